//! Review text normalization.
//!
//! Lowercase, keep ASCII letters only, drop stopwords, lemmatize, and join
//! the surviving tokens with single spaces.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::ArtifactError;
use crate::lemmatizer::{Lemmatizer, EMBEDDED_LEMMATIZER};
use crate::stopwords::{StopWords, ENGLISH_STOPWORDS};

static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z]").unwrap());

/// Where the normalizer's stopwords and lexicon came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    Embedded,
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stopwords: StopWords,
    lemmatizer: Lemmatizer,
    source: ResourceSource,
}

impl TextNormalizer {
    pub fn new(stopwords: StopWords, lemmatizer: Lemmatizer, source: ResourceSource) -> Self {
        Self {
            stopwords,
            lemmatizer,
            source,
        }
    }

    /// Normalizer backed by the resources compiled into the binary.
    pub fn embedded() -> Self {
        Self::new(
            ENGLISH_STOPWORDS.clone(),
            EMBEDDED_LEMMATIZER.clone(),
            ResourceSource::Embedded,
        )
    }

    /// Load resources from an `nltk_data`-style tree:
    /// `corpora/stopwords/english`, `corpora/wordnet/{index.noun,noun.exc}`.
    pub fn from_data_dir(dir: &Path) -> Result<Self, ArtifactError> {
        let corpora = dir.join("corpora");
        let stopwords = StopWords::load(&corpora.join("stopwords").join("english"))?;
        let lemmatizer = Lemmatizer::load(&corpora.join("wordnet"))?;
        Ok(Self::new(
            stopwords,
            lemmatizer,
            ResourceSource::Directory(dir.to_path_buf()),
        ))
    }

    pub fn source(&self) -> &ResourceSource {
        &self.source
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    pub fn lexicon_size(&self) -> usize {
        self.lemmatizer.lexicon_size()
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Map raw review text to its cleaned token string.
    ///
    /// Output only contains `[a-z ]`, never a stopword, and is empty for
    /// blank input.
    pub fn clean_text(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let letters_only = NON_ALPHA.replace_all(&lowered, " ");

        letters_only
            .split_whitespace()
            .filter(|word| !self.is_stopword(word))
            .map(|word| self.lemmatizer.lemmatize(word))
            // a lemma can land on a stopword ("ms" -> "m")
            .filter(|lemma| !self.is_stopword(lemma))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
