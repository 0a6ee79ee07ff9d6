//! English stopword set.
//!
//! The file format is NLTK's `corpora/stopwords/english`: one word per line.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

use crate::error::ArtifactError;

pub(crate) const EMBEDDED_ENGLISH: &str = include_str!("../resources/stopwords/english");

/// Stopwords compiled into the binary, used when no NLP data directory is configured.
pub static ENGLISH_STOPWORDS: Lazy<StopWords> = Lazy::new(|| StopWords::parse(EMBEDDED_ENGLISH));

#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn parse(content: &str) -> Self {
        let words = content
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();
        Self { words }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stopwords = Self::parse(&content);
        if stopwords.is_empty() {
            return Err(ArtifactError::EmptyResource(path.to_path_buf()));
        }
        Ok(stopwords)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
