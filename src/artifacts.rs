//! Loading of the model artifacts and NLP resources into one immutable context.

use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::classifier::LinearClassifier;
use crate::config::Settings;
use crate::error::{AnalyzeError, ArtifactError};
use crate::ml::{self, Analysis};
use crate::preprocess::{ResourceSource, TextNormalizer};
use crate::vectorizer::TfidfVectorizer;

static SHARED_CONTEXT: OnceCell<Arc<ModelContext>> = OnceCell::new();

pub(crate) fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything inference needs, loaded once and read-only afterwards.
#[derive(Debug)]
pub struct ModelContext {
    pub normalizer: TextNormalizer,
    pub vectorizer: TfidfVectorizer,
    pub classifier: LinearClassifier,
}

impl ModelContext {
    pub fn new(
        normalizer: TextNormalizer,
        vectorizer: TfidfVectorizer,
        classifier: LinearClassifier,
    ) -> Result<Self, ArtifactError> {
        if vectorizer.dimension() != classifier.n_features() {
            return Err(ArtifactError::DimensionMismatch {
                vectorizer: vectorizer.dimension(),
                classifier: classifier.n_features(),
            });
        }
        Ok(Self {
            normalizer,
            vectorizer,
            classifier,
        })
    }

    pub fn load(settings: &Settings) -> Result<Self, ArtifactError> {
        let normalizer = match &settings.nlp_data_dir {
            Some(dir) => TextNormalizer::from_data_dir(dir)?,
            None => TextNormalizer::embedded(),
        };
        match normalizer.source() {
            ResourceSource::Embedded => info!(
                stopwords = normalizer.stopword_count(),
                lexicon = normalizer.lexicon_size(),
                "using embedded NLP resources"
            ),
            ResourceSource::Directory(dir) => info!(
                dir = %dir.display(),
                stopwords = normalizer.stopword_count(),
                lexicon = normalizer.lexicon_size(),
                "loaded NLP resources"
            ),
        }

        let vectorizer = TfidfVectorizer::load(&settings.vectorizer_path)?;
        info!(
            path = %settings.vectorizer_path.display(),
            vocabulary = vectorizer.vocabulary_size(),
            dimension = vectorizer.dimension(),
            "loaded vectorizer"
        );

        let classifier = LinearClassifier::load(&settings.model_path)?;
        info!(
            path = %settings.model_path.display(),
            kind = classifier.kind().as_str(),
            "loaded classifier"
        );

        Self::new(normalizer, vectorizer, classifier)
    }

    /// Process-wide context. The first successful call loads it; later calls
    /// return the same instance and ignore `settings`. Failures are not cached.
    pub fn shared(settings: &Settings) -> Result<Arc<Self>, ArtifactError> {
        Self::shared_in(&SHARED_CONTEXT, settings)
    }

    fn shared_in(
        cell: &OnceCell<Arc<Self>>,
        settings: &Settings,
    ) -> Result<Arc<Self>, ArtifactError> {
        cell.get_or_try_init(|| Self::load(settings).map(Arc::new))
            .cloned()
    }

    pub fn analyze(&self, review: &str) -> Result<Analysis, AnalyzeError> {
        ml::analyze_review(&self.normalizer, &self.vectorizer, &self.classifier, review)
    }
}
