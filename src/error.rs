//! Error types for artifact loading and review analysis.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the model artifacts or the NLP resources.
///
/// All of these are startup errors: the service cannot answer a single
/// request without both artifacts and the normalizer resources.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("classifier expects {classifier} features but the vectorizer produces {vectorizer}")]
    DimensionMismatch { vectorizer: usize, classifier: usize },

    #[error("NLP resource {0} is empty")]
    EmptyResource(PathBuf),

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("archive from {url} has no {entry}")]
    MissingArchiveEntry { url: String, entry: &'static str },
}

/// Per-request failures of the inference path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Please enter a review")]
    EmptyReview,
}
