//! Pre-fitted TF-IDF transform.
//!
//! The artifact is a JSON export of a fitted scikit-learn `TfidfVectorizer`
//! (`vocabulary_`, `idf_` and the transform parameters). Nothing is fitted here.

use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::artifacts::read_artifact;
use crate::error::ArtifactError;

pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    #[serde(rename = "none")]
    Unnormalized,
}

#[derive(Debug, Deserialize)]
struct TfidfArtifact {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Norm,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_lowercase() -> bool {
    true
}

/// Sparse feature vector with strictly increasing column indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    #[cfg(test)]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn dot(&self, dense: &[f64]) -> f64 {
        debug_assert_eq!(dense.len(), self.dim);
        self.entries
            .iter()
            .map(|&(idx, value)| dense.get(idx).copied().unwrap_or(0.0) * value)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Norm,
    token_pattern: Regex,
    lowercase: bool,
}

impl TfidfVectorizer {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_json(&read_artifact(path)?, path)
    }

    /// Parse an artifact body. `origin` is only used in error messages.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ArtifactError> {
        let artifact: TfidfArtifact =
            serde_json::from_str(json).map_err(|source| ArtifactError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::from_artifact(artifact, origin)
    }

    fn from_artifact(artifact: TfidfArtifact, origin: &Path) -> Result<Self, ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            path: origin.to_path_buf(),
            reason,
        };

        if artifact.idf.is_empty() {
            return Err(invalid("idf is empty".to_string()));
        }
        if let Some(pos) = artifact.idf.iter().position(|w| !w.is_finite() || *w <= 0.0) {
            return Err(invalid(format!("idf[{}] is not a finite positive weight", pos)));
        }

        let mut taken = vec![false; artifact.idf.len()];
        for (term, &idx) in &artifact.vocabulary {
            match taken.get_mut(idx) {
                None => {
                    return Err(invalid(format!(
                        "term {:?} maps to column {} but idf has {} entries",
                        term,
                        idx,
                        artifact.idf.len()
                    )))
                }
                Some(slot) if *slot => {
                    return Err(invalid(format!("column {} is assigned twice", idx)))
                }
                Some(slot) => *slot = true,
            }
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(invalid(format!("bad ngram_range ({}, {})", min_n, max_n)));
        }

        let token_pattern = Regex::new(&artifact.token_pattern)
            .map_err(|e| invalid(format!("token_pattern does not compile: {}", e)))?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            token_pattern,
            lowercase: artifact.lowercase,
        })
    }

    /// Number of columns in every produced vector.
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let text: Cow<'_, str> = if self.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .collect();

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&gram) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let norm = match self.norm {
            Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::Unnormalized => 1.0,
        };
        if norm > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= norm;
            }
        }

        SparseVector {
            dim: self.dimension(),
            entries,
        }
    }
}
