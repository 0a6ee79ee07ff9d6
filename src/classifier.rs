//! Pre-trained binary linear classifier.

use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::ToSchema;

use crate::artifacts::read_artifact;
use crate::error::ArtifactError;
use crate::vectorizer::SparseVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    LinearSvc,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogisticRegression => "logistic_regression",
            Self::LinearSvc => "linear_svc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// Class `1` is positive; every other class value is negative.
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::Positive => "Positive Review",
            Self::Negative => "Negative Review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub class: i64,
    pub sentiment: Sentiment,
    /// Signed distance to the decision boundary.
    pub decision: f64,
    /// Percentage in [0, 100].
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct LinearModelArtifact {
    kind: ModelKind,
    coef: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_classes")]
    classes: [i64; 2],
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    kind: ModelKind,
    coef: Vec<f64>,
    intercept: f64,
    classes: [i64; 2],
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Confidence percentage for a decision score: the larger of the two class
/// probabilities under a logistic link, times 100.
pub fn confidence_from_decision(decision: f64) -> f64 {
    if decision.is_nan() {
        return 50.0;
    }
    let p = sigmoid(decision);
    (p.max(1.0 - p) * 100.0).clamp(0.0, 100.0)
}

impl LinearClassifier {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_json(&read_artifact(path)?, path)
    }

    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ArtifactError> {
        let artifact: LinearModelArtifact =
            serde_json::from_str(json).map_err(|source| ArtifactError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::from_artifact(artifact, origin)
    }

    fn from_artifact(artifact: LinearModelArtifact, origin: &Path) -> Result<Self, ArtifactError> {
        let invalid = |reason: &str| ArtifactError::Invalid {
            path: origin.to_path_buf(),
            reason: reason.to_string(),
        };
        if artifact.coef.is_empty() {
            return Err(invalid("coef is empty"));
        }
        if artifact.coef.iter().any(|w| !w.is_finite()) || !artifact.intercept.is_finite() {
            return Err(invalid("coef and intercept must be finite"));
        }
        if artifact.classes[0] == artifact.classes[1] {
            return Err(invalid("classes must be distinct"));
        }
        Ok(Self {
            kind: artifact.kind,
            coef: artifact.coef,
            intercept: artifact.intercept,
            classes: artifact.classes,
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn n_features(&self) -> usize {
        self.coef.len()
    }

    pub fn decision_function(&self, features: &SparseVector) -> f64 {
        features.dot(&self.coef) + self.intercept
    }

    pub fn predict(&self, features: &SparseVector) -> Prediction {
        let decision = self.decision_function(features);
        let class = if decision > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        };
        Prediction {
            class,
            sentiment: Sentiment::from_class(class),
            decision,
            confidence: confidence_from_decision(decision),
        }
    }
}
