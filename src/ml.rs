//! Review sentiment inference.
//!
//! Cleans the review, runs the pre-fitted vectorizer, then the pre-trained
//! classifier. Blank reviews are rejected before either model is touched.

use tracing::debug;

use crate::classifier::{LinearClassifier, Prediction};
use crate::error::AnalyzeError;
use crate::preprocess::TextNormalizer;
use crate::vectorizer::{SparseVector, TfidfVectorizer};

/// Cleaned text to feature vector.
pub trait FeatureTransform {
    fn transform(&self, cleaned: &str) -> SparseVector;
}

/// Feature vector to binary label plus confidence.
pub trait BinaryClassifier {
    fn predict(&self, features: &SparseVector) -> Prediction;
}

impl FeatureTransform for TfidfVectorizer {
    fn transform(&self, cleaned: &str) -> SparseVector {
        TfidfVectorizer::transform(self, cleaned)
    }
}

impl BinaryClassifier for LinearClassifier {
    fn predict(&self, features: &SparseVector) -> Prediction {
        LinearClassifier::predict(self, features)
    }
}

/// Result of analyzing one review.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub cleaned_text: String,
    pub non_zero_features: usize,
    pub prediction: Prediction,
}

pub fn analyze_review<V, C>(
    normalizer: &TextNormalizer,
    vectorizer: &V,
    classifier: &C,
    review: &str,
) -> Result<Analysis, AnalyzeError>
where
    V: FeatureTransform + ?Sized,
    C: BinaryClassifier + ?Sized,
{
    if review.trim().is_empty() {
        return Err(AnalyzeError::EmptyReview);
    }

    let cleaned_text = normalizer.clean_text(review);
    let features = vectorizer.transform(&cleaned_text);
    let prediction = classifier.predict(&features);

    debug!(
        label = prediction.sentiment.as_str(),
        confidence = prediction.confidence,
        features = features.nnz(),
        "review analyzed"
    );

    Ok(Analysis {
        cleaned_text,
        non_zero_features: features.nnz(),
        prediction,
    })
}
