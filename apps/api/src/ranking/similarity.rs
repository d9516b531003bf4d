//! Feature/similarity engine: category prediction plus resume ↔ JD cosine similarity.

use crate::artifacts::vectorizer::FeatureVector;
use crate::artifacts::{ModelArtifacts, ModelError};

/// Category and similarity for a single resume.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeMatch {
    pub category: String,
    pub similarity: f64,
}

/// Cosine similarity clamped to [0, 1].
/// A zero vector on either side yields 0.0, never NaN.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    let sim = a.dot(b) / denom;
    if sim.is_nan() {
        return 0.0;
    }
    sim.clamp(0.0, 1.0)
}

/// Vectorizes a normalized resume, predicts its category, and scores it
/// against the already-vectorized job description.
///
/// Only the resume is classified; the job description is never passed to
/// the classifier.
pub fn classify_and_score(
    artifacts: &ModelArtifacts,
    normalized_resume: &str,
    job_vector: &FeatureVector,
) -> Result<ResumeMatch, ModelError> {
    let resume_vector = artifacts.vectorizer().vectorize(normalized_resume);

    let class = artifacts.classifier().predict(&resume_vector)?;
    let category = artifacts.labels().inverse_transform(class)?.to_string();

    Ok(ResumeMatch {
        category,
        similarity: cosine_similarity(&resume_vector, job_vector),
    })
}
