//! Ranking orchestrator — scores every resume in a batch and orders them.
//!
//! Resumes are scored in parallel; the indexed collect keeps input order so
//! the stable sort still breaks ties by applicant id.

use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::artifacts::{ModelArtifacts, ModelError};
use crate::ranking::composer::compose_score;
use crate::ranking::experience::extract_years_of_experience;
use crate::ranking::normalize::normalize;
use crate::ranking::similarity::classify_and_score;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("required_experience must be a positive number, got {0}")]
    InvalidRequiredExperience(f64),

    #[error("failed to score applicant {applicant_id}: {source}")]
    Model {
        applicant_id: usize,
        source: ModelError,
    },
}

/// One resume's scores. All scores are unrounded and within [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResume {
    /// 1-based position in the input batch.
    pub applicant_id: usize,
    pub resume_text: String,
    pub predicted_category: String,
    pub similarity: f64,
    pub experience: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingResult {
    /// Sorted by `final_score` descending; ties keep input order.
    pub rankings: Vec<ScoredResume>,
    pub total: usize,
}

/// Ranks `resumes` against `job_description`.
///
/// Fails for the whole batch if `required_experience` is not a positive
/// finite number or if any single resume cannot be scored.
pub fn rank_resumes(
    artifacts: &ModelArtifacts,
    resumes: &[String],
    job_description: &str,
    required_experience: f64,
) -> Result<RankingResult, RankingError> {
    if !required_experience.is_finite() || required_experience <= 0.0 {
        return Err(RankingError::InvalidRequiredExperience(required_experience));
    }

    let started = Instant::now();
    let job_vector = artifacts.vectorizer().vectorize(&normalize(job_description));

    let mut rankings = resumes
        .par_iter()
        .enumerate()
        .map(|(idx, resume_text)| {
            let applicant_id = idx + 1;
            let matched = classify_and_score(artifacts, &normalize(resume_text), &job_vector)
                .map_err(|source| RankingError::Model {
                    applicant_id,
                    source,
                })?;
            let years = extract_years_of_experience(resume_text);
            let score = compose_score(matched.similarity, years, required_experience);

            debug!(
                applicant_id,
                category = %matched.category,
                similarity = matched.similarity,
                years,
                final_score = score.final_score,
                "Scored resume"
            );

            Ok(ScoredResume {
                applicant_id,
                resume_text: resume_text.clone(),
                predicted_category: matched.category,
                similarity: matched.similarity,
                experience: score.experience,
                final_score: score.final_score,
            })
        })
        .collect::<Result<Vec<_>, RankingError>>()?;

    // sort_by is stable: equal scores stay in applicant order
    rankings.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    let total = rankings.len();
    info!(
        total,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Ranked resumes"
    );

    Ok(RankingResult { rankings, total })
}
