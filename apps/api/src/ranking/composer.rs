/// Weight of the resume ↔ JD similarity in the final score.
pub const SIMILARITY_WEIGHT: f64 = 0.7;
/// Weight of the experience match in the final score.
pub const EXPERIENCE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposedScore {
    pub experience: f64,
    pub final_score: f64,
}

/// experience = min(years / required, 1.0)
/// final      = 0.7 * similarity + 0.3 * experience
///
/// `required_experience` must be positive; the orchestrator rejects anything
/// else before scoring starts. Values are unrounded.
pub fn compose_score(similarity: f64, years: u32, required_experience: f64) -> ComposedScore {
    let experience = (f64::from(years) / required_experience).clamp(0.0, 1.0);
    let similarity = similarity.clamp(0.0, 1.0);
    let final_score =
        (SIMILARITY_WEIGHT * similarity + EXPERIENCE_WEIGHT * experience).clamp(0.0, 1.0);

    ComposedScore {
        experience,
        final_score,
    }
}

/// Rounds to two decimal places for presentation.
///
/// Precision formatting rounds the exact binary value half-to-even, so
/// 0.625 becomes 0.62 and 0.375 becomes 0.38.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
