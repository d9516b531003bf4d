//! Axum route handler for the ranking API.

use anyhow::Context;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info_span;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ranking::composer::round2;
use crate::ranking::orchestrator::{rank_resumes, ScoredResume};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub resumes: Vec<String>,
    pub job_description: String,
    pub required_experience: f64,
}

/// One ranked applicant as sent over the wire. Scores are rounded to 2 places.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    #[serde(rename = "Applicant ID")]
    pub applicant_id: usize,
    #[serde(rename = "Resume Text")]
    pub resume_text: String,
    #[serde(rename = "Predicted Category")]
    pub predicted_category: String,
    #[serde(rename = "Similarity Score")]
    pub similarity_score: f64,
    #[serde(rename = "Experience Score")]
    pub experience_score: f64,
    #[serde(rename = "Final Score")]
    pub final_score: f64,
}

impl From<ScoredResume> for RankingEntry {
    fn from(scored: ScoredResume) -> Self {
        Self {
            applicant_id: scored.applicant_id,
            resume_text: scored.resume_text,
            predicted_category: scored.predicted_category,
            similarity_score: round2(scored.similarity),
            experience_score: round2(scored.experience),
            final_score: round2(scored.final_score),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankResponse {
    pub rankings: Vec<RankingEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /process-resume
///
/// Ranks a batch of resumes against one job description.
/// The whole batch succeeds or fails; partial rankings are never returned.
pub async fn handle_process_resume(
    State(state): State<AppState>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<RankResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::MalformedRequest(e.body_text()))?;

    let ranking_id = Uuid::new_v4();
    let span = info_span!("ranking", %ranking_id, resumes = request.resumes.len());
    let artifacts = state.artifacts.clone();

    // Scoring is CPU-bound; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        span.in_scope(|| {
            rank_resumes(
                &artifacts,
                &request.resumes,
                &request.job_description,
                request.required_experience,
            )
        })
    })
    .await
    .context("ranking task panicked")??;

    Ok(Json(RankResponse {
        rankings: result.rankings.into_iter().map(RankingEntry::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::fixtures;
    use crate::routes::build_router;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState {
            artifacts: fixtures::artifacts(),
        })
    }

    async fn post(app: Router, body: String) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/process-resume")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_ranks_batch() {
        let body = json!({
            "resumes": ["5 years Java developer", "no years mentioned"],
            "job_description": "Java backend role",
            "required_experience": 5
        });
        let (status, bytes) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let response: RankResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(response.rankings.len(), 2);
        let top = &response.rankings[0];
        assert_eq!(top.applicant_id, 1);
        assert_eq!(top.resume_text, "5 years Java developer");
        assert_eq!(top.predicted_category, "Java Developer");
        assert_eq!(top.experience_score, 1.0);
        assert_eq!(response.rankings[1].experience_score, 0.0);

        for entry in &response.rankings {
            let recomposed = 0.7 * entry.similarity_score + 0.3 * entry.experience_score;
            assert!((entry.final_score - recomposed).abs() <= 0.01 + 1e-9);
        }
    }

    #[tokio::test]
    async fn test_wire_field_names() {
        let body = json!({
            "resumes": ["python data science"],
            "job_description": "data science",
            "required_experience": 2.5
        });
        let (status, bytes) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        let entry = &value["rankings"][0];
        for key in [
            "Applicant ID",
            "Resume Text",
            "Predicted Category",
            "Similarity Score",
            "Experience Score",
            "Final Score",
        ] {
            assert!(entry.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(entry["Predicted Category"], "Data Science");
    }

    #[tokio::test]
    async fn test_half_cent_scores_round_to_even() {
        // 5 / 8 = 0.625
        let body = json!({
            "resumes": ["5 years java developer"],
            "job_description": "java backend",
            "required_experience": 8
        });
        let (status, bytes) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["rankings"][0]["Experience Score"], json!(0.62));
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_rankings() {
        let body = json!({
            "resumes": [],
            "job_description": "anything",
            "required_experience": 1
        });
        let (status, bytes) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "rankings": [] }));
    }

    #[tokio::test]
    async fn test_zero_required_experience_is_rejected() {
        let body = json!({
            "resumes": ["5 years java"],
            "job_description": "java",
            "required_experience": 0
        });
        let (status, bytes) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"]
            .as_str()
            .unwrap()
            .contains("required_experience"));
    }

    #[tokio::test]
    async fn test_missing_field_is_malformed() {
        let body = json!({ "resumes": ["java"], "required_experience": 3 });
        let (status, bytes) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_type_is_malformed() {
        let body = json!({
            "resumes": "not a list",
            "job_description": "java",
            "required_experience": 3
        });
        let (status, _) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({
            "resumes": ["java"],
            "job_description": "java",
            "required_experience": "three"
        });
        let (status, _) = post(app(), body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let (status, bytes) = post(app(), "{\"resumes\": [".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn test_identical_requests_give_identical_bytes() {
        let body = json!({
            "resumes": ["java 3 years", "python data", "backend developer two years", "java"],
            "job_description": "Java backend developer",
            "required_experience": 4
        })
        .to_string();
        let (_, first) = post(app(), body.clone()).await;
        let (_, second) = post(app(), body).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_health_reports_model_shape() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["categories"], 2);
        assert_eq!(value["features"], fixtures::TERMS.len());
    }
}
