use crate::infra::{parse_history, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use interview_coach::error::AppError;
use interview_coach::scoring::ScoringResult;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) transcript: String,
    pub(crate) question: String,
    pub(crate) duration_seconds: f64,
    #[serde(default)]
    pub(crate) history: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub(crate) question_id: Option<String>,
}

pub(crate) fn with_score_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/score", axum::routing::post(score_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoringResult>, AppError> {
    let ScoreRequest {
        transcript,
        question,
        duration_seconds,
        history,
        question_id,
    } = payload;

    if transcript.chars().count() > state.max_transcript_chars {
        return Err(AppError::InvalidRequest(format!(
            "transcript exceeds the {} character limit",
            state.max_transcript_chars
        )));
    }

    let history = match history {
        Some(values) => parse_history(&values)?,
        None => Vec::new(),
    };

    let result = state.engine.score(
        &transcript,
        &question,
        duration_seconds,
        &history,
        question_id.as_deref(),
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_coach::scoring::ScoringEngine;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::json;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(handle),
            engine: Arc::new(ScoringEngine::default()),
            max_transcript_chars: 200,
        }
    }

    fn request(transcript: &str) -> ScoreRequest {
        ScoreRequest {
            transcript: transcript.to_string(),
            question: "Tell me about a challenge you faced.".to_string(),
            duration_seconds: 90.0,
            history: None,
            question_id: None,
        }
    }

    #[tokio::test]
    async fn score_endpoint_returns_full_report() {
        let transcript = "At my internship our API slowed down. My task was to fix it. \
So I profiled the service and we cut latency 40% as a result. I learned to measure first.";
        let Json(body) = score_endpoint(Extension(test_state()), Json(request(transcript)))
            .await
            .expect("scoring succeeds");

        assert!(body.overall_score >= 0.0 && body.overall_score <= 100.0);
        assert_eq!(body.transcript, transcript);
        assert!(!body.detected.sentences.is_empty());
    }

    #[tokio::test]
    async fn score_endpoint_rejects_oversized_transcripts() {
        let oversized = "word ".repeat(100);
        let err = score_endpoint(Extension(test_state()), Json(request(&oversized)))
            .await
            .expect_err("transcript over the limit is rejected");
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn score_endpoint_rejects_malformed_history() {
        let mut req = request("A fine answer about the incident.");
        req.history = Some(vec![json!(42)]);
        let err = score_endpoint(Extension(test_state()), Json(req))
            .await
            .expect_err("non-object history entry is rejected");
        assert!(matches!(err, AppError::History(_)));
    }

    #[tokio::test]
    async fn score_endpoint_accepts_history_entries() {
        let mut req = request("So I led the fix and we reduced errors by 30% as a result.");
        req.history = Some(vec![json!({
            "transcript": "um um it was fine I guess",
            "duration_seconds": 30.0,
            "scores": { "total": 35.0 }
        })]);
        let Json(body) = score_endpoint(Extension(test_state()), Json(req))
            .await
            .expect("scoring succeeds");
        assert_eq!(body.history_summary.attempt_count, 1);
        assert_eq!(body.history_summary.last_total, Some(35.0));
    }

    #[tokio::test]
    async fn router_scores_over_http() {
        use axum::body::{to_bytes, Body};
        use axum::http::Request;
        use tower::ServiceExt;

        let app = with_score_routes().layer(Extension(test_state()));
        let payload = json!({
            "transcript": "So I led the fix and we cut errors by 30% as a result.",
            "question": "Tell me about a challenge you faced.",
            "duration_seconds": 60.0
        });

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/score")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert!(value.get("overallScore").is_some());
        assert!(value.get("subscores").is_some());

        let health = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(health.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn router_rejects_bad_history_with_400() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let app = with_score_routes().layer(Extension(test_state()));
        let payload = json!({
            "transcript": "A fine answer.",
            "question": "Tell me about a project.",
            "duration_seconds": 30.0,
            "history": ["not-an-object"]
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/score")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn readiness_flips_with_the_flag() {
        let state = test_state();
        state
            .readiness
            .store(false, std::sync::atomic::Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
