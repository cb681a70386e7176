use crate::infra::AppState;
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use rentcheck::error::AppError;
use rentcheck::identity::AnonymousUserId;
use rentcheck::market::{MarketRentError, MarketRentEstimate};
use rentcheck::persona::{Persona, PersonaProfile, VerdictCopy};
use rentcheck::presentation::{format_score, presentation, VerdictPresentation};
use rentcheck::scoring::{
    compute_breakdown, evaluate, RawScoreInput, ScoreBreakdown, ScoreInput, ScoreResult,
};
use rentcheck::submissions::{
    RecordId, RentInputRecord, ScoreRecord, Submission, SubmissionReceipt,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

/// Stored records plus the display copy the client renders next to them.
#[derive(Debug, Serialize)]
pub(crate) struct SubmissionView {
    pub(crate) input: RentInputRecord,
    pub(crate) score: ScoreRecord,
    pub(crate) display_score: String,
    pub(crate) presentation: &'static VerdictPresentation,
    pub(crate) copy: &'static VerdictCopy,
}

impl SubmissionView {
    fn new(receipt: SubmissionReceipt, default_persona: Persona) -> Self {
        let SubmissionReceipt { input, score } = receipt;
        let persona = score.persona.unwrap_or(default_persona);
        Self {
            display_score: format_score(score.score),
            presentation: presentation(score.verdict),
            copy: persona.copy(score.verdict),
            input,
            score,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/score", post(score_endpoint))
        .route("/api/v1/score/breakdown", post(breakdown_endpoint))
        .route("/api/v1/submissions", post(submit_endpoint))
        .route("/api/v1/submissions/:score_id", get(submission_endpoint))
        .route(
            "/api/v1/users/:user_id/submissions",
            get(user_history_endpoint),
        )
        .route("/api/v1/market-rent/:zip_code", get(market_rent_endpoint))
        .route("/api/v1/personas", get(personas_endpoint))
        .layer(Extension(state))
        .layer(cors_layer())
}

/// Browser clients call cross-origin and send API-key headers.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
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

// Bodies are read raw so an empty or untyped request still gets the
// missing-fields message instead of a content-type rejection.
pub(crate) async fn score_endpoint(body: Bytes) -> Result<Json<ScoreResult>, AppError> {
    let raw = RawScoreInput::from_json_slice(&body)?;
    let result = evaluate(&raw)?;
    debug!(score = result.score, verdict = %result.verdict, "scored request");
    Ok(Json(result))
}

pub(crate) async fn breakdown_endpoint(body: Bytes) -> Result<Json<ScoreBreakdown>, AppError> {
    let raw = RawScoreInput::from_json_slice(&body)?;
    let input = ScoreInput::try_from(raw)?;
    Ok(Json(compute_breakdown(&input)))
}

pub(crate) async fn submit_endpoint(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmissionView>), AppError> {
    let submission = Submission::from_json_slice(&body)?;
    let receipt = state.submissions.submit(submission)?;
    Ok((
        StatusCode::CREATED,
        Json(SubmissionView::new(receipt, state.default_persona)),
    ))
}

pub(crate) async fn submission_endpoint(
    Extension(state): Extension<AppState>,
    Path(score_id): Path<String>,
) -> Result<Json<SubmissionView>, AppError> {
    let receipt = state.submissions.get(&RecordId(score_id))?;
    Ok(Json(SubmissionView::new(receipt, state.default_persona)))
}

pub(crate) async fn user_history_endpoint(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ScoreRecord>>, AppError> {
    let user_id = AnonymousUserId::parse(&user_id)?;
    Ok(Json(state.submissions.history(&user_id)?))
}

pub(crate) async fn market_rent_endpoint(
    Extension(state): Extension<AppState>,
    Path(zip_code): Path<String>,
) -> Result<Json<MarketRentEstimate>, AppError> {
    let lookup = state.market.as_ref().ok_or(MarketRentError::NotConfigured)?;
    Ok(Json(lookup.market_rent_for(&zip_code)?))
}

pub(crate) async fn personas_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    let personas: Vec<&'static PersonaProfile> =
        Persona::ALL.iter().map(|persona| persona.profile()).collect();
    Json(json!({
        "default": state.default_persona.key(),
        "personas": personas,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use rentcheck::market::{CsvMarketRentTable, InMemoryMarketRentCache, MarketRentLookup};
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState::new(handle, Persona::SupportiveFriend)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn score_endpoint_returns_score_and_verdict() {
        let app = router(test_state());
        let (status, body) = send(
            app,
            post_json(
                "/api/v1/score",
                r#"{"rent":1500,"income":5000,"market_rent":1600,"unit_quality":8}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "score": 90, "verdict": "Fair" }));
    }

    #[tokio::test]
    async fn score_endpoint_rejects_missing_fields() {
        let app = router(test_state());
        let (status, body) = send(
            app,
            post_json("/api/v1/score", r#"{"rent":1500,"income":5000}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "missing required fields: market_rent, unit_quality"
        );
    }

    #[tokio::test]
    async fn score_endpoint_treats_empty_body_as_missing_everything() {
        let app = router(test_state());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/score")
            .body(Body::empty())
            .expect("request builds");
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "missing required fields: rent, income, market_rent, unit_quality"
        );
    }

    #[tokio::test]
    async fn score_endpoint_rejects_malformed_json() {
        let app = router(test_state());
        let (status, body) = send(app, post_json("/api/v1/score", "{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .expect("error string")
            .starts_with("malformed score input"));
    }

    #[tokio::test]
    async fn breakdown_endpoint_reports_each_term() {
        let app = router(test_state());
        let (status, body) = send(
            app,
            post_json(
                "/api/v1/score/breakdown",
                r#"{"rent":2000,"income":6000,"market_rent":1800,"unit_quality":7}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["income_ratio"]["points"], 20);
        assert_eq!(body["market_comparison"]["points"], -30);
        assert_eq!(body["quality"]["points"], 35);
        assert_eq!(body["result"], json!({ "score": 25, "verdict": "Predatory" }));
    }

    #[tokio::test]
    async fn preflight_is_answered_with_cors_headers() {
        let app = router(test_state());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/score")
            .header(header::ORIGIN, "https://truthbetold.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "apikey,content-type")
            .body(Body::empty())
            .expect("request builds");

        let response = app.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
        let allowed = headers
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        assert!(allowed.contains("x-client-info"));
        assert!(allowed.contains("apikey"));
    }

    #[tokio::test]
    async fn submissions_are_created_and_fetched() {
        let state = test_state();
        let user_id = AnonymousUserId::generate();
        let body = json!({
            "rent": 1800,
            "income": 6000,
            "market_rent": 1900,
            "unit_quality": 6,
            "zip_code": " 90210 ",
            "persona": "tough_coach",
            "user_id": user_id.as_str(),
        });

        let (status, created) = send(
            router(state.clone()),
            post_json("/api/v1/submissions", &body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["score"]["score"], 80);
        assert_eq!(created["score"]["verdict"], "Fair");
        assert_eq!(created["score"]["persona"], "tough_coach");
        assert_eq!(created["input"]["zip_code"], "90210");
        assert_eq!(created["display_score"], "80/100");
        assert_eq!(
            created["copy"]["label"],
            Persona::ToughCoach.copy(rentcheck::scoring::Verdict::Fair).label
        );

        let score_id = created["score"]["id"].as_str().expect("score id");
        let (status, fetched) = send(
            router(state.clone()),
            get_request(&format!("/api/v1/submissions/{score_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["score"], created["score"]);

        let (status, history) = send(
            router(state),
            get_request(&format!("/api/v1/users/{user_id}/submissions")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn submission_without_zip_code_is_rejected() {
        let app = router(test_state());
        let (status, body) = send(
            app,
            post_json(
                "/api/v1/submissions",
                r#"{"rent":1800,"income":6000,"market_rent":1900,"unit_quality":6}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "zip code is required");
    }

    #[tokio::test]
    async fn unknown_submission_is_not_found() {
        let app = router(test_state());
        let (status, body) = send(app, get_request("/api/v1/submissions/missing")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "record not found");
    }

    #[tokio::test]
    async fn malformed_user_id_is_bad_request() {
        let app = router(test_state());
        let (status, _) = send(app, get_request("/api/v1/users/not-a-uuid/submissions")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn market_rent_requires_configured_table() {
        let app = router(test_state());
        let (status, _) = send(app, get_request("/api/v1/market-rent/90210")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn market_rent_is_served_from_table() {
        let table = CsvMarketRentTable::from_reader(
            "zip_code,region_code,market_rent\n90210,CA-LA,2000\n".as_bytes(),
        )
        .expect("table parses");
        let lookup = MarketRentLookup::new(
            Arc::new(table),
            Arc::new(InMemoryMarketRentCache::default()),
        );
        let state = test_state().with_market(lookup);

        let (status, body) = send(
            router(state.clone()),
            get_request("/api/v1/market-rent/90210"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region_code"], "CA-LA");
        assert_eq!(body["market_rent"], 2000.0);

        let (status, _) = send(router(state), get_request("/api/v1/market-rent/10001")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn personas_are_listed_with_default() {
        let app = router(test_state());
        let (status, body) = send(app, get_request("/api/v1/personas")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default"], "supportive_friend");
        assert_eq!(body["personas"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let state = test_state();
        let (status, body) = send(router(state.clone()), get_request("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        state.readiness().store(true, Ordering::Release);
        let (status, body) = send(router(state), get_request("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }
}
