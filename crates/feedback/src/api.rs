//! HTTP handlers for the feedback API.
//!
//! Each handler does one storage round-trip at most. Validation failures are
//! answered locally with a 400; every other error becomes a generic 500.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::{Error, Result, REQUIRED_FIELDS_MESSAGE};
use crate::model::{FeedbackInput, FeedbackRepresentation};
use crate::server::AppState;

/// Number of records returned when `limit` is absent or unparsable.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const MAIN_JS: &str = include_str!("../assets/main.js");

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.is_validation() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": REQUIRED_FIELDS_MESSAGE })),
            )
                .into_response();
        }

        if self.is_storage() {
            error!(error = %self, "storage failure");
        } else {
            error!(error = %self, "request failed");
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}

/// Query parameters for listing feedback.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Raw `limit` value; parsed leniently.
    pub limit: Option<String>,
}

impl ListParams {
    /// Resolve the effective limit.
    ///
    /// Zero and negative values pass through to storage.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

/// `GET /api/feedback`
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<FeedbackRepresentation>>> {
    let records = state.storage().recent_async(params.limit()).await?;
    Ok(Json(records.iter().map(FeedbackRepresentation::from).collect()))
}

/// `POST /api/feedback`
///
/// The body is read raw so that a malformed payload is validated as an
/// empty submission instead of being rejected by the JSON extractor.
pub async fn create_feedback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<FeedbackRepresentation>)> {
    let new = FeedbackInput::from_body(&body).validate()?;
    let created = state.storage().insert_async(new).await?;
    info!(id = created.id, "feedback received");
    Ok((StatusCode::CREATED, Json(created.to_representation())))
}

/// `GET /health`
///
/// Liveness only; storage is not consulted.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /static/main.js`
pub async fn main_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        MAIN_JS,
    )
}
