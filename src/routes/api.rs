//! JSON API routes
//!
//! Thin handlers: parse the request, call into the emissions engine or the
//! chat coordinator, translate results to HTTP. All numeric fields are kg
//! CO2e unless the projection crossed the tons threshold; percentages are
//! integers 0-100.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::emissions::{
    activity_summary, aggregate, compute_footprint, evaluate_milestones, evaluate_weekly_goals,
    recommend, ActivityRecord,
};
use crate::server::http::AppState;

/// API error response
#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    code: &'static str,
}

/// Build a JSON error response
pub fn error_response(
    status: StatusCode,
    message: &str,
    code: &'static str,
) -> Response<Full<Bytes>> {
    let error = ApiError {
        error: message.to_string(),
        code,
    };
    let body = serde_json::to_vec(&error).unwrap_or_default();

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from(r#"{"error":"Internal error"}"#)))
                .unwrap()
        })
}

/// Build a successful JSON response from a serializable value
pub fn json_response<T: Serialize>(value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Cache-Control", "no-cache")
            .header("Access-Control-Allow-Origin", "*")
            .body(Full::new(Bytes::from(body)))
            .unwrap_or_else(|_| {
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to build response",
                    "encode_failed",
                )
            }),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Failed to encode response: {e}"),
            "encode_failed",
        ),
    }
}

/// Parse a query string into a key-value map
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    if query.is_empty() {
        return HashMap::new();
    }

    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Extract the mandatory `user_id` query parameter
fn require_user_id(req: &Request<Incoming>) -> Result<String, Response<Full<Bytes>>> {
    let params = parse_query_params(req.uri().query().unwrap_or(""));
    params
        .get("user_id")
        .filter(|u| !u.is_empty())
        .cloned()
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                "user_id query parameter required",
                "missing_user_id",
            )
        })
}

/// GET /health
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    json_response(&serde_json::json!({
        "status": "ok",
        "chat_connections": state.chat.connection_count(),
    }))
}

/// GET /version
pub fn version_info() -> Response<Full<Bytes>> {
    json_response(&serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
struct MintTokenRequest {
    user_id: String,
}

#[derive(Debug, Serialize)]
struct MintTokenResponse {
    token: String,
    user_id: String,
}

/// POST /auth/token (dev mode only)
///
/// Production identity comes from the external auth collaborator; this
/// endpoint only exists so local clients can obtain a chat token.
pub async fn mint_token(state: Arc<AppState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    if !state.args.dev_mode {
        return error_response(
            StatusCode::FORBIDDEN,
            "Token mint is only available in dev mode",
            "dev_mode_only",
        );
    }

    let body = match read_body(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    let request: MintTokenRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid request body: {e}"),
                "invalid_body",
            )
        }
    };

    match state.jwt.issue_token(&request.user_id) {
        Ok(token) => {
            info!(user = %request.user_id, "minted dev token");
            json_response(&MintTokenResponse {
                token,
                user_id: request.user_id,
            })
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &e.to_string(),
            "mint_failed",
        ),
    }
}

#[derive(Debug, Serialize)]
struct UpsertResponse {
    replaced: bool,
    footprint: crate::emissions::FootprintResult,
}

/// POST /api/v1/activities?user_id=
///
/// Upserts the day's record (one per user per calendar day; a re-submission
/// overwrites in place) and responds with its computed footprint.
pub async fn upsert_activity(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let body = match read_body(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    let record: ActivityRecord = match serde_json::from_slice(&body) {
        Ok(record) => record,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid activity record: {e}"),
                "invalid_body",
            )
        }
    };

    let footprint = compute_footprint(&record);
    let replaced = state.store.upsert(&user_id, record).await;
    debug!(user = %user_id, replaced, total = footprint.total, "activity upserted");

    json_response(&UpsertResponse { replaced, footprint })
}

/// GET /api/v1/dashboard?user_id=&days=
pub async fn dashboard(state: Arc<AppState>, req: &Request<Incoming>) -> Response<Full<Bytes>> {
    let params = parse_query_params(req.uri().query().unwrap_or(""));
    let Some(user_id) = params.get("user_id").filter(|u| !u.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "user_id query parameter required",
            "missing_user_id",
        );
    };
    let days = params
        .get("days")
        .and_then(|d| d.parse::<usize>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(state.args.window_days);

    let records = state.store.recent(user_id, days).await;
    json_response(&aggregate(&records, days))
}

/// GET /api/v1/summary?user_id=
pub async fn summary(state: Arc<AppState>, req: &Request<Incoming>) -> Response<Full<Bytes>> {
    let params = parse_query_params(req.uri().query().unwrap_or(""));
    let Some(user_id) = params.get("user_id").filter(|u| !u.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "user_id query parameter required",
            "missing_user_id",
        );
    };

    let records = state.store.recent(user_id, state.args.window_days).await;
    json_response(&activity_summary(&records))
}

#[derive(Debug, Serialize)]
struct MilestonesResponse {
    milestones: Vec<crate::emissions::Milestone>,
    goals: Vec<crate::emissions::WeeklyGoal>,
}

/// GET /api/v1/milestones?user_id=
pub async fn milestones(state: Arc<AppState>, req: &Request<Incoming>) -> Response<Full<Bytes>> {
    let params = parse_query_params(req.uri().query().unwrap_or(""));
    let Some(user_id) = params.get("user_id").filter(|u| !u.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "user_id query parameter required",
            "missing_user_id",
        );
    };

    let records = state.store.recent(user_id, state.args.window_days).await;
    json_response(&MilestonesResponse {
        milestones: evaluate_milestones(&records),
        goals: evaluate_weekly_goals(&records),
    })
}

/// GET /api/v1/recommendations?user_id=
pub async fn recommendations(
    state: Arc<AppState>,
    req: &Request<Incoming>,
) -> Response<Full<Bytes>> {
    let params = parse_query_params(req.uri().query().unwrap_or(""));
    let Some(user_id) = params.get("user_id").filter(|u| !u.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "user_id query parameter required",
            "missing_user_id",
        );
    };

    let records = state.store.recent(user_id, state.args.window_days).await;
    let summary = aggregate(&records, state.args.window_days);
    json_response(&recommend(&summary))
}

/// GET /api/v1/online
pub fn online_users(state: Arc<AppState>) -> Response<Full<Bytes>> {
    json_response(&serde_json::json!({
        "users": state.chat.list_online(),
    }))
}

/// 404 response
pub fn not_found(path: &str) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("No route for {path}"),
        "not_found",
    )
}

/// Collect a request body
async fn read_body(req: Request<Incoming>) -> Result<Bytes, Response<Full<Bytes>>> {
    match req.into_body().collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => Err(error_response(
            StatusCode::BAD_REQUEST,
            &format!("Failed to read request body: {e}"),
            "body_read_failed",
        )),
    }
}
