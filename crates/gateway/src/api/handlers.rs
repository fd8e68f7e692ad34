//! Request handlers
//!
//! Every kind follows the same template: validate query parameters, compute
//! the correlation key, build the outbound message, register a response
//! slot, forward to the selected target (fire-and-forget), then block on
//! the slot. The resolved value is returned with status 200 whether it is
//! the kind's success projection or the target's in-band `{error}`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use common::{b64, TargetKind};
use metrics::{counter, gauge};
use router::{key, OutboundMessage, PendingTable, Reply, ResponseSlot};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

const REQUESTS: &str = "gateway_requests_total";
const FORWARD_FAILURES: &str = "gateway_forward_failures_total";
const IN_FLIGHT: &str = "gateway_requests_in_flight";

/// Gauge guard covering the blocking wait, decremented on every exit path
struct InFlight;

impl InFlight {
    fn track() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}

#[derive(Debug, Deserialize)]
pub struct GpiaParams {
    #[serde(rename = "authKey")]
    auth_key: Option<String>,
    business: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CertParams {
    #[serde(rename = "authKey")]
    auth_key: Option<String>,
    enc: Option<String>,
    business: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InfoParams {
    business: Option<String>,
}

pub async fn handle_gpia(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GpiaParams>,
) -> Result<Response, ApiError> {
    counter!(REQUESTS, "route" => "/gpia").increment(1);
    let auth_key = params.auth_key.ok_or(ApiError::MissingParam("authKey"))?;
    let business = parse_business(params.business)?;

    let slot = state.tables.gpia.register(auth_key.clone());
    forward(
        &state,
        business,
        &OutboundMessage::Gpia {
            auth_key: auth_key.clone(),
        },
    );

    let reply = await_reply(&state, &state.tables.gpia, &auth_key, slot).await?;
    reply_response(reply)
}

pub async fn handle_cert(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CertParams>,
) -> Result<Response, ApiError> {
    counter!(REQUESTS, "route" => "/cert").increment(1);
    let auth_key = params.auth_key.ok_or(ApiError::MissingParam("authKey"))?;
    let enc = params.enc.ok_or(ApiError::MissingParam("enc"))?;
    let business = parse_business(params.business)?;

    // Both values must decode before any routing state is created.
    let data = b64::concat(&auth_key, &enc)
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;

    let slot = state.tables.cert.register(auth_key.clone());
    forward(&state, business, &OutboundMessage::Cert { data });

    let reply = await_reply(&state, &state.tables.cert, &auth_key, slot).await?;
    reply_response(reply)
}

pub async fn handle_info(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InfoParams>,
) -> Result<Response, ApiError> {
    counter!(REQUESTS, "route" => "/info").increment(1);
    let business = parse_business(params.business)?;

    // No natural identity for this kind; correlate on a generated token.
    let id = key::random_key();
    let slot = state.tables.info.register(id.clone());
    forward(&state, business, &OutboundMessage::Info { id: id.clone() });

    let reply = await_reply(&state, &state.tables.info, &id, slot).await?;
    reply_response(reply)
}

pub async fn handle_health(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({
        "status": "ok",
        "service": state.service_name,
        "version": state.service_version,
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "targets": state.targets.statuses(),
        "pending": {
            "gpia": state.tables.gpia.len(),
            "cert": state.tables.cert.len(),
            "info": state.tables.info.len(),
        },
    }))
    .into_response()
}

pub async fn handle_unknown() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Unknown method"}))).into_response()
}

fn parse_business(raw: Option<String>) -> Result<bool, ApiError> {
    let raw = raw.ok_or(ApiError::MissingParam("business"))?;
    raw.parse::<bool>()
        .map_err(|_| ApiError::InvalidParam("business"))
}

/// Fire-and-forget hand-off to the selected target. Failures are logged
/// and counted; the request keeps waiting on its slot either way.
fn forward(state: &AppState, business: bool, message: &OutboundMessage) {
    let kind = TargetKind::from_flag(business);
    match state.targets.get(kind) {
        Some(target) => match target.post(message) {
            Ok(()) => debug!(target = %kind, "forwarded request to target"),
            Err(error) => {
                counter!(FORWARD_FAILURES, "target" => kind.as_str()).increment(1);
                warn!(target = %kind, %error, "failed to forward request; request keeps waiting");
            }
        },
        None => {
            counter!(FORWARD_FAILURES, "target" => kind.as_str()).increment(1);
            warn!(target = %kind, "no attachment for target; request keeps waiting");
        }
    }
}

/// Block on the slot, honoring the optional bounded wait. On expiry the
/// table entry is evicted so a late reply cannot resolve a dead waiter.
async fn await_reply<T: Send>(
    state: &AppState,
    table: &PendingTable<Reply<T>>,
    request_key: &str,
    slot: ResponseSlot<Reply<T>>,
) -> Result<Reply<T>, ApiError> {
    let _in_flight = InFlight::track();
    match state.response_timeout {
        None => Ok(slot.wait().await),
        Some(timeout) => match slot.wait_timeout(timeout).await {
            Some(reply) => Ok(reply),
            None => {
                table.evict(request_key);
                warn!(kind = %table.kind(), key = request_key, "no reply within the bounded wait; evicted");
                Err(ApiError::ReplyTimeout(timeout.as_secs()))
            }
        },
    }
}

/// 200 with either the success projection or the in-band `{error}` body
fn reply_response<T: Serialize>(reply: Reply<T>) -> Result<Response, ApiError> {
    let body = match reply {
        Ok(value) => serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))?,
        Err(failure) => json!({"error": failure.description}),
    };
    Ok(Json(body).into_response())
}
