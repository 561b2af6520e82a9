use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use focusbuddy_core::billing::{handle_webhook, SIGNATURE_HEADER};
use focusbuddy_core::{CoreError, SignatureError, TipSource, ValidationError};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{error::ApiError, state::AppState};

type ApiResult = Result<Json<Value>, ApiError>;

/// Tip stored with a session when no generated one is available.
pub const DEFAULT_SESSION_TIP: &str = "You focused for a full session!";

fn ok(data: Value) -> ApiResult {
    Ok(Json(json!({ "success": true, "data": data })))
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::from(CoreError::Json(e)))
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::from(ValidationError::MissingField(field.into())).into())
}

/// Run synchronous storage work (SQLite, image files) on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn motivational_tip_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let tip = state.tips.get_cached_tip().await;
    ok(serde_json::to_value(tip).map_err(CoreError::from)?)
}

#[derive(Deserialize)]
pub struct VerifyPayment {
    reference: Option<String>,
}

pub async fn verify_payment_handler(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult {
    let payload: VerifyPayment = parse_body(&body)?;
    let reference = required("reference", payload.reference)?;
    let verification = state.verifier.verify_payment(&reference).await?;
    info!(reference = %verification.reference, "payment verified");
    ok(serde_json::to_value(verification).map_err(CoreError::from)?)
}

pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let Some(signature) = headers.get(SIGNATURE_HEADER) else {
        return Err(CoreError::from(SignatureError::Missing).into());
    };
    let signature = signature.to_str().map_err(|_| CoreError::from(SignatureError::Mismatch))?;

    let secret = state.config.webhook_secret()?;
    let event = handle_webhook(secret.as_bytes(), &body, Some(signature))?;
    ok(json!({ "message": event.ack_message() }))
}

pub async fn webhook_status_handler() -> ApiResult {
    ok(json!({ "message": "Paystack webhook endpoint is active" }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsQuery {
    user_id: Option<String>,
}

pub async fn list_rewards_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RewardsQuery>,
) -> ApiResult {
    let user_id = required("userId", query.user_id)?;
    let store = state.rewards.clone();
    let rewards = blocking(move || store.list_rewards(&user_id)).await?;
    ok(json!({ "rewards": rewards }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReward {
    user_id: Option<String>,
    session_id: Option<String>,
    image_data: Option<String>,
}

pub async fn save_reward_handler(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult {
    let payload: SaveReward = parse_body(&body)?;
    let user_id = required("userId", payload.user_id)?;
    let session_id = required("sessionId", payload.session_id)?;
    let image_data = required("imageData", payload.image_data)?;

    // Accept canvas data URLs as well as bare base64.
    let encoded = match image_data.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => image_data.as_str(),
    };
    let image = STANDARD.decode(encoded).map_err(|e| {
        CoreError::from(ValidationError::InvalidValue {
            field: "imageData".into(),
            message: e.to_string(),
        })
    })?;

    let store = state.rewards.clone();
    let saved = blocking(move || store.save_reward(&user_id, &session_id, &image)).await?;
    ok(json!({
        "message": "Reward saved successfully.",
        "asset_path": saved.asset_path,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSession {
    user_id: Option<String>,
    minutes: Option<u32>,
}

pub async fn save_session_handler(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult {
    let payload: SaveSession = parse_body(&body)?;
    let user_id = required("userId", payload.user_id)?;
    let minutes = payload
        .minutes
        .filter(|m| *m > 0)
        .ok_or_else(|| CoreError::from(ValidationError::MissingField("minutes".into())))?;

    let tip_text = if state.tips.has_generator() {
        let tip = state.tips.get_motivational_tip().await;
        match tip.source {
            TipSource::Api => tip.text,
            TipSource::Fallback => DEFAULT_SESSION_TIP.to_string(),
        }
    } else {
        DEFAULT_SESSION_TIP.to_string()
    };

    let db = state.db.clone();
    let (user, tip) = (user_id.clone(), tip_text.clone());
    let session_id = blocking(move || db.record_session(&user, minutes, &tip)).await?;
    info!(%user_id, %session_id, minutes, "session saved");
    ok(json!({
        "message": "Session data saved successfully.",
        "sessionId": session_id,
        "tipText": tip_text,
    }))
}

/// Which credentials are configured. Never echoes their values.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let cfg = &state.config;
    ok(json!({
        "message": "API is working!",
        "environment": {
            "hasHuggingFaceApiKey": cfg.tips.api_key.is_some(),
            "hasPaystackWebhookSecret": cfg.billing.webhook_secret.is_some(),
            "hasPaystackPublicKey": cfg.billing.public_key.is_some(),
            "timestamp": Utc::now().to_rfc3339(),
        },
    }))
}
