//! Signed payment webhooks.
//!
//! The gateway signs the raw request body with HMAC-SHA512 using the shared
//! webhook secret and sends the hex digest in `x-paystack-signature`. The
//! signature is checked against the exact bytes received, before the body is
//! parsed.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use tracing::info;

use crate::error::{Result, SignatureError};

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

type HmacSha512 = Hmac<Sha512>;

fn keyed(secret: &[u8], body: &[u8]) -> Result<HmacSha512, SignatureError> {
    let mut mac = HmacSha512::new_from_slice(secret).map_err(|_| SignatureError::Mismatch)?;
    mac.update(body);
    Ok(mac)
}

/// Hex HMAC-SHA512 of `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    Ok(hex::encode(keyed(secret, body)?.finalize().into_bytes()))
}

/// Check `signature` against `body`. Comparison is constant-time.
pub fn verify_signature(
    secret: &[u8],
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::Missing)?;
    let provided = hex::decode(signature).map_err(|_| SignatureError::Mismatch)?;

    keyed(secret, body)?
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeData {
    pub reference: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub customer: Customer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    ChargeSuccess(ChargeData),
    TransferSuccess(serde_json::Value),
    ChargeFailed(serde_json::Value),
    Unhandled(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let envelope: Envelope = serde_json::from_slice(body)?;
        Ok(match envelope.event.as_str() {
            "charge.success" => WebhookEvent::ChargeSuccess(serde_json::from_value(envelope.data)?),
            "transfer.success" => WebhookEvent::TransferSuccess(envelope.data),
            "charge.failed" => WebhookEvent::ChargeFailed(envelope.data),
            _ => WebhookEvent::Unhandled(envelope.event),
        })
    }

    /// Acknowledgement returned to the gateway.
    pub fn ack_message(&self) -> &'static str {
        match self {
            WebhookEvent::ChargeSuccess(_) => "Payment processed successfully",
            WebhookEvent::TransferSuccess(_) => "Transfer processed successfully",
            WebhookEvent::ChargeFailed(_) => "Payment failure logged",
            WebhookEvent::Unhandled(_) => "Event received",
        }
    }
}

/// Verify, parse and log one delivery.
pub fn handle_webhook(secret: &[u8], body: &[u8], signature: Option<&str>) -> Result<WebhookEvent> {
    verify_signature(secret, body, signature)?;
    let event = WebhookEvent::parse(body)?;

    match &event {
        WebhookEvent::ChargeSuccess(charge) => info!(
            reference = %charge.reference,
            amount = charge.amount,
            email = charge.customer.email.as_deref().unwrap_or(""),
            status = %charge.status,
            "payment successful"
        ),
        WebhookEvent::TransferSuccess(data) => info!(%data, "transfer successful"),
        WebhookEvent::ChargeFailed(data) => info!(%data, "payment failed"),
        WebhookEvent::Unhandled(name) => info!(event = %name, "unhandled webhook event"),
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    const SECRET: &[u8] = b"whsec_test";

    fn charge_body() -> Vec<u8> {
        serde_json::json!({
            "event": "charge.success",
            "data": {
                "reference": "FB_1_ABC",
                "amount": 150000,
                "status": "success",
                "customer": { "email": "user@example.com" }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn valid_signature_passes() {
        let body = charge_body();
        let sig = sign(SECRET, &body).unwrap();
        assert_eq!(sig.len(), 128);
        assert!(verify_signature(SECRET, &body, Some(&sig)).is_ok());
    }

    #[test]
    fn missing_signature_rejected() {
        let body = charge_body();
        assert_eq!(
            verify_signature(SECRET, &body, None),
            Err(SignatureError::Missing)
        );
        assert_eq!(
            verify_signature(SECRET, &body, Some("")),
            Err(SignatureError::Missing)
        );
    }

    #[test]
    fn tampered_body_rejected() {
        let body = charge_body();
        let sig = sign(SECRET, &body).unwrap();
        let mut tampered = body.clone();
        tampered.push(b' ');
        assert_eq!(
            verify_signature(SECRET, &tampered, Some(&sig)),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_signature(b"other", &body, Some(&sig)),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_signature(SECRET, &body, Some("zz-not-hex")),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn bad_signature_rejected_before_parsing() {
        let err = handle_webhook(SECRET, b"not json at all", Some("00")).unwrap_err();
        assert!(matches!(err, CoreError::Signature(SignatureError::Mismatch)));
    }

    #[test]
    fn events_map_to_acks() {
        let body = charge_body();
        let event = handle_webhook(SECRET, &body, Some(&sign(SECRET, &body).unwrap())).unwrap();
        match &event {
            WebhookEvent::ChargeSuccess(charge) => {
                assert_eq!(charge.reference, "FB_1_ABC");
                assert_eq!(charge.amount, 150_000);
                assert_eq!(charge.customer.email.as_deref(), Some("user@example.com"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(event.ack_message(), "Payment processed successfully");

        let other = br#"{"event":"subscription.create","data":{}}"#;
        let event = WebhookEvent::parse(other).unwrap();
        assert_eq!(event, WebhookEvent::Unhandled("subscription.create".into()));
        assert_eq!(event.ack_message(), "Event received");
    }
}
