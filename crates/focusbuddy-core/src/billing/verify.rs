//! Payment reference verification.
//!
//! Only a stub ships: it accepts any well-formed reference and reports the
//! premium price. A gateway-backed verifier slots in behind the same trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plans::{find_plan, PlanId};
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub reference: String,
    pub status: String,
    /// Amount in kobo.
    pub amount: u64,
    pub currency: String,
    pub verified_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify_payment(&self, reference: &str) -> Result<Verification>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StubVerifier;

#[async_trait]
impl PaymentVerifier for StubVerifier {
    async fn verify_payment(&self, reference: &str) -> Result<Verification> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ValidationError::MissingField("reference".into()).into());
        }
        Ok(Verification {
            reference: reference.to_string(),
            status: "success".to_string(),
            amount: find_plan(PlanId::Premium).price_naira * 100,
            currency: "NGN".to_string(),
            verified_at: Utc::now(),
        })
    }
}
