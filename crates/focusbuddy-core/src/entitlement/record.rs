use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::billing::PlanId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

/// Locally persisted subscription. Same JSON shape the web client keeps in
/// local storage: camelCase keys, epoch-millisecond timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub plan_id: PlanId,
    pub reference: String,
    pub status: SubscriptionStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Active and not yet expired at `now`.
    pub fn is_entitled_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expires_at > now
    }
}
