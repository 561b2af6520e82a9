//! Premium access decisions.

use chrono::Duration;
use tracing::warn;

use super::record::{SubscriptionRecord, SubscriptionStatus};
use super::store::SubscriptionStore;
use crate::billing::PlanId;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;

/// Length of a paid subscription term.
pub const SUBSCRIPTION_TERM_DAYS: i64 = 30;

/// Reads and writes the subscription record through an injected store.
pub struct EntitlementGate<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: SubscriptionStore> EntitlementGate<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: SubscriptionStore, C: Clock> EntitlementGate<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// True only for an active record that has not expired. A missing or
    /// unreadable record means no access.
    pub fn has_premium_access(&self) -> bool {
        match self.store.load() {
            Ok(Some(record)) => record.is_entitled_at(self.clock.now()),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "subscription record unreadable, treating as no access");
                false
            }
        }
    }

    pub fn current_subscription(&self) -> Option<SubscriptionRecord> {
        self.store.load().ok().flatten()
    }

    /// Start a fresh 30-day term, replacing any previous record.
    pub fn save_subscription(
        &self,
        plan_id: PlanId,
        reference: impl Into<String>,
    ) -> Result<SubscriptionRecord> {
        let now = self.clock.now();
        let record = SubscriptionRecord {
            plan_id,
            reference: reference.into(),
            status: SubscriptionStatus::Active,
            created_at: now,
            expires_at: now + Duration::days(SUBSCRIPTION_TERM_DAYS),
        };
        self.store.save(&record)?;
        Ok(record)
    }

    pub fn clear_subscription(&self) -> Result<()> {
        self.store.clear()
    }
}
