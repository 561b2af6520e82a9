//! Checkout widget capability.
//!
//! The hosted checkout is loaded asynchronously by whatever front end embeds
//! it, so it may not be usable straight away. Callers wait for it with
//! [`open_when_ready`], which polls readiness on a fixed interval and gives
//! up after a deadline instead of waiting forever.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use super::plans::{find_plan, generate_reference, PlanId, DEFAULT_REFERENCE_PREFIX};
use crate::clock::Clock;
use crate::entitlement::{EntitlementGate, SubscriptionRecord, SubscriptionStore};
use crate::error::{BillingError, Result};

/// What the widget is asked to charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub public_key: String,
    pub email: String,
    /// Smallest currency unit (kobo for NGN).
    pub amount_minor: u64,
    pub currency: String,
    pub reference: String,
    pub plan_id: PlanId,
}

impl PaymentRequest {
    pub fn new(
        public_key: impl Into<String>,
        email: impl Into<String>,
        plan_id: PlanId,
        reference: impl Into<String>,
    ) -> Self {
        let plan = find_plan(plan_id);
        Self {
            public_key: public_key.into(),
            email: email.into(),
            amount_minor: plan.price_naira.saturating_mul(100),
            currency: "NGN".to_string(),
            reference: reference.into(),
            plan_id,
        }
    }
}

/// How the widget session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid { reference: String },
    Closed,
}

#[async_trait]
pub trait PaymentWidget: Send + Sync {
    fn is_ready(&self) -> bool;

    /// Show the checkout and wait for the user to pay or close it.
    async fn open(&self, request: PaymentRequest) -> PaymentOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Wait (bounded) for the widget to become ready, then open it.
pub async fn open_when_ready<W: PaymentWidget + ?Sized>(
    widget: &W,
    request: PaymentRequest,
    policy: RetryPolicy,
) -> Result<PaymentOutcome, BillingError> {
    let started = Instant::now();
    while !widget.is_ready() {
        let waited = started.elapsed();
        if waited >= policy.timeout {
            return Err(BillingError::WidgetUnavailable {
                waited_ms: waited.as_millis() as u64,
            });
        }
        debug!(waited_ms = waited.as_millis() as u64, "payment widget not ready yet");
        tokio::time::sleep(policy.interval).await;
    }
    Ok(widget.open(request).await)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Free plan, nothing to pay and nothing stored.
    FreePlan,
    Subscribed(SubscriptionRecord),
}

/// Who is paying and with which publishable key.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub plan_id: PlanId,
    pub email: String,
    pub public_key: String,
    pub policy: RetryPolicy,
}

/// Run a checkout for one plan and record the subscription on success.
pub async fn checkout<S, C, W>(
    gate: &EntitlementGate<S, C>,
    widget: &W,
    request: CheckoutRequest,
) -> Result<CheckoutOutcome>
where
    S: SubscriptionStore,
    C: Clock,
    W: PaymentWidget + ?Sized,
{
    let plan = find_plan(request.plan_id);
    if plan.is_free() {
        return Ok(CheckoutOutcome::FreePlan);
    }

    let reference = generate_reference(DEFAULT_REFERENCE_PREFIX, gate.clock());
    let payment = PaymentRequest::new(
        request.public_key,
        request.email,
        plan.id,
        reference.clone(),
    );

    match open_when_ready(widget, payment, request.policy).await? {
        PaymentOutcome::Paid { reference: paid } => {
            info!(plan = %plan.id, reference = %paid, "payment completed");
            // The reference we generated is the one the gateway charged
            // against; the callback echoes it back.
            let record = gate.save_subscription(plan.id, reference)?;
            Ok(CheckoutOutcome::Subscribed(record))
        }
        PaymentOutcome::Closed => {
            info!(plan = %plan.id, "payment cancelled");
            Err(BillingError::Cancelled.into())
        }
    }
}
