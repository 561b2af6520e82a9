//! Billing relay: plan catalog, checkout widget, reference verification and
//! signed webhook intake. No money moves through this crate.

mod plans;
mod verify;
pub mod webhook;
mod widget;

pub use plans::{
    find_plan, format_price, generate_reference, PlanId, SubscriptionPlan,
    DEFAULT_REFERENCE_PREFIX, SUBSCRIPTION_PLANS,
};
pub use verify::{PaymentVerifier, StubVerifier, Verification};
pub use webhook::{handle_webhook, verify_signature, WebhookEvent, SIGNATURE_HEADER};
pub use widget::{
    checkout, open_when_ready, CheckoutOutcome, CheckoutRequest, PaymentOutcome,
    PaymentRequest, PaymentWidget, RetryPolicy,
};
