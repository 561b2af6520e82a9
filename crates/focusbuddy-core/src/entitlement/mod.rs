//! Subscription-based entitlement.
//!
//! The gate never talks to the payment provider; it only trusts the record
//! written after a successful checkout and lets it lapse at `expires_at`.

mod gate;
mod record;
mod store;

pub use gate::{EntitlementGate, SUBSCRIPTION_TERM_DAYS};
pub use record::{SubscriptionRecord, SubscriptionStatus};
pub use store::{FileSubscriptionStore, MemorySubscriptionStore, SubscriptionStore};
