//! # Focus Buddy Core Library
//!
//! Core logic for Focus Buddy, a Pomodoro companion for people with ADHD.
//! The CLI and the HTTP server are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a pure one-second tick reducer, the focus/break cycle
//!   controller, and a tokio actor that drives ticks only while running
//! - **Entitlement**: premium access derived from a locally stored
//!   subscription record
//! - **Billing**: plan catalog, checkout widget port, stub reference
//!   verification and HMAC-signed webhook intake
//! - **Tips**: generated motivational text with a static fallback
//! - **Storage**: SQLite session log and reward index, TOML configuration
//!
//! ## Key Components
//!
//! - [`FocusSession`]: timer plus cycle controller
//! - [`SessionRunner`]: owns a session on its own task
//! - [`EntitlementGate`]: premium access checks
//! - [`TipProvider`]: tips that never fail
//! - [`Config`]: application configuration management

pub mod billing;
pub mod clock;
pub mod entitlement;
pub mod error;
pub mod events;
pub mod rewards;
pub mod storage;
pub mod timer;
pub mod tips;

pub use billing::{PlanId, SubscriptionPlan, SUBSCRIPTION_PLANS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entitlement::{
    EntitlementGate, FileSubscriptionStore, MemorySubscriptionStore, SubscriptionRecord,
    SubscriptionStore,
};
pub use error::{
    BillingError, ConfigError, CoreError, DatabaseError, SignatureError, ValidationError,
};
pub use events::Event;
pub use rewards::{LocalRewardStore, RewardRecord, RewardStore, SavedReward};
pub use storage::{Config, Database, FocusSessionRecord};
pub use timer::{
    FocusSession, PhaseDurations, SessionRunner, SessionState, SessionTimer, SessionType,
    TimerState,
};
pub use tips::{MotivationalTip, TipProvider, TipSource};
