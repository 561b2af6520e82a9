pub mod config;
pub mod plans;
pub mod rewards;
pub mod subscription;
pub mod timer;
pub mod tip;

use focusbuddy_core::storage::data_dir;
use focusbuddy_core::{EntitlementGate, FileSubscriptionStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Gate over the subscription file in the data dir.
pub fn entitlement_gate() -> Result<EntitlementGate<FileSubscriptionStore>, Box<dyn std::error::Error>> {
    Ok(EntitlementGate::new(FileSubscriptionStore::in_dir(&data_dir()?)))
}
