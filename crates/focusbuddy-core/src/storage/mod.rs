mod config;
pub mod database;

pub use config::{
    BillingConfig, Config, ServerConfig, TimerConfig, TipsConfig, ENV_HUGGING_FACE_API_KEY,
    ENV_PAYSTACK_PUBLIC_KEY, ENV_PAYSTACK_WEBHOOK_SECRET,
};
pub use database::{Database, FocusSessionRecord};

use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Returns `~/.config/focusbuddy[-dev]/` based on FOCUSBUDDY_ENV.
///
/// Set FOCUSBUDDY_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSBUDDY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusbuddy-dev")
    } else {
        base_dir.join("focusbuddy")
    };

    std::fs::create_dir_all(&dir).map_err(CoreError::Io)?;
    Ok(dir)
}
