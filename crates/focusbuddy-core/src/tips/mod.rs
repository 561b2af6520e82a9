//! Motivational tips.
//!
//! A hosted generator supplies fresh text when configured; a fixed list
//! covers every failure so callers always get something to show.

mod fallback;
mod generator;
mod provider;

use serde::{Deserialize, Serialize};

pub use fallback::{random_fallback, FALLBACK_TIPS};
pub use generator::{
    clean_generated_text, HuggingFaceGenerator, TipGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL,
    TIP_PROMPT,
};
pub use provider::{TipProvider, DEFAULT_CACHE_TTL_SECS, MAX_TIP_CHARS, MIN_TIP_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipSource {
    Api,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotivationalTip {
    pub text: String,
    pub source: TipSource,
    /// Epoch milliseconds.
    pub timestamp: i64,
}
