//! Subscription plan catalog and payment references.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::Clock;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Basic,
    Premium,
    Pro,
}

impl PlanId {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanId::Basic => "basic",
            PlanId::Premium => "premium",
            PlanId::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(PlanId::Basic),
            "premium" => Ok(PlanId::Premium),
            "pro" => Ok(PlanId::Pro),
            other => Err(ValidationError::UnknownPlan(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub name: &'static str,
    /// Monthly price in Naira.
    pub price_naira: u64,
    pub features: &'static [&'static str],
    pub popular: bool,
}

impl SubscriptionPlan {
    pub fn is_free(&self) -> bool {
        self.price_naira == 0
    }

    pub fn price_label(&self) -> String {
        if self.is_free() {
            "Free".to_string()
        } else {
            format_price(self.price_naira)
        }
    }
}

pub const SUBSCRIPTION_PLANS: &[SubscriptionPlan] = &[
    SubscriptionPlan {
        id: PlanId::Basic,
        name: "Basic",
        price_naira: 0,
        features: &[
            "25-minute focus timer",
            "Basic task management",
            "Standard motivational tips",
            "Basic coloring pages",
        ],
        popular: false,
    },
    SubscriptionPlan {
        id: PlanId::Premium,
        name: "Premium",
        price_naira: 1_500,
        features: &[
            "All Basic features",
            "Customizable timer durations",
            "AI-powered motivational tips",
            "Unlimited coloring pages",
            "Progress analytics",
            "Priority support",
            "No ads",
        ],
        popular: true,
    },
    SubscriptionPlan {
        id: PlanId::Pro,
        name: "Pro",
        price_naira: 3_000,
        features: &[
            "All Premium features",
            "Team collaboration",
            "Advanced analytics",
            "Custom themes",
            "Export data",
            "API access",
            "White-label options",
        ],
        popular: false,
    },
];

pub fn find_plan(id: PlanId) -> &'static SubscriptionPlan {
    SUBSCRIPTION_PLANS
        .iter()
        .find(|p| p.id == id)
        .unwrap_or(&SUBSCRIPTION_PLANS[0])
}

/// `₦1,500` style, no decimals.
pub fn format_price(naira: u64) -> String {
    let digits = naira.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₦{grouped}")
}

pub const DEFAULT_REFERENCE_PREFIX: &str = "FB";

/// Unique transaction reference: `PREFIX_<epoch ms>_<9 base36 chars>`,
/// upper-cased.
pub fn generate_reference(prefix: &str, clock: &dyn Clock) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{prefix}_{}_{suffix}", clock.now_ms()).to_uppercase()
}
