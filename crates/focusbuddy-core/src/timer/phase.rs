use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default focus phase length in seconds (25 minutes).
pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
/// Default break phase length in seconds (5 minutes).
pub const DEFAULT_BREAK_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Focus,
    Break,
}

impl SessionType {
    pub fn label(self) -> &'static str {
        match self {
            SessionType::Focus => "Focus Session",
            SessionType::Break => "Break Time",
        }
    }

    /// The phase that follows this one in the cycle.
    pub fn next(self) -> Self {
        match self {
            SessionType::Focus => SessionType::Break,
            SessionType::Break => SessionType::Focus,
        }
    }
}

/// Full length of each phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDurations")]
pub struct PhaseDurations {
    focus_secs: u64,
    break_secs: u64,
}

impl PhaseDurations {
    /// Both durations must be at least one second; a zero-length phase would
    /// complete without ever passing through a tick.
    pub fn new(focus_secs: u64, break_secs: u64) -> Result<Self, ValidationError> {
        if focus_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "focus_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        if break_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "break_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self {
            focus_secs,
            break_secs,
        })
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_secs
    }

    pub fn break_secs(&self) -> u64 {
        self.break_secs
    }

    pub fn for_phase(&self, session_type: SessionType) -> u64 {
        match session_type {
            SessionType::Focus => self.focus_secs,
            SessionType::Break => self.break_secs,
        }
    }
}

#[derive(Deserialize)]
struct RawDurations {
    focus_secs: u64,
    break_secs: u64,
}

impl TryFrom<RawDurations> for PhaseDurations {
    type Error = ValidationError;

    fn try_from(raw: RawDurations) -> Result<Self, Self::Error> {
        PhaseDurations::new(raw.focus_secs, raw.break_secs)
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            focus_secs: DEFAULT_FOCUS_SECS,
            break_secs: DEFAULT_BREAK_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_25_and_5_minutes() {
        let d = PhaseDurations::default();
        assert_eq!(d.focus_secs(), 1500);
        assert_eq!(d.break_secs(), 300);
    }

    #[test]
    fn zero_duration_rejected() {
        assert!(PhaseDurations::new(0, 300).is_err());
        assert!(PhaseDurations::new(1500, 0).is_err());
        assert!(PhaseDurations::new(1, 1).is_ok());
    }

    #[test]
    fn deserializing_checks_durations() {
        let d: PhaseDurations =
            serde_json::from_str(r#"{"focus_secs":60,"break_secs":30}"#).unwrap();
        assert_eq!(d, PhaseDurations::new(60, 30).unwrap());

        let err = serde_json::from_str::<PhaseDurations>(r#"{"focus_secs":0,"break_secs":30}"#)
            .unwrap_err();
        assert!(err.to_string().contains("focus_secs"));
    }

    #[test]
    fn next_alternates() {
        assert_eq!(SessionType::Focus.next(), SessionType::Break);
        assert_eq!(SessionType::Break.next(), SessionType::Focus);
    }
}
