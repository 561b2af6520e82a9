use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SessionType, TimerState};

/// Every state change of a focus session produces an Event.
/// The CLI prints them; the runner publishes them on its event channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        session_type: SessionType,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The running phase reached zero. Emitted once per phase.
    PhaseComplete {
        session_type: SessionType,
        at: DateTime<Utc>,
    },
    /// The cycle controller queued up the next phase (timer left idle).
    PhaseAdvanced {
        from: SessionType,
        to: SessionType,
        duration_secs: u64,
        completed_focus_sessions: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        session_type: SessionType,
        label: String,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        completed_focus_sessions: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_phase_complete(&self) -> bool {
        matches!(self, Event::PhaseComplete { .. })
    }
}
