//! Session timer.
//!
//! The countdown is an explicit [`SessionState`] value advanced by the pure
//! [`tick`] reducer. [`SessionTimer`] wraps the state, applies the four user
//! commands and stamps the resulting events with wall-clock time. Nothing in
//! here sleeps or spawns; whoever drives the timer decides when a tick
//! happens (the runner uses a one-second interval, tests call `tick()`
//! directly).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --resume--> Running
//!   ^                |                  |
//!   +----reset-------+------reset-------+
//! Running --tick(remaining hits 0)--> Idle  (PhaseComplete)
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phase::{PhaseDurations, SessionType};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Countdown state. `paused` implies `running`.
///
/// Serialize-only: states are built through the timer, never read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionState {
    remaining_seconds: u64,
    session_type: SessionType,
    running: bool,
    paused: bool,
    completed_focus_sessions: u64,
}

impl SessionState {
    /// Fresh state: idle, at the start of a focus phase.
    pub fn new(durations: &PhaseDurations) -> Self {
        Self {
            remaining_seconds: durations.focus_secs(),
            session_type: SessionType::Focus,
            running: false,
            paused: false,
            completed_focus_sessions: 0,
        }
    }

    /// Idle state positioned at the start of `session_type`.
    pub(crate) fn idle_at(
        session_type: SessionType,
        remaining_seconds: u64,
        completed_focus_sessions: u64,
    ) -> Self {
        Self {
            remaining_seconds,
            session_type,
            running: false,
            paused: false,
            completed_focus_sessions,
        }
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn completed_focus_sessions(&self) -> u64 {
        self.completed_focus_sessions
    }

    pub fn status(&self) -> TimerState {
        match (self.running, self.paused) {
            (false, _) => TimerState::Idle,
            (true, false) => TimerState::Running,
            (true, true) => TimerState::Paused,
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub state: SessionState,
    /// Set when this tick took the phase through zero.
    pub completed: Option<SessionType>,
}

/// Advance `state` by one second.
///
/// No-op unless running and unpaused. Reaching zero stops the timer, so a
/// second tick queued behind the completing one cannot complete the phase
/// again.
pub fn tick(state: &SessionState) -> TickOutcome {
    if state.status() != TimerState::Running {
        return TickOutcome {
            state: *state,
            completed: None,
        };
    }

    let remaining = state.remaining_seconds.saturating_sub(1);
    let mut next = SessionState {
        remaining_seconds: remaining,
        ..*state
    };
    let mut completed = None;
    if remaining == 0 {
        next.running = false;
        next.paused = false;
        completed = Some(state.session_type);
    }
    TickOutcome {
        state: next,
        completed,
    }
}

/// Owns a [`SessionState`] and applies commands to it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTimer {
    state: SessionState,
    durations: PhaseDurations,
}

impl SessionTimer {
    /// Starts in the `Idle` state at the beginning of a focus phase.
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            state: SessionState::new(&durations),
            durations,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> TimerState {
        self.state.status()
    }

    pub fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    /// Full length of the phase currently loaded.
    pub fn total_secs(&self) -> u64 {
        self.durations.for_phase(self.state.session_type)
    }

    /// 0.0 .. 100.0 progress within the current phase.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.state.remaining_seconds);
        (elapsed as f64 / total as f64 * 100.0).min(100.0)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.status(),
            session_type: self.state.session_type,
            label: self.state.session_type.label().to_string(),
            remaining_secs: self.state.remaining_seconds,
            total_secs: self.total_secs(),
            progress_pct: self.progress_pct(),
            completed_focus_sessions: self.state.completed_focus_sessions,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.status() != TimerState::Idle || self.state.remaining_seconds == 0 {
            return None;
        }
        self.state.running = true;
        self.state.paused = false;
        Some(Event::TimerStarted {
            session_type: self.state.session_type,
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.status() != TimerState::Running {
            return None;
        }
        self.state.paused = true;
        Some(Event::TimerPaused {
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.status() != TimerState::Paused {
            return None;
        }
        self.state.paused = false;
        Some(Event::TimerResumed {
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Back to an idle focus phase. Valid from every state; the completed
    /// focus counter is kept.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = SessionState::idle_at(
            SessionType::Focus,
            self.durations.focus_secs(),
            self.state.completed_focus_sessions,
        );
        Some(Event::TimerReset {
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Call once per elapsed second. Returns `Some(Event::PhaseComplete)`
    /// on the tick that reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        let outcome = tick(&self.state);
        self.state = outcome.state;
        outcome.completed.map(|session_type| Event::PhaseComplete {
            session_type,
            at: Utc::now(),
        })
    }

    pub(crate) fn load_phase(&mut self, next: SessionState) {
        self.state = next;
    }
}
