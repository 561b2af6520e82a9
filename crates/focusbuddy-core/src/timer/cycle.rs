//! Focus/break cycling.
//!
//! [`SessionCycleController`] decides what the timer holds after a phase
//! completes. [`FocusSession`] pairs it with a [`SessionTimer`] so a single
//! `tick()` both counts down and rolls over to the next phase.

use chrono::Utc;

use super::engine::{SessionState, SessionTimer, TimerState};
use super::phase::{PhaseDurations, SessionType};
use crate::events::Event;

#[derive(Debug, Clone, Copy)]
pub struct SessionCycleController {
    durations: PhaseDurations,
}

impl SessionCycleController {
    pub fn new(durations: PhaseDurations) -> Self {
        Self { durations }
    }

    /// State that follows the completion of `completed`.
    ///
    /// Only a finished focus phase bumps the counter. The next phase is
    /// loaded idle; the user starts it.
    pub fn next_state(&self, state: &SessionState, completed: SessionType) -> SessionState {
        let next = completed.next();
        let count = match completed {
            SessionType::Focus => state.completed_focus_sessions().saturating_add(1),
            SessionType::Break => state.completed_focus_sessions(),
        };
        SessionState::idle_at(next, self.durations.for_phase(next), count)
    }

    /// Load the next phase into `timer`.
    ///
    /// Ignored unless the timer is sitting idle at zero on the phase that
    /// just completed.
    pub fn on_phase_complete(
        &self,
        timer: &mut SessionTimer,
        completed: SessionType,
    ) -> Option<Event> {
        let state = *timer.state();
        if state.status() != TimerState::Idle
            || state.remaining_seconds() != 0
            || state.session_type() != completed
        {
            return None;
        }

        let next = self.next_state(&state, completed);
        timer.load_phase(next);
        Some(Event::PhaseAdvanced {
            from: completed,
            to: next.session_type(),
            duration_secs: next.remaining_seconds(),
            completed_focus_sessions: next.completed_focus_sessions(),
            at: Utc::now(),
        })
    }
}

/// A timer plus its cycle policy.
#[derive(Debug, Clone)]
pub struct FocusSession {
    timer: SessionTimer,
    controller: SessionCycleController,
}

impl FocusSession {
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            timer: SessionTimer::new(durations),
            controller: SessionCycleController::new(durations),
        }
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn state(&self) -> &SessionState {
        self.timer.state()
    }

    pub fn status(&self) -> TimerState {
        self.timer.status()
    }

    pub fn snapshot(&self) -> Event {
        self.timer.snapshot()
    }

    pub fn start(&mut self) -> Option<Event> {
        self.timer.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.timer.pause()
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.timer.resume()
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.timer.reset()
    }

    /// One second elapsed. Returns `PhaseComplete` followed by
    /// `PhaseAdvanced` when the phase ends, otherwise nothing.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(done) = self.timer.tick() {
            if let Event::PhaseComplete { session_type, .. } = done {
                events.push(done);
                events.extend(self.controller.on_phase_complete(&mut self.timer, session_type));
            }
        }
        events
    }
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new(PhaseDurations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_phase(session: &mut FocusSession) -> Vec<Event> {
        session.start();
        let mut events = Vec::new();
        while session.status() == TimerState::Running {
            events.extend(session.tick());
        }
        events
    }

    #[test]
    fn focus_completion_moves_to_break() {
        let mut session = FocusSession::new(PhaseDurations::new(3, 2).unwrap());
        let events = run_phase(&mut session);

        assert_eq!(events.len(), 2);
        assert!(events[0].is_phase_complete());
        let s = session.state();
        assert_eq!(s.session_type(), SessionType::Break);
        assert_eq!(s.remaining_seconds(), 2);
        assert_eq!(s.completed_focus_sessions(), 1);
        assert_eq!(session.status(), TimerState::Idle);
    }

    #[test]
    fn break_completion_returns_to_focus_without_counting() {
        let mut session = FocusSession::new(PhaseDurations::new(3, 2).unwrap());
        run_phase(&mut session);
        run_phase(&mut session);

        let s = session.state();
        assert_eq!(s.session_type(), SessionType::Focus);
        assert_eq!(s.remaining_seconds(), 3);
        assert_eq!(s.completed_focus_sessions(), 1);
    }

    #[test]
    fn controller_ignores_stale_completion() {
        let controller = SessionCycleController::new(PhaseDurations::default());
        let mut timer = SessionTimer::new(PhaseDurations::default());
        timer.start();
        assert!(controller
            .on_phase_complete(&mut timer, SessionType::Focus)
            .is_none());
        assert_eq!(timer.state().completed_focus_sessions(), 0);
    }

    #[test]
    fn default_cycle_full_focus_phase() {
        let mut session = FocusSession::default();
        session.start();
        let mut completions = 0;
        for _ in 0..1500 {
            completions += session
                .tick()
                .iter()
                .filter(|e| e.is_phase_complete())
                .count();
        }

        assert_eq!(completions, 1);
        let s = session.state();
        assert_eq!(s.session_type(), SessionType::Break);
        assert_eq!(s.remaining_seconds(), 300);
        assert_eq!(s.completed_focus_sessions(), 1);
    }

    #[test]
    fn reset_keeps_counter() {
        let mut session = FocusSession::new(PhaseDurations::new(1, 1).unwrap());
        run_phase(&mut session);
        session.reset();
        assert_eq!(session.state().completed_focus_sessions(), 1);
        assert_eq!(session.state().session_type(), SessionType::Focus);
    }
}
