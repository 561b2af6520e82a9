mod cycle;
mod engine;
mod phase;
mod runner;

pub use cycle::{FocusSession, SessionCycleController};
pub use engine::{tick, SessionState, SessionTimer, TickOutcome, TimerState};
pub use phase::{PhaseDurations, SessionType, DEFAULT_BREAK_SECS, DEFAULT_FOCUS_SECS};
pub use runner::{RunnerStopped, SessionRunner, TICK_PERIOD};
