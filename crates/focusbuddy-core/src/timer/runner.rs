//! Tick driver for a [`FocusSession`].
//!
//! The runner is a single tokio task that owns the session outright. User
//! commands arrive over a channel and ticks come from an interval that only
//! exists while the session is running, so every mutation happens in one
//! place, one at a time. Work that may be slow (tip fetches, persistence)
//! never runs on this task.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use super::cycle::FocusSession;
use super::engine::TimerState;
use crate::events::Event;

/// The clock-source period: one tick per second.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session runner has stopped")]
pub struct RunnerStopped;

#[derive(Debug)]
enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    Snapshot(oneshot::Sender<Event>),
    Shutdown,
}

/// Handle to a running session task.
///
/// Dropping the handle aborts the task; [`SessionRunner::shutdown`] stops it
/// and waits for it to finish.
#[derive(Debug)]
pub struct SessionRunner {
    commands: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl SessionRunner {
    /// Spawn the task. Must be called from within a tokio runtime.
    pub fn spawn(
        session: FocusSession,
        period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(session, period, cmd_rx, event_tx));
        (
            Self {
                commands: cmd_tx,
                task: Some(task),
            },
            event_rx,
        )
    }

    pub fn start(&self) -> Result<(), RunnerStopped> {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> Result<(), RunnerStopped> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<(), RunnerStopped> {
        self.send(Command::Resume)
    }

    pub fn reset(&self) -> Result<(), RunnerStopped> {
        self.send(Command::Reset)
    }

    /// Current state as an `Event::StateSnapshot`.
    pub async fn snapshot(&self) -> Result<Event, RunnerStopped> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| RunnerStopped)
    }

    /// Stop the task and wait until it has exited. No tick fires after this
    /// returns.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    fn send(&self, cmd: Command) -> Result<(), RunnerStopped> {
        self.commands.send(cmd).map_err(|_| RunnerStopped)
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    mut session: FocusSession,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) {
    let mut ticker: Option<Interval> = None;

    loop {
        tokio::select! {
            cmd = commands.recv() => {
                let Some(cmd) = cmd else { break };
                let event = match cmd {
                    Command::Start => session.start(),
                    Command::Pause => session.pause(),
                    Command::Resume => session.resume(),
                    Command::Reset => session.reset(),
                    Command::Snapshot(reply) => {
                        let _ = reply.send(session.snapshot());
                        None
                    }
                    Command::Shutdown => break,
                };
                if let Some(event) = event {
                    publish(&events, event);
                }
            }
            _ = next_tick(&mut ticker) => {
                trace!(remaining = session.state().remaining_seconds(), "tick");
                for event in session.tick() {
                    publish(&events, event);
                }
            }
        }
        sync_ticker(&session, &mut ticker, period);
    }

    debug!("session runner stopped");
}

/// Keep an interval alive only while the session is running. A fresh
/// interval first fires one full period after it is created.
fn sync_ticker(session: &FocusSession, ticker: &mut Option<Interval>, period: Duration) {
    if session.status() == TimerState::Running {
        if ticker.is_none() {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some(interval);
        }
    } else {
        *ticker = None;
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn publish(events: &mpsc::UnboundedSender<Event>, event: Event) {
    debug!(?event, "session event");
    let _ = events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{PhaseDurations, SessionType};

    fn remaining(event: &Event) -> u64 {
        match event {
            Event::StateSnapshot { remaining_secs, .. } => *remaining_secs,
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_period() {
        let session = FocusSession::new(PhaseDurations::new(10, 5).unwrap());
        let (runner, _events) = SessionRunner::spawn(session, TICK_PERIOD);

        runner.start().unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(remaining(&runner.snapshot().await.unwrap()), 7);

        runner.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn paused_session_does_not_tick() {
        let session = FocusSession::new(PhaseDurations::new(10, 5).unwrap());
        let (runner, _events) = SessionRunner::spawn(session, TICK_PERIOD);

        runner.start().unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        runner.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(remaining(&runner.snapshot().await.unwrap()), 8);

        runner.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_ticking() {
        let session = FocusSession::new(PhaseDurations::new(10, 5).unwrap());
        let (runner, mut events) = SessionRunner::spawn(session, TICK_PERIOD);

        runner.start().unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        runner.reset().unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        match runner.snapshot().await.unwrap() {
            Event::StateSnapshot {
                state,
                session_type,
                remaining_secs,
                ..
            } => {
                assert_eq!(state, TimerState::Idle);
                assert_eq!(session_type, SessionType::Focus);
                assert_eq!(remaining_secs, 10);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
        runner.shutdown().await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(matches!(seen.first(), Some(Event::TimerStarted { .. })));
        assert!(matches!(seen.last(), Some(Event::TimerReset { .. })));
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn phase_completion_is_published_once() {
        let session = FocusSession::new(PhaseDurations::new(2, 1).unwrap());
        let (runner, mut events) = SessionRunner::spawn(session, TICK_PERIOD);

        runner.start().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        runner.shutdown().await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        let completions = seen.iter().filter(|e| e.is_phase_complete()).count();
        assert_eq!(completions, 1);
        assert!(seen.iter().any(|e| matches!(
            e,
            Event::PhaseAdvanced {
                to: SessionType::Break,
                completed_focus_sessions: 1,
                ..
            }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_task() {
        let (runner, mut events) = SessionRunner::spawn(FocusSession::default(), TICK_PERIOD);
        runner.start().unwrap();
        runner.shutdown().await;

        // Drain what was emitted before shutdown; the channel then closes.
        while events.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn commands_after_drop_fail() {
        let (runner, _events) = SessionRunner::spawn(FocusSession::default(), TICK_PERIOD);
        let commands = runner.commands.clone();
        drop(runner);
        for _ in 0..16 {
            if commands.is_closed() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(commands.send(Command::Start).is_err());
    }
}
