use clap::Subcommand;
use focusbuddy_core::timer::{FocusSession, PhaseDurations, SessionRunner, SessionType, TICK_PERIOD};
use focusbuddy_core::{Config, Database, Event, TipProvider};
use serde_json::json;
use tracing::info;

use super::{entitlement_gate, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run focus/break phases back to back, printing events as JSON lines
    Run {
        /// Stop after this many phases (default: until Ctrl-C)
        #[arg(long)]
        phases: Option<u32>,
        /// Focus length in seconds (overrides config)
        #[arg(long)]
        focus_secs: Option<u64>,
        /// Break length in seconds (overrides config)
        #[arg(long)]
        break_secs: Option<u64>,
        /// Log each finished focus phase for this user
        #[arg(long)]
        user: Option<String>,
    },
    /// Print the state a new session starts in
    Status,
}

pub async fn run(action: TimerAction) -> CliResult {
    let config = Config::load_or_default();

    match action {
        TimerAction::Run {
            phases,
            focus_secs,
            break_secs,
            user,
        } => {
            let defaults = config.durations()?;
            let durations = PhaseDurations::new(
                focus_secs.unwrap_or(defaults.focus_secs()),
                break_secs.unwrap_or(defaults.break_secs()),
            )?;
            run_sessions(&config, durations, phases, user).await
        }
        TimerAction::Status => {
            let session = FocusSession::new(config.durations()?);
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
            Ok(())
        }
    }
}

async fn run_sessions(
    config: &Config,
    durations: PhaseDurations,
    phases: Option<u32>,
    user: Option<String>,
) -> CliResult {
    let logger = match user {
        Some(user_id) => Some(SessionLogger::open(config, user_id)?),
        None => None,
    };

    let (runner, mut events) = SessionRunner::spawn(FocusSession::new(durations), TICK_PERIOD);
    runner.start()?;

    let mut finished = 0u32;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event)?);

                if let Event::PhaseAdvanced { from, .. } = event {
                    finished += 1;
                    let done = phases.is_some_and(|n| finished >= n);
                    if !done {
                        runner.start()?;
                    }
                    if from == SessionType::Focus {
                        if let Some(logger) = &logger {
                            logger.record(durations.focus_secs()).await?;
                        }
                    }
                    if done {
                        break;
                    }
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }
    }

    runner.shutdown().await;
    Ok(())
}

struct SessionLogger {
    user_id: String,
    db: Database,
    tips: TipProvider,
    premium: bool,
}

impl SessionLogger {
    fn open(config: &Config, user_id: String) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            user_id,
            db: Database::open()?,
            tips: TipProvider::from_config(&config.tips)?,
            premium: entitlement_gate()?.has_premium_access(),
        })
    }

    async fn record(&self, focus_secs: u64) -> CliResult {
        let tip = self.tips.tip_for(self.premium).await;
        let minutes = u32::try_from(focus_secs.div_ceil(60)).unwrap_or(u32::MAX);
        let session_id = self.db.record_session(&self.user_id, minutes, &tip.text)?;
        println!(
            "{}",
            json!({
                "type": "session_logged",
                "session_id": session_id,
                "minutes": minutes,
                "tip": tip.text,
            })
        );
        Ok(())
    }
}
