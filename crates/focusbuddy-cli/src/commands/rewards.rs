use std::sync::Arc;

use clap::Subcommand;
use focusbuddy_core::storage::data_dir;
use focusbuddy_core::{Database, LocalRewardStore, RewardStore};

use super::CliResult;

#[derive(Subcommand)]
pub enum RewardsAction {
    /// List a user's coloring-page rewards as JSON
    List { user: String },
}

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List a user's logged focus sessions as JSON
    List { user: String },
}

pub fn run(action: RewardsAction) -> CliResult {
    match action {
        RewardsAction::List { user } => {
            let store = LocalRewardStore::new(Arc::new(Database::open()?), data_dir()?);
            let rewards = store.list_rewards(&user)?;
            println!("{}", serde_json::to_string_pretty(&rewards)?);
        }
    }
    Ok(())
}

pub fn run_sessions(action: SessionsAction) -> CliResult {
    match action {
        SessionsAction::List { user } => {
            let sessions = Database::open()?.list_sessions(&user)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
