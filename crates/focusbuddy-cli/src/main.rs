use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focusbuddy", version, about = "Focus Buddy CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run focus/break sessions in the terminal
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Premium subscription management
    Subscription {
        #[command(subcommand)]
        action: commands::subscription::SubscriptionAction,
    },
    /// List subscription plans
    Plans {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print motivational tips
    Tip {
        /// Number of tips
        #[arg(long, default_value = "1")]
        count: usize,
    },
    /// Coloring-page rewards
    Rewards {
        #[command(subcommand)]
        action: commands::rewards::RewardsAction,
    },
    /// Logged focus sessions
    Sessions {
        #[command(subcommand)]
        action: commands::rewards::SessionsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Subscription { action } => commands::subscription::run(action).await,
        Commands::Plans { json } => commands::plans::run(json),
        Commands::Tip { count } => commands::tip::run(count).await,
        Commands::Rewards { action } => commands::rewards::run(action),
        Commands::Sessions { action } => commands::rewards::run_sessions(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
