use clap::Parser;
use microsave::args::{Args, Command};
use microsave::{commands, Config, Result, Shell};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            eprintln!("{}: {e}", e.heading());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().microsave_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Shell => {
            let config = Config::open(home).await?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            Shell::new(config, stdin.lock(), stdout.lock()).run().await?
        }

        Command::AddIncome(add_args) => {
            let config = Config::open(home).await?;
            commands::add_income(&config, add_args).await?.print()
        }

        Command::AddExpense(add_args) => {
            let config = Config::open(home).await?;
            commands::add_expense(&config, add_args).await?.print()
        }

        Command::SetGoal(goal_args) => {
            let config = Config::open(home).await?;
            commands::set_goal(&config, goal_args).await?.print()
        }

        Command::Summary(summary_args) => {
            let config = Config::open(home).await?;
            commands::summary(&config, summary_args).await?.print()
        }

        Command::Export(export_args) => {
            let config = Config::open(home).await?;
            commands::export(&config, export_args).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
