use clap::Parser;
use expense_ledger::args::{Args, ChartSubcommand, Command};
use expense_ledger::shell::{AppContext, Terminal};
use expense_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.backend()).await?.print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            commands::add(&config, add_args.clone()).await?.print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(&config, list_args.clone()).await?.print()
        }

        Command::Search(search_args) => {
            let config = Config::load(home).await?;
            commands::search(&config, search_args.clone())
                .await?
                .print()
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            commands::update(&config, update_args.clone())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(&config, delete_args.clone())
                .await?
                .print()
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            commands::summary(&config, summary_args.clone())
                .await?
                .print()
        }

        Command::Chart(chart_args) => {
            let config = Config::load(home).await?;
            match &chart_args.chart {
                ChartSubcommand::Category(args) => {
                    commands::chart_category(&config, args.clone())
                        .await?
                        .print()
                }
                ChartSubcommand::Month(args) => commands::chart_month(&config, args.clone())
                    .await?
                    .print(),
            }
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(&config, report_args.clone())
                .await?
                .print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(&config, export_args.clone())
                .await?
                .print()
        }

        Command::Config(config_args) => {
            let mut config = Config::load(home).await?;
            commands::configure(&mut config, config_args.clone())
                .await?
                .print()
        }

        Command::Menu => {
            let config = Config::load(home).await?;
            let mut shell = AppContext::new(config, Terminal::new()?, std::io::stdout(), ".");
            shell.run().await?
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG wins when it is set.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only this library and binary log, at the requested level.
        None => EnvFilter::new(format!(
            "expense_ledger={},{}={}",
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
