use agro_ledger::args::{Args, Command};
use agro_ledger::{commands, Config, Result};
use clap::Parser;
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
    let home = args.common().agro_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.locale()).await?.print(),
        Command::Categories => commands::categories().await?.print(),
        Command::Add(add_args) => commands::add(Config::load(home).await?, add_args.clone())
            .await?
            .print(),
        Command::Summary => commands::summary(Config::load(home).await?).await?.print(),
        Command::Chart => commands::chart(Config::load(home).await?).await?.print(),
        Command::History(history_args) => {
            commands::history(Config::load(home).await?, history_args.clone())
                .await?
                .print()
        }
        Command::Export(export_args) => {
            commands::export(Config::load(home).await?, export_args.clone())
                .await?
                .print()
        }
        Command::Register(register_args) => {
            commands::register(Config::load(home).await?, register_args.clone())
                .await?
                .print()
        }
        Command::Login(login_args) => {
            commands::login(Config::load(home).await?, login_args.clone())
                .await?
                .print()
        }
        Command::Logout => commands::logout(Config::load(home).await?).await?.print(),
        Command::Whoami => commands::whoami(Config::load(home).await?).await?.print(),
        Command::Ask(ask_args) => commands::ask(Config::load(home).await?, ask_args.clone())
            .await?
            .print(),
        Command::Analyze(analyze_args) => {
            commands::analyze(Config::load(home).await?, analyze_args.clone())
                .await?
                .print()
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
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
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
