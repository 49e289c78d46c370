use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use xlsx_ledger::args::{Args, Command};
use xlsx_ledger::{commands, Config, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.workbook().map(|p| p.to_path_buf()),
            init_args.listen().map(str::to_string),
        )
        .await?
        .print(),

        Command::Serve(serve_args) => {
            let config = Config::load(home).await?;
            commands::serve(config, serve_args.listen().map(str::to_string))
                .await?
                .print()
        }

        Command::Insert(insert_args) => {
            let config = Config::load(home).await?;
            commands::insert(&config, insert_args.transaction())
                .await?
                .print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(&config, list_args.category()).await?.print()
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            commands::update(
                &config,
                update_args.category(),
                update_args.index(),
                update_args.partial(),
            )
            .await?
            .print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(&config, delete_args.category(), delete_args.index())
                .await?
                .print()
        }

        Command::Repair => {
            let config = Config::load(home).await?;
            commands::repair(&config).await?.print()
        }

        Command::Schema => commands::schema().print(),
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
