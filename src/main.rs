use std::path::PathBuf;

use clap::{Parser, Subcommand};
use order_book_engine::{
    api,
    engine::MatchingEngine,
    order::SequentialIdGenerator,
    replay,
    state::AppState,
    utils::shutdown_token,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "engine-cli")]
#[command(
    author = "Andrew Odiit",
    version = "0.1",
    about = "A limit-order matching engine for a single instrument"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server binding the engine to `/bids/`, `/asks/`, `/order/`.
    Server {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Replay a scenario file against a fresh, in-process engine.
    Replay {
        /// Path to a scenario file (see `replay::run_scenario` for the grammar).
        file: PathBuf,
    },
}

async fn run_server(port: u16) -> anyhow::Result<()> {
    let state = AppState::new();
    let app = api::router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "HTTP server listening");
    let token = shutdown_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(token.cancelled_owned())
        .await?;
    Ok(())
}

fn run_replay(file: PathBuf) -> anyhow::Result<()> {
    let script = std::fs::read_to_string(&file)?;
    let mut engine = MatchingEngine::new();
    let id_gen = SequentialIdGenerator::new();
    match replay::run_scenario(&mut engine, &id_gen, &script) {
        Ok(passed) => {
            println!("replay {}: {passed} assertion(s) passed", file.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("replay {}: FAILED: {e}", file.display());
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Server { port } => run_server(port).await,
        Commands::Replay { file } => run_replay(file),
    }
}
