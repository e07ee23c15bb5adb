//! stockdesk CLI - runs the investor and stock transaction API
//!
//! - `serve`: HTTP API server
//! - `check-db`: database connectivity check
//! - `init-schema`: create the tables the API reads and writes

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use commands::check::CheckDbArgs;
use commands::schema::InitSchemaArgs;
use commands::serve::ServeArgs;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(name = "stockdesk", version, about = "Investor and stock transaction API")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Check that the database is reachable
    CheckDb(CheckDbArgs),
    /// Create missing tables
    InitSchema(InitSchemaArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();
    dotenv.log();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::CheckDb(args) => commands::run_check_db(args).await?,
        Commands::InitSchema(args) => commands::run_init_schema(args).await?,
    }
    Ok(())
}
