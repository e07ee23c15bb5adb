//! HTTP server command
//!
//! Runs the stockdesk API with the investor, table, holdings and insight routes.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use stockdesk_server::{run_server, Database, ServerConfig};

use crate::config::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Serve static front-end files from this directory
    #[arg(long)]
    pub public_dir: Option<PathBuf>,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            public_dir: self.public_dir.clone(),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let database_url = args.database.url()?;
    let config = args.server_config();

    if let Some(dir) = &config.public_dir {
        if !dir.is_dir() {
            anyhow::bail!("public directory not found: {}", dir.display());
        }
    }

    tracing::info!("Starting stockdesk server on {}", config.bind_addr);

    let db = Database::open(&database_url, &args.database.pool_config())
        .await
        .context("Failed to create database pool")?;

    // Blocks until shutdown; the pool is closed on the way out
    run_server(db, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_to_localhost() {
        let args = ServeArgs::try_parse_from(["serve", "--database-url", "postgres://x/y"]).unwrap();
        let config = args.server_config();
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3030)));
        assert!(!config.cors_permissive);
        assert!(config.public_dir.is_none());
        assert_eq!(args.database.max_connections, 50);
    }

    #[test]
    fn flags_flow_into_config() {
        let args = ServeArgs::try_parse_from([
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--cors-permissive",
            "--public-dir",
            "public",
            "--max-connections",
            "8",
        ])
        .unwrap();
        let config = args.server_config();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.cors_permissive);
        assert_eq!(config.public_dir, Some(PathBuf::from("public")));
        assert_eq!(args.database.pool_config().max_connections, 8);
    }
}
