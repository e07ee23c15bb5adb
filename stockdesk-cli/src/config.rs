//! Configuration loading: .env files and database settings

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use stockdesk_server::PoolConfig;
use tracing::{debug, info};

/// .env files read at startup, kept for logging once tracing is up.
#[derive(Debug, Default)]
pub struct DotenvSources {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Load environment variables from .env files.
///
/// Runs before argument parsing and tracing setup, so `DATABASE_URL` and
/// `RUST_LOG` from a .env file take effect. Nothing is logged here; call
/// [`DotenvSources::log`] after tracing is initialized.
///
/// Priority order (highest to lowest):
/// 1. Variables already set in the environment
/// 2. Current directory .env
/// 3. ~/.stockdesk/.env
pub fn load_dotenv() -> DotenvSources {
    let mut sources = DotenvSources::default();

    if let Ok(path) = dotenvy::dotenv() {
        sources.loaded.push(path);
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            // dotenvy doesn't overwrite existing vars
            match dotenvy::from_path(&env_file) {
                Ok(()) => sources.loaded.push(env_file),
                Err(e) => sources.failed.push((env_file, e.to_string())),
            }
        }
    }

    sources
}

impl DotenvSources {
    pub fn log(&self) {
        for path in &self.loaded {
            debug!("Loaded .env from {}", path.display());
        }
        for (path, err) in &self.failed {
            debug!("Failed to load {}: {}", path.display(), err);
        }

        if self.loaded.is_empty() {
            debug!("No .env files found (current dir or ~/.stockdesk)");
        } else {
            let sources: Vec<String> = self.loaded.iter().map(|p| p.display().to_string()).collect();
            info!("Loaded configuration from: {}", sources.join(", "));
        }
    }
}

/// The stockdesk config directory (~/.stockdesk)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".stockdesk"))
}

/// Database connection options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (falls back to STOCKDESK_DB_* variables)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, default_value_t = 50)]
    pub max_connections: u32,
}

impl DatabaseArgs {
    /// Resolve the connection URL from flags and the process environment.
    pub fn url(&self) -> Result<String> {
        resolve_database_url(self.database_url.clone(), |key| std::env::var(key).ok())
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.max_connections.max(1),
            ..PoolConfig::default()
        }
    }
}

/// Pick the explicit URL, then `DATABASE_URL`, or compose one from
/// `STOCKDESK_DB_USER`, `STOCKDESK_DB_PASS`, `STOCKDESK_DB_HOST`,
/// `STOCKDESK_DB_PORT` and `STOCKDESK_DB_NAME`.
pub fn resolve_database_url(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = explicit
        .filter(|u| !u.trim().is_empty())
        .or_else(|| var("DATABASE_URL"))
    {
        return Ok(url);
    }

    let (Some(user), Some(name)) = (var("STOCKDESK_DB_USER"), var("STOCKDESK_DB_NAME")) else {
        bail!(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, \
             STOCKDESK_DB_USER/STOCKDESK_DB_NAME, or ~/.stockdesk/.env"
        );
    };

    let host = var("STOCKDESK_DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = var("STOCKDESK_DB_PORT").unwrap_or_else(|| "5432".to_string());
    let auth = match var("STOCKDESK_DB_PASS") {
        Some(pass) => format!("{}:{}", user, pass),
        None => user,
    };

    Ok(format!("postgres://{}@{}:{}/{}", auth, host, port, name))
}
