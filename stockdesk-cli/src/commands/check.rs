//! Database connectivity check

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use stockdesk_server::{Database, PoolConfig};

use crate::config::DatabaseArgs;

#[derive(Parser, Debug)]
pub struct CheckDbArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Print `connected` or `unable to connect`, the same answer as
/// `GET /check-db-connection`. Exits non-zero when unreachable.
pub async fn run_check_db(args: CheckDbArgs) -> Result<()> {
    let url = args.database.url()?;
    let config = PoolConfig {
        acquire_timeout: Duration::from_secs(5),
        ..args.database.pool_config()
    };
    let db = Database::connect_lazy(&url, &config).context("Invalid database URL")?;

    let connected = db.ping().await;
    db.close().await;

    if connected {
        println!("connected");
        Ok(())
    } else {
        println!("unable to connect");
        anyhow::bail!("database at {} is unreachable", redact(&url))
    }
}

/// Hide the password component of a connection URL.
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((auth, host)) => {
            let user = auth.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
