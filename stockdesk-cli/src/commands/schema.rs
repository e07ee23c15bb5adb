//! Schema bootstrap command

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use stockdesk_server::db::schema;
use stockdesk_server::Database;

use crate::config::DatabaseArgs;

#[derive(Parser, Debug)]
pub struct InitSchemaArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create any missing tables. Existing tables and rows are left untouched.
pub async fn run_init_schema(args: InitSchemaArgs) -> Result<()> {
    let url = args.database.url()?;
    let db = Database::open(&url, &args.database.pool_config())
        .await
        .context("Failed to create database pool")?;

    let result = schema::bootstrap(&db).await;
    db.close().await;
    result.context("Schema bootstrap failed")?;

    for table in schema::table_names() {
        info!(table, "table ready");
    }
    println!("schema ready ({} tables)", schema::table_names().count());
    Ok(())
}
