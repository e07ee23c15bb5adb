//! Generic table access: column discovery, projection and filtered selection
//!
//! Column lists come from `information_schema.columns` and double as the
//! allow-list for every identifier placed in generated SQL.

use serde_json::Value;

use super::DbError;
use crate::db::Database;
use crate::models::{ColumnInfo, ConditionRequest, Selection, TableColumns, TableName};

/// Table repository
pub struct TableRepo<'a> {
    db: &'a Database,
}

impl<'a> TableRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Column names and types of a table in the current schema, in
    /// declaration order.
    ///
    /// A table with no visible columns is reported as not found.
    pub async fn columns(&self, table: &TableName) -> Result<TableColumns, DbError> {
        let columns = sqlx::query_as::<_, ColumnInfo>(
            r#"
            SELECT column_name::text AS name, data_type::text AS data_type
            FROM information_schema.columns
            WHERE table_schema = current_schema()
              AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table.as_str())
        .fetch_all(self.db.pool())
        .await?;

        if columns.is_empty() {
            return Err(DbError::NotFound {
                resource: "table",
                id: table.as_str().to_owned(),
            });
        }

        Ok(TableColumns::new(table.clone(), columns))
    }

    /// Rows of a table, optionally restricted to `cols`, as positional
    /// arrays in projection order.
    pub async fn rows(&self, table: &TableName, cols: &[String]) -> Result<Vec<Value>, DbError> {
        let columns = self.columns(table).await?;
        let selection = Selection::project(&columns, cols)?;
        self.run(table, selection).await
    }

    /// Rows matching every condition, joined left to right by each
    /// condition's logic token. No conditions returns the whole table.
    pub async fn select(
        &self,
        table: &TableName,
        conditions: Vec<ConditionRequest>,
    ) -> Result<Vec<Value>, DbError> {
        let columns = self.columns(table).await?;
        let selection = Selection::all(&columns).filter(&columns, conditions)?;
        self.run(table, selection).await
    }

    async fn run(&self, table: &TableName, selection: Selection) -> Result<Vec<Value>, DbError> {
        let mut query = selection.into_query();
        tracing::debug!(table = %table.as_str(), sql = %query.sql(), "Running selection");

        let rows = query
            .build_query_scalar::<Value>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }
}
