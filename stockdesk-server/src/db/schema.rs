//! Schema bootstrap for the investor/company/transaction tables
//!
//! The schema is normally provisioned out of band. Bootstrap creates any
//! missing table and leaves existing ones alone.

use super::{Database, DbError};

/// Table definitions in dependency order.
const TABLES: &[(&str, &str)] = &[
    (
        "user_table",
        r#"
        CREATE TABLE IF NOT EXISTS user_table (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    ),
    (
        "investor2",
        r#"
        CREATE TABLE IF NOT EXISTS investor2 (
            country TEXT NOT NULL,
            postal_code TEXT NOT NULL,
            province TEXT NOT NULL,
            city TEXT NOT NULL,
            PRIMARY KEY (country, postal_code)
        )
        "#,
    ),
    (
        "investor1",
        r#"
        CREATE TABLE IF NOT EXISTS investor1 (
            id TEXT PRIMARY KEY REFERENCES user_table(id),
            postal_code TEXT,
            address TEXT NOT NULL,
            country TEXT,
            FOREIGN KEY (country, postal_code) REFERENCES investor2(country, postal_code)
        )
        "#,
    ),
    (
        "industry",
        r#"
        CREATE TABLE IF NOT EXISTS industry (
            industry_name TEXT PRIMARY KEY,
            description TEXT
        )
        "#,
    ),
    (
        "industrial_company",
        r#"
        CREATE TABLE IF NOT EXISTS industrial_company (
            company_name TEXT PRIMARY KEY,
            industry_name TEXT NOT NULL REFERENCES industry(industry_name),
            net_worth NUMERIC(18, 2) NOT NULL
        )
        "#,
    ),
    (
        "analysable_company_released_financialreport",
        r#"
        CREATE TABLE IF NOT EXISTS analysable_company_released_financialreport (
            report_id TEXT PRIMARY KEY,
            company_name TEXT NOT NULL REFERENCES industrial_company(company_name),
            release_date DATE NOT NULL,
            revenue NUMERIC(18, 2) NOT NULL
        )
        "#,
    ),
    (
        "transactionable_share_of_company_stock",
        r#"
        CREATE TABLE IF NOT EXISTS transactionable_share_of_company_stock (
            transaction_id TEXT PRIMARY KEY,
            company_name TEXT NOT NULL REFERENCES industrial_company(company_name),
            price_per_share NUMERIC(12, 2) NOT NULL
        )
        "#,
    ),
    (
        "executed_transaction",
        r#"
        CREATE TABLE IF NOT EXISTS executed_transaction (
            transaction_id TEXT PRIMARY KEY
                REFERENCES transactionable_share_of_company_stock(transaction_id),
            investor_id TEXT NOT NULL REFERENCES user_table(id),
            number_of_shares INTEGER NOT NULL CHECK (number_of_shares > 0),
            executed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

/// Names of the tables bootstrap manages, in creation order.
pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|(name, _)| *name)
}

/// Create every missing table.
pub async fn bootstrap(db: &Database) -> Result<(), DbError> {
    tracing::info!("Bootstrapping schema...");

    for (name, ddl) in TABLES {
        sqlx::query(*ddl).execute(db.pool()).await?;
        tracing::debug!(table = *name, "table ready");
    }

    tracing::info!(tables = TABLES.len(), "Schema bootstrap complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_is_covered() {
        let names: Vec<_> = table_names().collect();
        assert_eq!(names.len(), 8);
        for (name, ddl) in TABLES {
            assert!(ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", name)));
        }
    }

    #[test]
    fn referenced_tables_are_created_first() {
        let names: Vec<_> = table_names().collect();
        for (i, (_, ddl)) in TABLES.iter().enumerate() {
            for referenced in ddl.split("REFERENCES ").skip(1) {
                let table = referenced.split('(').next().unwrap_or_default().trim();
                let pos = names.iter().position(|n| *n == table).expect("known table");
                assert!(pos < i, "{} referenced before creation", table);
            }
        }
    }
}
