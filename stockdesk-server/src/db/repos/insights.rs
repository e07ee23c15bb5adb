//! Fixed analytical queries returned as result sets

use serde_json::Value;

use super::DbError;
use crate::db::Database;
use crate::models::{InsightKind, ResultSet};

const COMPANY_NET_WORTH: &str = r#"
    SELECT json_build_array(i.industry_name, AVG(c.net_worth))
    FROM industrial_company c
    JOIN industry i ON c.industry_name = i.industry_name
    GROUP BY i.industry_name
    HAVING AVG(c.net_worth) > (SELECT AVG(net_worth) FROM industrial_company)
    ORDER BY i.industry_name
"#;

const ACTIVE_INVESTORS: &str = r#"
    SELECT json_build_array(u.id, u.name, res.transaction_count)
    FROM (
        SELECT i.id AS investor_id, COUNT(t.transaction_id) AS transaction_count
        FROM executed_transaction t
        JOIN investor1 i ON t.investor_id = i.id
        GROUP BY i.id
        HAVING COUNT(t.transaction_id) > (
            SELECT AVG(cnt)
            FROM (
                SELECT COUNT(transaction_id) AS cnt
                FROM executed_transaction
                GROUP BY investor_id
            ) per_investor
        )
    ) res
    JOIN user_table u ON res.investor_id = u.id
    ORDER BY u.id
"#;

// The correlated subquery is already restricted to one industry, so it needs
// no GROUP BY ic2.industry_name to return a single average.
const REVENUE: &str = r#"
    SELECT json_build_array(ic.industry_name, f.company_name, f.revenue)
    FROM industrial_company ic
    JOIN analysable_company_released_financialreport f ON ic.company_name = f.company_name
    WHERE f.revenue > (
        SELECT AVG(f2.revenue)
        FROM industrial_company ic2
        JOIN analysable_company_released_financialreport f2 ON ic2.company_name = f2.company_name
        WHERE ic.industry_name = ic2.industry_name
    )
    ORDER BY ic.industry_name, f.company_name
"#;

/// Relational division: investors who hold shares of every company.
const ALL_COMPANY_OWNERS: &str = r#"
    SELECT json_build_array(u.id, u.name)
    FROM user_table u
    JOIN investor1 i ON u.id = i.id
    WHERE NOT EXISTS (
        SELECT c.company_name
        FROM industrial_company c
        WHERE c.company_name NOT IN (
            SELECT ts.company_name
            FROM transactionable_share_of_company_stock ts
            JOIN executed_transaction et ON ts.transaction_id = et.transaction_id
            WHERE et.investor_id = i.id
        )
    )
    ORDER BY u.id
"#;

const ALL_COMPANY_OWNER_COLUMNS: &[&str] = &["INVESTOR_ID", "INVESTOR_NAME"];

impl InsightKind {
    fn sql(&self) -> &'static str {
        match self {
            Self::CompanyNetWorth => COMPANY_NET_WORTH,
            Self::ActiveInvestors => ACTIVE_INVESTORS,
            Self::Revenue => REVENUE,
        }
    }

    /// Column headers, in the order each row array is built.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::CompanyNetWorth => &["INDUSTRY_NAME", "AVG_NET_WORTH_PER_INDUSTRY"],
            Self::ActiveInvestors => &["INVESTOR_ID", "INVESTOR_NAME", "TRANSACTION_COUNT"],
            Self::Revenue => &["INDUSTRY_NAME", "COMPANY_NAME", "REVENUE"],
        }
    }
}

/// Insight repository
pub struct InsightRepo<'a> {
    db: &'a Database,
}

impl<'a> InsightRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn insight(&self, kind: InsightKind) -> Result<ResultSet, DbError> {
        tracing::debug!(insight = kind.as_str(), "Running insight query");
        let rows = self.fetch(kind.sql()).await?;
        Ok(ResultSet::new(kind.columns(), rows))
    }

    pub async fn all_company_owners(&self) -> Result<ResultSet, DbError> {
        let rows = self.fetch(ALL_COMPANY_OWNERS).await?;
        Ok(ResultSet::new(ALL_COMPANY_OWNER_COLUMNS, rows))
    }

    async fn fetch(&self, sql: &'static str) -> Result<Vec<Value>, DbError> {
        let rows = sqlx::query_scalar::<_, Value>(sql)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }
}
