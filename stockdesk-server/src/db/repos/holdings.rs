//! Transaction join and aggregate queries

use super::DbError;
use crate::db::Database;
use crate::models::{Buyer, CompanyThreshold, DiversifiedInvestor, ShareTotal};

/// Holdings repository
pub struct HoldingRepo<'a> {
    db: &'a Database,
}

impl<'a> HoldingRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Investors who executed a transaction on shares of `company`.
    pub async fn buyers_of(&self, company: &str) -> Result<Vec<Buyer>, DbError> {
        let mut conn = self.db.acquire().await?;

        let listed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM transactionable_share_of_company_stock
                WHERE company_name = $1
            )
            "#,
        )
        .bind(company)
        .fetch_one(&mut *conn)
        .await?;

        if !listed {
            return Err(DbError::NotFound {
                resource: "stock",
                id: company.to_owned(),
            });
        }

        let rows = sqlx::query_as::<_, Buyer>(
            r#"
            SELECT u.id AS investor_id, u.name AS investor_name
            FROM (
                SELECT DISTINCT e.investor_id
                FROM executed_transaction e
                JOIN transactionable_share_of_company_stock t
                    ON e.transaction_id = t.transaction_id
                WHERE t.company_name = $1
            ) res
            JOIN user_table u ON res.investor_id = u.id
            ORDER BY u.id
            "#,
        )
        .bind(company)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    /// Total shares per company for one investor.
    pub async fn shares_of(&self, investor_id: &str) -> Result<Vec<ShareTotal>, DbError> {
        let mut conn = self.db.acquire().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM investor1 WHERE id = $1)")
                .bind(investor_id)
                .fetch_one(&mut *conn)
                .await?;

        if !exists {
            return Err(DbError::NotFound {
                resource: "investor",
                id: investor_id.to_owned(),
            });
        }

        let rows = sqlx::query_as::<_, ShareTotal>(
            r#"
            SELECT t.company_name, SUM(e.number_of_shares)::bigint AS total_shares
            FROM executed_transaction e
            JOIN transactionable_share_of_company_stock t
                ON e.transaction_id = t.transaction_id
            WHERE e.investor_id = $1
            GROUP BY t.company_name
            ORDER BY t.company_name
            "#,
        )
        .bind(investor_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    /// Investors holding shares in at least `threshold` distinct companies.
    pub async fn diversified(
        &self,
        threshold: CompanyThreshold,
    ) -> Result<Vec<DiversifiedInvestor>, DbError> {
        let rows = sqlx::query_as::<_, DiversifiedInvestor>(
            r#"
            SELECT e.investor_id, COUNT(DISTINCT t.company_name) AS number_of_companies
            FROM executed_transaction e
            JOIN transactionable_share_of_company_stock t
                ON e.transaction_id = t.transaction_id
            GROUP BY e.investor_id
            HAVING COUNT(DISTINCT t.company_name) >= $1
            ORDER BY e.investor_id
            "#,
        )
        .bind(threshold.get())
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }
}
