//! Investor repository
//!
//! Registration, partial update, deletion and listing of investors across
//! `user_table`, `investor1` (profile row) and `investor2` (location row).
//!
//! Each multi-statement operation runs on one pooled connection with every
//! statement committed on its own. Concurrent writers to the same investor
//! can interleave between statements.

use sqlx::{Postgres, QueryBuilder};

use super::DbError;
use crate::db::Database;
use crate::models::{Investor, InvestorListing, InvestorUpdate, LocationKey, NewInvestor};

const INVESTOR_COLUMNS: &str = r#"
    SELECT u.id, u.name, i1.postal_code, i1.address, i1.country, i2.province, i2.city
    FROM user_table u
    JOIN investor1 i1 ON u.id = i1.id
    JOIN investor2 i2 ON i1.country = i2.country AND i1.postal_code = i2.postal_code
"#;

/// What happened to the location row during a partial update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocationChange {
    /// Neither province nor city was supplied
    #[default]
    NotRequested,
    Updated,
    /// No location row matched the profile's key; not treated as an error
    NoMatchingRow,
    /// The profile row has no postal code or country to key on
    SkippedMissingKey,
}

/// Steps applied by [`InvestorRepo::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub name_updated: bool,
    pub location_created: bool,
    pub profile_updated: bool,
    pub location: LocationChange,
}

/// Investor repository
pub struct InvestorRepo<'a> {
    db: &'a Database,
}

impl<'a> InvestorRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Register an investor.
    ///
    /// The user and location rows are inserted only if absent; the profile
    /// row is always inserted, so registering the same id twice fails on
    /// the profile's primary key.
    pub async fn register(&self, investor: &NewInvestor) -> Result<(), DbError> {
        let mut conn = self.db.acquire().await?;

        tracing::debug!(investor_id = %investor.id, "Ensuring user row exists");
        sqlx::query(
            r#"
            INSERT INTO user_table (id, name) VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&investor.id)
        .bind(&investor.name)
        .execute(&mut *conn)
        .await?;

        tracing::debug!(
            country = %investor.country,
            postal_code = %investor.postal_code,
            "Ensuring location row exists"
        );
        sqlx::query(
            r#"
            INSERT INTO investor2 (country, postal_code, province, city)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (country, postal_code) DO NOTHING
            "#,
        )
        .bind(&investor.country)
        .bind(&investor.postal_code)
        .bind(&investor.province)
        .bind(&investor.city)
        .execute(&mut *conn)
        .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO investor1 (id, postal_code, address, country)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&investor.id)
        .bind(&investor.postal_code)
        .bind(&investor.address)
        .bind(&investor.country)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NoRowsAffected {
                operation: "profile insert",
            });
        }

        tracing::info!(investor_id = %investor.id, "Investor registered");
        Ok(())
    }

    /// Apply a partial update.
    ///
    /// Steps run in order and each commits on its own: name, location row
    /// creation for a new `(country, postal_code)`, profile columns, then
    /// province/city on the location row the profile currently points at.
    /// A profile update touching no row is an error; a location update
    /// touching no row is only logged.
    pub async fn update(&self, update: &InvestorUpdate) -> Result<UpdateOutcome, DbError> {
        let id = update.id();
        let mut conn = self.db.acquire().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_table WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;

        if !exists {
            return Err(DbError::NotFound {
                resource: "user",
                id: id.to_owned(),
            });
        }

        let mut outcome = UpdateOutcome::default();

        if let Some(name) = update.name() {
            let result = sqlx::query("UPDATE user_table SET name = $1 WHERE id = $2")
                .bind(name)
                .bind(id)
                .execute(&mut *conn)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::NoRowsAffected {
                    operation: "name update",
                });
            }
            outcome.name_updated = true;
        }

        if let Some(key) = update.location_key() {
            let result = sqlx::query(
                r#"
                INSERT INTO investor2 (country, postal_code, province, city)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (country, postal_code) DO NOTHING
                "#,
            )
            .bind(&key.country)
            .bind(&key.postal_code)
            .bind(update.province_or_unknown())
            .bind(update.city_or_unknown())
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() > 0 {
                tracing::info!(
                    country = %key.country,
                    postal_code = %key.postal_code,
                    "Created location row"
                );
                outcome.location_created = true;
            }
        }

        if update.touches_profile() {
            let mut query = profile_update_query(update);
            let result = query.build().execute(&mut *conn).await?;

            if result.rows_affected() == 0 {
                return Err(DbError::NoRowsAffected {
                    operation: "profile update (record not found or no changes made)",
                });
            }
            outcome.profile_updated = true;
        }

        if update.touches_location() {
            // Key on what the profile holds now, which covers updates that
            // change province/city without touching postal code or country.
            let current: Option<(Option<String>, Option<String>)> =
                sqlx::query_as("SELECT postal_code, country FROM investor1 WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?;

            let (postal_code, country) = current.ok_or_else(|| DbError::NotFound {
                resource: "investor profile",
                id: id.to_owned(),
            })?;

            outcome.location = match (postal_code, country) {
                (Some(postal_code), Some(country)) => {
                    let key = LocationKey {
                        postal_code,
                        country,
                    };
                    let mut query = location_update_query(update, &key);
                    let result = query.build().execute(&mut *conn).await?;

                    if result.rows_affected() == 0 {
                        tracing::warn!(
                            investor_id = %id,
                            country = %key.country,
                            postal_code = %key.postal_code,
                            "No matching location row for update"
                        );
                        LocationChange::NoMatchingRow
                    } else {
                        LocationChange::Updated
                    }
                }
                (postal_code, country) => {
                    tracing::warn!(
                        investor_id = %id,
                        ?postal_code,
                        ?country,
                        "Skipping location update: profile has no postal code or country"
                    );
                    LocationChange::SkippedMissingKey
                }
            };
        }

        tracing::info!(investor_id = %id, ?outcome, "Investor updated");
        Ok(outcome)
    }

    /// Delete an investor's profile row.
    ///
    /// The user row and the location row are left in place.
    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let mut conn = self.db.acquire().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM investor1 WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;

        if !exists {
            return Err(DbError::NotFound {
                resource: "investor",
                id: id.to_owned(),
            });
        }

        let result = sqlx::query("DELETE FROM investor1 WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NoRowsAffected {
                operation: "investor delete",
            });
        }

        tracing::info!(investor_id = %id, "Investor deleted");
        Ok(())
    }

    /// All investors with a profile and a matching location row.
    pub async fn list(&self) -> Result<Vec<Investor>, DbError> {
        let sql = format!("{INVESTOR_COLUMNS} ORDER BY u.id");
        let rows = sqlx::query_as::<_, Investor>(&sql)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }

    /// One investor by id.
    pub async fn find(&self, id: &str) -> Result<Option<Investor>, DbError> {
        let sql = format!("{INVESTOR_COLUMNS} WHERE u.id = $1");
        let row = sqlx::query_as::<_, Investor>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row)
    }

    /// Listing for the "show all investors" view.
    pub async fn listing(&self) -> Result<Vec<InvestorListing>, DbError> {
        let rows = sqlx::query_as::<_, InvestorListing>(
            r#"
            SELECT
                u.id AS user_id,
                u.name AS user_name,
                i1.postal_code,
                i1.address,
                i1.country,
                i2.province,
                i2.city
            FROM user_table u, investor1 i1, investor2 i2
            WHERE
                u.id = i1.id
                AND i1.country = i2.country
                AND i1.postal_code = i2.postal_code
            ORDER BY u.id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }
}

/// UPDATE of the profile row restricted to the supplied columns.
///
/// Callers check [`InvestorUpdate::touches_profile`] first.
fn profile_update_query(update: &InvestorUpdate) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE investor1 SET ");
    let mut set = qb.separated(", ");

    if let Some(key) = update.location_key() {
        set.push("postal_code = ")
            .push_bind_unseparated(key.postal_code.as_str());
        set.push("country = ").push_bind_unseparated(key.country.as_str());
    }
    if let Some(address) = update.address() {
        set.push("address = ").push_bind_unseparated(address);
    }

    qb.push(" WHERE id = ").push_bind(update.id());
    qb
}

/// UPDATE of province/city on the location row keyed by `key`.
///
/// Callers check [`InvestorUpdate::touches_location`] first.
fn location_update_query<'a>(
    update: &'a InvestorUpdate,
    key: &'a LocationKey,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE investor2 SET ");
    let mut set = qb.separated(", ");

    if let Some(province) = update.province() {
        set.push("province = ").push_bind_unseparated(province);
    }
    if let Some(city) = update.city() {
        set.push("city = ").push_bind_unseparated(city);
    }

    qb.push(" WHERE country = ")
        .push_bind(key.country.as_str())
        .push(" AND postal_code = ")
        .push_bind(key.postal_code.as_str());
    qb
}
