//! Database connection pool management
//!
//! `Database` owns the sqlx `PgPool` for the process. It is constructed
//! explicitly, handed to the router as state and closed on shutdown.

use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};

/// Pool sizing and lifecycle settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,
    /// Idle connections above the minimum are closed after this long
    pub idle_timeout: Duration,
    /// Grace period for in-flight connections when closing
    pub close_grace: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 50,
            acquire_timeout: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(60),
            close_grace: Duration::from_secs(10),
        }
    }
}

impl PoolConfig {
    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

/// Handle to the connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    close_grace: Duration,
}

impl Database {
    /// Open the pool and establish the first connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the server is unreachable.
    pub async fn open(database_url: &str, config: &PoolConfig) -> Result<Self, sqlx::Error> {
        let pool = config.options().connect(database_url).await?;
        tracing::info!(
            max_connections = config.max_connections,
            "Connection pool started"
        );
        Ok(Self {
            pool,
            close_grace: config.close_grace,
        })
    }

    /// Build the pool without connecting; connections open on first use.
    pub fn connect_lazy(database_url: &str, config: &PoolConfig) -> Result<Self, sqlx::Error> {
        let pool = config.options().connect_lazy(database_url)?;
        Ok(Self {
            pool,
            close_grace: config.close_grace,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check out a connection. It returns to the pool when dropped,
    /// whichever way the caller exits.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, sqlx::Error> {
        self.pool.acquire().await
    }

    /// Round-trip a trivial query. Never fails; `false` means unreachable.
    pub async fn ping(&self) -> bool {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database connection check failed");
                false
            }
        }
    }

    /// Close the pool, giving checked-out connections the configured grace
    /// period to come back.
    pub async fn close(&self) {
        tracing::info!("Closing connection pool");
        match tokio::time::timeout(self.close_grace, self.pool.close()).await {
            Ok(()) => tracing::info!("Pool closed"),
            Err(_) => tracing::warn!(
                grace_secs = self.close_grace.as_secs(),
                "Pool close timed out with connections still checked out"
            ),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_pool_limits() {
        let config = PoolConfig::default();
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.close_grace, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let db = Database::connect_lazy("postgres://localhost:1/none", &PoolConfig::default())
            .expect("lazy pool");
        assert!(!db.is_closed());
    }

    #[tokio::test]
    async fn ping_reports_unreachable_server() {
        let config = PoolConfig {
            acquire_timeout: Duration::from_millis(200),
            ..PoolConfig::default()
        };
        let db = Database::connect_lazy("postgres://localhost:1/none", &config).expect("lazy pool");
        assert!(!db.ping().await);
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p stockdesk-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn ping_and_close() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let db = Database::open(&url, &PoolConfig::default())
            .await
            .expect("pool creation failed");

        assert!(db.ping().await);
        db.close().await;
        assert!(db.is_closed());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_acquire_releases_connections() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let config = PoolConfig {
            max_connections: 2,
            ..PoolConfig::default()
        };
        let db = Database::open(&url, &config).await.expect("pool creation failed");

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    let mut conn = db.acquire().await.expect("acquire failed");
                    let value: i32 = sqlx::query_scalar("SELECT $1::int")
                        .bind(i)
                        .fetch_one(&mut *conn)
                        .await
                        .expect("concurrent query failed");
                    value
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.expect("task panicked"), i as i32);
        }
        assert!(db.pool().size() <= 2);
    }
}
