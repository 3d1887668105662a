use crate::config::AppConfig;
use migrations::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::{debug, info};

/// Shared connection pool handle passed to every service.
pub type DbPool = DatabaseConnection;

/// Pool settings, usually derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 16,
            min_connections: 2,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            acquire_timeout_secs: 8,
            sqlx_logging: false,
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            url: config.database_url.clone(),
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            connect_timeout_secs: config.db_connect_timeout_secs,
            idle_timeout_secs: config.db_idle_timeout_secs,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
            sqlx_logging: !config.is_production(),
        }
    }
}

/// Connect with default pool settings. Mostly used by tests and the seed binary.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, DbErr> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..DbConfig::default()
    };
    establish_connection_with_config(&config).await
}

/// Connect using explicit pool settings and verify the connection with a ping.
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(config.sqlx_logging);

    debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to database"
    );

    let pool = Database::connect(options).await?;
    pool.ping().await?;
    info!("Database connection established");
    Ok(pool)
}

/// Connect using the pool settings carried by the application config.
pub async fn establish_connection_from_app_config(config: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection_with_config(&DbConfig::from(config)).await
}

/// Bring the schema up to date. Invoked on startup when `auto_migrate` is set.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    info!("Running pending migrations");
    Migrator::up(pool, None).await?;
    info!("Migrations complete");
    Ok(())
}

/// Lightweight liveness probe used by the health endpoint.
pub async fn check_connection(pool: &DbPool) -> Result<(), DbErr> {
    pool.ping().await
}

/// Close the pool during graceful shutdown.
pub async fn close_pool(pool: DbPool) -> Result<(), DbErr> {
    pool.close().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 16);
        assert!(config.min_connections <= config.max_connections);
        assert!(config.acquire_timeout_secs < config.connect_timeout_secs);
    }

    #[test]
    fn db_config_from_app_config() {
        let app = AppConfig::new("sqlite::memory:", "127.0.0.1", 8080, "development");
        let config = DbConfig::from(&app);
        assert_eq!(config.url, "sqlite::memory:");
        assert_eq!(config.max_connections, app.db_max_connections);
        assert!(config.sqlx_logging);
    }

    #[tokio::test]
    async fn connects_to_in_memory_sqlite() {
        let pool = establish_connection("sqlite::memory:").await.unwrap();
        check_connection(&pool).await.unwrap();
        close_pool(pool).await.unwrap();
    }

    #[tokio::test]
    async fn connects_to_sqlite_file_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("influence.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let pool = establish_connection(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        check_connection(&pool).await.unwrap();
        close_pool(pool).await.unwrap();
    }
}
