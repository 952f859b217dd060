//! Database backend detection, connection pool, and PostgreSQL database bootstrap.

use crate::config::Settings;
use crate::error::{AppError, ConfigError};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use sqlx::ConnectOptions;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(ConfigError::InvalidSetting {
                name: "DATABASE_URL",
                value: url.to_string(),
            })
        }
    }
}

/// An in-memory SQLite database lives and dies with its connection.
fn is_in_memory(url: &str) -> bool {
    url.starts_with("sqlite::memory:") || url.contains("mode=memory")
}

/// Connect a pool for `settings.database_url`. In-memory SQLite is pinned to one
/// connection that is never recycled.
pub async fn connect(settings: &Settings) -> Result<AnyPool, AppError> {
    sqlx::any::install_default_drivers();
    let url = settings.database_url.as_str();
    Backend::from_url(url)?;
    let options = if is_in_memory(url) {
        AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        AnyPoolOptions::new().max_connections(settings.db_max_connections)
    };
    let pool = options.connect(url).await?;
    tracing::debug!(max_connections = settings.db_max_connections, "database pool ready");
    Ok(pool)
}

/// Create the target database if it does not exist. Only meaningful for PostgreSQL;
/// SQLite URLs are left to `?mode=rwc`.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    if Backend::from_url(database_url)? != Backend::Postgres {
        return Ok(());
    }
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|_| ConfigError::InvalidSetting {
            name: "DATABASE_URL",
            value: database_url.to_string(),
        })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split "postgres://host/db?opts" into ("postgres://host/postgres", "db").
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url[after_scheme..]
        .find('/')
        .map(|i| after_scheme + i + 1)
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}
