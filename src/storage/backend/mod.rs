//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
mod retry;

use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{Result, TelemetryError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_record, model_to_registered_mod};
pub use mutations::{MOD_ALREADY_EXISTS, MOD_DOES_NOT_EXIST};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(TelemetryError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        "postgresql" => "postgres".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str, config: &DatabaseConfig) -> Result<Self> {
        if database_url.is_empty() {
            return Err(TelemetryError::database_config("database URL is empty"));
        }

        let backend_name = normalize_backend_name(backend_name);

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, config).await?
        };

        run_migrations(&db).await?;

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry_config: retry::RetryConfig::from(config),
        };
        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接（关闭连接池等需要直接访问数据库的场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend() {
        assert_eq!(infer_backend_from_url("sqlite://telemetry.db?mode=rwc").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/telemetry.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mysql://root@localhost/t").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("mariadb://root@localhost/t").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("postgresql://localhost/t").unwrap(), "postgres");
    }

    #[test]
    fn test_infer_backend_rejects_unknown_scheme() {
        let err = infer_backend_from_url("redis://localhost").unwrap_err();
        assert!(matches!(err, TelemetryError::DatabaseConfig(_)));
    }

    #[test]
    fn test_normalize_backend_name() {
        assert_eq!(normalize_backend_name("mariadb"), "mysql");
        assert_eq!(normalize_backend_name("postgresql"), "postgres");
        assert_eq!(normalize_backend_name("sqlite"), "sqlite");
    }
}
