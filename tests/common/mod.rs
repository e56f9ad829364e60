//! Shared setup for the HTTP integration tests

#![allow(dead_code)]

use modtelemetry::config::StaticConfig;
use modtelemetry::runtime::lifetime::{StartupContext, prepare_server_startup};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PASSWORD: &str = "s3cret";

pub struct TestEnv {
    pub context: StartupContext,
    pub export_dir: PathBuf,
    // 保持临时目录存活
    _dir: TempDir,
}

/// Fresh SQLite database and export directory per test.
pub async fn setup(password: Option<&str>) -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let export_dir = dir.path().join("exports");
    std::fs::create_dir_all(&export_dir).expect("Failed to create export dir");

    let mut config = StaticConfig::default();
    config.database.database_url = Some(format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("test.db").display()
    ));
    config.auth.password = password.map(str::to_string);
    config.export.temp_dir = Some(export_dir.display().to_string());

    let context = prepare_server_startup(&config)
        .await
        .expect("Failed to prepare startup context");

    TestEnv {
        context,
        export_dir,
        _dir: dir,
    }
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
