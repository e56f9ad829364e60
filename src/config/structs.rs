use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（启动时加载一次，之后只读）
///
/// 包含：
/// - server: 监听地址、端口、路由前缀、worker 数量
/// - database: 数据库连接配置
/// - auth: 共享密码
/// - export: CSV 导出临时目录
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：旧式环境变量 > MT__* 环境变量 > TOML 文件 > 默认值
    /// ENV 前缀：MT，分隔符：__
    /// 示例：MT__SERVER__PORT=9999
    ///
    /// Logging is not up yet when this runs, so problems go to stderr.
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("MT")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        config.apply_legacy_env(|key| std::env::var(key).ok());
        config
    }

    /// Applies the flat variables older deployments set in `.env`
    /// (`PASSWORD`, `DATABASE_URL`, `DB_HOST`, ...).
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup("PASSWORD") {
            self.auth.password = Some(password);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.database_url = Some(url);
        }
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = Some(host);
        }
        if let Some(port) = lookup("DB_PORT") {
            match port.parse() {
                Ok(port) => self.database.port = port,
                Err(_) => eprintln!("[WARN] Ignoring invalid DB_PORT: {}", port),
            }
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = Some(user);
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = Some(name);
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Prefix every endpoint is mounted under.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    #[serde(default = "default_cpu_count")]
    pub workers: usize,
}

/// 数据库连接配置
///
/// Either a full `database_url`, or MySQL connection parts (`host`, `port`,
/// `user`, `password`, `name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_database_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Retries for writes that hit lock contention.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl DatabaseConfig {
    /// Resolve the connection string: explicit URL, then MySQL parts, then
    /// the local SQLite file.
    pub fn connection_url(&self) -> String {
        if let Some(url) = self.database_url.as_deref().map(str::trim)
            && !url.is_empty()
        {
            return url.to_string();
        }

        if let Some(host) = self.host.as_deref().map(str::trim)
            && !host.is_empty()
        {
            let user = urlencoding::encode(self.user.as_deref().unwrap_or("root"));
            let credentials = match self.password.as_deref() {
                Some(password) if !password.is_empty() => {
                    format!("{}:{}", user, urlencoding::encode(password))
                }
                _ => user.into_owned(),
            };
            return format!(
                "mysql://{}@{}:{}/{}",
                credentials,
                host,
                self.port,
                self.name.as_deref().unwrap_or("telemetry")
            );
        }

        default_sqlite_url()
    }
}

/// 访问控制配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared secret for registration, statistics and export.
    #[serde(default)]
    pub password: Option<String>,
}

/// CSV 导出配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub temp_dir: Option<String>,
}

impl ExportConfig {
    pub fn resolve_temp_dir(&self) -> PathBuf {
        match self.temp_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::temp_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_route_prefix() -> String {
    "/telemetry".to_string()
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_sqlite_url() -> String {
    "sqlite://telemetry.db?mode=rwc".to_string()
}

fn default_database_port() -> u16 {
    3306
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    8
}

fn default_retry_count() -> u32 {
    5
}

fn default_retry_base_delay_ms() -> u64 {
    20
}

fn default_retry_max_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            route_prefix: default_route_prefix(),
            workers: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: None,
            port: default_database_port(),
            user: None,
            password: None,
            name: None,
            pool_size: default_database_pool_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
