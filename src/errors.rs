use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum TelemetryError {
    MissingFields(String),
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
}

impl TelemetryError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TelemetryError::MissingFields(_) => "E001",
            TelemetryError::Validation(_) => "E002",
            TelemetryError::Unauthorized(_) => "E003",
            TelemetryError::NotFound(_) => "E004",
            TelemetryError::Conflict(_) => "E005",
            TelemetryError::DatabaseConfig(_) => "E006",
            TelemetryError::DatabaseConnection(_) => "E007",
            TelemetryError::DatabaseOperation(_) => "E008",
            TelemetryError::FileOperation(_) => "E009",
            TelemetryError::Serialization(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TelemetryError::MissingFields(_) => "Missing Fields",
            TelemetryError::Validation(_) => "Validation Error",
            TelemetryError::Unauthorized(_) => "Unauthorized",
            TelemetryError::NotFound(_) => "Resource Not Found",
            TelemetryError::Conflict(_) => "Conflict",
            TelemetryError::DatabaseConfig(_) => "Database Configuration Error",
            TelemetryError::DatabaseConnection(_) => "Database Connection Error",
            TelemetryError::DatabaseOperation(_) => "Database Operation Error",
            TelemetryError::FileOperation(_) => "File Operation Error",
            TelemetryError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TelemetryError::MissingFields(msg)
            | TelemetryError::Validation(msg)
            | TelemetryError::Unauthorized(msg)
            | TelemetryError::NotFound(msg)
            | TelemetryError::Conflict(msg)
            | TelemetryError::DatabaseConfig(msg)
            | TelemetryError::DatabaseConnection(msg)
            | TelemetryError::DatabaseOperation(msg)
            | TelemetryError::FileOperation(msg)
            | TelemetryError::Serialization(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    pub fn http_status(&self) -> StatusCode {
        match self {
            TelemetryError::MissingFields(_) | TelemetryError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            TelemetryError::Unauthorized(_) => StatusCode::FORBIDDEN,
            TelemetryError::NotFound(_) => StatusCode::NOT_FOUND,
            TelemetryError::Conflict(_) => StatusCode::CONFLICT,
            TelemetryError::DatabaseConfig(_)
            | TelemetryError::DatabaseConnection(_)
            | TelemetryError::DatabaseOperation(_)
            | TelemetryError::FileOperation(_)
            | TelemetryError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 内部错误（存储、文件、序列化）不向调用方暴露细节
    pub fn is_internal(&self) -> bool {
        self.http_status().is_server_error()
    }

    /// 返回给调用方的消息
    pub fn public_message(&self) -> &str {
        if self.is_internal() {
            "Internal server error"
        } else {
            self.message()
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TelemetryError {}

// 便捷的构造函数
impl TelemetryError {
    pub fn missing_fields<T: Into<String>>(msg: T) -> Self {
        TelemetryError::MissingFields(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TelemetryError::Validation(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        TelemetryError::Unauthorized(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TelemetryError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        TelemetryError::Conflict(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TelemetryError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TelemetryError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TelemetryError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TelemetryError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TelemetryError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for TelemetryError {
    fn from(err: sea_orm::DbErr) -> Self {
        TelemetryError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::FileOperation(err.to_string())
    }
}

impl From<csv::Error> for TelemetryError {
    fn from(err: csv::Error) -> Self {
        TelemetryError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
