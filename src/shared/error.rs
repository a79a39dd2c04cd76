use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Storage(String),
    Network(String),
    Unauthorized(String),
    NotFound(String),
    ValidationError(String),
    SerializationError(String),
    DeserializationError(String),
    ConfigurationError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Storage(msg) => write!(f, "Storage error: {msg}"),
            AppError::Network(msg) => write!(f, "Network error: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            AppError::DeserializationError(msg) => write!(f, "Deserialization error: {msg}"),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            AppError::DeserializationError(err.to_string())
        } else {
            AppError::SerializationError(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Storage(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
