use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("No data to export")]
    EmptyDataset,

    #[error("Formatter for column '{column}' failed: {message}")]
    FormatterFailure { column: String, message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Data,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ApiError(_) => ErrorCategory::Network,
            ReportError::IoError(_) => ErrorCategory::Storage,
            ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::SerializationError(_)
            | ReportError::EmptyDataset
            | ReportError::FormatterFailure { .. }
            | ReportError::ProcessingError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 空資料集是通知，不是失敗
            ReportError::EmptyDataset => ErrorSeverity::Low,
            ReportError::ApiError(_) => ErrorSeverity::Medium,
            ReportError::IoError(_) => ErrorSeverity::Critical,
            ReportError::SerializationError(_)
            | ReportError::FormatterFailure { .. }
            | ReportError::ProcessingError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReportError::ApiError(_) => "Could not reach the DoorBel API".to_string(),
            ReportError::IoError(_) => "Could not read or write the export file".to_string(),
            ReportError::SerializationError(_) => {
                "The API returned data in an unexpected shape".to_string()
            }
            ReportError::EmptyDataset => "No data to export".to_string(),
            ReportError::FormatterFailure { column, .. } => {
                format!("Could not format the '{}' column", column)
            }
            ReportError::ConfigValidationError { field, .. }
            | ReportError::InvalidConfigValueError { field, .. }
            | ReportError::MissingConfigError { field } => {
                format!("Configuration problem with '{}'", field)
            }
            ReportError::ProcessingError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check your network connection and the API base URL, then try again"
            }
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration value and re-run",
            ErrorCategory::Data => match self {
                ReportError::EmptyDataset => "Widen the query or pick a different collection",
                _ => "Inspect the offending record with --verbose and report it if it persists",
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
