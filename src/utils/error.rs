use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Invalid spec field '{field}': {reason}")]
    InvalidSpec { field: String, reason: String },

    #[error("No CPU match found for '{query}'")]
    NoMatchFound { query: String },

    #[error("CPU record not found: {key}")]
    NotFound { key: String },

    #[error("Reference store unavailable ({source_name}): {reason}")]
    StoreUnavailable { source_name: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Matching,
    Store,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ValuationError {
    pub fn invalid_spec(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn store_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSpec { .. } => ErrorCategory::Input,
            Self::NoMatchFound { .. } | Self::NotFound { .. } => ErrorCategory::Matching,
            Self::StoreUnavailable { .. } => ErrorCategory::Store,
            Self::ConfigError { .. } | Self::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::System,
        }
    }

    /// Input and matching problems are the caller's to fix; store and config
    /// failures stop the current request outright.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Matching => ErrorSeverity::Medium,
            ErrorCategory::Store | ErrorCategory::Configuration | ErrorCategory::System => {
                ErrorSeverity::Critical
            }
        }
    }

    /// True when the same request may succeed later without changes.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidSpec { field, .. } => {
                format!("Correct the '{}' field and submit again", field)
            }
            Self::NoMatchFound { .. } | Self::NotFound { .. } => {
                "Refine the CPU name or enter a benchmark score manually".to_string()
            }
            Self::StoreUnavailable { .. } => {
                "Check that the CPU table is readable, then retry the request".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValue { .. } => {
                "Fix the configuration file and restart".to_string()
            }
            Self::Io(_) => "Check file paths and permissions".to_string(),
            Self::Serialization(_) => "Check that the input is valid JSON".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidSpec { field, reason } => {
                format!("The value given for {} is not usable: {}", field, reason)
            }
            Self::NoMatchFound { query } if query.trim().is_empty() => {
                "No CPU was given and no benchmark score was entered".to_string()
            }
            Self::NoMatchFound { query } => {
                format!("Could not find a CPU matching \"{}\"", query)
            }
            Self::NotFound { key } => format!("Unknown CPU model \"{}\"", key),
            Self::StoreUnavailable { .. } => {
                "The CPU reference data could not be loaded".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValuationError>;
