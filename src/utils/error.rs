use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Field {field} is required")]
    MissingField { field: String },

    #[error("Field {field} must be {expected}")]
    InvalidType { field: String, expected: String },

    #[error("Field {field} must be one of: {allowed}")]
    InvalidEnum { field: String, allowed: String },

    #[error("Field {field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("Parameters page and limit must be positive numbers")]
    InvalidPagination { page: i64, limit: i64 },

    #[error("Invalid vehicle identifier: {value}")]
    InvalidIdentifier { value: String },

    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("Validation error: {}", errors.join(", "))]
    StoreValidationError { errors: Vec<String> },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("Authentication required: {message}")]
    Unauthorized { message: String },

    #[error("Malformed request body: {message}")]
    MalformedBody { message: String },

    #[error("Request timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FleetError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Lookup,
    Access,
    Storage,
    Configuration,
    Transport,
}

impl FleetError {
    /// Machine-checkable error kind, surfaced as `kind` in error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            FleetError::MissingField { .. } => "missing_field",
            FleetError::InvalidType { .. } => "invalid_type",
            FleetError::InvalidEnum { .. } => "invalid_enum",
            FleetError::OutOfRange { .. } => "out_of_range",
            FleetError::InvalidPagination { .. } => "invalid_pagination",
            FleetError::InvalidIdentifier { .. } => "invalid_identifier",
            FleetError::NotFound { .. } => "not_found",
            FleetError::StoreValidationError { .. } => "store_validation_error",
            FleetError::StoreError { .. } => "store_error",
            FleetError::Unauthorized { .. } => "unauthorized",
            FleetError::MalformedBody { .. } => "malformed_body",
            FleetError::Timeout { .. } => "timeout",
            FleetError::ConfigError { .. } | FleetError::InvalidConfigValueError { .. } => {
                "config_error"
            }
            FleetError::IoError(_) => "io_error",
            FleetError::SerializationError(_) => "serialization_error",
            FleetError::HttpError(_) => "http_error",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FleetError::MissingField { .. }
            | FleetError::InvalidType { .. }
            | FleetError::InvalidEnum { .. }
            | FleetError::OutOfRange { .. }
            | FleetError::InvalidPagination { .. }
            | FleetError::InvalidIdentifier { .. }
            | FleetError::MalformedBody { .. }
            | FleetError::StoreValidationError { .. } => ErrorCategory::Validation,
            FleetError::NotFound { .. } => ErrorCategory::Lookup,
            FleetError::Unauthorized { .. } => ErrorCategory::Access,
            FleetError::StoreError { .. }
            | FleetError::IoError(_)
            | FleetError::SerializationError(_) => ErrorCategory::Storage,
            FleetError::ConfigError { .. } | FleetError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            FleetError::Timeout { .. } | FleetError::HttpError(_) => ErrorCategory::Transport,
        }
    }

    /// HTTP status the boundary answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            FleetError::NotFound { .. } => 404,
            FleetError::Unauthorized { .. } => 401,
            FleetError::Timeout { .. } => 503,
            _ if self.category() == ErrorCategory::Validation => 400,
            _ => 500,
        }
    }

    /// Deterministic, caller-side failures. Retrying them never helps.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FleetError::StoreError { .. } | FleetError::IoError(_) => {
                "The vehicle store could not complete the operation".to_string()
            }
            FleetError::ConfigError { .. } | FleetError::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
            FleetError::HttpError(_) => "Could not reach the fleet API".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Fix the request payload and send it again",
            ErrorCategory::Lookup => "Check that the vehicle identifier exists",
            ErrorCategory::Access => "Send the request through the authentication gateway",
            ErrorCategory::Storage => "Check the data file path and its permissions",
            ErrorCategory::Configuration => "Review the TOML configuration and CLI flags",
            ErrorCategory::Transport => "Check the server address and retry later",
        }
    }
}
