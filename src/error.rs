use std::fmt;

/// Operation-level errors surfaced to the views.
///
/// Validation variants are raised locally, before any request is dispatched;
/// `Network` carries the best-effort detail shaped by the HTTP adapter. Stale
/// conditions (deciding on a request the cache no longer holds, for example)
/// are not errors at all: they are logged warnings and no-ops.
#[derive(Debug)]
pub enum AppError {
    InvalidAmount(String),
    AmountTooLarge { remaining: f64 },
    FullyFunded(String),
    UnknownStartup(i64),
    MissingField(String),
    InvalidEquity(f64),
    Network(String),
    Serialization(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidAmount(raw) => {
                write!(f, "Enter a valid positive amount (got {:?})", raw)
            }
            AppError::AmountTooLarge { remaining } => {
                write!(f, "Amount exceeds remaining: ₹{}", remaining)
            }
            AppError::FullyFunded(name) => {
                write!(f, "{} has already reached its funding goal", name)
            }
            AppError::UnknownStartup(id) => write!(f, "Startup {} is not available", id),
            AppError::MissingField(field) => write!(f, "Missing required field: {}", field),
            AppError::InvalidEquity(pct) => {
                write!(f, "Equity must be between 0 and 100 (got {})", pct)
            }
            AppError::Network(detail) => write!(f, "Request failed: {}", detail),
            AppError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// True for errors raised before dispatch; these never touched the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidAmount(_)
                | AppError::AmountTooLarge { .. }
                | AppError::FullyFunded(_)
                | AppError::UnknownStartup(_)
                | AppError::MissingField(_)
                | AppError::InvalidEquity(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}
