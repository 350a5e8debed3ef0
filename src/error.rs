use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Backend error ({status}): {message}")]
    BackendError { status: u16, message: String },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Insufficient funds: balance {balance} is below price {price}")]
    InsufficientFunds { balance: Decimal, price: Decimal },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Authentication error: {0}")]
    AuthError(String),
    #[error("No signed-in session")]
    NotSignedIn,
    #[error("Email address has not been confirmed")]
    EmailNotConfirmed,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, MarketError>;

impl MarketError {
    /// The message shown to the person at the keyboard.
    ///
    /// Details stay in the logs; users get one message per kind of failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            MarketError::EmailNotConfirmed => {
                "Please verify your email address, then sign in again."
            }
            MarketError::InsufficientFunds { .. } => {
                "Your wallet balance is too low to book this session."
            }
            MarketError::ValidationError(_) => "Some of the details you entered are not valid.",
            MarketError::AuthError(_) => "Sign-in failed. Check your email and password.",
            MarketError::NotSignedIn => "You are not signed in. Sign in or sign up first.",
            MarketError::ConfigError(_) => "The application is not configured correctly.",
            _ => "Something went wrong. Please try again later.",
        }
    }
}
