//! Error types for the Prospector core library.

use thiserror::Error;

use crate::db::DatabaseError;

/// Result type alias using the Prospector Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for license governance operations.
#[derive(Debug, Error)]
pub enum Error {
    /// License or payment row absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A license write would leave the grace period ending before the expiry.
    #[error("Invalid license state: {0}")]
    InvalidLicenseState(String),

    /// A payment event failed validation before any write occurred.
    #[error("Invalid payment event: {0}")]
    InvalidPaymentEvent(String),

    /// Partial failure while registering a payment. Carries which stage
    /// failed and whether the ledger append was compensated, so an
    /// administrator can reconcile manually.
    #[error("Renewal failed during {stage}: {detail} (ledger compensated: {compensated})")]
    RenewalFailed {
        /// The stage of the renewal that failed.
        stage: RenewalStage,
        /// Underlying failure description.
        detail: String,
        /// Whether the just-appended ledger entry was rolled back.
        compensated: bool,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying storage error.
    #[error("Storage error: {0}")]
    Storage(DatabaseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage of the payment-registration saga that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalStage {
    /// Appending the payment event to the ledger.
    LedgerAppend,
    /// Updating the license record after the append.
    LicenseUpdate,
    /// Committing the combined transaction.
    Commit,
}

impl RenewalStage {
    /// Stable lowercase name used in logs and error messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LedgerAppend => "ledger-append",
            Self::LicenseUpdate => "license-update",
            Self::Commit => "commit",
        }
    }
}

impl std::fmt::Display for RenewalStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<DatabaseError> for Error {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(DatabaseError::from(e))
    }
}
