//! Ledger error types
//!
//! One taxonomy for the whole crate boundary. Every externally visible
//! error means no account or transfer field changed.

use thiserror::Error;

/// Ledger error types
///
/// Error codes are stable strings for the calling application.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    // === Validation Errors ===
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Source and destination account cannot be the same")]
    SameAccount,

    // === Authorization Errors ===
    #[error("Actor does not control the required side of this transfer")]
    NotAuthorized,

    // === Lookup Errors ===
    #[error("Account not found")]
    AccountNotFound,

    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    // === Funds Errors ===
    #[error("Insufficient available balance")]
    InsufficientFunds,

    #[error("Source account is frozen")]
    AccountFrozen,

    // === Lifecycle Errors ===
    #[error("Transfer already finalized as {0}")]
    AlreadyTerminal(String),

    #[error("Transfer expired before confirmation")]
    Expired,

    // === System Errors ===
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl LedgerError {
    /// Get the stable error code for the calling application
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "INVALID_AMOUNT",
            LedgerError::SameAccount => "SAME_ACCOUNT",
            LedgerError::NotAuthorized => "NOT_AUTHORIZED",
            LedgerError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            LedgerError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            LedgerError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            LedgerError::AccountFrozen => "ACCOUNT_FROZEN",
            LedgerError::AlreadyTerminal(_) => "ALREADY_TERMINAL",
            LedgerError::Expired => "EXPIRED",
            LedgerError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// Whether a retry of the same call can ever succeed.
    ///
    /// Only transient storage failures qualify; everything else is a
    /// definitive verdict on this request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StorageUnavailable(_))
    }
}
