use rust_decimal::Decimal;
use thiserror::Error;

use crate::storage::StorageError;
use crate::types::AccountId;

/// Why a transfer request was rejected.
///
/// Every variant except `Internal` is an expected validation outcome: it is
/// reported verbatim to the caller, causes no balance mutation, and is
/// never retried. `Internal` wraps infrastructure faults; the detail is
/// logged, not interpreted.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Neither amount_sent nor amount_received was specified")]
    Underspecified,
    #[error("Both amount_sent and amount_received were specified")]
    Overspecified,
    #[error("Amount [{amount}] is not positive")]
    InvalidAmount {
        amount: Decimal,
    },
    #[error("Tax percentage [{percent}] is negative")]
    InvalidTaxPercent {
        percent: Decimal,
    },
    #[error("Sender [{qrid}] does not exist")]
    InvalidSender {
        qrid: AccountId,
    },
    #[error("Recipient [{qrid}] does not exist")]
    InvalidRecipient {
        qrid: AccountId,
    },
    #[error("Sender [{qrid}] does not have enough money for this transfer")]
    InsufficientFunds {
        qrid: AccountId,
    },
    #[error("Comment is {length} characters long, limit is {max_len}")]
    CommentTooLong {
        length: usize,
        max_len: usize,
    },
    #[error("Amount [{amount}] has more than {max_places} decimal places")]
    TooManyDecimalPlaces {
        amount: Decimal,
        max_places: u32,
    },
    #[error("Sender password is invalid")]
    InvalidPassword,
    #[error("Account [{qrid}] does not exist")]
    UnknownAccount {
        qrid: AccountId,
    },
    #[error("Caller is not authorized for this operation")]
    Unauthorized,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransferError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }
}

impl From<StorageError> for TransferError {
    fn from(error: StorageError) -> Self {
        Self::Internal(error.to_string())
    }
}
