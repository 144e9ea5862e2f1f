mod account;
mod errors;
mod transaction;

use serde::{Deserialize, Serialize};

pub use account::Account;
pub use errors::TransferError;
pub use transaction::{PartySnapshot, TransactionRecord, TransferRequest};

/// Role an account plays in the currency system.
///
/// The role is an explicit tag on the stored account rather than a
/// configured id comparison, so a mistyped configuration value cannot turn
/// an ordinary account into the money supply.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Student account; balance must never go negative.
    Normal,
    /// Creates money as a sender and destroys it as a recipient.
    /// Its own balance is never touched.
    Mint,
    /// Collects the tax cut of every transfer.
    TaxIncome,
}
