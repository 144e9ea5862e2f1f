mod memory;

use rust_decimal::Decimal;
use thiserror::Error;

pub use memory::MemoryBank;

use crate::models::{Account, TransactionRecord};
use crate::types::{AccountId, TransactionId};

/// Infrastructure failure at the store boundary. The detail is logged and
/// surfaced to callers as an opaque internal error, never interpreted.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Ledger sums for one account, as used by the balance reconciliation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerTotals {
    /// Sum of `amount_received` where the account is the recipient.
    pub received: Decimal,
    /// Sum of `amount_tax` where the account is the tax account.
    pub tax_collected: Decimal,
    /// Sum of `amount_sent` where the account is the sender.
    pub sent: Decimal,
}

impl LedgerTotals {
    /// The balance implied by the ledger alone.
    pub fn net(&self) -> Decimal {
        self.received + self.tax_collected - self.sent
    }
}

/// Point lookup and save of accounts.
///
/// `save` must fail cleanly: either the whole account is written or nothing
/// is.
#[allow(async_fn_in_trait)]
pub trait AccountStore: Send + Sync + 'static {
    async fn load(&self, qrid: &AccountId) -> Result<Option<Account>, StorageError>;
    async fn save(&self, account: Account) -> Result<(), StorageError>;
}

/// Append-only store of immutable transfer records.
#[allow(async_fn_in_trait)]
pub trait TransactionLedger: Send + Sync + 'static {
    /// Appends a record, assigning and returning its id.
    async fn append(&self, record: TransactionRecord) -> Result<TransactionId, StorageError>;

    async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, StorageError>;

    /// Records the account sent or received, newest first. A `limit` of 0
    /// returns the full history.
    async fn history_for(&self, qrid: &AccountId, limit: usize) -> Result<Vec<TransactionRecord>, StorageError>;

    async fn totals_for(&self, qrid: &AccountId) -> Result<LedgerTotals, StorageError>;
}

/// A store that can apply a whole transfer as one unit of work.
#[allow(async_fn_in_trait)]
pub trait TransferStore: AccountStore + TransactionLedger {
    /// Persists all participant accounts and appends the record
    /// all-or-nothing: no reader may ever observe some of the writes
    /// without the others.
    ///
    /// The record id is assigned here and linked into the transaction list
    /// of every participant that is the record's sender or recipient,
    /// except the mint account.
    async fn commit(
        &self,
        participants: Vec<Account>,
        record: TransactionRecord,
    ) -> Result<TransactionId, StorageError>;
}
