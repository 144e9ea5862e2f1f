use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::models::{Account, TransactionRecord};
use crate::storage::{AccountStore, LedgerTotals, StorageError, TransactionLedger, TransferStore};
use crate::types::{AccountId, TransactionId};

/// In-memory account store and ledger, used by tests and the demo binary.
///
/// All state lives behind a single lock so `commit` is atomic with respect
/// to every reader: a concurrent `load` sees a transfer either completely
/// or not at all.
#[derive(Default)]
pub struct MemoryBank {
    state: RwLock<BankState>,
}

#[derive(Default)]
struct BankState {
    accounts: HashMap<AccountId, Account>,
    records: Vec<TransactionRecord>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all accounts, unordered.
    pub async fn accounts(&self) -> Vec<Account> {
        self.state.read().await.accounts.values().cloned().collect()
    }

    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}

impl BankState {
    fn next_id(&self) -> TransactionId {
        self.records.len() as TransactionId + 1
    }

    fn matches(record: &TransactionRecord, qrid: &AccountId) -> bool {
        &record.sender.qrid == qrid || &record.recipient.qrid == qrid
    }
}

impl AccountStore for MemoryBank {
    async fn load(&self, qrid: &AccountId) -> Result<Option<Account>, StorageError> {
        Ok(self.state.read().await.accounts.get(qrid).cloned())
    }

    async fn save(&self, account: Account) -> Result<(), StorageError> {
        self.state.write().await.accounts.insert(account.qrid.clone(), account);
        Ok(())
    }
}

impl TransactionLedger for MemoryBank {
    async fn append(&self, mut record: TransactionRecord) -> Result<TransactionId, StorageError> {
        let mut state = self.state.write().await;
        let id = state.next_id();

        record.id = id;
        state.records.push(record);

        Ok(id)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, StorageError> {
        let state = self.state.read().await;

        Ok(id
            .checked_sub(1)
            .and_then(|index| state.records.get(index as usize))
            .cloned())
    }

    async fn history_for(&self, qrid: &AccountId, limit: usize) -> Result<Vec<TransactionRecord>, StorageError> {
        let state = self.state.read().await;
        let matching = state.records.iter().rev().filter(|record| BankState::matches(record, qrid));

        let history = if limit == 0 {
            matching.cloned().collect()
        } else {
            matching.take(limit).cloned().collect()
        };

        Ok(history)
    }

    async fn totals_for(&self, qrid: &AccountId) -> Result<LedgerTotals, StorageError> {
        let state = self.state.read().await;
        let mut totals = LedgerTotals::default();

        for record in &state.records {
            if &record.recipient.qrid == qrid {
                totals.received += record.amount_received;
            }
            if &record.tax_account == qrid {
                totals.tax_collected += record.amount_tax;
            }
            if &record.sender.qrid == qrid {
                totals.sent += record.amount_sent;
            }
        }

        Ok(totals)
    }
}

impl TransferStore for MemoryBank {
    async fn commit(
        &self,
        mut participants: Vec<Account>,
        mut record: TransactionRecord,
    ) -> Result<TransactionId, StorageError> {
        let mut state = self.state.write().await;
        let id = state.next_id();

        record.id = id;

        for account in &mut participants {
            if BankState::matches(&record, &account.qrid) && !account.is_mint() {
                account.transactions.push(id);
            }
        }

        for account in participants {
            state.accounts.insert(account.qrid.clone(), account);
        }

        state.records.push(record);

        Ok(id)
    }
}
