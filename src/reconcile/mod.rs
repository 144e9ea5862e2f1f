
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Account;
use crate::storage::{StorageError, TransactionLedger};
use crate::types::AccountId;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Balance of [{qrid}] diverges from its ledger: stored {stored}, recomputed {recomputed}")]
    Divergence {
        qrid: AccountId,
        stored: Decimal,
        recomputed: Decimal,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Recomputes balances purely from the ledger, ignoring the stored running
/// balance.
///
/// The two values must always agree; divergence means a lost update or a
/// bug in the transfer path, which is exactly what the audit is for.
pub struct BalanceReconciler<L> {
    ledger: Arc<L>,
}

impl<L: TransactionLedger> BalanceReconciler<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// The balance implied by the ledger alone: everything received plus
    /// everything collected as tax, minus everything sent.
    pub async fn recompute(&self, qrid: &AccountId) -> Result<Decimal, StorageError> {
        Ok(self.ledger.totals_for(qrid).await?.net())
    }

    /// Compares the stored balance against the ledger-derived one.
    ///
    /// The mint account is skipped: its balance is intentionally untracked,
    /// since it creates and destroys money instead of holding it.
    pub async fn audit(&self, account: &Account) -> Result<(), AuditError> {
        if account.is_mint() {
            return Ok(());
        }

        let recomputed = self.recompute(&account.qrid).await?;

        if recomputed != account.balance {
            return Err(AuditError::Divergence {
                qrid: account.qrid.clone(),
                stored: account.balance,
                recomputed,
            });
        }

        Ok(())
    }
}
