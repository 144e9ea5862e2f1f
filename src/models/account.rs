use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AccountKind, TransferError};
use crate::types::{AccountId, TransactionId};

/// A single account holding HGC.
///
/// Balances are mutated only by the transfer engine; account creation and
/// removal happen behind the store seam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The QR-card id, unique across the system.
    pub qrid: AccountId,
    /// Display name, copied into ledger snapshots at transfer time.
    pub name: String,
    /// Country code, copied into ledger snapshots at transfer time.
    pub country: String,
    /// Role of the account in the currency system.
    pub kind: AccountKind,
    /// Current balance in HGC.
    pub balance: Decimal,
    /// Ids of the ledger records this account sent or received.
    pub transactions: Vec<TransactionId>,
}

impl Account {
    /// Creates an ordinary account with a zero balance.
    pub fn new(qrid: impl Into<AccountId>, name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            qrid: qrid.into(),
            name: name.into(),
            country: country.into(),
            kind: AccountKind::Normal,
            balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    /// Creates the money-supply account.
    pub fn mint(qrid: impl Into<AccountId>) -> Self {
        let mut account = Self::new(qrid, "Mint", "");
        account.kind = AccountKind::Mint;
        account
    }

    /// Creates the tax collection account.
    pub fn tax_income(qrid: impl Into<AccountId>) -> Self {
        let mut account = Self::new(qrid, "Tax income", "");
        account.kind = AccountKind::TaxIncome;
        account
    }

    pub fn is_mint(&self) -> bool {
        self.kind == AccountKind::Mint
    }

    /// Adds `amount` to the balance.
    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<(), TransferError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::internal("balance overflow on credit"))?;
        Ok(())
    }

    /// Removes `amount` from the balance, refusing to take it negative.
    pub(crate) fn debit(&mut self, amount: Decimal) -> Result<(), TransferError> {
        if self.balance < amount {
            return Err(TransferError::InsufficientFunds { qrid: self.qrid.clone() });
        }

        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| TransferError::internal("balance overflow on debit"))?;
        Ok(())
    }
}
