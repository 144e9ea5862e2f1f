use rust_decimal::Decimal;

use crate::types::AccountId;

/// Immutable engine configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// Default tax rate applied to ordinary transfers, in percent.
    pub tax_percent: Decimal,
    /// Maximum accepted transfer comment length, in characters.
    pub comment_max_len: usize,
    /// Maximum number of decimal places a requested amount may carry.
    pub transfer_decimal_places: u32,
    /// Decimal places the tax computation rounds up to.
    pub rounding_decimal_places: u32,
    /// Account that creates money as a sender and destroys it as a recipient.
    pub mint_qrid: AccountId,
    /// Account that collects the tax cut of every transfer.
    pub tax_qrid: AccountId,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            tax_percent: Decimal::from(10),
            comment_max_len: 300,
            transfer_decimal_places: 2,
            rounding_decimal_places: 5,
            mint_qrid: "mint".to_string(),
            tax_qrid: "taxinc".to_string(),
        }
    }
}

impl BankConfig {
    pub fn with_tax_percent(mut self, percent: Decimal) -> Self {
        self.tax_percent = percent;
        self
    }

    pub fn with_comment_max_len(mut self, max_len: usize) -> Self {
        self.comment_max_len = max_len;
        self
    }

    pub fn with_transfer_decimal_places(mut self, places: u32) -> Self {
        self.transfer_decimal_places = places;
        self
    }

    pub fn with_rounding_decimal_places(mut self, places: u32) -> Self {
        self.rounding_decimal_places = places;
        self
    }

    pub fn with_mint_qrid(mut self, qrid: impl Into<AccountId>) -> Self {
        self.mint_qrid = qrid.into();
        self
    }

    pub fn with_tax_qrid(mut self, qrid: impl Into<AccountId>) -> Self {
        self.tax_qrid = qrid.into();
        self
    }
}
