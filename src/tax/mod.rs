#[cfg(test)]
mod tests;

use rust_decimal::{Decimal, RoundingStrategy};

/// Gross, net, and tax amounts of a single transfer.
///
/// Whichever side was requested, `gross - tax == net` holds exactly after
/// rounding, because the missing side is derived from the other two.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TaxBreakdown {
    /// Amount debited from the sender.
    pub gross: Decimal,
    /// Amount credited to the recipient.
    pub net: Decimal,
    /// Amount credited to the tax account.
    pub tax: Decimal,
    /// Tax rate in percent.
    pub percent: Decimal,
}

/// Pure gross/net/tax conversions.
///
/// Tax is rounded up at the configured precision: fractional remainders go
/// to the tax account, not the individual.
#[derive(Debug, Clone, Copy)]
pub struct TaxPolicy {
    rounding_decimal_places: u32,
}

impl TaxPolicy {
    pub fn new(rounding_decimal_places: u32) -> Self {
        Self { rounding_decimal_places }
    }

    /// Tax contained in a gross amount: `gross * p / (1 + p)` with
    /// `p = percent / 100`, rounded up.
    pub fn gross_to_tax(&self, gross: Decimal, percent: Decimal) -> Decimal {
        let rate = percent / Decimal::ONE_HUNDRED;
        self.round_up(gross * rate / (Decimal::ONE + rate))
    }

    /// Tax owed on top of a net amount: `net * p`, rounded up.
    pub fn net_to_tax(&self, net: Decimal, percent: Decimal) -> Decimal {
        let rate = percent / Decimal::ONE_HUNDRED;
        self.round_up(net * rate)
    }

    /// Splits a sender-specified amount into net and tax.
    pub fn from_gross(&self, gross: Decimal, percent: Decimal) -> TaxBreakdown {
        let tax = self.gross_to_tax(gross, percent);

        TaxBreakdown {
            gross,
            net: gross - tax,
            tax,
            percent,
        }
    }

    /// Derives the gross amount a sender must pay for a recipient-specified
    /// net amount.
    pub fn from_net(&self, net: Decimal, percent: Decimal) -> TaxBreakdown {
        let tax = self.net_to_tax(net, percent);

        TaxBreakdown {
            gross: net + tax,
            net,
            tax,
            percent,
        }
    }

    fn round_up(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.rounding_decimal_places, RoundingStrategy::ToPositiveInfinity)
    }
}
