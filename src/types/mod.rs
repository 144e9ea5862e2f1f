/// QR-card identifier of an account. The card id doubles as the account id;
/// ledger snapshots keep transfers traceable if a card is ever reassigned.
pub type AccountId = String;

/// Ledger-assigned record id. Ids start at 1; 0 marks a record that has not
/// been appended yet.
pub type TransactionId = u64;
