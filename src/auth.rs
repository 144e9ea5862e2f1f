use std::collections::HashSet;

use dashmap::DashMap;

use crate::models::Account;
use crate::types::AccountId;

/// Opaque caller credentials, as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

/// The transfer entry points a caller can be authorized for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransferVariant {
    Taxed,
    TaxExempt,
    Master,
}

/// Decides which transfer variant a caller may invoke. Consulted before any
/// validation runs.
pub trait AuthorizationGate: Send + Sync {
    fn check(&self, caller: &Credentials, variant: TransferVariant) -> bool;
}

/// Password verification is external; hashing lives behind this predicate.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, account: &Account, plaintext: &str) -> bool;
}

/// Grants every variant to every caller. For tests and the demo binary.
pub struct OpenGate;

impl AuthorizationGate for OpenGate {
    fn check(&self, _caller: &Credentials, _variant: TransferVariant) -> bool {
        true
    }
}

/// Token-tiered gate: taxed transfers are open to everyone, tax-exempt
/// transfers need an exempt or master token, master operations need a
/// master token.
pub struct TokenGate {
    master: HashSet<String>,
    tax_exempt: HashSet<String>,
}

impl TokenGate {
    pub fn new(master: impl IntoIterator<Item = String>, tax_exempt: impl IntoIterator<Item = String>) -> Self {
        Self {
            master: master.into_iter().collect(),
            tax_exempt: tax_exempt.into_iter().collect(),
        }
    }
}

impl AuthorizationGate for TokenGate {
    fn check(&self, caller: &Credentials, variant: TransferVariant) -> bool {
        match variant {
            TransferVariant::Taxed => true,
            TransferVariant::TaxExempt => {
                self.tax_exempt.contains(&caller.token) || self.master.contains(&caller.token)
            }
            TransferVariant::Master => self.master.contains(&caller.token),
        }
    }
}

/// Plain-text password map. For tests and the demo binary only; production
/// deployments verify against hashed credentials behind the same trait.
#[derive(Default)]
pub struct PlainPasswords {
    passwords: DashMap<AccountId, String>,
}

impl PlainPasswords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, qrid: impl Into<AccountId>, password: impl Into<String>) {
        self.passwords.insert(qrid.into(), password.into());
    }
}

impl PasswordVerifier for PlainPasswords {
    fn verify(&self, account: &Account, plaintext: &str) -> bool {
        self.passwords
            .get(&account.qrid)
            .map(|stored| stored.value().as_str() == plaintext)
            .unwrap_or(false)
    }
}
