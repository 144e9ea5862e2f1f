use std::net::IpAddr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Account;
use crate::types::{AccountId, TransactionId};

/// Profile fields of one party, captured as of transfer time.
///
/// Snapshots stay valid when the underlying account is later renamed or its
/// QR card reassigned, so old transfers can still be traced in case of
/// fraud or abuse.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PartySnapshot {
    pub qrid: AccountId,
    pub name: String,
    pub country: String,
}

impl PartySnapshot {
    pub fn capture(account: &Account) -> Self {
        Self {
            qrid: account.qrid.clone(),
            name: account.name.clone(),
            country: account.country.clone(),
        }
    }
}

/// One completed transfer, as stored in the append-only ledger.
///
/// Records are immutable: they are never edited or deleted once appended.
/// `amount_sent - amount_tax == amount_received` holds exactly for every
/// record the engine produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Assigned by the ledger on append; 0 until then.
    pub id: TransactionId,
    pub sender: PartySnapshot,
    pub recipient: PartySnapshot,
    /// The tax account credited by this transfer.
    pub tax_account: AccountId,
    pub time: DateTime<Utc>,
    /// Gross amount debited from the sender.
    pub amount_sent: Decimal,
    /// Net amount credited to the recipient.
    pub amount_received: Decimal,
    /// Tax cut credited to the tax account.
    pub amount_tax: Decimal,
    /// Tax rate in percent at transfer time.
    pub percent_tax: Decimal,
    pub comment: Option<String>,
    pub origin_ip: Option<IpAddr>,
}

/// A proposed transfer, before validation.
///
/// Exactly one of `amount_sent` and `amount_received` must be given; the
/// engine derives the other side from the tax rate.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount_sent: Option<Decimal>,
    pub amount_received: Option<Decimal>,
    pub comment: Option<String>,
    pub origin_ip: Option<IpAddr>,
}

impl TransferRequest {
    /// A request specifying the gross amount debited from the sender.
    pub fn sending(sender: impl Into<AccountId>, recipient: impl Into<AccountId>, gross: Decimal) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount_sent: Some(gross),
            amount_received: None,
            comment: None,
            origin_ip: None,
        }
    }

    /// A request specifying the net amount credited to the recipient.
    pub fn receiving(sender: impl Into<AccountId>, recipient: impl Into<AccountId>, net: Decimal) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount_sent: None,
            amount_received: Some(net),
            comment: None,
            origin_ip: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_origin_ip(mut self, ip: IpAddr) -> Self {
        self.origin_ip = Some(ip);
        self
    }
}
