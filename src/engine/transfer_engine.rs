use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::config::BankConfig;
use crate::engine::locks::AccountLocks;
use crate::models::{Account, AccountKind, PartySnapshot, TransactionRecord, TransferError, TransferRequest};
use crate::storage::TransferStore;
use crate::tax::{TaxBreakdown, TaxPolicy};
use crate::types::{AccountId, TransactionId};

/// Orchestrates a single transfer: validation, tax computation, balance
/// mutation, and the ledger append.
///
/// Money creation and destruction are ordinary transfers with the mint
/// account as sender or recipient; the tax account is credited in every
/// case.
pub struct TransferEngine<S> {
    store: Arc<S>,
    config: Arc<BankConfig>,
    policy: TaxPolicy,
    locks: AccountLocks,
}

impl<S: TransferStore> TransferEngine<S> {
    pub fn new(store: Arc<S>, config: Arc<BankConfig>) -> Self {
        let policy = TaxPolicy::new(config.rounding_decimal_places);

        Self {
            store,
            config,
            policy,
            locks: AccountLocks::new(),
        }
    }

    /// Validates and applies one transfer, returning the new record id.
    ///
    /// The first failing check decides the error and no later check runs.
    /// A rejected transfer never changes any balance; an applied transfer
    /// becomes visible atomically, balances and ledger record together.
    pub async fn execute(&self, request: TransferRequest, tax_percent: Decimal) -> Result<TransactionId, TransferError> {
        let breakdown = self.breakdown(&request, tax_percent)?;

        let _guards = self
            .locks
            .acquire([&request.sender, &request.recipient, &self.config.tax_qrid])
            .await;

        let taxinc = self.load_tax_account().await?;

        let sender = if request.sender == taxinc.qrid {
            taxinc.clone()
        } else {
            self.store
                .load(&request.sender)
                .await?
                .ok_or_else(|| TransferError::InvalidSender { qrid: request.sender.clone() })?
        };

        let recipient = if request.recipient == sender.qrid {
            sender.clone()
        } else if request.recipient == taxinc.qrid {
            taxinc.clone()
        } else {
            self.store
                .load(&request.recipient)
                .await?
                .ok_or_else(|| TransferError::InvalidRecipient { qrid: request.recipient.clone() })?
        };

        let spawns_money = sender.is_mint();
        let destroys_money = recipient.is_mint();

        // Snapshots are taken from the pre-mutation loads; the record holds
        // the profile of both parties as of transfer time.
        let record = TransactionRecord {
            id: 0,
            sender: PartySnapshot::capture(&sender),
            recipient: PartySnapshot::capture(&recipient),
            tax_account: taxinc.qrid.clone(),
            time: Utc::now(),
            amount_sent: breakdown.gross,
            amount_received: breakdown.net,
            amount_tax: breakdown.tax,
            percent_tax: breakdown.percent,
            comment: request.comment.clone(),
            origin_ip: request.origin_ip,
        };

        // Roles may alias (sender == recipient, tax account in either
        // role); every unique account gets exactly one instance so no
        // mutation is lost on save.
        let mut participants: Vec<Account> = Vec::with_capacity(3);

        for account in [taxinc, sender, recipient] {
            if !participants.iter().any(|existing| existing.qrid == account.qrid) {
                participants.push(account);
            }
        }

        if !spawns_money {
            Self::participant_mut(&mut participants, &request.sender)?.debit(breakdown.gross)?;
        }

        if !destroys_money {
            Self::participant_mut(&mut participants, &request.recipient)?.credit(breakdown.net)?;
        }

        Self::participant_mut(&mut participants, &self.config.tax_qrid)?.credit(breakdown.tax)?;

        let id = self.store.commit(participants, record).await.map_err(|storage_error| {
            error!("Transfer commit failed, no balances were changed: {storage_error}");
            TransferError::from(storage_error)
        })?;

        let label = if spawns_money {
            "Money spawn"
        } else if destroys_money {
            "Money destruction"
        } else {
            "Transfer"
        };

        info!(
            "{label} [{id}] from [{}] to [{}]: net {} HGC, tax income {} HGC",
            request.sender, request.recipient, breakdown.net, breakdown.tax
        );

        Ok(id)
    }

    /// Amount checks and tax computation; runs before any store access.
    fn breakdown(&self, request: &TransferRequest, tax_percent: Decimal) -> Result<TaxBreakdown, TransferError> {
        let (amount, amount_is_gross) = match (request.amount_sent, request.amount_received) {
            (None, None) => return Err(TransferError::Underspecified),
            (Some(_), Some(_)) => return Err(TransferError::Overspecified),
            (Some(gross), None) => (gross, true),
            (None, Some(net)) => (net, false),
        };

        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount { amount });
        }

        if tax_percent < Decimal::ZERO {
            return Err(TransferError::InvalidTaxPercent { percent: tax_percent });
        }

        let breakdown = if amount_is_gross {
            self.policy.from_gross(amount, tax_percent)
        } else {
            self.policy.from_net(amount, tax_percent)
        };

        // A gross amount below the rounding step would leave a zero or
        // negative net after the rounded-up tax is taken out.
        if breakdown.net <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount { amount });
        }

        Ok(breakdown)
    }

    async fn load_tax_account(&self) -> Result<Account, TransferError> {
        match self.store.load(&self.config.tax_qrid).await? {
            Some(account) if account.kind == AccountKind::TaxIncome => Ok(account),
            Some(account) => {
                error!("Configured tax account [{}] is not a tax income account", account.qrid);
                Err(TransferError::internal("tax income account misconfigured"))
            }
            None => {
                error!(
                    "Tax income account [{}] not found, no taxes can be collected",
                    self.config.tax_qrid
                );
                Err(TransferError::internal("tax income account not found"))
            }
        }
    }

    fn participant_mut<'a>(
        participants: &'a mut [Account],
        qrid: &AccountId,
    ) -> Result<&'a mut Account, TransferError> {
        participants
            .iter_mut()
            .find(|account| &account.qrid == qrid)
            .ok_or_else(|| TransferError::internal("transfer participant not loaded"))
    }
}
