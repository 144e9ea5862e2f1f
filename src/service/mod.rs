
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, warn};

use crate::auth::{AuthorizationGate, Credentials, PasswordVerifier, TransferVariant};
use crate::config::BankConfig;
use crate::engine::TransferEngine;
use crate::models::{Account, AccountKind, TransactionRecord, TransferError, TransferRequest};
use crate::storage::TransferStore;
use crate::types::{AccountId, TransactionId};

/// The exposed transfer surface.
///
/// Every entry point consults the authorization gate first, then layers its
/// own checks on top of the engine. Expected rejections come back verbatim;
/// only infrastructure faults are opaque.
pub struct TransferService<S, G, P> {
    engine: TransferEngine<S>,
    store: Arc<S>,
    gate: G,
    passwords: P,
    config: Arc<BankConfig>,
}

impl<S, G, P> TransferService<S, G, P>
where
    S: TransferStore,
    G: AuthorizationGate,
    P: PasswordVerifier,
{
    pub fn new(store: Arc<S>, config: BankConfig, gate: G, passwords: P) -> Self {
        let config = Arc::new(config);

        Self {
            engine: TransferEngine::new(store.clone(), config.clone()),
            store,
            gate,
            passwords,
            config,
        }
    }

    /// Ordinary transfer at the configured tax rate, authenticated by the
    /// sender's password.
    pub async fn taxed(
        &self,
        caller: &Credentials,
        request: TransferRequest,
        password: &str,
    ) -> Result<TransactionId, TransferError> {
        self.authorize(caller, TransferVariant::Taxed)?;
        self.check_comment(&request)?;
        self.check_decimal_places(&request)?;
        self.check_password(&request.sender, password).await?;

        self.engine.execute(request, self.config.tax_percent).await
    }

    /// Transfer without the tax cut. The capability gate replaces the
    /// password; the remaining checks match the taxed variant.
    pub async fn tax_exempt(&self, caller: &Credentials, request: TransferRequest) -> Result<TransactionId, TransferError> {
        self.authorize(caller, TransferVariant::TaxExempt)?;
        self.check_comment(&request)?;
        self.check_decimal_places(&request)?;

        self.engine.execute(request, Decimal::ZERO).await
    }

    /// Unrestricted transfer: no password, comment, or precision checks,
    /// and an optional tax-rate override. A negative override is rejected
    /// before the engine runs.
    pub async fn master(
        &self,
        caller: &Credentials,
        request: TransferRequest,
        tax_percent: Option<Decimal>,
    ) -> Result<TransactionId, TransferError> {
        self.authorize(caller, TransferVariant::Master)?;

        let percent = tax_percent.unwrap_or(self.config.tax_percent);

        if percent < Decimal::ZERO {
            return Err(TransferError::InvalidTaxPercent { percent });
        }

        self.engine.execute(request, percent).await
    }

    /// Creates money: a tax-free transfer from the mint to `recipient`.
    pub async fn spawn(
        &self,
        caller: &Credentials,
        recipient: impl Into<AccountId>,
        amount: Decimal,
        comment: Option<String>,
    ) -> Result<TransactionId, TransferError> {
        self.authorize(caller, TransferVariant::Master)?;

        let mut request = TransferRequest::sending(self.config.mint_qrid.clone(), recipient, amount);
        request.comment = Self::tagged_comment("spawn", comment);

        self.engine.execute(request, Decimal::ZERO).await
    }

    /// Destroys money: a tax-free transfer from `sender` to the mint.
    pub async fn destroy(
        &self,
        caller: &Credentials,
        sender: impl Into<AccountId>,
        amount: Decimal,
        comment: Option<String>,
    ) -> Result<TransactionId, TransferError> {
        self.authorize(caller, TransferVariant::Master)?;

        let mut request = TransferRequest::sending(sender, self.config.mint_qrid.clone(), amount);
        request.comment = Self::tagged_comment("destroy", comment);

        self.engine.execute(request, Decimal::ZERO).await
    }

    /// Password-checked read of the stored balance.
    pub async fn balance_of(&self, qrid: &AccountId, password: &str) -> Result<Decimal, TransferError> {
        let account = self.load_known(qrid).await?;

        if !self.passwords.verify(&account, password) {
            return Err(TransferError::InvalidPassword);
        }

        Ok(account.balance)
    }

    /// Password-checked history slice, newest first. A `limit` of 0 returns
    /// the full history.
    pub async fn recent_transactions(
        &self,
        qrid: &AccountId,
        password: &str,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, TransferError> {
        let account = self.load_known(qrid).await?;

        if !self.passwords.verify(&account, password) {
            return Err(TransferError::InvalidPassword);
        }

        Ok(self.store.history_for(qrid, limit).await?)
    }

    /// Startup configuration check. A missing or mis-kinded tax account is
    /// reported loudly but does not halt anything; transfers keep failing
    /// internally until it is fixed.
    pub async fn verify_tax_account(&self) -> bool {
        match self.store.load(&self.config.tax_qrid).await {
            Ok(Some(account)) if account.kind == AccountKind::TaxIncome => true,
            Ok(_) => {
                error!(
                    "Tax income account [{}] not found. Create it, or every transfer will fail.",
                    self.config.tax_qrid
                );
                false
            }
            Err(storage_error) => {
                error!("Could not verify the tax income account: {storage_error}");
                false
            }
        }
    }

    fn authorize(&self, caller: &Credentials, variant: TransferVariant) -> Result<(), TransferError> {
        if self.gate.check(caller, variant) {
            Ok(())
        } else {
            warn!("Caller was denied the {variant:?} transfer variant");
            Err(TransferError::Unauthorized)
        }
    }

    fn check_comment(&self, request: &TransferRequest) -> Result<(), TransferError> {
        let max_len = self.config.comment_max_len;

        if let Some(comment) = &request.comment {
            let length = comment.chars().count();

            if length > max_len {
                return Err(TransferError::CommentTooLong { length, max_len });
            }
        }

        Ok(())
    }

    fn check_decimal_places(&self, request: &TransferRequest) -> Result<(), TransferError> {
        let max_places = self.config.transfer_decimal_places;

        for amount in [request.amount_sent, request.amount_received].into_iter().flatten() {
            if amount.normalize().scale() > max_places {
                return Err(TransferError::TooManyDecimalPlaces { amount, max_places });
            }
        }

        Ok(())
    }

    async fn check_password(&self, sender: &AccountId, password: &str) -> Result<(), TransferError> {
        let account = self
            .store
            .load(sender)
            .await?
            .ok_or_else(|| TransferError::InvalidSender { qrid: sender.clone() })?;

        if !self.passwords.verify(&account, password) {
            return Err(TransferError::InvalidPassword);
        }

        Ok(())
    }

    async fn load_known(&self, qrid: &AccountId) -> Result<Account, TransferError> {
        self.store
            .load(qrid)
            .await?
            .ok_or_else(|| TransferError::UnknownAccount { qrid: qrid.clone() })
    }

    fn tagged_comment(tag: &str, comment: Option<String>) -> Option<String> {
        Some(match comment {
            Some(comment) => format!("{tag} - {comment}"),
            None => tag.to_string(),
        })
    }
}
