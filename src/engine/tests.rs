use super::TransferEngine;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::BankConfig;
use crate::models::{Account, TransactionRecord, TransferError, TransferRequest};
use crate::storage::{AccountStore, LedgerTotals, MemoryBank, StorageError, TransactionLedger, TransferStore};
use crate::types::{AccountId, TransactionId};

async fn seeded_bank() -> Result<MemoryBank> {
    let bank = MemoryBank::new();

    bank.save(Account::mint("mint")).await?;
    bank.save(Account::tax_income("taxinc")).await?;

    let mut ada = Account::new("s-1", "Ada", "DE");
    ada.balance = dec!(1000);
    bank.save(ada).await?;

    let mut ben = Account::new("s-2", "Ben", "FR");
    ben.balance = dec!(100);
    bank.save(ben).await?;

    Ok(bank)
}

fn engine<S: TransferStore>(store: Arc<S>) -> TransferEngine<S> {
    TransferEngine::new(store, Arc::new(BankConfig::default()))
}

async fn balance<S: AccountStore>(store: &S, qrid: &str) -> Result<Decimal> {
    let account = store
        .load(&qrid.to_string())
        .await?
        .ok_or_else(|| anyhow!("account {qrid} missing"))?;

    Ok(account.balance)
}

/// Store double counting account loads and optionally refusing commits.
struct InstrumentedBank {
    inner: MemoryBank,
    loads: AtomicUsize,
    fail_commit: AtomicBool,
}

impl InstrumentedBank {
    fn new(inner: MemoryBank) -> Self {
        Self {
            inner,
            loads: AtomicUsize::new(0),
            fail_commit: AtomicBool::new(false),
        }
    }
}

impl AccountStore for InstrumentedBank {
    async fn load(&self, qrid: &AccountId) -> Result<Option<Account>, StorageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(qrid).await
    }

    async fn save(&self, account: Account) -> Result<(), StorageError> {
        self.inner.save(account).await
    }
}

impl TransactionLedger for InstrumentedBank {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionId, StorageError> {
        self.inner.append(record).await
    }

    async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, StorageError> {
        self.inner.get(id).await
    }

    async fn history_for(&self, qrid: &AccountId, limit: usize) -> Result<Vec<TransactionRecord>, StorageError> {
        self.inner.history_for(qrid, limit).await
    }

    async fn totals_for(&self, qrid: &AccountId) -> Result<LedgerTotals, StorageError> {
        self.inner.totals_for(qrid).await
    }
}

impl TransferStore for InstrumentedBank {
    async fn commit(&self, participants: Vec<Account>, record: TransactionRecord) -> Result<TransactionId, StorageError> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("commit refused by test double".to_string()));
        }

        self.inner.commit(participants, record).await
    }
}

#[tokio::test]
async fn test_request_with_both_amounts_is_overspecified() -> Result<()> {
    let engine = engine(Arc::new(seeded_bank().await?));

    let mut request = TransferRequest::sending("s-1", "s-2", dec!(10));
    request.amount_received = Some(dec!(9));

    let result = engine.execute(request, dec!(10)).await;

    assert!(matches!(result, Err(TransferError::Overspecified)));

    Ok(())
}

#[tokio::test]
async fn test_request_with_no_amount_is_underspecified() -> Result<()> {
    let engine = engine(Arc::new(seeded_bank().await?));

    let mut request = TransferRequest::sending("s-1", "s-2", dec!(10));
    request.amount_sent = None;

    let result = engine.execute(request, dec!(10)).await;

    assert!(matches!(result, Err(TransferError::Underspecified)));

    Ok(())
}

#[tokio::test]
async fn test_non_positive_amounts_are_rejected_before_any_account_lookup() -> Result<()> {
    let bank = Arc::new(InstrumentedBank::new(seeded_bank().await?));
    let engine = engine(bank.clone());

    for amount in [dec!(0), dec!(-5)] {
        let result = engine.execute(TransferRequest::sending("s-1", "s-2", amount), dec!(10)).await;
        assert!(matches!(result, Err(TransferError::InvalidAmount { .. })));

        let result = engine.execute(TransferRequest::receiving("s-1", "s-2", amount), dec!(10)).await;
        assert!(matches!(result, Err(TransferError::InvalidAmount { .. })));
    }

    assert_eq!(bank.loads.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn test_negative_tax_percent_is_rejected_before_any_account_lookup() -> Result<()> {
    let bank = Arc::new(InstrumentedBank::new(seeded_bank().await?));
    let engine = engine(bank.clone());

    let result = engine.execute(TransferRequest::sending("s-1", "s-2", dec!(10)), dec!(-1)).await;

    assert!(matches!(result, Err(TransferError::InvalidTaxPercent { .. })));
    assert_eq!(bank.loads.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn test_missing_tax_account_is_an_internal_error() -> Result<()> {
    let bank = Arc::new(MemoryBank::new());
    bank.save(Account::new("s-1", "Ada", "DE")).await?;
    bank.save(Account::new("s-2", "Ben", "FR")).await?;

    let engine = engine(bank.clone());
    let result = engine.execute(TransferRequest::sending("s-1", "s-2", dec!(10)), dec!(10)).await;

    assert!(matches!(result, Err(TransferError::Internal(_))));
    assert_eq!(bank.record_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_mis_kinded_tax_account_is_an_internal_error() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let config = BankConfig::default().with_tax_qrid("s-2");
    let engine = TransferEngine::new(bank.clone(), Arc::new(config));

    let result = engine.execute(TransferRequest::sending("s-1", "s-2", dec!(10)), dec!(10)).await;

    assert!(matches!(result, Err(TransferError::Internal(_))));

    Ok(())
}

#[tokio::test]
async fn test_unknown_sender_and_recipient_are_rejected() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    let result = engine.execute(TransferRequest::sending("ghost", "s-2", dec!(10)), dec!(10)).await;
    assert!(matches!(result, Err(TransferError::InvalidSender { .. })));

    let result = engine.execute(TransferRequest::sending("s-1", "ghost", dec!(10)), dec!(10)).await;
    assert!(matches!(result, Err(TransferError::InvalidRecipient { .. })));

    assert_eq!(balance(bank.as_ref(), "s-1").await?, dec!(1000));

    Ok(())
}

#[tokio::test]
async fn test_taxed_transfer_moves_gross_net_and_tax() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    let id = engine
        .execute(TransferRequest::sending("s-1", "s-2", dec!(110)).with_comment("lunch"), dec!(10))
        .await?;

    assert_eq!(balance(bank.as_ref(), "s-1").await?, dec!(890));
    assert_eq!(balance(bank.as_ref(), "s-2").await?, dec!(200.00000));
    assert_eq!(balance(bank.as_ref(), "taxinc").await?, dec!(10.00000));

    let record = bank.get(id).await?.ok_or_else(|| anyhow!("record missing"))?;

    assert_eq!(record.amount_sent - record.amount_tax, record.amount_received);
    assert_eq!(record.sender.name, "Ada");
    assert_eq!(record.recipient.name, "Ben");
    assert_eq!(record.tax_account, "taxinc");
    assert_eq!(record.comment.as_deref(), Some("lunch"));

    let ada = bank.load(&"s-1".to_string()).await?.ok_or_else(|| anyhow!("sender missing"))?;
    let taxinc = bank.load(&"taxinc".to_string()).await?.ok_or_else(|| anyhow!("tax account missing"))?;

    assert_eq!(ada.transactions, vec![id]);
    assert!(taxinc.transactions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_transfer_specified_by_net_amount_charges_the_sender_the_gross() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    engine.execute(TransferRequest::receiving("s-1", "s-2", dec!(100)), dec!(10)).await?;

    assert_eq!(balance(bank.as_ref(), "s-1").await?, dec!(890.00000));
    assert_eq!(balance(bank.as_ref(), "s-2").await?, dec!(200));
    assert_eq!(balance(bank.as_ref(), "taxinc").await?, dec!(10.00000));

    Ok(())
}

#[tokio::test]
async fn test_insufficient_funds_changes_nothing() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    let result = engine.execute(TransferRequest::sending("s-2", "s-1", dec!(100.01)), dec!(0)).await;

    assert!(matches!(result, Err(TransferError::InsufficientFunds { .. })));
    assert_eq!(balance(bank.as_ref(), "s-1").await?, dec!(1000));
    assert_eq!(balance(bank.as_ref(), "s-2").await?, dec!(100));
    assert_eq!(bank.record_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_spawn_skips_the_funds_check_and_still_collects_tax() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    engine.execute(TransferRequest::sending("mint", "s-2", dec!(110)), dec!(10)).await?;

    assert_eq!(balance(bank.as_ref(), "mint").await?, Decimal::ZERO);
    assert_eq!(balance(bank.as_ref(), "s-2").await?, dec!(200.00000));
    assert_eq!(balance(bank.as_ref(), "taxinc").await?, dec!(10.00000));

    let mint = bank.load(&"mint".to_string()).await?.ok_or_else(|| anyhow!("mint missing"))?;

    assert!(mint.transactions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_destroy_discards_the_net_amount_and_still_collects_tax() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    engine.execute(TransferRequest::sending("s-1", "mint", dec!(110)), dec!(10)).await?;

    assert_eq!(balance(bank.as_ref(), "s-1").await?, dec!(890));
    assert_eq!(balance(bank.as_ref(), "mint").await?, Decimal::ZERO);
    assert_eq!(balance(bank.as_ref(), "taxinc").await?, dec!(10.00000));

    Ok(())
}

#[tokio::test]
async fn test_self_transfer_applies_each_mutation_exactly_once() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    let id = engine.execute(TransferRequest::sending("s-1", "s-1", dec!(110)), dec!(10)).await?;

    // Debited 110, credited back the net 100; only the tax leaves.
    assert_eq!(balance(bank.as_ref(), "s-1").await?, dec!(990.00000));
    assert_eq!(balance(bank.as_ref(), "taxinc").await?, dec!(10.00000));

    let ada = bank.load(&"s-1".to_string()).await?.ok_or_else(|| anyhow!("account missing"))?;

    assert_eq!(ada.transactions, vec![id]);

    Ok(())
}

#[tokio::test]
async fn test_tax_account_as_recipient_is_credited_for_both_roles() -> Result<()> {
    let bank = Arc::new(seeded_bank().await?);
    let engine = engine(bank.clone());

    engine.execute(TransferRequest::sending("s-1", "taxinc", dec!(110)), dec!(10)).await?;

    assert_eq!(balance(bank.as_ref(), "s-1").await?, dec!(890));
    assert_eq!(balance(bank.as_ref(), "taxinc").await?, dec!(110.00000));

    Ok(())
}

#[tokio::test]
async fn test_failed_commit_leaves_no_partial_state() -> Result<()> {
    let bank = Arc::new(InstrumentedBank::new(seeded_bank().await?));
    bank.fail_commit.store(true, Ordering::SeqCst);

    let engine = engine(bank.clone());
    let result = engine.execute(TransferRequest::sending("s-1", "s-2", dec!(110)), dec!(10)).await;

    assert!(matches!(result, Err(TransferError::Internal(_))));
    assert_eq!(balance(&bank.inner, "s-1").await?, dec!(1000));
    assert_eq!(balance(&bank.inner, "s-2").await?, dec!(100));
    assert_eq!(balance(&bank.inner, "taxinc").await?, Decimal::ZERO);
    assert_eq!(bank.inner.record_count().await, 0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_transfers_from_one_account_never_lose_updates() -> Result<()> {
    const TRANSFERS: usize = 20;

    let bank = Arc::new(seeded_bank().await?);
    let engine = Arc::new(engine(bank.clone()));

    // 20 transfers of 50 HGC drain the seeded 1000 exactly to zero.
    let handles = (0..TRANSFERS).map(|_| {
        let engine = engine.clone();

        tokio::spawn(async move {
            engine.execute(TransferRequest::sending("s-1", "s-2", dec!(50)), dec!(10)).await
        })
    });

    for joined in join_all(handles).await {
        joined??;
    }

    assert_eq!(balance(bank.as_ref(), "s-1").await?, Decimal::ZERO);
    assert_eq!(bank.record_count().await, TRANSFERS);

    // Whatever the rounding split, recipient plus tax account received the
    // full 1000 that left the sender.
    let gained = balance(bank.as_ref(), "s-2").await? - dec!(100) + balance(bank.as_ref(), "taxinc").await?;

    assert_eq!(gained, dec!(1000.00000));

    Ok(())
}
