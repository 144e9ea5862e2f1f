//! Transfer engine for HGC, a closed virtual currency.
//!
//! Transfers move money between student accounts, with a configurable tax
//! cut collected into a tax income account on every transfer. A dedicated
//! mint account creates money as a sender and destroys it as a recipient.
//! Every applied transfer appends an immutable ledger record, and stored
//! balances can always be recomputed from the ledger alone.

pub mod auth;
pub mod config;
pub mod engine;
pub mod models;
pub mod reconcile;
pub mod service;
pub mod storage;
pub mod tax;
pub mod types;

pub use config::BankConfig;
pub use engine::TransferEngine;
pub use reconcile::BalanceReconciler;
pub use service::TransferService;
