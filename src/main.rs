use std::io::{BufWriter, Write, stderr, stdout};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use hgc_bank::auth::{Credentials, PlainPasswords, TokenGate};
use hgc_bank::models::{Account, TransferRequest};
use hgc_bank::storage::{AccountStore, MemoryBank};
use hgc_bank::{BalanceReconciler, BankConfig, TransferService};

const STUDENTS: [(&str, &str, &str); 3] = [
    ("s-100", "Alice", "DE"),
    ("s-200", "Bob", "FR"),
    ("s-300", "Clara", "AT"),
];

/// Demo scenario: seed a small bank, spawn money, run a batch of concurrent
/// taxed transfers, destroy part of a balance, and print every stored
/// balance next to its ledger-derived counterpart.
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let log_level = args.get(1).map(|s| parse_log_level(s)).unwrap_or(LevelFilter::INFO);

    setup_logging(log_level);

    let bank = Arc::new(MemoryBank::new());

    bank.save(Account::mint("mint")).await?;
    bank.save(Account::tax_income("taxinc")).await?;

    let passwords = PlainPasswords::new();

    for (qrid, name, country) in STUDENTS {
        bank.save(Account::new(qrid, name, country)).await?;
        passwords.set(qrid, format!("{qrid}-pw"));
    }

    let gate = TokenGate::new(["master-key".to_string()], Vec::new());
    let service = Arc::new(TransferService::new(bank.clone(), BankConfig::default(), gate, passwords));
    let master = Credentials::new("master-key");

    if !service.verify_tax_account().await {
        anyhow::bail!("demo setup is missing the tax income account");
    }

    for (qrid, _, _) in STUDENTS {
        service
            .spawn(&master, qrid, Decimal::from(1000), Some("demo seed".to_string()))
            .await?;
    }

    let timer = Instant::now();
    let caller = Credentials::new("student");
    let mut handles = Vec::new();

    for round in 0..3 {
        for (index, (sender, _, _)) in STUDENTS.iter().enumerate() {
            let recipient = STUDENTS[(index + 1) % STUDENTS.len()].0;
            let service = service.clone();
            let caller = caller.clone();
            let comment = format!("round {round}");

            handles.push(tokio::spawn(async move {
                let request = TransferRequest::sending(*sender, recipient, Decimal::from(110)).with_comment(comment);

                service.taxed(&caller, request, &format!("{sender}-pw")).await
            }));
        }
    }

    for joined in join_all(handles).await {
        joined??;
    }

    service
        .destroy(&master, "s-100", Decimal::from(100), Some("end of term".to_string()))
        .await?;

    info!("Demo scenario finished in {:?}", timer.elapsed());

    write_results_to_stdout(&bank).await?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    }
}

fn setup_logging(level: LevelFilter) {
    // Balances go to stdout, so logging has to stay on stderr.
    let terminal_log = fmt::layer().with_target(false).with_writer(stderr).with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

async fn write_results_to_stdout(bank: &Arc<MemoryBank>) -> Result<()> {
    let reconciler = BalanceReconciler::new(bank.clone());
    let mut accounts = bank.accounts().await;

    accounts.sort_by(|a, b| a.qrid.cmp(&b.qrid));

    let mut output = BufWriter::new(stdout().lock());

    writeln!(output, "qrid,kind,balance,ledger_balance,consistent")?;

    for account in accounts {
        let ledger_balance = reconciler.recompute(&account.qrid).await?;
        let consistent = reconciler.audit(&account).await.is_ok();

        writeln!(
            output,
            "{},{:?},{},{},{}",
            account.qrid, account.kind, account.balance, ledger_balance, consistent
        )?;
    }

    output.flush()?;

    Ok(())
}
