use chrono::{NaiveDate, Utc};
use clap::Parser;
use coupon_engine::application::coordinator::BalanceCoordinator;
use coupon_engine::application::expiry::ExpiryBatchProcessor;
use coupon_engine::application::joblog::JobLogService;
use coupon_engine::domain::ports::{
    DynBalanceCache, DynJobLogStore, DynLedgerStore, DynLockService,
};
use coupon_engine::infrastructure::cache::InMemoryBalanceCache;
use coupon_engine::infrastructure::in_memory::{InMemoryJobLogStore, InMemoryLedgerStore};
use coupon_engine::infrastructure::lock::InProcessLockService;
#[cfg(feature = "storage-rocksdb")]
use coupon_engine::infrastructure::rocksdb::RocksDBStore;
use coupon_engine::interfaces::csv::coupon_reader::CouponReader;
use coupon_engine::interfaces::csv::coupon_writer::CouponWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Below this success rate the run is flagged for follow-up.
const SUCCESS_RATE_WARN_THRESHOLD: f64 = 95.0;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input coupon ledger CSV file
    input: PathBuf,

    /// Path to persistent ledger database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Date the expiry sweep runs as of (defaults to today, UTC)
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (ledger, job_logs) = stores(&cli)?;
    let locks: DynLockService = Arc::new(InProcessLockService::new());
    let cache: DynBalanceCache = Arc::new(InMemoryBalanceCache::new());
    let balance = Arc::new(BalanceCoordinator::new(ledger.clone(), locks, cache));
    let processor = ExpiryBatchProcessor::new(
        ledger.clone(),
        balance.clone(),
        JobLogService::new(job_logs),
    );

    // Seed the ledger and warm the balance cache
    let file = File::open(&cli.input).into_diagnostic()?;
    for result in CouponReader::new(file).coupons() {
        match result {
            Ok(coupon) => {
                balance
                    .initialize_balance(&coupon.coupon_id, coupon.remaining_amount)
                    .await
                    .into_diagnostic()?;
                ledger.save(coupon).await.into_diagnostic()?;
            }
            Err(err) => warn!(%err, "skipping invalid coupon row"),
        }
    }

    let as_of = cli.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let result = processor.process_expired_as_of(as_of).await.into_diagnostic()?;

    info!("{}", result.summary());
    if result.has_errors() {
        warn!("{}", result.detailed_summary());
    }
    if result.has_processed_items() && result.success_rate() < SUCCESS_RATE_WARN_THRESHOLD {
        warn!(
            success_rate = result.success_rate(),
            "expiry success rate below threshold"
        );
    }

    // Output final ledger state
    let coupons = ledger.find_all().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = CouponWriter::new(stdout.lock());
    writer.write_coupons(coupons).into_diagnostic()?;

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn stores(cli: &Cli) -> Result<(DynLedgerStore, DynJobLogStore)> {
    if let Some(db_path) = &cli.db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        let ledger: DynLedgerStore = Arc::new(store.clone());
        let job_logs: DynJobLogStore = Arc::new(store);
        return Ok((ledger, job_logs));
    }
    Ok(memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn stores(_cli: &Cli) -> Result<(DynLedgerStore, DynJobLogStore)> {
    Ok(memory_stores())
}

fn memory_stores() -> (DynLedgerStore, DynJobLogStore) {
    let ledger: DynLedgerStore = Arc::new(InMemoryLedgerStore::new());
    let job_logs: DynJobLogStore = Arc::new(InMemoryJobLogStore::new());
    (ledger, job_logs)
}
