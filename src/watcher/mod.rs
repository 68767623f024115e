// ===== WALLET WATCHING =====
//
// The coordinator owns one subscription and one processing worker per
// tracked wallet. Processing failures are logged and dropped; nothing
// in a single wallet's pipeline can take the monitor down or stall
// another wallet.

pub mod stream;

pub use stream::{LogEvent, LogSource, WebSocketLogSource};

use crate::errors::WatchError;
use crate::logger::{self, log, LogTag};
use crate::platforms;
use crate::rpc::TransactionSource;
use crate::tokens::TokenResolver;
use crate::trades::{self, TradeRecord};
use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify, Semaphore};
use tokio::task::JoinHandle;

/// Delivery seam for reconstructed trades.
#[async_trait]
pub trait TradeSink: Send + Sync {
    async fn deliver(&self, trade: &TradeRecord) -> Result<(), WatchError>;
}

struct TrackedWallet {
    shutdown: Arc<Notify>,
    /// Cleared on untrack so pipelines already past the fetch stage
    /// drop their result instead of notifying for a removed wallet.
    active: Arc<AtomicBool>,
    subscription: JoinHandle<()>,
    worker: JoinHandle<()>,
}

pub struct WatchCoordinator {
    log_source: Arc<dyn LogSource>,
    tx_source: Arc<dyn TransactionSource>,
    resolver: Arc<dyn TokenResolver>,
    sink: Arc<dyn TradeSink>,
    quote_mints: Vec<String>,
    max_pipelines_per_wallet: usize,
    tracked: Mutex<HashMap<String, TrackedWallet>>,
}

impl WatchCoordinator {
    pub fn new(
        log_source: Arc<dyn LogSource>,
        tx_source: Arc<dyn TransactionSource>,
        resolver: Arc<dyn TokenResolver>,
        sink: Arc<dyn TradeSink>,
        quote_mints: Vec<String>,
        max_pipelines_per_wallet: usize,
    ) -> Self {
        Self {
            log_source,
            tx_source,
            resolver,
            sink,
            quote_mints,
            max_pipelines_per_wallet: max_pipelines_per_wallet.max(1),
            tracked: Mutex::new(HashMap::new()),
        }
    }

    /// Start watching a wallet. Tracking an already-watched wallet is a
    /// no-op; the existing subscription keeps running.
    pub fn track(&self, wallet: &str) -> Result<bool, WatchError> {
        Pubkey::from_str(wallet).map_err(|e| WatchError::Subscription {
            wallet: wallet.to_string(),
            message: format!("invalid wallet address: {}", e),
        })?;

        let mut tracked = self.tracked.lock();
        if tracked.contains_key(wallet) {
            logger::debug(LogTag::Watcher, "ALREADY_TRACKED", logger::short_address(wallet));
            return Ok(false);
        }

        let shutdown = Arc::new(Notify::new());
        let active = Arc::new(AtomicBool::new(true));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let subscription = {
            let log_source = Arc::clone(&self.log_source);
            let shutdown = Arc::clone(&shutdown);
            let wallet = wallet.to_string();
            tokio::spawn(async move {
                if let Err(e) = log_source.subscribe(&wallet, event_tx, shutdown).await {
                    log(
                        LogTag::Watcher,
                        "SUBSCRIPTION_LOST",
                        &format!("{}: {}", logger::short_address(&wallet), e),
                    );
                }
            })
        };

        let worker = self.spawn_worker(wallet.to_string(), event_rx, Arc::clone(&active));

        tracked.insert(
            wallet.to_string(),
            TrackedWallet {
                shutdown,
                active,
                subscription,
                worker,
            },
        );

        log(LogTag::Watcher, "TRACKING", logger::short_address(wallet));
        Ok(true)
    }

    /// Stop watching a wallet. Unknown wallets are a no-op.
    pub fn untrack(&self, wallet: &str) -> bool {
        let entry = self.tracked.lock().remove(wallet);

        match entry {
            Some(tracked) => {
                tracked.active.store(false, Ordering::SeqCst);
                tracked.shutdown.notify_waiters();
                tracked.subscription.abort();
                tracked.worker.abort();
                log(LogTag::Watcher, "UNTRACKED", logger::short_address(wallet));
                true
            }
            None => false,
        }
    }

    pub fn tracked_wallets(&self) -> Vec<String> {
        let mut wallets: Vec<String> = self.tracked.lock().keys().cloned().collect();
        wallets.sort();
        wallets
    }

    pub fn is_tracked(&self, wallet: &str) -> bool {
        self.tracked.lock().contains_key(wallet)
    }

    /// Stop every subscription. Used at shutdown.
    pub fn stop_all(&self) {
        let wallets = self.tracked_wallets();
        for wallet in wallets {
            self.untrack(&wallet);
        }
    }

    /// Per-wallet worker: drains log events and runs one pipeline per
    /// event, bounded by the per-wallet concurrency limit. The bound
    /// keeps a bursty wallet from monopolizing RPC capacity.
    fn spawn_worker(
        &self,
        wallet: String,
        mut events: mpsc::UnboundedReceiver<LogEvent>,
        active: Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        let tx_source = Arc::clone(&self.tx_source);
        let resolver = Arc::clone(&self.resolver);
        let sink = Arc::clone(&self.sink);
        let quote_mints = self.quote_mints.clone();
        let pipelines = Arc::new(Semaphore::new(self.max_pipelines_per_wallet));

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                // Cheap log prefilter before spending an RPC fetch.
                if !platforms::classify(&event.logs).is_swap {
                    continue;
                }

                let permit = match Arc::clone(&pipelines).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let tx_source = Arc::clone(&tx_source);
                let resolver = Arc::clone(&resolver);
                let sink = Arc::clone(&sink);
                let quote_mints = quote_mints.clone();
                let wallet = wallet.clone();
                let active = Arc::clone(&active);

                tokio::spawn(async move {
                    run_pipeline(
                        &wallet,
                        &event.signature,
                        tx_source.as_ref(),
                        resolver.as_ref(),
                        sink.as_ref(),
                        &quote_mints,
                        &active,
                    )
                    .await;
                    drop(permit);
                });
            }
        })
    }
}

/// Fetch, normalize and deliver one candidate transaction. Every
/// failure mode ends here as a log line.
async fn run_pipeline(
    wallet: &str,
    signature: &str,
    tx_source: &dyn TransactionSource,
    resolver: &dyn TokenResolver,
    sink: &dyn TradeSink,
    quote_mints: &[String],
    active: &AtomicBool,
) {
    let envelope = match tx_source.fetch_transaction(signature).await {
        Ok(Some(envelope)) => envelope,
        Ok(None) => {
            logger::debug(
                LogTag::Watcher,
                "TX_UNAVAILABLE",
                &format!("{} not found after retries", signature),
            );
            return;
        }
        Err(e) => {
            log(
                LogTag::Watcher,
                "FETCH_FAILED",
                &format!("{}: {}", signature, e),
            );
            return;
        }
    };

    let trade = match trades::normalize(&envelope, wallet, resolver, quote_mints).await {
        Some(trade) => trade,
        None => return,
    };

    if !active.load(Ordering::SeqCst) {
        // Wallet was untracked while this pipeline was in flight.
        return;
    }

    log(LogTag::Trade, "DETECTED", &trade.summary());

    if let Err(e) = sink.deliver(&trade).await {
        log(
            LogTag::Watcher,
            "DELIVERY_FAILED",
            &format!("{}: {}", trade.signature, e),
        );
    }
}
