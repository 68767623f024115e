use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use swapwatch::arguments;
use swapwatch::config::Config;
use swapwatch::logger::{self, log, LogTag};
use swapwatch::rpc::{self, RpcClient};
use swapwatch::telegram::TelegramNotifier;
use swapwatch::tokens::MetadataResolver;
use swapwatch::watcher::{WatchCoordinator, WebSocketLogSource};
use swapwatch::watchlist::{parse_wallet_input, WatchlistStore};
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> Result<()> {
    arguments::init();
    logger::header("SwapWatch");

    let config = Config::load(arguments::config_path())?;

    let store = Arc::new(
        WatchlistStore::open(Path::new(&config.database.path))
            .context("failed to open watch-list store")?,
    );

    // Wallets listed in the config are merged into the persistent
    // store, so a one-time config entry survives restarts.
    let (configured_wallets, invalid) = parse_wallet_input(&config.watch.wallets.join("\n"));
    for wallet in &invalid {
        log(
            LogTag::Config,
            "INVALID_WALLET",
            &format!("skipping {}", wallet),
        );
    }
    for wallet in &configured_wallets {
        store
            .add_wallet(wallet, None)
            .context("failed to store configured wallet")?;
    }

    let mut chat_ids = config.telegram.chat_ids.clone();
    for chat_id in store
        .subscriber_chat_ids()
        .context("failed to load subscribers")?
    {
        if !chat_ids.contains(&chat_id) {
            chat_ids.push(chat_id);
        }
    }

    let notifier = Arc::new(
        TelegramNotifier::new(&config.telegram.bot_token, &chat_ids)
            .context("failed to initialize Telegram notifier")?,
    );

    let rpc = Arc::new(RpcClient::new(&config.rpc_url, &config.rpc_fallbacks));
    let resolver = Arc::new(MetadataResolver::new(
        Arc::clone(&rpc),
        config.metadata.cache_capacity,
    ));
    let log_source = Arc::new(WebSocketLogSource::new(config.ws_url.clone()));

    let coordinator = Arc::new(WatchCoordinator::new(
        log_source,
        Arc::clone(&rpc) as Arc<dyn swapwatch::rpc::TransactionSource>,
        Arc::clone(&resolver) as Arc<dyn swapwatch::tokens::TokenResolver>,
        notifier,
        config.watch.quote_mints.clone(),
        config.watch.max_pipelines_per_wallet,
    ));

    let wallets = store.list_wallets().context("failed to list wallets")?;
    if wallets.is_empty() {
        log(
            LogTag::System,
            "IDLE",
            "no wallets in the watch list; add some via config watch.wallets",
        );
    }

    for wallet in &wallets {
        match coordinator.track(&wallet.address) {
            Ok(_) => match rpc.get_balance(&wallet.address).await {
                Ok(lamports) => log(
                    LogTag::Watcher,
                    "BALANCE",
                    &format!(
                        "{} holds {:.4} SOL",
                        logger::short_address(&wallet.address),
                        rpc::lamports_to_sol(lamports)
                    ),
                ),
                Err(e) => log(
                    LogTag::Watcher,
                    "BALANCE_FAILED",
                    &format!("{}: {}", logger::short_address(&wallet.address), e),
                ),
            },
            Err(e) => log(LogTag::Watcher, "TRACK_FAILED", &e.to_string()),
        }
    }

    log(
        LogTag::System,
        "READY",
        &format!(
            "watching {} wallet(s), alerting {} chat(s)",
            coordinator.tracked_wallets().len(),
            chat_ids.len()
        ),
    );

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            shutdown.notify_waiters();
        })
        .context("failed to install signal handler")?;
    }

    shutdown.notified().await;

    log(LogTag::System, "SHUTDOWN", "stopping subscriptions");
    coordinator.stop_all();
    log(
        LogTag::Tokens,
        "CACHE",
        &format!("{} metadata entr(ies) resolved this run", resolver.cached_entries()),
    );
    log(LogTag::System, "EXIT", "goodbye");

    Ok(())
}
