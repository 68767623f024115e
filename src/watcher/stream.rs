//! Real-time log subscription per watched wallet.
//!
//! One WebSocket connection per wallet, subscribed with `logsSubscribe`
//! mentioning the wallet at confirmed commitment. The subscription task
//! runs until shutdown is signalled and reconnects on any stream error
//! after a fixed delay; missed transactions during the gap are not
//! replayed.

use crate::errors::WatchError;
use crate::logger::{log, short_address, LogTag};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::{connect_async, tungstenite::Message};

const RECONNECT_DELAY_SECS: u64 = 5;

/// One confirmed transaction that mentioned the wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub signature: String,
    pub logs: Vec<String>,
}

/// Source of per-wallet log events. The implementation owns its
/// connection lifecycle; `subscribe` returns only on shutdown or an
/// unrecoverable setup failure.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn subscribe(
        &self,
        wallet: &str,
        events: mpsc::UnboundedSender<LogEvent>,
        shutdown: Arc<Notify>,
    ) -> Result<(), WatchError>;
}

#[derive(Serialize)]
struct LogsSubscribeRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: Vec<serde_json::Value>,
}

impl LogsSubscribeRequest {
    fn for_wallet(wallet: &str) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "logsSubscribe",
            params: vec![
                serde_json::json!({ "mentions": [wallet] }),
                serde_json::json!({ "commitment": "confirmed" }),
            ],
        }
    }
}

#[derive(Deserialize)]
struct LogsNotification {
    method: Option<String>,
    params: Option<LogsNotificationParams>,
}

#[derive(Deserialize)]
struct LogsNotificationParams {
    result: Option<LogsNotificationResult>,
}

#[derive(Deserialize)]
struct LogsNotificationResult {
    value: Option<LogsNotificationValue>,
}

#[derive(Deserialize)]
struct LogsNotificationValue {
    signature: Option<String>,
    #[serde(default)]
    logs: Option<Vec<String>>,
    #[serde(default)]
    err: Option<serde_json::Value>,
}

pub struct WebSocketLogSource {
    ws_url: String,
}

impl WebSocketLogSource {
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    /// One connection lifetime: connect, subscribe, pump notifications
    /// until the stream ends or shutdown fires. Returns true when
    /// shutdown was the reason for exit.
    async fn run_connection(
        &self,
        wallet: &str,
        events: &mpsc::UnboundedSender<LogEvent>,
        shutdown: &Notify,
    ) -> Result<bool, WatchError> {
        let (ws_stream, _) = connect_async(&self.ws_url).await.map_err(|e| {
            WatchError::Subscription {
                wallet: wallet.to_string(),
                message: format!("connect failed: {}", e),
            }
        })?;

        let (mut sender, mut receiver) = ws_stream.split();

        let request = LogsSubscribeRequest::for_wallet(wallet);
        let request_text =
            serde_json::to_string(&request).map_err(|e| WatchError::Subscription {
                wallet: wallet.to_string(),
                message: format!("subscription encode failed: {}", e),
            })?;

        sender
            .send(Message::Text(request_text))
            .await
            .map_err(|e| WatchError::Subscription {
                wallet: wallet.to_string(),
                message: format!("subscribe send failed: {}", e),
            })?;

        log(
            LogTag::Stream,
            "SUBSCRIBED",
            &format!("logs for {} at confirmed commitment", short_address(wallet)),
        );

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    let _ = sender.send(Message::Close(None)).await;
                    return Ok(true);
                }
                message = receiver.next() => {
                    let message = match message {
                        Some(Ok(m)) => m,
                        Some(Err(e)) => {
                            log(
                                LogTag::Stream,
                                "STREAM_ERROR",
                                &format!("{}: {}", short_address(wallet), e),
                            );
                            return Ok(false);
                        }
                        None => return Ok(false),
                    };

                    match message {
                        Message::Text(text) => {
                            if let Some(event) = parse_notification(&text) {
                                if events.send(event).is_err() {
                                    // Receiver dropped: the wallet was untracked.
                                    return Ok(true);
                                }
                            }
                        }
                        Message::Ping(payload) => {
                            let _ = sender.send(Message::Pong(payload)).await;
                        }
                        Message::Close(_) => return Ok(false),
                        _ => {}
                    }
                }
            }
        }
    }
}

/// Extract a `LogEvent` from one frame. Subscription confirmations,
/// keep-alives and failed transactions all map to `None`.
fn parse_notification(text: &str) -> Option<LogEvent> {
    let notification: LogsNotification = serde_json::from_str(text).ok()?;

    if notification.method.as_deref() != Some("logsNotification") {
        return None;
    }

    let value = notification.params?.result?.value?;
    if value.err.is_some() {
        return None;
    }

    Some(LogEvent {
        signature: value.signature?,
        logs: value.logs.unwrap_or_default(),
    })
}

#[async_trait]
impl LogSource for WebSocketLogSource {
    async fn subscribe(
        &self,
        wallet: &str,
        events: mpsc::UnboundedSender<LogEvent>,
        shutdown: Arc<Notify>,
    ) -> Result<(), WatchError> {
        loop {
            match self.run_connection(wallet, &events, &shutdown).await {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    log(
                        LogTag::Stream,
                        "RECONNECT",
                        &format!(
                            "{}: stream ended, retrying in {}s",
                            short_address(wallet),
                            RECONNECT_DELAY_SECS
                        ),
                    );
                }
                Err(e) => {
                    log(
                        LogTag::Stream,
                        "CONNECT_FAILED",
                        &format!("{}: {}, retrying in {}s", short_address(wallet), e, RECONNECT_DELAY_SECS),
                    );
                }
            }

            tokio::select! {
                _ = shutdown.notified() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)) => {}
            }
        }
    }
}
