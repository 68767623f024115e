//! Persistent watch list.
//!
//! SQLite-backed store for the wallets being watched and the Telegram
//! chats receiving alerts. The store survives restarts; the coordinator
//! re-subscribes every stored wallet at startup.

use crate::errors::WatchError;
use crate::logger::{log, LogTag};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;

/// Upper bound on wallets accepted from a single add command.
pub const MAX_WALLETS_PER_INPUT: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct WatchedWallet {
    pub address: String,
    pub label: Option<String>,
    pub created_at: String,
}

pub struct WatchlistStore {
    conn: Mutex<Connection>,
}

impl WatchlistStore {
    pub fn open(path: &Path) -> Result<Self, WatchError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        log(
            LogTag::Db,
            "OPENED",
            &format!("watch list at {}", path.display()),
        );
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, WatchError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), WatchError> {
        let conn = self.conn.lock();

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(10_000))?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS wallets (
                address TEXT PRIMARY KEY,
                label TEXT,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                chat_id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }

    /// Add a wallet. Returns false when it was already stored.
    pub fn add_wallet(&self, address: &str, label: Option<&str>) -> Result<bool, WatchError> {
        let inserted = self.conn.lock().execute(
            "INSERT OR IGNORE INTO wallets (address, label, created_at) VALUES (?1, ?2, ?3)",
            params![address, label, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub fn remove_wallet(&self, address: &str) -> Result<bool, WatchError> {
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM wallets WHERE address = ?1", params![address])?;
        Ok(removed > 0)
    }

    pub fn list_wallets(&self) -> Result<Vec<WatchedWallet>, WatchError> {
        let conn = self.conn.lock();
        let mut statement =
            conn.prepare("SELECT address, label, created_at FROM wallets ORDER BY created_at")?;

        let wallets = statement
            .query_map([], |row| {
                Ok(WatchedWallet {
                    address: row.get(0)?,
                    label: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(wallets)
    }

    pub fn add_subscriber(&self, chat_id: i64) -> Result<bool, WatchError> {
        let inserted = self.conn.lock().execute(
            "INSERT OR IGNORE INTO subscribers (chat_id, created_at) VALUES (?1, ?2)",
            params![chat_id, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub fn remove_subscriber(&self, chat_id: i64) -> Result<bool, WatchError> {
        let removed = self.conn.lock().execute(
            "DELETE FROM subscribers WHERE chat_id = ?1",
            params![chat_id],
        )?;
        Ok(removed > 0)
    }

    pub fn subscriber_chat_ids(&self) -> Result<Vec<i64>, WatchError> {
        let conn = self.conn.lock();
        let mut statement = conn.prepare("SELECT chat_id FROM subscribers ORDER BY chat_id")?;

        let ids = statement
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }
}

/// Parse free-form wallet input: whitespace, comma or semicolon
/// separated addresses, validated as base58 public keys and
/// deduplicated in input order. Invalid entries are reported alongside
/// the accepted ones.
pub fn parse_wallet_input(input: &str) -> (Vec<String>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for candidate in input.split(|c: char| c.is_whitespace() || c == ',' || c == ';') {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        if accepted.len() >= MAX_WALLETS_PER_INPUT {
            rejected.push(candidate.to_string());
            continue;
        }
        if accepted.iter().any(|a| a == candidate) {
            continue;
        }

        match Pubkey::from_str(candidate) {
            Ok(_) => accepted.push(candidate.to_string()),
            Err(_) => rejected.push(candidate.to_string()),
        }
    }

    (accepted, rejected)
}
