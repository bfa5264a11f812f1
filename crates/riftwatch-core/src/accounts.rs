// ── Saved accounts ──
//
// A JSON array of accounts in one file. Every write replaces the whole
// file through a temp file in the same directory, so a crash mid-write
// leaves the previous version intact. Unknown fields written by other
// tools are kept.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::AccountStoreError;

/// One saved login. Absent optional fields are left out of the file, so
/// an update only overwrites what it carries.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, rename = "riotID", skip_serializing_if = "Option::is_none")]
    pub riot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    /// Blue essence balance.
    #[serde(default, rename = "be", skip_serializing_if = "Option::is_none")]
    pub blue_essence: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("server", &self.server)
            .field("riot_id", &self.riot_id)
            .field("level", &self.level)
            .field("rank", &self.rank)
            .field("blue_essence", &self.blue_essence)
            .finish_non_exhaustive()
    }
}

/// File-backed account list. Writers are serialized so concurrent
/// read-modify-write cycles can't lose an update.
#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every saved account, in file order. A missing file is an empty list.
    pub async fn load_all(&self) -> Result<Vec<Account>, AccountStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AccountStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| self.json_err(source))
    }

    pub async fn get(&self, username: &str) -> Result<Account, AccountStoreError> {
        self.load_all()
            .await?
            .into_iter()
            .find(|a| a.username == username)
            .ok_or_else(|| AccountStoreError::NotFound {
                username: username.to_owned(),
            })
    }

    /// Insert `account`, or merge it into the saved account with the same
    /// username. Fields present in `account` win; the rest are kept.
    pub async fn upsert(&self, account: Account) -> Result<Account, AccountStoreError> {
        if account.username.trim().is_empty() {
            return Err(AccountStoreError::EmptyUsername);
        }
        let _guard = self.write_lock.lock().await;
        let mut accounts = self.load_all().await?;

        let merged = match accounts.iter_mut().find(|a| a.username == account.username) {
            Some(existing) => {
                let merged = merge(existing, &account).map_err(|e| self.json_err(e))?;
                existing.clone_from(&merged);
                debug!(username = %account.username, "updated saved account");
                merged
            }
            None => {
                accounts.push(account.clone());
                debug!(username = %account.username, "added saved account");
                account
            }
        };
        self.persist(&accounts).await?;
        Ok(merged)
    }

    /// Delete the account named `username`. Returns whether one existed.
    pub async fn remove(&self, username: &str) -> Result<bool, AccountStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut accounts = self.load_all().await?;
        let before = accounts.len();
        accounts.retain(|a| a.username != username);
        if accounts.len() == before {
            return Ok(false);
        }
        self.persist(&accounts).await?;
        info!(username, "removed saved account");
        Ok(true)
    }

    async fn persist(&self, accounts: &[Account]) -> Result<(), AccountStoreError> {
        let bytes = serde_json::to_vec_pretty(accounts).map_err(|e| self.json_err(e))?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(io::Error::other)
            .and_then(|r| r)
            .map_err(|source| AccountStoreError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn json_err(&self, source: serde_json::Error) -> AccountStoreError {
        AccountStoreError::Json {
            path: self.path.clone(),
            source,
        }
    }
}

fn merge(existing: &Account, update: &Account) -> Result<Account, serde_json::Error> {
    let mut base = serde_json::to_value(existing)?;
    if let (Value::Object(base), Value::Object(overlay)) = (&mut base, serde_json::to_value(update)?) {
        base.extend(overlay);
    }
    serde_json::from_value(base)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, AccountStore) {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = AccountStore::new(dir.path().join("nested").join("accounts.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let (_dir, store) = store();
        let accounts = store.load_all().await.unwrap_or_else(|e| panic!("{e}"));
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn upsert_merges_by_username() {
        let (_dir, store) = store();
        let mut first = Account::new("main");
        first.password = Some("hunter2".into());
        first.server = Some("EUW".into());
        store.upsert(first).await.unwrap_or_else(|e| panic!("{e}"));

        let mut update = Account::new("main");
        update.level = Some(142);
        let merged = store.upsert(update).await.unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(merged.password.as_deref(), Some("hunter2"));
        assert_eq!(merged.server.as_deref(), Some("EUW"));
        assert_eq!(merged.level, Some(142));
        let all = store.load_all().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn remove_reports_absent_username() {
        let (_dir, store) = store();
        store
            .upsert(Account::new("a"))
            .await
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(store.remove("b").await, Ok(false)));
        assert!(matches!(store.remove("a").await, Ok(true)));
        assert!(matches!(
            store.get("a").await,
            Err(AccountStoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_fields_survive_rewrite() {
        let (_dir, store) = store();
        let path = store.path().to_path_buf();
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))
            .unwrap_or_else(|e| panic!("{e}"));
        std::fs::write(
            &path,
            r#"[{"username":"x","riotID":"X#EUW","be":3000,"notes":"smurf"}]"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let mut update = Account::new("x");
        update.rank = Some("Gold II".into());
        store.upsert(update).await.unwrap_or_else(|e| panic!("{e}"));

        let raw = std::fs::read_to_string(&path).unwrap_or_default();
        assert!(raw.contains("\"notes\": \"smurf\""));
        assert!(raw.contains("\"riotID\": \"X#EUW\""));
        assert!(raw.contains("\"rank\": \"Gold II\""));
    }

    #[tokio::test]
    async fn empty_username_is_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.upsert(Account::new("  ")).await,
            Err(AccountStoreError::EmptyUsername)
        ));
    }

    #[test]
    fn debug_redacts_password() {
        let mut account = Account::new("u");
        account.password = Some("secret-pass".into());
        let debug = format!("{account:?}");
        assert!(!debug.contains("secret-pass"));
        assert!(debug.contains("REDACTED"));
    }
}
