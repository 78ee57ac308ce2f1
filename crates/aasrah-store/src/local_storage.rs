//! String key/value persistence with browser local-storage semantics.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::{lock, Database, SharedDatabase};
use crate::error::Result;

impl Database {
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

/// Cloneable handle over the `local_storage` table.
#[derive(Clone)]
pub struct LocalStorage {
    db: SharedDatabase,
}

impl LocalStorage {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        lock(&self.db)?.get_item(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.db)?.set_item(key, value)
    }

    pub fn remove_item(&self, key: &str) -> Result<bool> {
        lock(&self.db)?.remove_item(key)
    }

    /// Read and deserialize `key`. A value that fails to parse is an error.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw)
    }

    /// Read-modify-write of a JSON value under one lock acquisition.
    /// A missing key starts from `T::default()`.
    pub fn modify_json<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Default + Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> R,
    {
        let db = lock(&self.db)?;
        let mut value: T = match db.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => T::default(),
        };
        let out = f(&mut value);
        db.set_item(key, &serde_json::to_string(&value)?)?;
        Ok(out)
    }
}
