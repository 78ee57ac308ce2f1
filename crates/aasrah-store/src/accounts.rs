//! Local account registry standing in for the hosted auth provider when the
//! client runs against the demo backend.
//!
//! Passwords are stored as `BLAKE3(salt || password)` with a random 16-byte
//! salt. Error codes mirror the hosted provider's so the client surfaces
//! them the same way.

use std::sync::Mutex;

use aasrah_shared::{AuthService, AuthUser, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::database::{lock, Database, SharedDatabase};
use crate::error::Result;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    salt: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl Database {
    fn insert_account(&self, account: &Account) -> Result<()> {
        self.conn().execute(
            "INSERT INTO accounts (uid, email, salt, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.uid,
                account.email,
                account.salt,
                account.password_hash,
                account.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn find_account(&self, email: &str) -> Result<Option<Account>> {
        let account = self
            .conn()
            .query_row(
                "SELECT uid, email, salt, password_hash, created_at FROM accounts WHERE email = ?1",
                params![email],
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }
}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let created_str: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Account {
        uid: row.get(0)?,
        email: row.get(1)?,
        salt: row.get(2)?,
        password_hash: row.get(3)?,
        created_at,
    })
}

fn digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub struct LocalAuth {
    db: SharedDatabase,
    current: Mutex<Option<AuthUser>>,
}

impl LocalAuth {
    pub fn new(db: SharedDatabase) -> Self {
        Self {
            db,
            current: Mutex::new(None),
        }
    }

    fn set_current(&self, user: Option<AuthUser>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = user;
        }
    }
}

#[async_trait]
impl AuthService for LocalAuth {
    async fn sign_up(&self, email: &str, password: &str) -> std::result::Result<AuthUser, ServiceError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::Auth(
                "WEAK_PASSWORD : Password should be at least 6 characters".to_string(),
            ));
        }

        let email = normalize(email);
        let salt = hex::encode(rand::random::<[u8; 16]>());
        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.clone(),
            password_hash: digest(&salt, password),
            salt,
            created_at: Utc::now(),
        };

        {
            let db = lock(&self.db)?;
            if db.find_account(&email)?.is_some() {
                return Err(ServiceError::Auth("EMAIL_EXISTS".to_string()));
            }
            db.insert_account(&account)?;
        }

        info!(uid = %account.uid, "Local account created");

        let user = AuthUser {
            uid: account.uid,
            email: account.email,
            credential: None,
        };
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> std::result::Result<AuthUser, ServiceError> {
        let email = normalize(email);
        let account = lock(&self.db)?.find_account(&email)?;

        let account = match account {
            Some(a) if digest(&a.salt, password) == a.password_hash => a,
            _ => return Err(ServiceError::Auth("INVALID_LOGIN_CREDENTIALS".to_string())),
        };

        tracing::debug!(uid = %account.uid, since = %account.created_at, "Local sign-in");

        let user = AuthUser {
            uid: account.uid,
            email: account.email,
            credential: None,
        };
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> std::result::Result<(), ServiceError> {
        self.set_current(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    fn restore(&self, user: AuthUser) {
        self.set_current(Some(user));
    }
}
