//! Cached profile of the signed-in account.
//!
//! Every successful change is written to local storage under
//! [`SESSION_STORAGE_KEY`]; loading falls back to a signed-out state when the
//! entry is missing or unreadable. No expiry is applied: the cached session
//! stays valid until an explicit logout, whatever the remote credential does.

use aasrah_shared::constants::SESSION_STORAGE_KEY;
use aasrah_shared::{User, UserPatch};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::local_storage::LocalStorage;

/// Serialized shape of the session entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub current_user: Option<User>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct SessionCache {
    storage: LocalStorage,
    state: SessionState,
}

impl SessionCache {
    /// Restore the session from local storage.
    pub fn load(storage: LocalStorage) -> Self {
        let state = match storage.get_json::<SessionState>(SESSION_STORAGE_KEY) {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::default(),
            Err(e) => {
                warn!(error = %e, "Unreadable session entry, starting signed out");
                SessionState::default()
            }
        };
        debug!(authenticated = state.is_authenticated, "Session loaded");
        Self { storage, state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated && self.state.current_user.is_some()
    }

    pub fn login_start(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    /// Record a successful sign-in and persist it.
    pub fn set_user(&mut self, user: User) -> Result<()> {
        self.state = SessionState {
            current_user: Some(user),
            is_authenticated: true,
            loading: false,
            error: None,
        };
        self.persist()
    }

    /// Record a failed sign-in. The session is signed out, keeping only the
    /// error, and the persisted entry is removed.
    pub fn login_failure(&mut self, message: impl Into<String>) -> Result<()> {
        self.state = SessionState {
            error: Some(message.into()),
            ..SessionState::default()
        };
        self.storage.remove_item(SESSION_STORAGE_KEY)?;
        Ok(())
    }

    /// Merge a partial profile into the current user. Returns `false` (and
    /// changes nothing) when signed out.
    pub fn update_user(&mut self, patch: UserPatch) -> Result<bool> {
        let Some(user) = self.state.current_user.as_mut() else {
            return Ok(false);
        };
        user.apply(patch);
        self.persist()?;
        Ok(true)
    }

    /// Sign out locally. The in-memory state is reset even when removing the
    /// persisted entry fails.
    pub fn clear(&mut self) -> Result<()> {
        self.state = SessionState::default();
        self.storage.remove_item(SESSION_STORAGE_KEY)?;
        Ok(())
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    fn persist(&self) -> Result<()> {
        self.storage.set_json(SESSION_STORAGE_KEY, &self.state)
    }
}
