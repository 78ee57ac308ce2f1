//! Application context shared by every command and view.
//!
//! Replaces a process-global session: the views receive an `Arc<AppState>`
//! and reach the external collaborators only through the injected service
//! traits.

use std::sync::{Arc, Mutex};

use aasrah_shared::constants::AUTH_STORAGE_KEY;
use aasrah_shared::{
    AuthService, AuthUser, Geocoder, LocationProvider, ObjectStore, ReportStore, Role, User,
};
use aasrah_store::{LocalStorage, SessionCache, SessionState, StoreError};
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use crate::events::{EventBus, Toast};
use crate::poller::{PollerHandle, ReportPoller};

/// The external collaborators, as trait objects.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub reports: Arc<dyn ReportStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub locator: Arc<dyn LocationProvider>,
}

pub struct AppState {
    pub services: Services,
    pub storage: LocalStorage,
    pub events: EventBus,
    pub config: ClientConfig,
    session: Mutex<SessionCache>,
    /// Present while the NGO dashboard is mounted.
    poller: Mutex<Option<PollerHandle>>,
}

impl AppState {
    /// Load the cached session and re-establish the persisted hosted-auth
    /// sign-in, if any.
    pub fn new(services: Services, storage: LocalStorage, config: ClientConfig) -> Self {
        match storage.get_json::<AuthUser>(AUTH_STORAGE_KEY) {
            Ok(Some(user)) => services.auth.restore(user),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Unreadable auth entry, ignoring"),
        }

        let session = SessionCache::load(storage.clone());
        Self {
            services,
            events: EventBus::new(),
            config,
            session: Mutex::new(session),
            poller: Mutex::new(None),
            storage,
        }
    }

    pub fn with_session<R>(&self, f: impl FnOnce(&mut SessionCache) -> R) -> Result<R> {
        let mut session = self.session.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut session))
    }

    pub fn session_state(&self) -> SessionState {
        self.with_session(|s| s.state().clone()).unwrap_or_default()
    }

    /// The signed-in profile, if the session is authenticated.
    pub fn current_user(&self) -> Option<User> {
        self.with_session(|s| {
            if s.is_authenticated() {
                s.current_user().cloned()
            } else {
                None
            }
        })
        .ok()
        .flatten()
    }

    /// Admins by role, or by membership in the configured admin email list.
    pub fn is_admin(&self, user: &User) -> bool {
        user.role == Role::Admin || self.config.is_admin_email(&user.email)
    }

    /// Persist the auth provider's current sign-in so a restart can restore it.
    pub fn persist_auth(&self) -> Result<()> {
        if let Some(user) = self.services.auth.current_user() {
            self.storage.set_json(AUTH_STORAGE_KEY, &user)?;
        }
        Ok(())
    }

    pub fn forget_auth(&self) -> Result<()> {
        self.storage.remove_item(AUTH_STORAGE_KEY)?;
        Ok(())
    }

    /// Mount the report poller, or return the one already running.
    pub fn start_poller(&self) -> Result<Arc<ReportPoller>> {
        let mut slot = self.poller.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(handle) = slot.as_ref() {
            return Ok(handle.poller().clone());
        }
        let poller = Arc::new(ReportPoller::new(
            self.services.reports.clone(),
            self.events.clone(),
        ));
        *slot = Some(PollerHandle::spawn(poller.clone(), self.config.poll_interval));
        Ok(poller)
    }

    /// Unmount the poller; its timer is cancelled.
    pub fn stop_poller(&self) {
        if let Ok(mut slot) = self.poller.lock() {
            if slot.take().is_some() {
                debug!("Poller unmounted");
            }
        }
    }

    pub fn poller(&self) -> Option<Arc<ReportPoller>> {
        self.poller
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|h| h.poller().clone()))
    }

    /// Log a failure caught at an operation boundary and surface it.
    pub fn fail(&self, title: &str, err: &AppError) {
        error!(title, error = %err, "Operation failed");
        self.events.toast(Toast::error(title, err.to_string()));
    }
}
