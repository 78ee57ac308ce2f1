//! In-crate fakes of the service traits with call counters and scripted
//! failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aasrah_shared::{
    AuthService, AuthUser, Coordinates, Geocoder, LocationProvider, NewReport, ObjectStore,
    Report, ReportFilter, ReportId, ReportStatus, ReportStore, ServiceError, StatusUpdate,
};
use aasrah_store::{Database, LocalStorage};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::events::{AppEvent, Toast};
use crate::state::{AppState, Services};

pub fn report(id: &str, status: ReportStatus) -> Report {
    NewReport {
        description: format!("Report {id}"),
        animal_type: Some("dog".into()),
        location: "MG Road".into(),
        coordinates: None,
        image: None,
        date: Utc::now(),
        created_at: Utc::now(),
        status,
        user_id: "u1".into(),
        user_email: "asha@example.com".into(),
    }
    .into_report(ReportId::from(id))
}

#[derive(Default)]
pub struct FakeReports {
    reports: Mutex<Vec<Report>>,
    updates: Mutex<Vec<(ReportId, StatusUpdate)>>,
    queries: AtomicUsize,
    creates: AtomicUsize,
    fail_queries: AtomicBool,
    fail_create: AtomicBool,
    fail_updates: AtomicBool,
}

impl FakeReports {
    pub fn insert(&self, report: Report) {
        self.reports.lock().unwrap().push(report);
    }

    pub fn all(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(ReportId, StatusUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReportStore for FakeReports {
    async fn query(&self, filter: &ReportFilter) -> Result<Vec<Report>, ServiceError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ServiceError::Network("connection reset".into()));
        }
        Ok(self
            .all()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    async fn create(&self, report: &NewReport) -> Result<ReportId, ServiceError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ServiceError::Rejected {
                status: 503,
                message: "unavailable".into(),
            });
        }
        let id = ReportId(format!("r{}", self.creates.load(Ordering::SeqCst)));
        self.insert(report.clone().into_report(id.clone()));
        Ok(id)
    }

    async fn update_status(
        &self,
        id: &ReportId,
        update: &StatusUpdate,
    ) -> Result<(), ServiceError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ServiceError::Network("timeout".into()));
        }
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        report.apply_status(update);
        self.updates.lock().unwrap().push((id.clone(), update.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAuth {
    accounts: Mutex<HashMap<String, (String, String)>>,
    current: Mutex<Option<AuthUser>>,
    calls: AtomicUsize,
    fail_sign_out: AtomicBool,
}

impl FakeAuth {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(ServiceError::Auth("EMAIL_EXISTS".into()));
        }
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (uid.clone(), password.to_string()));
        let user = AuthUser {
            uid,
            email: email.to_string(),
            credential: None,
        };
        *self.current.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((uid, pw)) if pw == password => {
                let user = AuthUser {
                    uid: uid.clone(),
                    email: email.to_string(),
                    credential: None,
                };
                *self.current.lock().unwrap() = Some(user.clone());
                Ok(user)
            }
            _ => Err(ServiceError::Auth("INVALID_LOGIN_CREDENTIALS".into())),
        }
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap() = None;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ServiceError::Network("offline".into()));
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().unwrap().clone()
    }

    fn restore(&self, user: AuthUser) {
        *self.current.lock().unwrap() = Some(user);
    }
}

#[derive(Default)]
pub struct FakeObjects {
    uploads: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl FakeObjects {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for FakeObjects {
    async fn upload(
        &self,
        key: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> Result<String, ServiceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage("quota exceeded".into()));
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(format!("https://objects.test/{key}"))
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    address: Mutex<Option<String>>,
}

impl FakeGeocoder {
    pub fn answer(&self, address: Option<&str>) {
        *self.address.lock().unwrap() = address.map(str::to_string);
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn reverse(&self, _at: Coordinates) -> Result<String, ServiceError> {
        self.address
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ServiceError::Network("dns failure".into()))
    }
}

#[derive(Default)]
pub struct FakeLocator {
    position: Mutex<Option<Result<Coordinates, ServiceError>>>,
}

impl FakeLocator {
    pub fn answer(&self, position: Result<Coordinates, ServiceError>) {
        *self.position.lock().unwrap() = Some(position);
    }
}

#[async_trait]
impl LocationProvider for FakeLocator {
    async fn current_position(&self) -> Result<Coordinates, ServiceError> {
        self.position
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ServiceError::LocationUnavailable("unsupported".into())))
    }
}

pub struct Fakes {
    pub auth: Arc<FakeAuth>,
    pub reports: Arc<FakeReports>,
    pub objects: Arc<FakeObjects>,
    pub geocoder: Arc<FakeGeocoder>,
    pub locator: Arc<FakeLocator>,
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub fakes: Fakes,
    pub events: broadcast::Receiver<AppEvent>,
    pub storage: LocalStorage,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::in_dir(dir)
    }

    /// Open a second application over the same data directory, as after a
    /// restart.
    pub fn reopen(self) -> Self {
        let Harness { state, dir, .. } = self;
        drop(state);
        Self::in_dir(dir)
    }

    fn in_dir(dir: tempfile::TempDir) -> Self {
        let db = Database::open_in(dir.path()).unwrap().into_shared();
        let storage = LocalStorage::new(db);
        let fakes = Fakes {
            auth: Arc::new(FakeAuth::default()),
            reports: Arc::new(FakeReports::default()),
            objects: Arc::new(FakeObjects::default()),
            geocoder: Arc::new(FakeGeocoder::default()),
            locator: Arc::new(FakeLocator::default()),
        };
        let services = Services {
            auth: fakes.auth.clone(),
            reports: fakes.reports.clone(),
            objects: fakes.objects.clone(),
            geocoder: fakes.geocoder.clone(),
            locator: fakes.locator.clone(),
        };
        let state = Arc::new(AppState::new(services, storage.clone(), ClientConfig::default()));
        let events = state.events.subscribe();
        Self {
            state,
            fakes,
            events,
            storage,
            dir,
        }
    }

    pub fn drain(&mut self) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn toasts(&mut self) -> Vec<Toast> {
        self.drain()
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::Toast(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}
