//! Wire the service traits to a concrete backend family.

use std::path::Path;
use std::sync::Arc;

use aasrah_remote::{
    http_client, FirebaseAuth, FirebaseStorage, FirestoreReports, NominatimGeocoder,
};
use aasrah_shared::constants::{AUTH_STORAGE_KEY, MAX_IMAGE_SIZE};
use aasrah_shared::AuthUser;
use aasrah_store::{DemoReportStore, LocalAuth, LocalObjectStore, LocalStorage, SharedDatabase};
use tracing::{info, warn};

use crate::config::{Backend, ClientConfig};
use crate::device::DeviceLocation;
use crate::error::Result;
use crate::state::Services;

pub async fn connect(
    config: &ClientConfig,
    db: SharedDatabase,
    storage: LocalStorage,
    data_dir: &Path,
) -> Result<Services> {
    let http = http_client()?;
    let geocoder = Arc::new(NominatimGeocoder::new(http.clone(), &config.geocoder_url));
    let locator = Arc::new(DeviceLocation::new(config.device_location));

    let services = match config.backend {
        Backend::Firebase => {
            if config.firebase_api_key.is_empty() {
                warn!("FIREBASE_API_KEY is not set; hosted sign-in will be rejected");
            }
            let firebase = config.firebase();
            let auth = Arc::new(
                FirebaseAuth::new(http.clone(), firebase.clone())
                    .on_refresh(persist_refreshed(storage.clone())),
            );
            info!(project = %firebase.project_id, "Using Firebase backend");
            Services {
                reports: Arc::new(FirestoreReports::new(http.clone(), auth.clone(), &firebase)),
                objects: Arc::new(FirebaseStorage::new(http, auth.clone(), &firebase)),
                auth,
                geocoder,
                locator,
            }
        }
        Backend::Local => {
            let objects = LocalObjectStore::new(data_dir.join("images"), MAX_IMAGE_SIZE).await?;
            info!(dir = %data_dir.display(), "Using local demo backend");
            Services {
                auth: Arc::new(LocalAuth::new(db)),
                reports: Arc::new(DemoReportStore::new(storage)),
                objects: Arc::new(objects),
                geocoder,
                locator,
            }
        }
    };
    Ok(services)
}

/// Keep the persisted sign-in in step with refreshed tokens.
fn persist_refreshed(storage: LocalStorage) -> impl Fn(&AuthUser) + Send + Sync + 'static {
    move |user| {
        if let Err(e) = storage.set_json(AUTH_STORAGE_KEY, user) {
            warn!(error = %e, "Failed to persist refreshed credential");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aasrah_shared::Credential;
    use aasrah_store::Database;
    use chrono::Utc;

    #[test]
    fn test_refreshed_credential_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(Database::open_in(dir.path()).unwrap().into_shared());
        let user = AuthUser {
            uid: "u1".into(),
            email: "asha@example.com".into(),
            credential: Some(Credential {
                id_token: "fresh".into(),
                refresh_token: "r2".into(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
            }),
        };

        persist_refreshed(storage.clone())(&user);
        assert_eq!(
            storage.get_json::<AuthUser>(AUTH_STORAGE_KEY).unwrap(),
            Some(user)
        );
    }
}
