//! Client configuration from environment variables.
//!
//! Everything has a default, so an unconfigured client runs against the
//! local demo backend. Invalid values are logged and the default is kept.

use std::path::PathBuf;
use std::time::Duration;

use aasrah_remote::FirebaseConfig;
use aasrah_shared::constants::{DEFAULT_ADMIN_EMAILS, DEFAULT_GEOCODER_URL, POLL_INTERVAL_SECS};
use aasrah_shared::Coordinates;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Hosted Firebase auth, Firestore and Storage.
    Firebase,
    /// SQLite-backed demo backend; nothing leaves the machine.
    Local,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend: Backend,
    pub firebase_api_key: String,
    pub firebase_project_id: String,
    pub firebase_storage_bucket: String,
    pub geocoder_url: String,
    pub poll_interval: Duration,
    /// `None` selects the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Position reported by the device location provider. `None` means the
    /// device has no geolocation support.
    pub device_location: Option<Coordinates>,
    pub admin_emails: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            firebase_api_key: String::new(),
            firebase_project_id: String::new(),
            firebase_storage_bucket: String::new(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            data_dir: None,
            device_location: None,
            admin_emails: DEFAULT_ADMIN_EMAILS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.firebase_api_key = get("FIREBASE_API_KEY").unwrap_or_default();
        config.firebase_project_id = get("FIREBASE_PROJECT_ID").unwrap_or_default();
        config.firebase_storage_bucket = get("FIREBASE_STORAGE_BUCKET")
            .unwrap_or_else(|| format!("{}.appspot.com", config.firebase_project_id));

        config.backend = match get("AASRAH_BACKEND").as_deref() {
            Some(v) if v.eq_ignore_ascii_case("firebase") => Backend::Firebase,
            Some(v) if v.eq_ignore_ascii_case("local") => Backend::Local,
            other => {
                if let Some(v) = other {
                    warn!(value = v, "Unknown AASRAH_BACKEND, choosing from project id");
                }
                if config.firebase_project_id.is_empty() {
                    Backend::Local
                } else {
                    Backend::Firebase
                }
            }
        };

        if let Some(url) = get("AASRAH_GEOCODER_URL") {
            config.geocoder_url = url;
        }

        if let Some(raw) = get("AASRAH_POLL_INTERVAL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.poll_interval = Duration::from_secs(secs),
                _ => warn!(value = %raw, "Invalid AASRAH_POLL_INTERVAL_SECS, keeping default"),
            }
        }

        config.data_dir = get("AASRAH_DATA_DIR").map(PathBuf::from);

        if let Some(raw) = get("AASRAH_DEVICE_LOCATION") {
            match Coordinates::parse(&raw) {
                Ok(at) => config.device_location = Some(at),
                Err(e) => warn!(error = %e, "Invalid AASRAH_DEVICE_LOCATION, ignoring"),
            }
        }

        if let Some(raw) = get("AASRAH_ADMIN_EMAILS") {
            config.admin_emails = raw
                .split(',')
                .map(|e| e.trim().to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
        }

        config
    }

    pub fn firebase(&self) -> FirebaseConfig {
        FirebaseConfig::new(
            &self.firebase_api_key,
            &self.firebase_project_id,
            &self.firebase_storage_bucket,
        )
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_select_local_backend() {
        let c = config(&[]);
        assert_eq!(c.backend, Backend::Local);
        assert_eq!(c.poll_interval, Duration::from_secs(15));
        assert_eq!(c.geocoder_url, "https://nominatim.openstreetmap.org");
        assert!(c.device_location.is_none());
        assert!(c.is_admin_email("Admin@Aasrah.com"));
    }

    #[test]
    fn test_project_id_selects_firebase() {
        let c = config(&[("FIREBASE_PROJECT_ID", "aasrah-prod"), ("FIREBASE_API_KEY", "k")]);
        assert_eq!(c.backend, Backend::Firebase);
        assert_eq!(c.firebase_storage_bucket, "aasrah-prod.appspot.com");
        assert_eq!(c.firebase().project_id, "aasrah-prod");
    }

    #[test]
    fn test_explicit_backend_wins() {
        let c = config(&[("FIREBASE_PROJECT_ID", "p"), ("AASRAH_BACKEND", "LOCAL")]);
        assert_eq!(c.backend, Backend::Local);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let c = config(&[
            ("AASRAH_POLL_INTERVAL_SECS", "0"),
            ("AASRAH_DEVICE_LOCATION", "north pole"),
        ]);
        assert_eq!(c.poll_interval, Duration::from_secs(15));
        assert!(c.device_location.is_none());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("AASRAH_POLL_INTERVAL_SECS", "5"),
            ("AASRAH_DEVICE_LOCATION", "28.6139,77.2090"),
            ("AASRAH_ADMIN_EMAILS", " Ops@Example.org , "),
            ("AASRAH_DATA_DIR", "/tmp/aasrah"),
        ]);
        assert_eq!(c.poll_interval, Duration::from_secs(5));
        assert_eq!(c.device_location, Some(Coordinates::new(28.6139, 77.209).unwrap()));
        assert_eq!(c.admin_emails, vec!["ops@example.org".to_string()]);
        assert!(!c.is_admin_email("admin@aasrah.com"));
        assert_eq!(c.data_dir, Some(PathBuf::from("/tmp/aasrah")));
    }
}
