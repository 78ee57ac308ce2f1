//! Email/password accounts through the Identity Toolkit REST API.
//!
//! The signed-in account and its credential live in memory; the client
//! persists them through [`AuthService::current_user`] and hands them back
//! with [`AuthService::restore`] at start-up. Id tokens are refreshed through
//! the Secure Token API shortly before they expire; the hook registered with
//! [`FirebaseAuth::on_refresh`] sees every refreshed account so it can be
//! persisted again.

use std::sync::Mutex;

use aasrah_shared::{AuthService, AuthUser, Credential, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{check, invalid, network, FirebaseConfig};

/// Refresh this many seconds before the id token expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

fn expires_at(expires_in: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let secs = expires_in.trim().parse::<i64>().unwrap_or_else(|_| {
        warn!(value = expires_in, "Unparseable expiresIn, assuming one hour");
        3600
    });
    now + chrono::Duration::seconds(secs)
}

/// Provider rejections during sign-in/up are authentication errors.
fn auth_error(e: ServiceError) -> ServiceError {
    match e {
        ServiceError::Rejected { status, message } if status < 500 => ServiceError::Auth(message),
        other => other,
    }
}

type RefreshHook = Box<dyn Fn(&AuthUser) + Send + Sync>;

pub struct FirebaseAuth {
    http: reqwest::Client,
    config: FirebaseConfig,
    current: Mutex<Option<AuthUser>>,
    refresh_lock: tokio::sync::Mutex<()>,
    on_refresh: Option<RefreshHook>,
}

impl FirebaseAuth {
    pub fn new(http: reqwest::Client, config: FirebaseConfig) -> Self {
        Self {
            http,
            config,
            current: Mutex::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
            on_refresh: None,
        }
    }

    /// Called with the signed-in account after each token refresh.
    pub fn on_refresh(mut self, hook: impl Fn(&AuthUser) + Send + Sync + 'static) -> Self {
        self.on_refresh = Some(Box::new(hook));
        self
    }

    /// Swap in a refreshed credential and hand the account to the hook.
    /// Returns `None` when the account was signed out meanwhile.
    fn store_refreshed(&self, fresh: Credential) -> Option<AuthUser> {
        let updated = self.current.lock().ok().and_then(|mut guard| {
            let user = guard.as_mut()?;
            user.credential = Some(fresh);
            Some(user.clone())
        })?;
        if let Some(hook) = &self.on_refresh {
            hook(&updated);
        }
        Some(updated)
    }

    fn set_current(&self, user: Option<AuthUser>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = user;
        }
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ServiceError> {
        let url = format!(
            "{}/accounts:{endpoint}",
            self.config.identity_url.trim_end_matches('/')
        );
        let resp = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(network)?;
        let resp = check(resp).await.map_err(auth_error)?;
        let body: PasswordResponse = resp.json().await.map_err(invalid)?;

        let user = AuthUser {
            uid: body.local_id,
            email: body.email,
            credential: Some(Credential {
                id_token: body.id_token,
                refresh_token: body.refresh_token,
                expires_at: expires_at(&body.expires_in, Utc::now()),
            }),
        };
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    /// Bearer token for data requests, refreshed when close to expiry.
    pub async fn id_token(&self) -> Result<String, ServiceError> {
        let credential = self
            .current_user()
            .and_then(|u| u.credential)
            .ok_or(ServiceError::NotSignedIn)?;
        if !credential.is_expired(Utc::now(), EXPIRY_MARGIN_SECS) {
            return Ok(credential.id_token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        let credential = self
            .current_user()
            .and_then(|u| u.credential)
            .ok_or(ServiceError::NotSignedIn)?;
        if !credential.is_expired(Utc::now(), EXPIRY_MARGIN_SECS) {
            return Ok(credential.id_token);
        }

        let fresh = self.refresh(&credential.refresh_token).await?;
        let token = fresh.id_token.clone();
        if self.store_refreshed(fresh).is_none() {
            debug!("Signed out during token refresh");
        }
        Ok(token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, ServiceError> {
        debug!("Refreshing id token");
        let url = format!("{}/token", self.config.token_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(network)?;
        let resp = check(resp).await.map_err(auth_error)?;
        let body: RefreshResponse = resp.json().await.map_err(invalid)?;

        Ok(Credential {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expires_at(&body.expires_in, Utc::now()),
        })
    }
}

#[async_trait]
impl AuthService for FirebaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ServiceError> {
        let user = self.password_call("signUp", email, password).await?;
        info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ServiceError> {
        let user = self.password_call("signInWithPassword", email, password).await?;
        info!(uid = %user.uid, "Signed in");
        Ok(user)
    }

    // Tokens are bearer-only; signing out drops them locally.
    async fn sign_out(&self) -> Result<(), ServiceError> {
        self.set_current(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    fn restore(&self, user: AuthUser) {
        debug!(uid = %user.uid, "Restoring persisted sign-in");
        self.set_current(Some(user));
    }
}
