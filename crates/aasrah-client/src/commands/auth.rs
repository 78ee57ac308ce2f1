use aasrah_shared::validation::{require, validate_email, validate_password_match};
use aasrah_shared::{Role, User, UserPatch};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::events::Toast;
use crate::router::Route;
use crate::state::AppState;

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    /// Person's name, or the organisation name for NGO accounts.
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub retype_password: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub role: Role,
}

fn validate_registration(form: &RegistrationForm) -> Result<()> {
    validate_password_match(&form.password, &form.retype_password)?;
    require(&form.full_name, "Full name")?;
    validate_email(&form.email)?;
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

/// Record a failed sign-in/up in the session and surface it.
fn auth_failed(state: &AppState, err: AppError) -> AppError {
    match state.with_session(|s| s.login_failure(err.to_string())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Failed to record login failure"),
        Err(e) => warn!(error = %e, "Failed to record login failure"),
    }
    state.fail("Error", &err);
    err
}

/// Create an account and sign it in with `role`. The form is checked locally
/// before any network call.
pub async fn register(state: &AppState, form: RegistrationForm, role: Role) -> Result<User> {
    if let Err(e) = validate_registration(&form) {
        state.fail("Registration Failed", &e);
        return Err(e);
    }

    state.with_session(|s| s.login_start())?;
    let account = match state
        .services
        .auth
        .sign_up(form.email.trim(), &form.password)
        .await
    {
        Ok(account) => account,
        Err(e) => return Err(auth_failed(state, e.into())),
    };

    let user = User {
        id: Some(account.uid),
        full_name: optional(&form.full_name),
        email: account.email,
        phone: optional(&form.phone),
        role,
    };
    state.with_session(|s| s.set_user(user.clone()))??;
    state.persist_auth()?;

    info!(email = %user.email, %role, "Registered");
    state.events.toast(Toast::info(
        "Registration Successful!",
        "Welcome to our platform! Redirecting to dashboard...",
    ));
    state.events.navigate(Route::Dashboard);
    Ok(user)
}

/// Sign in. The role chosen on the form is kept as the session role.
pub async fn login(state: &AppState, form: LoginForm) -> Result<User> {
    let checked = validate_email(&form.email)
        .and_then(|_| require(&form.password, "Password").map(|_| ()));
    if let Err(e) = checked {
        let e = AppError::from(e);
        state.fail("Error", &e);
        return Err(e);
    }

    state.with_session(|s| s.login_start())?;
    let account = match state
        .services
        .auth
        .sign_in(form.email.trim(), &form.password)
        .await
    {
        Ok(account) => account,
        Err(e) => return Err(auth_failed(state, e.into())),
    };

    let user = User {
        id: Some(account.uid),
        full_name: None,
        email: account.email,
        phone: None,
        role: form.role,
    };
    state.with_session(|s| s.set_user(user.clone()))??;
    state.persist_auth()?;

    info!(email = %user.email, role = %user.role, "Logged in");
    state.events.toast(Toast::info(
        "Login Successful!",
        "Welcome back! Redirecting to dashboard...",
    ));
    state.events.navigate(Route::Dashboard);
    Ok(user)
}

/// Sign out. The session cache and persisted credential are cleared even when
/// the provider call fails or nobody was signed in.
pub async fn logout(state: &AppState) -> Result<()> {
    state.stop_poller();

    if let Err(e) = state.services.auth.sign_out().await {
        warn!(error = %e, "Provider sign-out failed, clearing local session anyway");
    }

    let cleared = state
        .with_session(|s| s.clear())
        .and_then(|r| r.map_err(AppError::from));
    let forgotten = state.forget_auth();
    if let Err(e) = cleared.and(forgotten) {
        state.fail("Error", &e);
        return Err(e);
    }

    info!("Logged out");
    state.events.toast(Toast::info(
        "Logged Out Successfully",
        "You have been logged out.",
    ));
    state.events.navigate(Route::Home);
    Ok(())
}

/// Merge profile edits into the cached user. Returns `false` when signed out.
pub fn update_profile(state: &AppState, patch: UserPatch) -> Result<bool> {
    if let Some(email) = patch.email.as_deref() {
        validate_email(email)?;
    }
    let updated = state.with_session(|s| s.update_user(patch))??;
    if updated {
        state
            .events
            .toast(Toast::info("Profile Updated", "Your profile has been saved."));
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AppEvent;
    use crate::testing::Harness;
    use aasrah_shared::constants::{AUTH_STORAGE_KEY, SESSION_STORAGE_KEY};

    fn form(password: &str, retype: &str) -> RegistrationForm {
        RegistrationForm {
            full_name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            password: password.into(),
            retype_password: retype.into(),
            phone: "9999999999".into(),
        }
    }

    #[tokio::test]
    async fn test_password_mismatch_rejected_before_network() {
        let mut h = Harness::new();
        let err = register(&h.state, form("secret1", "secret2"), Role::User).await;

        assert!(matches!(err, Err(AppError::Validation(_))));
        assert_eq!(h.fakes.auth.calls(), 0);
        assert_eq!(
            h.toasts(),
            vec![Toast::error("Registration Failed", "Passwords do not match!")]
        );
        assert!(h.state.current_user().is_none());
    }

    #[tokio::test]
    async fn test_register_signs_in_with_role() {
        let mut h = Harness::new();
        let user = register(&h.state, form("secret1", "secret1"), Role::Ngo)
            .await
            .unwrap();

        assert_eq!(user.role, Role::Ngo);
        assert_eq!(user.full_name.as_deref(), Some("Asha Rao"));
        assert_eq!(h.state.current_user(), Some(user));
        assert!(h.storage.get_item(SESSION_STORAGE_KEY).unwrap().is_some());
        assert!(h.storage.get_item(AUTH_STORAGE_KEY).unwrap().is_some());
        assert!(h.drain().contains(&AppEvent::Navigate(Route::Dashboard)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_records_failure() {
        let mut h = Harness::new();
        register(&h.state, form("secret1", "secret1"), Role::User)
            .await
            .unwrap();
        logout(&h.state).await.unwrap();
        h.drain();

        let err = register(&h.state, form("secret1", "secret1"), Role::User).await;
        assert!(matches!(err, Err(AppError::Auth(_))));
        let session = h.state.session_state();
        assert!(!session.is_authenticated);
        assert!(session.error.is_some());
        assert_eq!(h.toasts()[0].title, "Error");
    }

    #[tokio::test]
    async fn test_login_keeps_selected_role() {
        let h = Harness::new();
        register(&h.state, form("secret1", "secret1"), Role::User)
            .await
            .unwrap();
        logout(&h.state).await.unwrap();

        let user = login(
            &h.state,
            LoginForm {
                email: "asha@example.com".into(),
                password: "secret1".into(),
                role: Role::Admin,
            },
        )
        .await
        .unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let h = Harness::new();
        let err = login(
            &h.state,
            LoginForm {
                email: "nobody@example.com".into(),
                password: "whatever".into(),
                role: Role::User,
            },
        )
        .await;
        assert!(matches!(err, Err(AppError::Auth(ref m)) if m == "INVALID_LOGIN_CREDENTIALS"));
        assert!(h.state.current_user().is_none());
    }

    #[tokio::test]
    async fn test_failed_login_signs_out_cached_session() {
        let h = Harness::new();
        register(&h.state, form("secret1", "secret1"), Role::User)
            .await
            .unwrap();
        assert!(h.state.current_user().is_some());

        let err = login(
            &h.state,
            LoginForm {
                email: "asha@example.com".into(),
                password: "wrong-password".into(),
                role: Role::User,
            },
        )
        .await;
        assert!(matches!(err, Err(AppError::Auth(_))));
        assert!(h.state.current_user().is_none());
        assert_eq!(h.storage.get_item(SESSION_STORAGE_KEY).unwrap(), None);

        // Memory and disk agree after a restart.
        let h = h.reopen();
        assert!(h.state.current_user().is_none());
    }

    #[tokio::test]
    async fn test_logout_always_clears() {
        let h = Harness::new();
        // Signed out already: still succeeds.
        logout(&h.state).await.unwrap();

        register(&h.state, form("secret1", "secret1"), Role::User)
            .await
            .unwrap();
        h.fakes.auth.fail_sign_out(true);
        logout(&h.state).await.unwrap();

        assert!(h.state.current_user().is_none());
        assert_eq!(h.storage.get_item(SESSION_STORAGE_KEY).unwrap(), None);
        assert_eq!(h.storage.get_item(AUTH_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let h = Harness::new();
        register(&h.state, form("secret1", "secret1"), Role::User)
            .await
            .unwrap();

        let h = h.reopen();
        let user = h.state.current_user().unwrap();
        assert_eq!(user.email, "asha@example.com");
    }

    #[tokio::test]
    async fn test_update_profile() {
        let h = Harness::new();
        let patch = UserPatch {
            phone: Some("12345".into()),
            ..Default::default()
        };
        assert!(!update_profile(&h.state, patch.clone()).unwrap());

        register(&h.state, form("secret1", "secret1"), Role::User)
            .await
            .unwrap();
        assert!(update_profile(&h.state, patch).unwrap());
        assert_eq!(
            h.state.current_user().unwrap().phone.as_deref(),
            Some("12345")
        );
    }
}
