//! Client-visible routes and the one place roles are dispatched to screens.

use aasrah_shared::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    /// NGO registration.
    Register,
    UserRegistration,
    /// Admin login.
    Admin,
    Dashboard,
    Report,
    Donate,
    MyReports,
    AdminDashboard,
    KnowMore,
    Login,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match normalized {
            "/" => Route::Home,
            "/register" => Route::Register,
            "/user-registration" => Route::UserRegistration,
            "/admin" => Route::Admin,
            "/dashboard" => Route::Dashboard,
            "/report" => Route::Report,
            "/donate" => Route::Donate,
            "/my-reports" => Route::MyReports,
            "/admin-dashboard" => Route::AdminDashboard,
            "/know-more" => Route::KnowMore,
            "/login" => Route::Login,
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::Register => "/register",
            Route::UserRegistration => "/user-registration",
            Route::Admin => "/admin",
            Route::Dashboard => "/dashboard",
            Route::Report => "/report",
            Route::Donate => "/donate",
            Route::MyReports => "/my-reports",
            Route::AdminDashboard => "/admin-dashboard",
            Route::KnowMore => "/know-more",
            Route::Login => "/login",
            Route::NotFound(path) => path,
        }
    }
}

/// What a route renders once the session is taken into account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    /// Registration form creating accounts with this role.
    Register(Role),
    /// Login form; the role selector starts at this role.
    Login(Role),
    Dashboard(Role),
    ReportForm,
    Donate,
    MyReports,
    KnowMore,
    NotFound(String),
}

/// Map a route to a screen for the current session. Signed-in users opening
/// an auth page land on their dashboard; signed-out users opening a
/// dashboard land on the login page.
pub fn resolve(route: &Route, user: Option<&User>) -> Screen {
    match (route, user) {
        (Route::Register | Route::UserRegistration | Route::Login | Route::Admin, Some(u)) => {
            Screen::Dashboard(u.role)
        }
        (Route::Register, None) => Screen::Register(Role::Ngo),
        (Route::UserRegistration, None) => Screen::Register(Role::User),
        (Route::Login, None) => Screen::Login(Role::User),
        (Route::Admin, None) | (Route::AdminDashboard, None) => Screen::Login(Role::Admin),
        (Route::Dashboard, None) => Screen::Login(Role::User),
        (Route::Dashboard, Some(u)) => Screen::Dashboard(u.role),
        // Non-admins get their own dashboard instead.
        (Route::AdminDashboard, Some(u)) => Screen::Dashboard(u.role),
        (Route::Home, _) => Screen::Home,
        (Route::Report, _) => Screen::ReportForm,
        (Route::Donate, _) => Screen::Donate,
        (Route::MyReports, _) => Screen::MyReports,
        (Route::KnowMore, _) => Screen::KnowMore,
        (Route::NotFound(path), _) => Screen::NotFound(path.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Some("u1".into()),
            full_name: None,
            email: "x@example.com".into(),
            phone: None,
            role,
        }
    }

    #[test]
    fn test_parse_all_routes() {
        for path in [
            "/",
            "/register",
            "/user-registration",
            "/admin",
            "/dashboard",
            "/report",
            "/donate",
            "/my-reports",
            "/admin-dashboard",
            "/know-more",
            "/login",
        ] {
            let route = Route::parse(path);
            assert!(!matches!(route, Route::NotFound(_)), "{path}");
            assert_eq!(route.path(), path);
        }
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".into()));
    }

    #[test]
    fn test_dashboard_dispatches_on_role() {
        for role in [Role::User, Role::Ngo, Role::Admin] {
            assert_eq!(
                resolve(&Route::Dashboard, Some(&user(role))),
                Screen::Dashboard(role)
            );
        }
        assert_eq!(resolve(&Route::Dashboard, None), Screen::Login(Role::User));
    }

    #[test]
    fn test_signed_in_users_skip_auth_pages() {
        let ngo = user(Role::Ngo);
        for route in [Route::Login, Route::Admin, Route::Register, Route::UserRegistration] {
            assert_eq!(resolve(&route, Some(&ngo)), Screen::Dashboard(Role::Ngo));
        }
    }

    #[test]
    fn test_signed_out_auth_pages() {
        assert_eq!(resolve(&Route::Register, None), Screen::Register(Role::Ngo));
        assert_eq!(
            resolve(&Route::UserRegistration, None),
            Screen::Register(Role::User)
        );
        assert_eq!(resolve(&Route::Admin, None), Screen::Login(Role::Admin));
        assert_eq!(
            resolve(&Route::AdminDashboard, Some(&user(Role::User))),
            Screen::Dashboard(Role::User)
        );
    }
}
