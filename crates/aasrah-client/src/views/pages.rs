use aasrah_shared::constants::APP_NAME;
use aasrah_shared::Role;

use super::heading;

pub fn home() -> String {
    let mut out = heading(&format!("{APP_NAME}: help for animals in distress"));
    out.push_str(
        "Report an animal emergency and nearby NGOs are notified right away.\n\n\
         User Registration        /user-registration\n\
         \x20 - Quick emergency reporting\n\
         \x20 - Track report status\n\
         \x20 - Real-time notifications\n\
         \x20 - Support NGO activities\n\n\
         NGO Registration         /register\n\
         \x20 - Instant emergency notifications\n\
         \x20 - GPS-based case assignments\n\
         \x20 - Performance tracking dashboard\n\
         \x20 - Donation management tools\n\n\
         Admin Portal             /admin\n\
         \x20 - Real-time system monitoring\n\
         \x20 - NGO verification management\n\
         \x20 - Analytics and reporting\n\
         \x20 - Content moderation tools\n\n\
         Already registered? /login    Learn more: /know-more\n",
    );
    out
}

pub fn know_more() -> String {
    let mut out = heading("About Aasrah");
    out.push_str(
        "Aasrah connects people who find injured, stranded or abused animals\n\
         with the NGOs that can help them.\n\n\
         1. Report: describe the animal, add a photo and share the location.\n\
         2. Respond: registered NGOs see new reports and accept the case.\n\
         3. Resolve: the NGO marks the report completed once the animal is safe.\n",
    );
    out
}

pub fn donate() -> String {
    let mut out = heading("Donate");
    out.push_str(
        "Every contribution funds rescues, treatment and shelter.\n\
         Online donations are not available from this client yet; contact\n\
         your local partner NGO to contribute.\n",
    );
    out
}

pub fn not_found(path: &str) -> String {
    let mut out = heading("404");
    out.push_str(&format!("Oops! Page not found: {path}\nReturn to Home: /\n"));
    out
}

pub fn register_form(role: Role) -> String {
    let (title, name_label) = match role {
        Role::Ngo => ("NGO Registration", "organisation name"),
        _ => ("User Registration", "full name"),
    };
    let mut out = heading(title);
    out.push_str(&format!(
        "register name=<{name_label}> email=<email> password=<password> retype=<password> [phone=<phone>]\n"
    ));
    out
}

pub fn login_form(role: Role) -> String {
    let title = if role == Role::Admin { "Admin Login" } else { "Login" };
    let mut out = heading(title);
    out.push_str(&format!(
        "login email=<email> password=<password> [role=user|ngo|admin]   (role defaults to {role})\n"
    ));
    out
}

pub fn report_form() -> String {
    let mut out = heading("Report an Emergency");
    out.push_str(
        "report description=<text> [animal=<type>] [image=<path>]\n\
         \x20      location=<address> | here | map=<lat,lng>\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_form_label_follows_role() {
        assert!(register_form(Role::Ngo).contains("organisation name"));
        assert!(register_form(Role::User).starts_with("User Registration"));
    }

    #[test]
    fn test_not_found_echoes_path() {
        assert!(not_found("/nope").contains("/nope"));
    }

    #[test]
    fn test_home_lists_portals() {
        let page = home();
        for portal in ["/user-registration", "/register", "/admin"] {
            assert!(page.contains(portal));
        }
    }
}
