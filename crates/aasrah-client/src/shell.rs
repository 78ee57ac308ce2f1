//! Line-oriented front-end.
//!
//! The user navigates between the client routes with `go <path>` and fills
//! forms with `key=value` arguments. Notifications, navigation requests and
//! poller updates arrive on the event bus and are printed between commands.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use aasrah_shared::{Coordinates, Role, UserPatch};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::commands::auth::{self, LoginForm, RegistrationForm};
use crate::commands::location::{self, LocationInput};
use crate::commands::ngo::{self, Triage};
use crate::commands::reports::{self, ImageAttachment, ReportForm};
use crate::events::AppEvent;
use crate::router::{resolve, Route, Screen};
use crate::state::AppState;
use crate::views;

const HELP: &str = "\
Commands
  go <path>                     open a page (/, /login, /dashboard, /report, ...)
  register name=.. email=.. password=.. retype=.. [phone=..]
  login email=.. password=.. [role=user|ngo|admin]
  logout
  profile [name=..] [phone=..] [email=..]
  report description=.. [animal=..] [image=<path>] location=<text>|here|map=<lat,lng>
  search <email>                admins: reports filed by another account
  accept <id> | decline <id> | complete <id>
  refresh                       re-query the NGO dashboard now
  whoami | help | quit
";

/// Split a command line into words. Double quotes group words and may appear
/// mid-word (`description=\"hurt dog\"`); `\\` escapes the next character.
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or("Trailing backslash")?;
                current.push(escaped);
                in_word = true;
            }
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err("Unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Positional words and `key=value` pairs of one command.
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub positional: Vec<String>,
    pub named: HashMap<String, String>,
}

impl Args {
    pub fn parse(words: &[String]) -> Self {
        let mut args = Args::default();
        for word in words {
            match word.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    args.named.insert(key.to_ascii_lowercase(), value.to_string());
                }
                _ => args.positional.push(word.clone()),
            }
        }
        args
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.named.get(key).map(String::as_str)
    }

    fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    state: Arc<AppState>,
    route: Route,
    screen: Screen,
}

impl Shell {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            route: Route::Home,
            screen: Screen::Home,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Open `route`, mounting or unmounting the report poller as the
    /// resulting screen requires, and render it.
    pub async fn navigate(&mut self, route: Route) -> String {
        let user = self.state.current_user();
        let screen = resolve(&route, user.as_ref());

        if screen == Screen::Dashboard(Role::Ngo) {
            if let Err(e) = ngo::open_dashboard(&self.state) {
                self.state.fail("Error", &e);
            }
        } else {
            ngo::close_dashboard(&self.state);
        }

        debug!(path = route.path(), ?screen, "Navigated");
        self.route = route;
        self.screen = screen;
        self.render().await
    }

    pub async fn render(&self) -> String {
        if let Some(text) = views::static_screen(&self.screen) {
            return text;
        }
        match &self.screen {
            Screen::Dashboard(Role::Ngo) => self
                .state
                .poller()
                .map(|p| views::dashboard::ngo(&p.snapshot()))
                .unwrap_or_default(),
            Screen::Dashboard(_) => self
                .state
                .current_user()
                .map(|u| views::dashboard::user(&u))
                .unwrap_or_default(),
            Screen::MyReports => match reports::my_reports(&self.state, None).await {
                Ok(mine) => views::reports::my_reports(&mine),
                Err(_) => String::new(),
            },
            _ => String::new(),
        }
    }

    /// React to a bus event; returns text to print, if any.
    pub async fn handle_event(&mut self, event: AppEvent) -> Option<String> {
        match event {
            AppEvent::Toast(t) => Some(views::toast(&t)),
            AppEvent::Navigate(route) => Some(self.navigate(route).await),
            AppEvent::ReportsChanged if self.screen == Screen::Dashboard(Role::Ngo) => {
                Some(self.render().await)
            }
            AppEvent::ReportsChanged => None,
        }
    }

    /// Run one command line. Command failures have already been surfaced
    /// as notifications, so they produce no output here.
    pub async fn execute(&mut self, line: &str) -> (Flow, String) {
        let words = match tokenize(line) {
            Ok(words) => words,
            Err(e) => return (Flow::Continue, format!("{e}\n")),
        };
        let Some((command, rest)) = words.split_first() else {
            return (Flow::Continue, String::new());
        };
        let args = Args::parse(rest);

        let output = match command.as_str() {
            "quit" | "exit" => return (Flow::Quit, String::new()),
            "help" => HELP.to_string(),
            "go" => match args.positional.first() {
                Some(path) => self.navigate(Route::parse(path)).await,
                None => "usage: go <path>\n".to_string(),
            },
            "whoami" => match self.state.current_user() {
                Some(u) => format!("{} <{}> ({})\n", u.display_name(), u.email, u.role),
                None => "Not signed in\n".to_string(),
            },
            "register" => self.register(&args).await,
            "login" => self.login(&args).await,
            "logout" => {
                let _ = auth::logout(&self.state).await;
                String::new()
            }
            "profile" => {
                let patch = UserPatch {
                    full_name: args.get("name").map(str::to_string),
                    email: args.get("email").map(str::to_string),
                    phone: args.get("phone").map(str::to_string),
                    role: None,
                };
                match auth::update_profile(&self.state, patch) {
                    Ok(true) => String::new(),
                    Ok(false) => "Not signed in\n".to_string(),
                    Err(e) => {
                        self.state.fail("Error", &e);
                        String::new()
                    }
                }
            }
            "report" => self.report(&args).await,
            "search" => match args.positional.first() {
                Some(email) if self.screen == Screen::MyReports => {
                    match reports::my_reports(&self.state, Some(email.as_str())).await {
                        Ok(found) => views::reports::my_reports(&found),
                        Err(_) => String::new(),
                    }
                }
                Some(_) => "Open /my-reports first\n".to_string(),
                None => "usage: search <email>\n".to_string(),
            },
            "accept" | "decline" | "complete" => {
                let action = match command.as_str() {
                    "accept" => Triage::Accept,
                    "decline" => Triage::Decline,
                    _ => Triage::Complete,
                };
                match args.positional.first() {
                    Some(id) => {
                        let _ = ngo::triage(&self.state, action, id).await;
                        String::new()
                    }
                    None => format!("usage: {command} <id>\n"),
                }
            }
            "refresh" => match self.state.poller() {
                Some(poller) => {
                    poller.refresh().await;
                    String::new()
                }
                None => "Open the NGO dashboard first\n".to_string(),
            },
            other => format!("Unknown command '{other}'. Type 'help'.\n"),
        };
        (Flow::Continue, output)
    }

    async fn register(&mut self, args: &Args) -> String {
        let Screen::Register(role) = self.screen else {
            return "Open /user-registration or /register first\n".to_string();
        };
        let form = RegistrationForm {
            full_name: args.text("name"),
            email: args.text("email"),
            password: args.text("password"),
            retype_password: args.text("retype"),
            phone: args.text("phone"),
        };
        let _ = auth::register(&self.state, form, role).await;
        String::new()
    }

    async fn login(&mut self, args: &Args) -> String {
        let Screen::Login(default_role) = self.screen else {
            return "Open /login or /admin first\n".to_string();
        };
        let role = match args.get("role") {
            None => default_role,
            Some(raw) => match Role::parse(raw) {
                Some(role) => role,
                None => return format!("Unknown role '{raw}'\n"),
            },
        };
        let form = LoginForm {
            email: args.text("email"),
            password: args.text("password"),
            role,
        };
        let _ = auth::login(&self.state, form).await;
        String::new()
    }

    async fn report(&mut self, args: &Args) -> String {
        if self.screen != Screen::ReportForm {
            return "Open /report first\n".to_string();
        }

        let input = match (args.get("map"), args.get("location")) {
            (Some(raw), _) => match Coordinates::parse(raw) {
                Ok(at) => LocationInput::Map(at),
                Err(e) => return format!("{e}\n"),
            },
            (None, Some("here")) => LocationInput::Device,
            (None, text) => LocationInput::Typed(text.unwrap_or_default().to_string()),
        };
        let location = match location::resolve(&self.state, input).await {
            Ok(location) => location,
            Err(e) => {
                if matches!(e, crate::AppError::Validation(_)) {
                    self.state.fail("Error", &e);
                }
                return String::new();
            }
        };

        let image = match args.get("image") {
            Some(path) => match ImageAttachment::from_path(Path::new(path)).await {
                Ok(image) => Some(image),
                Err(e) => {
                    self.state.fail("Error", &e);
                    return String::new();
                }
            },
            None => None,
        };

        let form = ReportForm {
            description: args.text("description"),
            animal_type: args.get("animal").map(str::to_string),
            location: location.text,
            coordinates: location.coordinates,
            image,
        };
        match reports::submit_report(&self.state, form).await {
            Ok(id) => format!("Report {} filed\n", id.short()),
            Err(_) => String::new(),
        }
    }

    /// Read commands until `quit` or end of input, printing notifications as
    /// they arrive.
    pub async fn run<R, W>(mut self, input: R, mut out: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut events = self.state.events.subscribe();

        let intro = self.navigate(Route::Home).await;
        out.write_all(intro.as_bytes()).await?;

        loop {
            out.write_all(format!("aasrah:{}> ", self.route.path()).as_bytes())
                .await?;
            out.flush().await?;

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let (flow, text) = self.execute(&line).await;
                    out.write_all(text.as_bytes()).await?;
                    if flow == Flow::Quit {
                        break;
                    }
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        if let Some(text) = self.handle_event(event).await {
                            out.write_all(format!("\n{text}\n").as_bytes()).await?;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Dropped notifications");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        self.state.stop_poller();
        out.flush().await
    }
}
