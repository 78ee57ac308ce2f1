//! Text renderings of the screens. Views are pure: they take cached data
//! and return the text to print.

pub mod dashboard;
pub mod pages;
pub mod reports;

use aasrah_shared::Role;

use crate::events::{Toast, ToastVariant};
use crate::router::Screen;

pub fn toast(t: &Toast) -> String {
    let marker = match t.variant {
        ToastVariant::Default => "*",
        ToastVariant::Destructive => "!",
    };
    format!("[{marker}] {}: {}", t.title, t.description)
}

pub(crate) fn heading(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

pub(crate) fn stat(label: &str, value: &str, note: &str) -> String {
    format!("  {label:<28} {value:>10}   {note}\n")
}

/// Screens that render without session or report data.
pub fn static_screen(screen: &Screen) -> Option<String> {
    match screen {
        Screen::Home => Some(pages::home()),
        Screen::KnowMore => Some(pages::know_more()),
        Screen::Donate => Some(pages::donate()),
        Screen::NotFound(path) => Some(pages::not_found(path)),
        Screen::Register(role) => Some(pages::register_form(*role)),
        Screen::Login(role) => Some(pages::login_form(*role)),
        Screen::ReportForm => Some(pages::report_form()),
        Screen::Dashboard(Role::Admin) => Some(dashboard::admin()),
        Screen::Dashboard(_) | Screen::MyReports => None,
    }
}
