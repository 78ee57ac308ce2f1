//! Operations invoked from the views.
//!
//! Each sub-module groups related commands by domain. Every command catches
//! its own failures: they are logged, surfaced as a notification and then
//! returned to the caller.

pub mod auth;
pub mod location;
pub mod ngo;
pub mod reports;
