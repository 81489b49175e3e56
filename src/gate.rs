//! User-facing capabilities the controllers depend on.
//!
//! Destructive actions ask a [`ConfirmationGate`] before doing anything,
//! failures are acknowledged through a [`Notifier`], and page changes go
//! through a [`Navigator`]. The terminal front end provides the
//! implementations below; tests use the recording doubles in [`crate::mock`].

use console::style;
use dialoguer::Confirm;
use std::fmt;

/// Blocking yes/no prompt guarding a side effect.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Blocking acknowledgment of a failure message.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Where the user should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Catalog,
    Login,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Catalog => write!(f, "/"),
            Route::Login => write!(f, "/login"),
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Interactive terminal prompt. Defaults to "no".
pub struct TerminalGate;

impl ConfirmationGate for TerminalGate {
    fn confirm(&self, message: &str) -> bool {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Answers yes without asking (`--yes`).
pub struct AutoConfirm;

impl ConfirmationGate for AutoConfirm {
    fn confirm(&self, message: &str) -> bool {
        println!("  {} {}", style("Auto-confirmed:").dim(), message);
        true
    }
}

/// Prints failures to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{} {}", style("Error:").red().bold(), message);
    }
}

/// Tells the user which command corresponds to the next page.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        let hint = match route {
            Route::Login => "folio login <username>",
            Route::Catalog => "folio list",
        };
        println!("{} {}", style("Next:").cyan(), style(hint).bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Catalog.to_string(), "/");
        assert_eq!(Route::Login.to_string(), "/login");
    }

    #[test]
    fn test_auto_confirm_always_agrees() {
        assert!(AutoConfirm.confirm("Delete?"));
    }
}
