use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::icons::{CHECK, CROSS};

/// Single-line spinner shown while a request is in flight.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .expect("spinner template is a valid static string"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn success(&self, message: &str) {
        self.bar
            .finish_with_message(format!("{}{}", CHECK, style(message).green()));
    }

    pub fn fail(&self, message: &str) {
        self.bar
            .finish_with_message(format!("{}{}", CROSS, style(message).red()));
    }

    /// Remove the spinner line entirely.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}
