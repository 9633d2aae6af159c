//! # Output Configuration
//!
//! Controls how the CLI decorates what it prints: status symbols, colored
//! module names, and the spinner shown while a module is cloned.
//!
//! Color is decided from the `--color=always|never|auto` flag. In `auto`
//! mode these environment variables are honoured:
//! - `NO_COLOR` - disables colors when set (https://no-color.org/)
//! - `CLICOLOR=0` - disables colors
//! - `CLICOLOR_FORCE=1` - forces colors even without a TTY
//! - `TERM=dumb` - disables colors
//!
//! ```rust,ignore
//! use airone::output::{OutputConfig, emoji};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{} Syncing modules", emoji(&config, "📦", "[SYNC]"));
//! ```

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::time::Duration;

use crate::sync::{ModuleOutcome, SyncAction};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors, emojis and spinners should be used.
    pub use_color: bool,
}

impl OutputConfig {
    /// Build from the `--color` flag value, falling back to environment
    /// detection for anything other than `always` or `never`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Module name, bold when colors are on.
    pub fn module_name(&self, name: &str) -> String {
        if self.use_color {
            style(name).bold().to_string()
        } else {
            name.to_string()
        }
    }

    /// A spinner for a long-running step. Hidden when colors are off so
    /// piped output stays clean.
    pub fn spinner(&self, message: String) -> ProgressBar {
        if !self.use_color {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(spinner_style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    /// One summary line for a synced or planned module.
    pub fn describe_outcome(&self, outcome: &ModuleOutcome, planned: bool) -> String {
        let name = self.module_name(&outcome.name);
        let path = outcome.path.display();
        match (outcome.action, planned) {
            (SyncAction::Fetch, false) => {
                format!("{} {} cloned into {}", emoji(self, "📥", "[CLONE]"), name, path)
            }
            (SyncAction::Fetch, true) => {
                format!("{} {} would be cloned into {}", emoji(self, "📥", "[CLONE]"), name, path)
            }
            (SyncAction::Update, _) => {
                format!("{} {} already present, not updated", emoji(self, "✔️ ", "[OK]"), name)
            }
            (SyncAction::Skip, _) => {
                format!("{} {} is not declared, left alone", emoji(self, "➖", "[SKIP]"), name)
            }
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// The emoji when colors are enabled, otherwise the plain alternative.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
