//! # Error Handling
//!
//! This module defines the centralized error type for `airone`. It uses the
//! `thiserror` library to create an `Error` enum covering every failure the
//! library can report, each with a descriptive message.
//!
//! ## Fatal vs. recoverable
//!
//! Every variant here is fatal for the running command. Anomalies the tool
//! can heal on its own, such as a Podfile without an owned region, are not
//! errors at all: they are reported as outcomes (see `region::RegionRewrite`)
//! and logged.
//!
//! The `Result` type alias is used to return `Result<T, Error>` from
//! functions throughout the library.

use thiserror::Error;

fn render_hint(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!("\n  hint: {}", h))
        .unwrap_or_default()
}

/// Main error type for airone operations
#[derive(Error, Debug)]
pub enum Error {
    /// The project manifest (`airone.json`) does not exist.
    #[error("Project configuration not found: {path}{}", render_hint(hint))]
    ConfigMissing {
        path: String,
        /// Optional hint for how to resolve the problem
        hint: Option<String>,
    },

    /// The project manifest or the tool home config could not be parsed.
    #[error("Configuration parsing error: {message}{}", render_hint(hint))]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The manifest parsed but violates its invariants (duplicate names).
    #[error("Malformed project configuration: {message}")]
    MalformedManifest { message: String },

    /// A step of fetching a module failed. Remaining modules are not synced.
    #[error("Failed to fetch module {module} ({step}): {message}")]
    FetchFailed {
        module: String,
        step: String,
        message: String,
    },

    /// A required external program is not installed or not runnable.
    #[error("Required tool '{tool}' was not found, please install it first")]
    ToolMissing { tool: String },

    /// No Podfile was found in the iOS directory.
    #[error("No Podfile found in {dir}")]
    PodfileMissing { dir: String },

    /// A line splice fell outside the document.
    #[error("Invalid splice at line {start} (removing {count} of {len} lines)")]
    Splice {
        start: usize,
        count: usize,
        len: usize,
    },

    /// The confirmation prompt could not be answered.
    #[error("Prompt failed: {message}")]
    Prompt { message: String },

    /// An external command exited unsuccessfully.
    #[error("Command failed: {command} - {message}")]
    Command { command: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
