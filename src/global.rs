//! Tool home configuration and the daily update check
//!
//! airone keeps a small JSON file in its home directory (`~/.airone` unless
//! overridden):
//!
//! ```json
//! {
//! 	"version": "0.4.0",
//! 	"lastUpdate": "2026-10-19",
//! 	"updateSource": "https://git.example.com/tools/airone.git"
//! }
//! ```
//!
//! `lastUpdate` (formatted `yyyy-M-d`) records the last day an update check
//! ran, so the check happens at most once a day. The check only runs when
//! an `updateSource` git URL is configured; it compares the newest semver
//! tag of that repository with the running version.
//!
//! The home directory and today's date are always passed in by the caller.

use chrono::NaiveDate;
use log::{debug, info};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::to_pretty_json;
use crate::error::{Error, Result};

/// Name of the config file inside the tool home.
pub const GLOBAL_CONFIG_NAME: &str = "config.json";

/// Contents of the tool home config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_source: Option<String>,
}

/// Format a date the way `lastUpdate` stores it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%-m-%-d").to_string()
}

/// The per-user directory airone keeps its state in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolHome {
    dir: PathBuf,
}

impl ToolHome {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<home>/.airone`
    pub fn under(user_home: &Path) -> Self {
        Self::new(user_home.join(".airone"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(GLOBAL_CONFIG_NAME)
    }

    /// Load the config, creating the directory and a fresh file on first
    /// use. A fresh file counts today as already checked.
    pub fn load_or_init(&self, current_version: &str, today: NaiveDate) -> Result<GlobalConfig> {
        let path = self.config_path();
        if !path.exists() {
            info!("Creating airone home config at {}", path.display());
            let config = GlobalConfig {
                version: current_version.to_string(),
                last_update: Some(format_date(today)),
                update_source: None,
            };
            self.save(&config)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(GlobalConfig {
                version: current_version.to_string(),
                last_update: None,
                update_source: None,
            });
        }
        serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e),
            hint: Some("delete the file to have it recreated".to_string()),
        })
    }

    pub fn save(&self, config: &GlobalConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.config_path(), to_pretty_json(config)?)?;
        Ok(())
    }
}

/// Lists the tags of a remote repository - allows mocking in tests
pub trait TagLister {
    fn list_tags(&self, url: &str) -> Result<Vec<String>>;
}

/// Lists tags with `git ls-remote --tags`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitTagLister;

impl TagLister for GitTagLister {
    fn list_tags(&self, url: &str) -> Result<Vec<String>> {
        let output = Command::new("git")
            .args(ls_remote_args(url))
            .output()
            .map_err(|e| Error::Command {
                command: "git ls-remote --tags".to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Command {
                command: "git ls-remote --tags".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_ls_remote_tags(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Arguments for listing the tags of `url`; `--` keeps the URL positional.
pub fn ls_remote_args(url: &str) -> [&str; 4] {
    ["ls-remote", "--tags", "--", url]
}

/// Extract tag names from `git ls-remote --tags` output
/// (`<hash>\trefs/tags/<tag>`), dropping peeled `^{}` duplicates.
pub fn parse_ls_remote_tags(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .filter_map(|(_, reference)| reference.strip_prefix("refs/tags/"))
        .filter(|tag| !tag.ends_with("^{}"))
        .map(str::to_string)
        .collect()
}

/// Parse a tag such as `v1.2.0` or `1.2.0`.
pub fn parse_semver_tag(tag: &str) -> Option<Version> {
    Version::parse(tag.strip_prefix('v').unwrap_or(tag)).ok()
}

/// Parse the version airone is running as, e.g. `CARGO_PKG_VERSION`.
pub fn running_version(raw: &str) -> Result<Version> {
    Ok(Version::parse(raw.trim())?)
}

/// The highest semver among `tags`, ignoring tags that are not versions.
pub fn newest_version(tags: &[String]) -> Option<Version> {
    tags.iter().filter_map(|tag| parse_semver_tag(tag)).max()
}

/// Result of the daily update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    /// Already checked today.
    NotDue,
    /// No `updateSource` configured.
    NoSource,
    UpToDate,
    Available(Version),
}

/// Run the update check if it is due, recording today's date afterwards.
pub fn check_for_update(
    home: &ToolHome,
    current: &Version,
    today: NaiveDate,
    lister: &dyn TagLister,
) -> Result<UpdateCheck> {
    let mut config = home.load_or_init(&current.to_string(), today)?;
    let today_str = format_date(today);

    if config.last_update.as_deref() == Some(today_str.as_str()) {
        debug!("Update check already ran today");
        return Ok(UpdateCheck::NotDue);
    }

    let Some(source) = config.update_source.clone() else {
        debug!("No update source configured, skipping update check");
        return Ok(UpdateCheck::NoSource);
    };

    info!("Running daily update check against {}", source);
    let tags = lister.list_tags(&source)?;
    let result = match newest_version(&tags) {
        Some(latest) if latest > *current => UpdateCheck::Available(latest),
        _ => UpdateCheck::UpToDate,
    };

    config.last_update = Some(today_str);
    config.version = current.to_string();
    home.save(&config)?;

    Ok(result)
}
