//! # Module Synchronization
//!
//! Reconciles the modules declared in `airone.json` against the directories
//! present on disk:
//!
//! | declared | on disk | action |
//! |---|---|---|
//! | yes | no  | `Fetch`: clone the module's git source |
//! | yes | yes | `Update`: currently a no-op, the directory is left as is |
//! | no  | yes | `Skip`: never touched |
//!
//! Modules are reconciled one at a time in manifest order. The first failed
//! fetch aborts the whole run; modules after it are not attempted and
//! modules before it stay on disk.
//!
//! ## Design
//!
//! Fetching goes through the `ModuleFetcher` trait so the engine can be
//! driven by a mock in tests. `GitFetcher` is the real implementation and
//! shells out to the system `git`, which picks up the user's SSH keys and
//! credential helpers.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ModuleEntry;
use crate::error::{Error, Result};

/// What to clone for a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    /// Branch or tag to check out; `None` uses the remote's default branch.
    pub reference: Option<String>,
}

impl CloneRequest {
    /// Resolve the ref of `entry`: its branch, else its tag, else none.
    pub fn for_entry(entry: &ModuleEntry) -> Self {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            url: entry.git.clone(),
            reference: non_empty(&entry.branch).or_else(|| non_empty(&entry.tag)),
        }
    }
}

/// Trait for fetching module sources - allows mocking in tests
pub trait ModuleFetcher {
    /// Materialize the source described by `request` into `target_dir`,
    /// which does not exist when this is called.
    fn fetch(&self, module: &str, request: &CloneRequest, target_dir: &Path) -> Result<()>;
}

impl<T: ModuleFetcher + ?Sized> ModuleFetcher for &T {
    fn fetch(&self, module: &str, request: &CloneRequest, target_dir: &Path) -> Result<()> {
        (**self).fetch(module, request, target_dir)
    }
}

/// Fetches modules with the system `git` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitFetcher;

impl GitFetcher {
    /// Fail with `Error::ToolMissing` when `git` cannot be run.
    pub fn ensure_available() -> Result<()> {
        match Command::new("git").arg("--version").output() {
            Ok(output) if output.status.success() => Ok(()),
            Ok(_) => Err(Error::ToolMissing {
                tool: "git".to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::ToolMissing {
                tool: "git".to_string(),
            }),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Arguments passed to `git` for `request`. Everything after `--` is
    /// positional, so a URL starting with `-` is never read as an option.
    pub fn clone_args(request: &CloneRequest, target_dir: &Path) -> Vec<String> {
        let mut args = vec!["clone".to_string()];
        if let Some(reference) = &request.reference {
            args.push("--branch".to_string());
            args.push(reference.clone());
        }
        args.push("--".to_string());
        args.push(request.url.clone());
        args.push(target_dir.display().to_string());
        args
    }
}

impl ModuleFetcher for GitFetcher {
    fn fetch(&self, _module: &str, request: &CloneRequest, target_dir: &Path) -> Result<()> {
        Self::ensure_available()?;

        let args = Self::clone_args(request, target_dir);
        let output = Command::new("git")
            .args(&args)
            .output()
            .map_err(|e| Error::Command {
                command: format!("git {}", args.join(" ")),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.contains("Authentication failed")
                || stderr.contains("Permission denied")
                || stderr.contains("Could not read from remote repository")
            {
                format!(
                    "authentication failed, make sure your SSH key or git credentials give access to {}\n{}",
                    request.url,
                    stderr.trim()
                )
            } else {
                format!("{} ({})", stderr.trim(), output.status)
            };
            return Err(Error::Command {
                command: format!("git {}", args.join(" ")),
                message,
            });
        }

        Ok(())
    }
}

/// Presence of one module name, declared and/or on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    pub declared: bool,
    pub present_on_disk: bool,
}

/// What reconciliation does for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Skip,
    Fetch,
    Update,
}

impl SyncState {
    pub fn action(&self) -> SyncAction {
        match (self.declared, self.present_on_disk) {
            (true, false) => SyncAction::Fetch,
            (true, true) => SyncAction::Update,
            (false, _) => SyncAction::Skip,
        }
    }
}

/// The individual steps of fetching a module, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStep {
    /// Remove whatever dangling entry occupies the module path.
    ClearStale,
    /// Clone the module source.
    Clone,
}

impl FetchStep {
    pub const ORDER: [FetchStep; 2] = [FetchStep::ClearStale, FetchStep::Clone];
}

impl fmt::Display for FetchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStep::ClearStale => f.write_str("clear stale directory"),
            FetchStep::Clone => f.write_str("clone"),
        }
    }
}

/// The action decided for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    pub name: String,
    pub path: PathBuf,
    pub action: SyncAction,
}

/// Work out what `reconcile` would do, without touching the disk.
///
/// Directories under `base_dir` that no entry declares are reported as
/// `Skip`, after the declared modules.
pub fn plan(entries: &[ModuleEntry], base_dir: &Path) -> Result<Vec<ModuleOutcome>> {
    let mut outcomes: Vec<ModuleOutcome> = entries
        .iter()
        .map(|entry| {
            let path = base_dir.join(&entry.name);
            let state = SyncState {
                declared: true,
                present_on_disk: path.exists(),
            };
            ModuleOutcome {
                name: entry.name.clone(),
                path,
                action: state.action(),
            }
        })
        .collect();

    if base_dir.is_dir() {
        let declared: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let mut undeclared = Vec::new();
        for dir_entry in fs::read_dir(base_dir)? {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name().to_string_lossy().to_string();
            if dir_entry.file_type()?.is_dir()
                && !name.starts_with('.')
                && !declared.contains(name.as_str())
            {
                undeclared.push(ModuleOutcome {
                    path: dir_entry.path(),
                    name,
                    action: SyncState {
                        declared: false,
                        present_on_disk: true,
                    }
                    .action(),
                });
            }
        }
        undeclared.sort_by(|a, b| a.name.cmp(&b.name));
        outcomes.extend(undeclared);
    }

    Ok(outcomes)
}

/// Reconciles declared modules against a directory.
pub struct ModuleSyncEngine<F: ModuleFetcher> {
    fetcher: F,
}

impl<F: ModuleFetcher> ModuleSyncEngine<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch every declared module missing from `base_dir`.
    ///
    /// Returns one outcome per entry, in order. The first failing fetch
    /// aborts with `Error::FetchFailed` (or `Error::ToolMissing`).
    pub fn reconcile(&self, entries: &[ModuleEntry], base_dir: &Path) -> Result<Vec<ModuleOutcome>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        if !base_dir.exists() {
            fs::create_dir_all(base_dir)?;
        }

        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = base_dir.join(&entry.name);
            let action = SyncState {
                declared: true,
                present_on_disk: path.exists(),
            }
            .action();

            match action {
                SyncAction::Update => {
                    debug!(
                        "Module {} already present at {}, leaving it untouched",
                        entry.name,
                        path.display()
                    );
                }
                SyncAction::Fetch => {
                    info!("Fetching module {} into {}", entry.name, path.display());
                    self.fetch(entry, &path)?;
                    info!("Module {} fetched", entry.name);
                }
                SyncAction::Skip => {}
            }

            outcomes.push(ModuleOutcome {
                name: entry.name.clone(),
                path,
                action,
            });
        }

        Ok(outcomes)
    }

    fn fetch(&self, entry: &ModuleEntry, path: &Path) -> Result<()> {
        let request = CloneRequest::for_entry(entry);
        for step in FetchStep::ORDER {
            let result = match step {
                FetchStep::ClearStale => clear_stale(path),
                FetchStep::Clone => self.fetcher.fetch(&entry.name, &request, path),
            };

            match result {
                Ok(()) => {}
                Err(err @ Error::ToolMissing { .. }) => return Err(err),
                Err(err) => {
                    return Err(Error::FetchFailed {
                        module: entry.name.clone(),
                        step: step.to_string(),
                        message: err.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Remove a leftover at `path` that `Path::exists` does not see, such as a
/// dangling symlink.
fn clear_stale(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            warn!("Removing stale entry at {}", path.display());
            if metadata.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}
