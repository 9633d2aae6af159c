//! Running `pod install` after the Podfile has been rewritten.

use log::info;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Arguments for `pod install`. Without a repository update, CocoaPods
/// resolves against its local spec repos only, which is much faster.
pub fn install_args(repo_update: bool) -> Vec<&'static str> {
    let mut args = vec!["install"];
    if !repo_update {
        args.push("--no-repo-update");
    }
    args.push("--verbose");
    args
}

/// Run `pod install` in `ios_dir`, streaming its output to the terminal.
pub fn run_pod_install(ios_dir: &Path, repo_update: bool) -> Result<()> {
    let args = install_args(repo_update);
    let command = format!("pod {}", args.join(" "));
    if !ios_dir.is_dir() {
        return Err(Error::Command {
            command,
            message: format!("{} is not a directory", ios_dir.display()),
        });
    }
    info!("Running {} in {}", command, ios_dir.display());

    let status = Command::new("pod")
        .args(&args)
        .current_dir(ios_dir)
        .status()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ToolMissing {
                    tool: "pod".to_string(),
                }
            } else {
                Error::Command {
                    command: command.clone(),
                    message: e.to_string(),
                }
            }
        })?;

    if !status.success() {
        return Err(Error::Command {
            command,
            message: format!("exited with {}", status),
        });
    }
    Ok(())
}
