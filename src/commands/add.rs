//! # Add Command Implementation
//!
//! `airone add <name> --git <url>` declares a new module in `airone.json`.
//! The module goes into `modules` by default, or `devModules` with `--dev`.
//! A name already declared in either list is rejected and the file is left
//! untouched. The manifest is written back pretty-printed, so hand-made
//! formatting is not preserved.
//!
//! The module is only declared here; the next `airone install` clones it.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use airone::config::{self, ModuleEntry, ModuleKind, ProjectContext};
use airone::output::{emoji, OutputConfig};

/// Declare a new module in airone.json
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Module name, also the directory it is cloned into
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Git URL of the module source
    #[arg(long, value_name = "URL")]
    pub git: String,

    /// Branch to check out when cloning
    #[arg(long, conflicts_with = "tag")]
    pub branch: Option<String>,

    /// Tag to check out when cloning
    #[arg(long)]
    pub tag: Option<String>,

    /// Declare the module under devModules
    #[arg(long)]
    pub dev: bool,

    /// Project root containing airone.json (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "PATH")]
    pub project_dir: Option<PathBuf>,
}

impl AddArgs {
    fn entry(&self) -> ModuleEntry {
        let mut entry = ModuleEntry::new(self.name.trim(), self.git.trim());
        entry.branch = self.branch.clone();
        entry.tag = self.tag.clone();
        entry
    }

    fn kind(&self) -> ModuleKind {
        if self.dev {
            ModuleKind::Dev
        } else {
            ModuleKind::Library
        }
    }
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, output: &OutputConfig) -> Result<()> {
    if args.name.trim().is_empty() {
        anyhow::bail!("Module name must not be empty");
    }

    let project_dir = match &args.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };
    let context = ProjectContext::new(project_dir);
    let path = context.config_path();

    let mut manifest = config::from_file(&path)?;
    manifest.add_module(args.entry(), args.kind())?;
    config::save(&manifest, &path)?;

    let list = match args.kind() {
        ModuleKind::Library => "modules",
        ModuleKind::Dev => "devModules",
    };
    println!(
        "{} Added {} to {} in {}",
        emoji(output, "✅", "[OK]"),
        output.module_name(args.name.trim()),
        list,
        path.display()
    );
    println!(
        "{} Run `airone install` to clone it",
        emoji(output, "💡", "[HINT]")
    );

    Ok(())
}
