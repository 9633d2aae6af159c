//! # Install Command Implementation
//!
//! `airone install` brings a project in line with its `airone.json`:
//!
//! 1. Load the manifest (a missing manifest aborts before anything else)
//! 2. Run the daily update check, if one is due
//! 3. Clone declared modules missing from `modules/` and `devModules/`
//! 4. Regenerate the owned region of `ios/Podfile` and ask, once per target,
//!    whether it should call `airone_modules!`
//! 5. Run `pod install` in `ios/`
//!
//! `--yes` and `--skip-all` answer every target question up front, which is
//! what scripts and CI should use. `--dry-run` only prints the plan.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use log::warn;
use std::path::{Path, PathBuf};

use airone::config::{self, ProjectContext};
use airone::error::Error;
use airone::global::{self, GitTagLister, ToolHome, UpdateCheck};
use airone::injector::{ConfirmOracle, FixedAnswer};
use airone::output::{emoji, OutputConfig};
use airone::pipeline::{self, InstallPreview, InstallReport};
use airone::pods;
use airone::region::RegionRewrite;
use airone::sync::{CloneRequest, GitFetcher, ModuleFetcher};

/// Sync modules and inject them into the Podfile
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Project root containing airone.json (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "PATH")]
    pub project_dir: Option<PathBuf>,

    /// Directory airone keeps its own state in (defaults to ~/.airone)
    #[arg(long, value_name = "PATH", env = "AIRONE_HOME")]
    pub home: Option<PathBuf>,

    /// Inject airone modules into every target without asking
    #[arg(short, long, conflicts_with = "skip_all")]
    pub yes: bool,

    /// Mark every unmarked target as skipped without asking
    #[arg(long)]
    pub skip_all: bool,

    /// Do not run `pod install` afterwards
    #[arg(long)]
    pub no_pod_install: bool,

    /// Let `pod install` update the CocoaPods spec repositories
    #[arg(long)]
    pub full_repo_update: bool,

    /// Skip the daily check for a newer airone release
    #[arg(long)]
    pub no_update_check: bool,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Asks on the terminal, defaulting to yes.
struct DialoguerOracle {
    theme: ColorfulTheme,
}

impl ConfirmOracle for DialoguerOracle {
    fn confirm(&mut self, target: &str) -> airone::error::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(format!(
                "[iOS] Found target {}, inject airone modules?",
                target
            ))
            .default(true)
            .interact()
            .map_err(|e| Error::Prompt {
                message: e.to_string(),
            })
    }
}

/// How target questions get answered for this run.
enum Answers {
    Fixed(FixedAnswer),
    Interactive(DialoguerOracle),
}

impl Answers {
    fn from_args(args: &InstallArgs) -> Self {
        if args.yes {
            Answers::Fixed(FixedAnswer(true))
        } else if args.skip_all {
            Answers::Fixed(FixedAnswer(false))
        } else {
            Answers::Interactive(DialoguerOracle {
                theme: ColorfulTheme::default(),
            })
        }
    }

    fn is_interactive(&self) -> bool {
        matches!(self, Answers::Interactive(_))
    }
}

impl ConfirmOracle for Answers {
    fn confirm(&mut self, target: &str) -> airone::error::Result<bool> {
        match self {
            Answers::Fixed(answer) => answer.confirm(target),
            Answers::Interactive(oracle) => oracle.confirm(target),
        }
    }
}

/// `GitFetcher` with a spinner while each clone runs.
struct SpinnerFetcher<'a> {
    output: &'a OutputConfig,
}

impl ModuleFetcher for SpinnerFetcher<'_> {
    fn fetch(
        &self,
        module: &str,
        request: &CloneRequest,
        target_dir: &Path,
    ) -> airone::error::Result<()> {
        let spinner = self
            .output
            .spinner(format!("Cloning {} from {}", module, request.url));
        let result = GitFetcher.fetch(module, request, target_dir);
        spinner.finish_and_clear();
        result
    }
}

/// Execute the `install` command.
pub fn execute(args: InstallArgs, output: &OutputConfig) -> Result<()> {
    let project_dir = match &args.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };
    let context = ProjectContext::new(project_dir);
    let manifest = config::from_file(context.config_path())?;

    if !args.no_update_check && !args.dry_run {
        run_update_check(&args, output);
    }

    if args.dry_run {
        let preview = pipeline::preview_install(&context, &manifest)?;
        print_preview(&preview, output);
        return Ok(());
    }

    let answers = Answers::from_args(&args);
    let interactive = answers.is_interactive();

    println!("{} Syncing modules", emoji(output, "📦", "[SYNC]"));
    let report = pipeline::run_install(&context, &manifest, SpinnerFetcher { output }, answers)?;
    print_report(&report, output);

    if args.no_pod_install {
        return Ok(());
    }

    let repo_update = args.full_repo_update || (interactive && ask_repo_update()?);
    println!("{} Running pod install", emoji(output, "☕", "[PODS]"));
    pods::run_pod_install(&context.ios_dir(), repo_update)?;
    println!("{} Done", emoji(output, "✅", "[DONE]"));

    Ok(())
}

fn ask_repo_update() -> Result<bool> {
    let update = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Update the CocoaPods spec repositories? (slow)")
        .default(false)
        .interact()?;
    Ok(update)
}

/// Run the update check, logging instead of failing.
fn run_update_check(args: &InstallArgs, output: &OutputConfig) {
    let home = match &args.home {
        Some(dir) => ToolHome::new(dir.clone()),
        None => match dirs::home_dir() {
            Some(user_home) => ToolHome::under(&user_home),
            None => {
                warn!("Could not determine the home directory, skipping update check");
                return;
            }
        },
    };

    let current = match global::running_version(env!("CARGO_PKG_VERSION")) {
        Ok(version) => version,
        Err(e) => {
            warn!("Could not parse the running version: {}", e);
            return;
        }
    };

    let today = Local::now().date_naive();
    match global::check_for_update(&home, &current, today, &GitTagLister) {
        Ok(UpdateCheck::Available(latest)) => println!(
            "{} airone {} is available (running {})",
            emoji(output, "🆕", "[UPDATE]"),
            latest,
            current
        ),
        Ok(_) => {}
        Err(e) => warn!("Update check failed: {}", e),
    }
}

fn describe_region(region: RegionRewrite) -> String {
    match region {
        RegionRewrite::Replaced => "regenerated".to_string(),
        RegionRewrite::Repaired => "repaired (one marker was missing)".to_string(),
        RegionRewrite::Inserted { at } => format!("created at line {}", at + 1),
    }
}

fn print_report(report: &InstallReport, output: &OutputConfig) {
    for outcome in report.modules.iter().chain(&report.dev_modules) {
        println!("  {}", output.describe_outcome(outcome, false));
    }

    println!(
        "{} Owned region {}",
        emoji(output, "📝", "[PODFILE]"),
        describe_region(report.region)
    );
    for name in report.injection.injected() {
        println!("  {} injected into target {}", emoji(output, "➕", "+"), name);
    }
    for name in report.injection.skipped() {
        println!("  {} skipped target {}", emoji(output, "➖", "-"), name);
    }

    if report.podfile_changed {
        println!("  wrote {}", report.podfile.display());
    } else {
        println!("  {} is already up to date", report.podfile.display());
    }
}

fn print_preview(preview: &InstallPreview, output: &OutputConfig) {
    println!("{} Dry run, nothing will be changed", emoji(output, "🔍", "[DRY RUN]"));
    for outcome in preview.modules.iter().chain(&preview.dev_modules) {
        println!("  {}", output.describe_outcome(outcome, true));
    }

    println!(
        "{} Owned region in {} would be {}",
        emoji(output, "📝", "[PODFILE]"),
        preview.podfile.display(),
        describe_region(preview.region)
    );
    if preview.pending_targets.is_empty() {
        println!("  every target is already marked");
    } else {
        for name in &preview.pending_targets {
            println!("  would ask about target {}", name);
        }
    }
}
