//! Orchestrator for the complete install operation
//!
//! An install runs these steps in order, each blocking until done:
//! 1. Locate the Podfile (fails before anything is written)
//! 2. Sync `modules` into `<project>/modules`
//! 3. Sync `devModules` into `<project>/devModules`
//! 4. Regenerate the owned region of the Podfile
//! 5. Ask about every target that has no injection marker yet
//! 6. Write the Podfile back once
//!
//! `preview_install` computes the same plan without fetching, prompting, or
//! writing, for `install --dry-run`.

use log::info;
use std::path::PathBuf;

use crate::config::{ProjectConfig, ProjectContext};
use crate::document::TextDocument;
use crate::error::Result;
use crate::injector::{ConfirmOracle, InjectionReport, TargetInjector, SKIP_MARKER};
use crate::region::{self, ModuleLayout, RegionRewrite};
use crate::scanner::{self, InjectionState};
use crate::sync::{self, ModuleFetcher, ModuleOutcome, ModuleSyncEngine};

/// What an install did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub modules: Vec<ModuleOutcome>,
    pub dev_modules: Vec<ModuleOutcome>,
    pub podfile: PathBuf,
    pub region: RegionRewrite,
    pub injection: InjectionReport,
    /// Whether the Podfile content differs from what was on disk.
    pub podfile_changed: bool,
}

/// What an install would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPreview {
    pub modules: Vec<ModuleOutcome>,
    pub dev_modules: Vec<ModuleOutcome>,
    pub podfile: PathBuf,
    pub region: RegionRewrite,
    /// Targets that would be asked about, in the order they would be asked.
    pub pending_targets: Vec<String>,
}

/// Apply both Podfile rewrites to an in-memory document.
pub fn rewrite_podfile<O: ConfirmOracle>(
    doc: &mut TextDocument,
    config: &ProjectConfig,
    layout: &ModuleLayout,
    oracle: O,
) -> Result<(RegionRewrite, InjectionReport)> {
    let region = region::rewrite_owned_region(doc, config, layout)?;
    let injection = TargetInjector::new(oracle).run(doc)?;
    Ok((region, injection))
}

/// Execute the complete install.
pub fn run_install<F, O>(
    context: &ProjectContext,
    config: &ProjectConfig,
    fetcher: F,
    oracle: O,
) -> Result<InstallReport>
where
    F: ModuleFetcher,
    O: ConfirmOracle,
{
    let podfile = context.podfile_path()?;

    let engine = ModuleSyncEngine::new(fetcher);
    let modules = engine.reconcile(&config.modules, &context.modules_dir())?;
    let dev_modules = engine.reconcile(&config.dev_modules, &context.dev_modules_dir())?;

    let mut doc = TextDocument::load(&podfile)?;
    let original = doc.to_string();
    let (region, injection) = rewrite_podfile(&mut doc, config, &ModuleLayout::default(), oracle)?;

    let podfile_changed = doc.to_string() != original;
    if podfile_changed {
        doc.save(&podfile)?;
        info!("Updated {}", podfile.display());
    } else {
        info!("{} is already up to date", podfile.display());
    }

    Ok(InstallReport {
        modules,
        dev_modules,
        podfile,
        region,
        injection,
        podfile_changed,
    })
}

/// Work out what `run_install` would do.
pub fn preview_install(context: &ProjectContext, config: &ProjectConfig) -> Result<InstallPreview> {
    let podfile = context.podfile_path()?;
    let modules = sync::plan(&config.modules, &context.modules_dir())?;
    let dev_modules = sync::plan(&config.dev_modules, &context.dev_modules_dir())?;

    let mut doc = TextDocument::load(&podfile)?;
    let region = region::rewrite_owned_region(&mut doc, config, &ModuleLayout::default())?;

    // Answering "skip" marks targets in the same order the real run asks.
    let mut pending_targets = Vec::new();
    while let Some(block) = scanner::find_next_uninjected_target(&doc) {
        debug_assert_eq!(block.state, InjectionState::Uninjected);
        doc.insert(block.start + 1, [SKIP_MARKER])?;
        pending_targets.push(block.name);
    }

    Ok(InstallPreview {
        modules,
        dev_modules,
        podfile,
        region,
        pending_targets,
    })
}
