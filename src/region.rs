//! Owned region generation
//!
//! The owned region is the one stretch of the Podfile airone writes in full.
//! It defines a Ruby method, `airone_modules!`, declaring one local pod per
//! synced module:
//!
//! ```text
//! # ---- generate by airone, do not edit below ----
//! def airone_modules!()
//!     # -- modules
//!     pod 'AirNetwork', :path => '../modules/AirNetwork'
//!     # -- devModules
//!     pod 'AirUI', :path => '../devModules/AirUI'
//! end
//! # ---- end of airone ----
//! ```
//!
//! `render` is a pure function of the manifest, so rewriting an up-to-date
//! region is a no-op. `rewrite_owned_region` replaces only the lines between
//! the two markers; when the markers are missing or incomplete it inserts
//! or completes the region instead of failing.

use log::{debug, warn};

use crate::config::{ModuleEntry, ProjectConfig, DEV_MODULES_DIR, MODULES_DIR};
use crate::document::TextDocument;
use crate::error::Result;
use crate::scanner::{self, RegionScan};

/// Start marker line written by airone.
pub const REGION_START_LINE: &str = "# ---- generate by airone, do not edit below ----";

/// End marker line written by airone.
pub const REGION_END_LINE: &str = "# ---- end of airone ----";

/// Name of the generated method targets invoke.
pub const GENERATED_METHOD: &str = "airone_modules!";

/// Where module directories live, relative to the Podfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLayout {
    pub modules_path: String,
    pub dev_modules_path: String,
}

impl Default for ModuleLayout {
    fn default() -> Self {
        Self {
            modules_path: format!("../{}", MODULES_DIR),
            dev_modules_path: format!("../{}", DEV_MODULES_DIR),
        }
    }
}

fn pod_line(module: &ModuleEntry, base: &str) -> String {
    format!(
        "    pod '{name}', :path => '{base}/{name}'",
        name = module.name,
        base = base.trim_end_matches('/')
    )
}

/// The lines between the two markers.
pub fn render_body(config: &ProjectConfig, layout: &ModuleLayout) -> Vec<String> {
    let mut lines = Vec::with_capacity(config.modules.len() + config.dev_modules.len() + 4);
    lines.push(format!("def {}()", GENERATED_METHOD));

    lines.push("    # -- modules".to_string());
    lines.extend(
        config
            .modules
            .iter()
            .map(|m| pod_line(m, &layout.modules_path)),
    );

    lines.push("    # -- devModules".to_string());
    lines.extend(
        config
            .dev_modules
            .iter()
            .map(|m| pod_line(m, &layout.dev_modules_path)),
    );

    lines.push("end".to_string());
    lines
}

/// The complete region, markers included.
pub fn render(config: &ProjectConfig, layout: &ModuleLayout) -> Vec<String> {
    let mut lines = vec![REGION_START_LINE.to_string()];
    lines.extend(render_body(config, layout));
    lines.push(REGION_END_LINE.to_string());
    lines
}

/// What `rewrite_owned_region` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRewrite {
    /// Both markers were present; the content between them was regenerated.
    Replaced,
    /// Only one marker was present; the missing half was written around it.
    Repaired,
    /// No marker was present; a fresh region was inserted at `at`.
    Inserted { at: usize },
}

/// Bring the owned region of `doc` up to date with `config`.
pub fn rewrite_owned_region(
    doc: &mut TextDocument,
    config: &ProjectConfig,
    layout: &ModuleLayout,
) -> Result<RegionRewrite> {
    let body = render_body(config, layout);

    match scanner::scan_owned_region(doc) {
        RegionScan::Found(region) => {
            debug!(
                "Regenerating owned region between lines {} and {}",
                region.start + 1,
                region.end + 1
            );
            doc.replace(region.start + 1, region.end - region.start - 1, body)?;
            Ok(RegionRewrite::Replaced)
        }
        RegionScan::StartOnly(start) => {
            warn!(
                "Owned region starting at line {} has no end marker, completing it",
                start + 1
            );
            let mut lines = body;
            lines.push(REGION_END_LINE.to_string());
            doc.insert(start + 1, lines)?;
            Ok(RegionRewrite::Repaired)
        }
        RegionScan::EndOnly(end) => {
            warn!(
                "Owned region ending at line {} has no start marker, completing it",
                end + 1
            );
            let mut lines = vec![REGION_START_LINE.to_string()];
            lines.extend(body);
            doc.insert(end, lines)?;
            Ok(RegionRewrite::Repaired)
        }
        RegionScan::Missing => {
            let at = insertion_point(doc);
            warn!("No owned region found, creating one at line {}", at + 1);
            let mut lines = Vec::new();
            if at > 0 && doc.line(at - 1).is_some_and(|line| !line.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.extend(render(config, layout));
            if doc.line(at).is_some_and(|line| !line.trim().is_empty()) {
                lines.push(String::new());
            }
            doc.insert(at, lines)?;
            Ok(RegionRewrite::Inserted { at })
        }
    }
}

/// Fresh regions go before the first top-level target so the method is
/// defined before any target invokes it. Without targets they go at the
/// end, keeping a trailing newline last.
fn insertion_point(doc: &TextDocument) -> usize {
    if let Some(index) = scanner::first_top_level_target(doc) {
        return index;
    }
    match doc.lines().last() {
        Some(last) if last.is_empty() => doc.len() - 1,
        _ => doc.len(),
    }
}
