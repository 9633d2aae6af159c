//! # Project Configuration
//!
//! This module defines the schema of the project manifest, `airone.json`,
//! which declares the modules a project vendors:
//!
//! ```json
//! {
//!   "name": "shop",
//!   "version": "1.0.0",
//!   "modules": [{ "name": "AirNetwork", "git": "https://git.example.com/air/network.git", "tag": "1.2.0" }],
//!   "devModules": [{ "name": "AirUI", "git": "https://git.example.com/air/ui.git", "branch": "develop" }]
//! }
//! ```
//!
//! `modules` are library modules (consumed as built artifacts), `devModules`
//! are modules vendored as editable source. A module name must be unique
//! within its list and may appear in only one of the two lists; manifests
//! breaking that rule are rejected when they are loaded.
//!
//! The module also defines `ProjectContext`, the explicit set of paths the
//! rest of the library works against. Nothing here reads the current working
//! directory or the environment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the project manifest.
pub const PROJECT_CONFIG_NAME: &str = "airone.json";

/// Directory (relative to the project root) library modules are synced into.
pub const MODULES_DIR: &str = "modules";

/// Directory (relative to the project root) dev modules are synced into.
pub const DEV_MODULES_DIR: &str = "devModules";

/// Directory (relative to the project root) holding the iOS project.
pub const IOS_DIR: &str = "ios";

/// A declared module: an external git source vendored into the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    pub git: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ModuleEntry {
    pub fn new(name: impl Into<String>, git: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            git: git.into(),
            version: None,
            branch: None,
            tag: None,
        }
    }
}

/// The project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub version: String,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub dev_modules: Vec<ModuleEntry>,
}

/// Which of the two module lists an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Library,
    Dev,
}

impl ProjectConfig {
    /// Check the manifest invariants: every name is a valid module name,
    /// names are unique within each list and no name is declared in both
    /// lists.
    pub fn validate(&self) -> Result<()> {
        for module in self.modules.iter().chain(&self.dev_modules) {
            validate_module_name(&module.name)?;
        }

        let mut library = HashSet::new();
        for module in &self.modules {
            if !library.insert(module.name.as_str()) {
                return Err(Error::MalformedManifest {
                    message: format!("module '{}' is declared twice in modules", module.name),
                });
            }
        }

        let mut dev = HashSet::new();
        for module in &self.dev_modules {
            if !dev.insert(module.name.as_str()) {
                return Err(Error::MalformedManifest {
                    message: format!(
                        "module '{}' is declared twice in devModules",
                        module.name
                    ),
                });
            }
            if library.contains(module.name.as_str()) {
                return Err(Error::MalformedManifest {
                    message: format!(
                        "module '{}' is declared in both modules and devModules",
                        module.name
                    ),
                });
            }
        }

        Ok(())
    }

    /// Find which list declares `name`, if any.
    pub fn kind_of(&self, name: &str) -> Option<ModuleKind> {
        if self.modules.iter().any(|m| m.name == name) {
            Some(ModuleKind::Library)
        } else if self.dev_modules.iter().any(|m| m.name == name) {
            Some(ModuleKind::Dev)
        } else {
            None
        }
    }

    /// Declare a new module, refusing names that are already declared.
    pub fn add_module(&mut self, entry: ModuleEntry, kind: ModuleKind) -> Result<()> {
        validate_module_name(&entry.name)?;
        if let Some(existing) = self.kind_of(&entry.name) {
            let list = match existing {
                ModuleKind::Library => "modules",
                ModuleKind::Dev => "devModules",
            };
            return Err(Error::MalformedManifest {
                message: format!("module '{}' is already declared in {}", entry.name, list),
            });
        }

        match kind {
            ModuleKind::Library => self.modules.push(entry),
            ModuleKind::Dev => self.dev_modules.push(entry),
        }
        Ok(())
    }
}

/// Check that `name` can be used both as a directory under `modules/` and
/// inside a single-quoted Ruby string in the Podfile.
pub fn validate_module_name(name: &str) -> Result<()> {
    let problem = if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be '.' or '..'")
    } else if name.starts_with('-') {
        Some("must not start with '-'")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name.contains('\'') {
        Some("must not contain quotes")
    } else if name.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    };

    match problem {
        Some(problem) => Err(Error::MalformedManifest {
            message: format!("invalid module name '{}': {}", name.escape_default(), problem),
        }),
        None => Ok(()),
    }
}

/// Parse and validate a manifest from its JSON text.
pub fn parse(json: &str) -> Result<ProjectConfig> {
    let config: ProjectConfig = serde_json::from_str(json).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(format!(
            "{} needs at least \"name\" and \"version\" fields",
            PROJECT_CONFIG_NAME
        )),
    })?;
    config.validate()?;
    Ok(config)
}

/// Load the manifest at `path`.
///
/// A missing file is reported as `Error::ConfigMissing` so callers can abort
/// before touching anything on disk.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ProjectConfig> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::ConfigMissing {
            path: path.display().to_string(),
            hint: Some(format!(
                "make sure you are in the root directory of an airone project ({} not found)",
                PROJECT_CONFIG_NAME
            )),
        });
    }
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Write the manifest back to `path`, pretty-printed with tab indentation.
pub fn save<P: AsRef<Path>>(config: &ProjectConfig, path: P) -> Result<()> {
    let content = to_pretty_json(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Serialize a value as JSON indented with tabs, the layout the tool has
/// always written.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })
}

/// Paths of the project an install runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub project_dir: PathBuf,
}

impl ProjectContext {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(PROJECT_CONFIG_NAME)
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.project_dir.join(MODULES_DIR)
    }

    pub fn dev_modules_dir(&self) -> PathBuf {
        self.project_dir.join(DEV_MODULES_DIR)
    }

    pub fn ios_dir(&self) -> PathBuf {
        self.project_dir.join(IOS_DIR)
    }

    /// Locate the Podfile, accepting the lowercase spelling some projects use.
    pub fn podfile_path(&self) -> Result<PathBuf> {
        let ios_dir = self.ios_dir();
        ["Podfile", "podfile"]
            .iter()
            .map(|name| ios_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::PodfileMissing {
                dir: ios_dir.display().to_string(),
            })
    }
}
