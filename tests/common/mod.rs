//! Shared test utilities for the E2E tests.
//!
//! Add `mod common;` to a test file, then:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_manifest(manifests::ONE_OF_EACH)
//!         .with_podfile(podfiles::SINGLE_TARGET);
//!     fixture.command().arg("install").arg("--yes").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::podfiles;
    pub use super::TestFixture;
}

/// `airone.json` contents.
#[allow(dead_code)]
pub mod manifests {
    /// One library module and one dev module.
    pub const ONE_OF_EACH: &str = r#"{
	"name": "shop",
	"version": "1.0.0",
	"modules": [
		{ "name": "AirNetwork", "git": "https://git.example.com/air/network.git", "tag": "1.2.0" }
	],
	"devModules": [
		{ "name": "AirUI", "git": "https://git.example.com/air/ui.git", "branch": "develop" }
	]
}"#;

    /// No modules at all.
    pub const EMPTY: &str = r#"{ "name": "shop", "version": "1.0.0" }"#;

    /// The same name in both lists.
    pub const CONFLICTING: &str = r#"{
	"name": "shop",
	"version": "1.0.0",
	"modules": [{ "name": "AirUI", "git": "https://git.example.com/a.git" }],
	"devModules": [{ "name": "AirUI", "git": "https://git.example.com/b.git" }]
}"#;
}

/// Podfile contents.
#[allow(dead_code)]
pub mod podfiles {
    pub const SINGLE_TARGET: &str = "\
platform :ios, '12.0'

target 'Shop' do
  use_frameworks!
  pod 'Alamofire'
end
";

    pub const TWO_TARGETS: &str = "\
platform :ios, '12.0'

target 'Shop' do
  pod 'Alamofire'

  target 'ShopTests' do
    inherit! :search_paths
  end
end

target 'Widget' do
end
";
}

/// A temporary project directory plus a private airone home.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a fixture with an empty project directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `airone.json`.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("airone.json", content)
    }

    /// Write `ios/Podfile`.
    pub fn with_podfile(self, content: &str) -> Self {
        self.with_file("ios/Podfile", content)
    }

    /// Create a directory, e.g. a module that is already synced.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Pre-create both modules of `manifests::ONE_OF_EACH` so no clone runs.
    pub fn with_modules_synced(self) -> Self {
        self.with_dir("modules/AirNetwork")
            .with_dir("devModules/AirUI")
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory passed as `AIRONE_HOME`.
    pub fn home(&self) -> PathBuf {
        self.temp_dir.path().join(".airone-home")
    }

    pub fn podfile(&self) -> String {
        self.read("ios/Podfile")
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command running in the project directory with a private home and
    /// plain output.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("airone");
        cmd.current_dir(self.path())
            .env("AIRONE_HOME", self.home())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `install` with every flag needed to run without a terminal, git or
    /// CocoaPods. `answer` picks `--yes` or `--skip-all`.
    pub fn install(&self, answer: bool) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("install")
            .arg(if answer { "--yes" } else { "--skip-all" })
            .arg("--no-pod-install")
            .arg("--no-update-check");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_writes_project_files() {
        let fixture = TestFixture::new()
            .with_manifest(manifests::EMPTY)
            .with_podfile(podfiles::SINGLE_TARGET);
        assert!(fixture.path().join("airone.json").exists());
        assert_eq!(fixture.podfile(), podfiles::SINGLE_TARGET);
    }

    #[test]
    fn test_manifests_are_valid_json() {
        for manifest in [manifests::ONE_OF_EACH, manifests::EMPTY, manifests::CONFLICTING] {
            serde_json::from_str::<serde_json::Value>(manifest).expect("manifest should be JSON");
        }
    }
}
