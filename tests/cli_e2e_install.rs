//! End-to-end tests for the `airone install` command.
//!
//! Modules are pre-created on disk so no clone runs, and `pod install` is
//! always disabled; these tests need neither git access nor CocoaPods.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

const SINGLE_TARGET_INJECTED: &str = "\
platform :ios, '12.0'

# ---- generate by airone, do not edit below ----
def airone_modules!()
    # -- modules
    pod 'AirNetwork', :path => '../modules/AirNetwork'
    # -- devModules
    pod 'AirUI', :path => '../devModules/AirUI'
end
# ---- end of airone ----

target 'Shop' do
  airone_modules!
  use_frameworks!
  pod 'Alamofire'
end
";

#[test]
fn test_install_help() {
    let mut cmd = cargo_bin_cmd!("airone");
    cmd.arg("install")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("--skip-all"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--no-pod-install"));
}

#[test]
fn test_install_injects_region_and_marker() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::ONE_OF_EACH)
        .with_podfile(podfiles::SINGLE_TARGET)
        .with_modules_synced();

    fixture
        .install(true)
        .assert()
        .success()
        .stdout(predicate::str::contains("injected into target Shop"))
        .stdout(predicate::str::contains("AirNetwork already present"));

    assert_eq!(fixture.podfile(), SINGLE_TARGET_INJECTED);
}

#[test]
fn test_install_skip_all_writes_skip_markers() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::ONE_OF_EACH)
        .with_podfile(podfiles::TWO_TARGETS)
        .with_modules_synced();

    fixture
        .install(false)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped target Widget"));

    let podfile = fixture.podfile();
    assert!(podfile.contains("target 'Shop' do\n  # airone_ignore!\n"));
    assert!(podfile.contains("  target 'ShopTests' do\n    # airone_ignore!\n"));
    assert!(podfile.contains("target 'Widget' do\n  # airone_ignore!\nend\n"));
    assert!(!podfile.contains("\n  airone_modules!"));
}

#[test]
fn test_second_install_changes_nothing() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::ONE_OF_EACH)
        .with_podfile(podfiles::SINGLE_TARGET)
        .with_modules_synced();

    fixture.install(true).assert().success();
    let first = fixture.podfile();

    // The opposite answer must not matter: nothing is asked again.
    fixture
        .install(false)
        .assert()
        .success()
        .stdout(predicate::str::contains("is already up to date"))
        .stdout(predicate::str::contains("skipped target").not());

    assert_eq!(fixture.podfile(), first);
}

#[test]
fn test_install_picks_up_manifest_changes() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::ONE_OF_EACH)
        .with_podfile(podfiles::SINGLE_TARGET)
        .with_modules_synced();

    fixture.install(true).assert().success();

    let fixture = fixture.with_manifest(manifests::EMPTY);
    fixture.install(true).assert().success();

    let podfile = fixture.podfile();
    assert!(!podfile.contains("pod 'AirNetwork'"));
    assert!(podfile.contains("def airone_modules!()\n    # -- modules\n    # -- devModules\nend\n"));
    assert_eq!(podfile.matches("generate by airone").count(), 1);
    assert_eq!(podfile.matches("  airone_modules!\n").count(), 1);
}

#[test]
fn test_install_without_manifest_fails() {
    let fixture = TestFixture::new().with_podfile(podfiles::SINGLE_TARGET);

    fixture
        .install(true)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project configuration not found"));

    assert_eq!(fixture.podfile(), podfiles::SINGLE_TARGET);
}

#[test]
fn test_install_with_conflicting_manifest_fails() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::CONFLICTING)
        .with_podfile(podfiles::SINGLE_TARGET);

    fixture
        .install(true)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "declared in both modules and devModules",
        ));
}

#[test]
fn test_install_without_podfile_fails_before_sync() {
    let fixture = TestFixture::new().with_manifest(manifests::ONE_OF_EACH);

    fixture
        .install(true)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Podfile found"));

    fixture.child("modules").assert(predicate::path::missing());
}

#[test]
fn test_install_without_terminal_needs_an_answer_flag() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::ONE_OF_EACH)
        .with_podfile(podfiles::SINGLE_TARGET)
        .with_modules_synced();

    fixture
        .command()
        .arg("install")
        .arg("--no-pod-install")
        .arg("--no-update-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Prompt failed"));

    // Nothing is written when the run aborts.
    assert_eq!(fixture.podfile(), podfiles::SINGLE_TARGET);
}

#[test]
fn test_dry_run_changes_nothing() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::ONE_OF_EACH)
        .with_podfile(podfiles::TWO_TARGETS);

    fixture
        .command()
        .arg("install")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("AirNetwork would be cloned"))
        .stdout(predicate::str::contains("would ask about target ShopTests"))
        .stdout(predicate::str::contains("would ask about target Widget"));

    assert_eq!(fixture.podfile(), podfiles::TWO_TARGETS);
    fixture.child("modules").assert(predicate::path::missing());
    fixture.child(".airone-home").assert(predicate::path::missing());
}

#[test]
fn test_update_check_initializes_home() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::EMPTY)
        .with_podfile(podfiles::SINGLE_TARGET);

    fixture
        .command()
        .arg("install")
        .arg("--yes")
        .arg("--no-pod-install")
        .assert()
        .success();

    // A fresh home counts as checked today, so no network access happens.
    let config = fixture.read(".airone-home/config.json");
    assert!(config.contains("\"lastUpdate\""));
    assert!(config.contains(&format!("\"version\": \"{}\"", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_install_with_project_dir() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::ONE_OF_EACH)
        .with_podfile(podfiles::SINGLE_TARGET)
        .with_modules_synced();

    let mut cmd = cargo_bin_cmd!("airone");
    cmd.env("NO_COLOR", "1")
        .arg("install")
        .arg("--project-dir")
        .arg(fixture.path())
        .arg("--yes")
        .arg("--no-pod-install")
        .arg("--no-update-check")
        .assert()
        .success();

    assert_eq!(fixture.podfile(), SINGLE_TARGET_INJECTED);
}
