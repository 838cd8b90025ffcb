use assert_cmd::Command;
use predicates::prelude::*;

fn ncs() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ncs"));
    cmd.env_remove("NCS_PATH");
    cmd
}

#[test]
fn commands_require_an_installation_path() {
    ncs()
        .args(["app", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No installation directory"));
}

#[test]
fn app_install_rejects_both_sources() {
    let dir = tempfile::tempdir().unwrap();
    ncs()
        .args([
            "--path",
            dir.path().to_str().unwrap(),
            "app",
            "install",
            "--name",
            "bookmarks",
            "--url",
            "https://example.com/bookmarks.tar.gz",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Specify either name or URL"));
}

#[test]
fn app_install_rejects_no_source() {
    let dir = tempfile::tempdir().unwrap();
    ncs()
        .args(["--path", dir.path().to_str().unwrap(), "app", "install"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Specify either name or URL"));
}

#[test]
fn status_reports_a_missing_version_file() {
    let dir = tempfile::tempdir().unwrap();
    ncs()
        .args(["--path", dir.path().to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("version.php"));
}
