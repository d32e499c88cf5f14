//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// A claimdesk command isolated from the user's config and environment
pub fn claimdesk(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("claimdesk"));
    cmd.env("XDG_CONFIG_HOME", tmp.path().join("config"))
        .env("HOME", tmp.path())
        .env_remove("CLAIMDESK_BACKEND")
        .env_remove("CLAIMDESK_API_URL")
        .env_remove("CLAIMDESK_PAGE_SIZE")
        .env_remove("CLAIMDESK_TIMEOUT")
        .env_remove("RUST_LOG")
        .env("CLAIMDESK_DATA_DIR", tmp.path().join("data"));
    cmd
}

/// Run a `new` command with `-o id` and return the created id
pub fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = claimdesk(tmp)
        .args(args)
        .args(["-o", "id"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn create_country(tmp: &TempDir, name: &str) -> String {
    create(tmp, &["country", "new", "--name", name])
}

pub fn create_project(tmp: &TempDir, title: &str, country: &str) -> String {
    create(tmp, &["project", "new", "--title", title, "--country", country])
}

pub fn create_contractor(tmp: &TempDir, name: &str, projects: &[&str]) -> String {
    let mut args = vec!["contractor", "new", "--name", name];
    for project in projects {
        args.extend(["--project", project]);
    }
    create(tmp, &args)
}

pub fn create_claim(tmp: &TempDir, title: &str, project: &str, contractor: &str) -> String {
    create(
        tmp,
        &[
            "claim",
            "new",
            "--title",
            title,
            "--project",
            project,
            "--contractor",
            contractor,
            "--claim-file",
            "claims/delay.pdf",
        ],
    )
}
