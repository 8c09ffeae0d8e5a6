//! End-to-end runs of the `upmerge` binary against a temporary deployment
//! directory.

use anyhow::Result;
use assert_cmd::Command;
use rstest::{fixture, rstest};
use test_helpers::manifests::{manifest, stream};
use test_helpers::workspace::Workspace;

#[fixture]
fn workspace() -> Workspace {
    let workspace = Workspace::new().expect("workspace");
    workspace
        .lock(&[("api", "12", "0123456789abcdef"), ("web", "3", "fedcba9876543210")])
        .expect("lock");
    workspace
        .base(
            "api",
            &stream(&[
                manifest("Deployment", "api", "spec:\n  replicas: 1\n"),
                manifest("Service", "api", "spec:\n  port: 80\n"),
            ]),
        )
        .expect("api base");
    workspace
        .override_manifest("api", &manifest("Deployment", "api", "spec:\n  replicas: 4\n"))
        .expect("api override");
    workspace
        .base("web", &manifest("Deployment", "web", "spec:\n  image: web:{commit}\n"))
        .expect("web base");
    workspace
}

/// Runs the binary inside `workspace` with settings discovery and logging
/// isolated from the developer's environment.
fn upmerge(workspace: &Workspace) -> Command {
    #[expect(
        deprecated,
        clippy::expect_used,
        reason = "cargo_bin is the standard assert_cmd API and test panics are acceptable"
    )]
    let mut cmd = Command::cargo_bin("upmerge").expect("binary should exist");
    cmd.current_dir(workspace.root())
        .env("XDG_CONFIG_HOME", workspace.root().join("xdg"))
        .env("RUST_BACKTRACE", "0")
        .env("RUST_LOG", "warn")
        .env_remove("UPMERGE_CONFIG_PATH")
        .env_remove("UPMERGE_OUTPUT");
    cmd
}

#[rstest]
fn merge_writes_deploy_lock(workspace: Workspace) -> Result<()> {
    upmerge(&workspace).arg("merge").assert().success();
    let written = workspace.read("deploy-lock.yaml")?;
    let names: Vec<&str> = written
        .lines()
        .filter_map(|line| line.strip_prefix("  name: "))
        .collect();
    assert_eq!(names, vec!["api", "web"], "{written}");
    assert!(written.contains("replicas: 4"), "{written}");
    assert!(written.contains("web:fedcba9"), "{written}");
    assert!(!written.contains("port: 80"), "{written}");
    Ok(())
}

#[rstest]
fn merge_streams_to_stdout(workspace: Workspace) -> Result<()> {
    let output = upmerge(&workspace).args(["merge", "--output", "-"]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("---\n"), "{stdout}");
    assert_eq!(stdout.matches("---\n").count(), 2);
    Ok(())
}

#[rstest]
fn unused_base_documents_are_warned_about(workspace: Workspace) -> Result<()> {
    let output = upmerge(&workspace).args(["merge", "-o", "-"]).output()?;
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("unused base manifest"), "{stderr}");
    Ok(())
}

#[rstest]
fn settings_file_is_discovered(workspace: Workspace) -> Result<()> {
    workspace.write(".upmerge.toml", "output = \"from-settings.yaml\"\n")?;
    upmerge(&workspace).arg("merge").assert().success();
    assert!(workspace.read("from-settings.yaml")?.contains("name: web"));
    Ok(())
}

#[rstest]
fn broken_override_fails_the_run(workspace: Workspace) -> Result<()> {
    workspace.override_manifest("web", "kind: [broken\n")?;
    let output = upmerge(&workspace).arg("merge").output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("'web' override manifest"), "{stderr}");
    assert!(workspace.read("deploy-lock.yaml").is_err());
    Ok(())
}

#[rstest]
fn inspect_prints_json(workspace: Workspace) -> Result<()> {
    upmerge(&workspace).arg("merge").assert().success();
    let output = upmerge(&workspace)
        .args(["inspect", "deploy-lock.yaml", "--json", "--kind", "Deployment", "--name", "web"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("\"version\": \"3\""), "{stdout}");
    assert!(stdout.contains("\"service\": \"web\""), "{stdout}");
    Ok(())
}
