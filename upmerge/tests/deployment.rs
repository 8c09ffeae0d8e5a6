//! Whole-deployment merges read from disk.

use anyhow::Result;
use rstest::{fixture, rstest};
use test_helpers::manifests::{manifest, stream};
use test_helpers::workspace::Workspace;
use upmerge::{
    DirectorySource, EmptyOverridePolicy, Identity, LockFile, MergeOptions, find_version,
    inspect, run_batch,
};

#[fixture]
fn workspace() -> Workspace {
    let workspace = Workspace::new().expect("workspace");
    workspace
        .lock(&[
            ("api", "12", "0123456789abcdef"),
            ("worker", "7", "aaaaaaabbbbbbb"),
        ])
        .expect("lock");
    workspace
        .base(
            "api",
            &stream(&[
                manifest(
                    "Deployment",
                    "api",
                    "spec:\n  replicas: 1\n  containers:\n  - name: web\n    image: api:{commit}\n    port: 80\n  - name: sidecar\n    image: logger\n",
                ),
                manifest("Service", "api", "spec:\n  port: 80\n"),
            ]),
        )
        .expect("api base");
    workspace
        .override_manifest(
            "api",
            &stream(&[
                manifest(
                    "Deployment",
                    "api",
                    "spec:\n  replicas: 3\n  containers:\n  - name: web\n    image: api:v2\n",
                ),
                manifest("Ingress", "api", "spec:\n  host: api.example.org\n"),
            ]),
        )
        .expect("api override");
    workspace
        .base("worker", &manifest("Deployment", "worker", "spec:\n  replicas: 2\n"))
        .expect("worker base");
    workspace
}

fn source(workspace: &Workspace) -> DirectorySource {
    DirectorySource::new(workspace.root().join("services"), workspace.root())
}

fn lock(workspace: &Workspace) -> Result<LockFile> {
    Ok(LockFile::load(&workspace.root().join("up-lock.yaml"))?)
}

#[rstest]
fn merges_overrides_into_base_manifests(workspace: Workspace) -> Result<()> {
    let batch = run_batch(&source(&workspace), &lock(&workspace)?, &MergeOptions::default())?;

    let deployment = find_version(&batch.manifest, "Deployment", "api")?.expect("api deployment");
    assert_eq!(deployment.version.as_deref(), Some("12"));

    let documents: Vec<(String, String)> = inspect(&batch.manifest)?
        .into_iter()
        .map(|summary| (summary.name, summary.kind))
        .collect();
    assert_eq!(
        documents,
        vec![
            ("api".to_owned(), "Deployment".to_owned()),
            ("api".to_owned(), "Ingress".to_owned()),
            ("worker".to_owned(), "Deployment".to_owned()),
        ]
    );

    assert!(batch.manifest.contains("replicas: 3"));
    assert!(batch.manifest.contains("image: api:v2"));
    assert!(batch.manifest.contains("port: 80"));
    assert!(batch.manifest.contains("image: logger"));
    assert!(batch.manifest.contains("host: api.example.org"));
    Ok(())
}

#[rstest]
fn reports_unused_base_documents(workspace: Workspace) -> Result<()> {
    let batch = run_batch(&source(&workspace), &lock(&workspace)?, &MergeOptions::default())?;
    let api = batch
        .services
        .iter()
        .find(|report| report.service == "api")
        .expect("api report");
    assert_eq!(api.unused, vec![Identity::new("Service", "api")]);
    assert_eq!(api.documents, 2);
    Ok(())
}

#[rstest]
fn drop_base_policy_removes_services_without_overrides(workspace: Workspace) -> Result<()> {
    let options = MergeOptions {
        empty_override: EmptyOverridePolicy::DropBase,
        ..MergeOptions::default()
    };
    let batch = run_batch(&source(&workspace), &lock(&workspace)?, &options)?;
    assert!(find_version(&batch.manifest, "Deployment", "worker")?.is_none());
    assert_eq!(batch.document_count(), 2);
    Ok(())
}

#[rstest]
fn repeated_runs_produce_identical_streams(workspace: Workspace) -> Result<()> {
    let lock = lock(&workspace)?;
    let first = run_batch(&source(&workspace), &lock, &MergeOptions::default())?;
    let second = run_batch(&source(&workspace), &lock, &MergeOptions::default())?;
    assert_eq!(first, second);
    Ok(())
}
