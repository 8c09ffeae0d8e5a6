//! Implementations of the subcommands.
//!
//! Each command writes its primary output to the supplied writer so tests can
//! capture it; `main` passes a locked standard output.

use std::io::Write;

use camino::Utf8PathBuf;
use tracing::info;
use upmerge::{DirectorySource, DocumentSummary, LockFile, find_version, inspect, run_batch};

use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use crate::settings::Settings;

/// Outcome of `upmerge merge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    /// Services merged.
    pub services: usize,
    /// Documents written.
    pub documents: usize,
    /// Base documents dropped because no override matched them.
    pub unused: usize,
    /// Where the stream went; [`crate::settings::STDOUT`] for standard output.
    pub output: Utf8PathBuf,
}

/// Merge every service pinned by the lock file and write the stream.
///
/// # Errors
///
/// Returns an error if the lock file or a manifest cannot be loaded, a
/// manifest fails to parse, or the stream cannot be written.
pub fn merge<W: Write>(settings: &Settings, stdout: &mut W) -> Result<MergeSummary> {
    let lock = LockFile::load(&settings.lock_file)?;
    let source = DirectorySource::new(&settings.services_dir, &settings.overrides_dir);
    let batch = run_batch(&source, &lock, &settings.merge_options())?;

    if settings.writes_to_stdout() {
        stdout
            .write_all(batch.manifest.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(CliError::Stdout)?;
    } else {
        std::fs::write(&settings.output, &batch.manifest).map_err(|source| CliError::Write {
            path: settings.output.clone(),
            source,
        })?;
    }

    let summary = MergeSummary {
        services: batch.services.len(),
        documents: batch.document_count(),
        unused: batch.services.iter().map(|report| report.unused.len()).sum(),
        output: settings.output.clone(),
    };
    info!(
        services = summary.services,
        documents = summary.documents,
        unused = summary.unused,
        output = %summary.output,
        "deployment stream written"
    );
    Ok(summary)
}

/// List the documents of a merged stream.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a requested
/// document is absent, or output cannot be written.
pub fn inspect_stream<W: Write>(args: &InspectArgs, out: &mut W) -> Result<Vec<DocumentSummary>> {
    let text = std::fs::read_to_string(&args.file).map_err(|source| CliError::Read {
        path: args.file.clone(),
        source,
    })?;
    let summaries = match (&args.kind, &args.name) {
        (Some(kind), Some(name)) => vec![find_version(&text, kind, name)?.ok_or_else(|| {
            CliError::DocumentNotFound {
                kind: kind.clone(),
                name: name.clone(),
            }
        })?],
        _ => inspect(&text)?,
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &summaries)?;
        writeln!(out).map_err(CliError::Stdout)?;
    } else {
        for summary in &summaries {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                summary.kind,
                summary.name,
                summary.version.as_deref().unwrap_or("-"),
                summary.service.as_deref().unwrap_or("-"),
            )
            .map_err(CliError::Stdout)?;
        }
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::{inspect_stream, merge};
    use crate::cli::InspectArgs;
    use crate::error::CliError;
    use crate::settings::Settings;
    use anyhow::Result;
    use rstest::{fixture, rstest};
    use test_helpers::manifests::{manifest, stream};
    use test_helpers::workspace::Workspace;

    #[fixture]
    fn workspace() -> Workspace {
        let workspace = Workspace::new().expect("workspace");
        workspace
            .lock(&[("api", "12", "0123456789abcdef")])
            .expect("lock");
        workspace
            .base(
                "api",
                &stream(&[
                    manifest("Deployment", "api", "spec:\n  image: repo/{name}:{commit}\n"),
                    manifest("ConfigMap", "api-stale", ""),
                ]),
            )
            .expect("base");
        workspace
            .override_manifest("api", &manifest("Deployment", "api", "spec:\n  replicas: 2\n"))
            .expect("override");
        workspace
    }

    fn settings_for(workspace: &Workspace, output: &str) -> Settings {
        Settings {
            lock_file: workspace.root().join("up-lock.yaml"),
            services_dir: workspace.root().join("services"),
            overrides_dir: workspace.root().to_path_buf(),
            output: if output == "-" {
                output.into()
            } else {
                workspace.root().join(output)
            },
            ..Settings::default()
        }
    }

    #[rstest]
    fn merge_writes_the_output_file(workspace: Workspace) -> Result<()> {
        let mut stdout = Vec::new();
        let summary = merge(&settings_for(&workspace, "deploy-lock.yaml"), &mut stdout)?;
        assert!(stdout.is_empty());
        assert_eq!((summary.services, summary.documents, summary.unused), (1, 1, 1));
        let written = workspace.read("deploy-lock.yaml")?;
        assert!(written.starts_with("---\n"), "{written}");
        assert!(written.contains("repo/api:0123456"), "{written}");
        assert!(written.contains("replicas: 2"), "{written}");
        assert!(!written.contains("api-stale"), "{written}");
        Ok(())
    }

    #[rstest]
    fn merge_can_stream_to_stdout(workspace: Workspace) -> Result<()> {
        let mut stdout = Vec::new();
        merge(&settings_for(&workspace, "-"), &mut stdout)?;
        let text = String::from_utf8(stdout)?;
        assert!(text.contains("version: '12'"), "{text}");
        Ok(())
    }

    #[rstest]
    fn inspect_lists_merged_documents(workspace: Workspace) -> Result<()> {
        merge(&settings_for(&workspace, "deploy-lock.yaml"), &mut Vec::new())?;
        let args = InspectArgs {
            file: workspace.root().join("deploy-lock.yaml"),
            kind: None,
            name: None,
            json: false,
        };
        let mut out = Vec::new();
        inspect_stream(&args, &mut out)?;
        assert_eq!(String::from_utf8(out)?, "Deployment\tapi\t12\tapi\n");
        Ok(())
    }

    #[rstest]
    fn inspect_reports_missing_documents(workspace: Workspace) -> Result<()> {
        merge(&settings_for(&workspace, "deploy-lock.yaml"), &mut Vec::new())?;
        let args = InspectArgs {
            file: workspace.root().join("deploy-lock.yaml"),
            kind: Some("ConfigMap".to_owned()),
            name: Some("api-stale".to_owned()),
            json: true,
        };
        let err = inspect_stream(&args, &mut Vec::new()).expect_err("expected failure");
        assert!(matches!(err, CliError::DocumentNotFound { .. }));
        Ok(())
    }
}
