//! Per-service merge pipeline and the batch driver.
//!
//! A service is merged in isolation: templates are rendered, both streams are
//! parsed, the override set is reconciled against the base set and every
//! result is annotated. A batch runs one worker thread per service and
//! collects the outcomes through the workers' join handles; the combined
//! document set is then ordered by the sorter, so completion order never
//! shows in the output.

use std::sync::Arc;
use std::thread;

use tracing::{info, info_span};

use crate::annotate::annotate;
use crate::document::{Document, Identity, parse_documents};
use crate::error::{UpmergeError, UpmergeResult};
use crate::lock::{LockEntry, LockFile};
use crate::reconcile::{MergeOptions, reconcile};
use crate::sort::render_stream;
use crate::source::ManifestSource;
use crate::template::{TemplateVars, render_template};

/// Inputs for merging one service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceInput<'a> {
    /// Service name; also the `service` annotation and `{name}` placeholder.
    pub service: &'a str,
    /// Deployment version; the `version` annotation and `{version}`
    /// placeholder.
    pub version: &'a str,
    /// Short commit hash for the `{commit}` placeholder.
    pub commit: &'a str,
    /// Raw base manifest text.
    pub base: &'a str,
    /// Raw override manifest text, if the operator wrote one.
    pub overrides: Option<&'a str>,
}

/// Merged documents of one service.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceOutput {
    /// Service name.
    pub service: String,
    /// Deployment version stamped on every document.
    pub version: String,
    /// Merged and annotated documents, in override order.
    pub documents: Vec<Document>,
    /// Identities of base documents no override claimed.
    pub unused: Vec<Identity>,
}

/// Merge one service.
///
/// # Errors
///
/// Returns [`UpmergeError::Parse`] when either stream contains a fragment
/// that cannot be parsed.
pub fn merge_service(input: &ServiceInput<'_>, options: &MergeOptions) -> UpmergeResult<ServiceOutput> {
    let span = info_span!("service", service = input.service, version = input.version);
    let _entered = span.enter();

    let vars = TemplateVars {
        version: input.version,
        name: input.service,
        commit: input.commit,
    };
    let base_text = render_template(input.base, &vars);
    let override_text = input
        .overrides
        .map(|text| render_template(text, &vars))
        .unwrap_or_default();

    let base = parse_documents(&base_text, &format!("service '{}' base manifest", input.service))?;
    let overrides = parse_documents(
        &override_text,
        &format!("service '{}' override manifest", input.service),
    )?;

    info!(base = base.len(), overrides = overrides.len(), "merging service");
    let reconciliation = reconcile(overrides, base, options);
    let unused = reconciliation.unused_identities();
    let mut documents = reconciliation.merged;
    annotate(&mut documents, input.version, input.service);

    Ok(ServiceOutput {
        service: input.service.to_owned(),
        version: input.version.to_owned(),
        documents,
        unused,
    })
}

/// Summary of one service within a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceReport {
    /// Service name.
    pub service: String,
    /// Deployed version.
    pub version: String,
    /// Number of documents the service contributed.
    pub documents: usize,
    /// Base documents that were dropped because nothing overrode them.
    pub unused: Vec<Identity>,
}

/// Result of merging every service in a lock file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOutput {
    /// Rendered, globally sorted multi-document stream.
    pub manifest: String,
    /// Per-service summaries, in service name order.
    pub services: Vec<ServiceReport>,
}

impl BatchOutput {
    /// Total number of documents in the rendered stream.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.services.iter().map(|report| report.documents).sum()
    }
}

fn load_and_merge<S>(
    source: &S,
    service: &str,
    entry: &LockEntry,
    options: &MergeOptions,
) -> UpmergeResult<ServiceOutput>
where
    S: ManifestSource + ?Sized,
{
    let base = source.base(service)?;
    let overrides = source.overrides(service)?;
    merge_service(
        &ServiceInput {
            service,
            version: &entry.version,
            commit: entry.short_commit(),
            base: &base,
            overrides: overrides.as_deref(),
        },
        options,
    )
}

/// Merge every service pinned by `lock`, one worker thread per service.
///
/// Any failing service aborts the batch: a partially merged deployment is
/// worse than none. When several services fail, the error of the first one
/// in name order is returned.
///
/// # Errors
///
/// Returns the first service error, [`UpmergeError::Worker`] when a worker
/// panicked, or [`UpmergeError::Render`] when the combined stream cannot be
/// rendered.
pub fn run_batch<S>(source: &S, lock: &LockFile, options: &MergeOptions) -> UpmergeResult<BatchOutput>
where
    S: ManifestSource + ?Sized,
{
    let outputs = thread::scope(|scope| {
        let workers: Vec<_> = lock
            .iter()
            .map(|(service, entry)| {
                let handle = scope.spawn(move || load_and_merge(source, service, entry, options));
                (service, handle)
            })
            .collect();
        workers
            .into_iter()
            .map(|(service, handle)| {
                handle.join().unwrap_or_else(|_| {
                    Err(Arc::new(UpmergeError::Worker {
                        service: service.to_owned(),
                    }))
                })
            })
            .collect::<Vec<_>>()
    })
    .into_iter()
    .collect::<UpmergeResult<Vec<ServiceOutput>>>()?;

    let services = outputs
        .iter()
        .map(|output| ServiceReport {
            service: output.service.clone(),
            version: output.version.clone(),
            documents: output.documents.len(),
            unused: output.unused.clone(),
        })
        .collect();
    let documents: Vec<Document> = outputs
        .into_iter()
        .flat_map(|output| output.documents)
        .collect();
    let manifest = render_stream(&documents)?;
    info!(
        services = lock.len(),
        documents = documents.len(),
        "merged batch"
    );
    Ok(BatchOutput { manifest, services })
}
