//! Command implementations for kube-versions CLI

pub mod check;
pub mod list;
pub mod table;

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use crate::config::{ContextSelection, OutputFormat, ReportConfig};
use crate::k8s::cluster::{ClusterApi, KubeCluster};
use crate::k8s::kubeconfig;
use crate::utils::errors::ReportError;
use crate::utils::{CommonPrereqs, Prerequisite, ScanProgress};

/// Resolve the context selection against the contexts the cluster knows
pub fn select_contexts<C: ClusterApi>(
    cluster: &C,
    selection: &ContextSelection,
) -> Result<Vec<String>, ReportError> {
    let available = cluster.contexts();
    match selection {
        ContextSelection::All if available.is_empty() => Err(ReportError::no_contexts()),
        ContextSelection::All => Ok(available),
        ContextSelection::Single(name) if available.iter().any(|c| c == name) => {
            Ok(vec![name.clone()])
        }
        ContextSelection::Single(name) => Err(ReportError::unknown_context(name)),
    }
}

/// Entry point for the default command: list or table report
pub async fn run_report(config: &ReportConfig, kubeconfig_path: Option<&Path>) -> Result<()> {
    let kc = kubeconfig::load(kubeconfig_path)?;
    let cluster = KubeCluster::new(kc);

    let contexts = select_contexts(&cluster, &config.contexts)?;

    // Credential plugins must exist before any context is contacted
    let prereqs: Vec<_> = kubeconfig::exec_plugins(cluster.kubeconfig(), &contexts)
        .iter()
        .map(|command| CommonPrereqs::exec_plugin(command))
        .collect();
    let prereq_refs: Vec<&dyn Prerequisite> =
        prereqs.iter().map(|p| p as &dyn Prerequisite).collect();
    CommonPrereqs::require_all(&prereq_refs)?;

    let progress = match config.output {
        OutputFormat::Text => ScanProgress::new(contexts.len()),
        OutputFormat::Json => ScanProgress::hidden(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if config.table {
        let rows = table::collect(&cluster, config, &contexts, &progress).await?;
        progress.finish();
        match config.output {
            OutputFormat::Text => table::render(&rows, &config.namespaces, &mut out),
            OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &rows)
                .map_err(io::Error::from),
        }
        .context("Failed to write table report")?;
    } else {
        let reports = list::collect(&cluster, config, &contexts, &progress).await?;
        progress.finish();
        match config.output {
            OutputFormat::Text => list::render(&reports, &mut out),
            OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &reports)
                .map_err(io::Error::from),
        }
        .context("Failed to write version report")?;
    }

    if config.output == OutputFormat::Json {
        writeln!(out).context("Failed to write version report")?;
    }

    Ok(())
}
