//! List mode: one row per pod, grouped by context and namespace

use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::config::{ContextSelection, NamespaceSpec, ReportConfig};
use crate::k8s::cluster::{ClusterApi, ContextSession};
use crate::utils::ScanProgress;
use crate::utils::errors::ReportError;
use crate::version::{ResolvedVersion, VersionResolver, VersionSource, distinct_versions};

const POD_WIDTH: usize = 52;
const VERSION_WIDTH: usize = 22;
const SOURCE_WIDTH: usize = 16;

#[derive(Debug, Clone, Serialize)]
pub struct PodVersion {
    pub pod: String,
    pub version: String,
    pub source: VersionSource,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceReport {
    pub namespace: String,
    pub display_name: String,
    pub pods: Vec<PodVersion>,
    /// Distinct versions across the reported pods
    pub versions: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextReport {
    pub context: String,
    pub accessible: bool,
    pub namespaces: Vec<NamespaceReport>,
}

/// Visit every (context, namespace) pair and resolve pod versions
///
/// Only an explicitly selected context that cannot be reached is an error;
/// everything else degrades to a warning and the run moves on.
pub async fn collect<C: ClusterApi>(
    cluster: &C,
    config: &ReportConfig,
    contexts: &[String],
    progress: &ScanProgress,
) -> Result<Vec<ContextReport>, ReportError> {
    let mut reports = Vec::with_capacity(contexts.len());

    for context in contexts {
        progress.set_context(context, None);

        let session = match cluster.connect(context).await {
            Ok(session) => session,
            Err(e) if matches!(config.contexts, ContextSelection::Single(_)) => return Err(e),
            Err(e) => {
                progress.suspend(|| crate::log_warn!("{}; skipping", e));
                reports.push(ContextReport {
                    context: context.clone(),
                    accessible: false,
                    namespaces: Vec::new(),
                });
                continue;
            }
        };

        let mut namespaces = Vec::new();
        for spec in &config.namespaces {
            progress.set_context(context, Some(&spec.name));
            if let Some(report) = report_namespace(&session, spec, config, progress).await {
                namespaces.push(report);
            }
        }

        reports.push(ContextReport {
            context: context.clone(),
            accessible: true,
            namespaces,
        });
    }

    Ok(reports)
}

async fn report_namespace<S: ContextSession>(
    session: &S,
    spec: &NamespaceSpec,
    config: &ReportConfig,
    progress: &ScanProgress,
) -> Option<NamespaceReport> {
    let context = session.context();

    match session.namespace_exists(&spec.name).await {
        Ok(true) => {}
        Ok(false) => {
            let err = ReportError::namespace_absent(context, &spec.name);
            progress.suspend(|| crate::log_warn!("{}; skipping", err));
            return None;
        }
        Err(e) => {
            progress.suspend(|| crate::log_warn!("{}; skipping", e));
            return None;
        }
    }

    let pods = match session.list_pods(&spec.name).await {
        Ok(pods) => pods,
        Err(e) => {
            progress.suspend(|| crate::log_warn!("{}; skipping", e));
            return None;
        }
    };

    let selected: Vec<_> = pods.into_iter().filter(|p| spec.admits(&p.name)).collect();
    if selected.is_empty() {
        let err = ReportError::empty_result(context, &spec.name);
        progress.suspend(|| crate::log_warn!("{}; skipping", err));
        return None;
    }

    let mut resolver = VersionResolver::new(session, &spec.name);
    let mut resolved: Vec<(_, ResolvedVersion)> = Vec::with_capacity(selected.len());
    for pod in selected {
        let version = resolver.resolve(&pod).await;
        resolved.push((pod, version));
    }
    crate::log_debug!(
        "{}/{}: {} owner lookups cached",
        context,
        spec.name,
        resolver.cache().len()
    );

    let versions = distinct_versions(config.summary_source, &resolved);
    let pods = resolved
        .into_iter()
        .map(|(pod, version)| PodVersion {
            pod: pod.name,
            version: version.version,
            source: version.source,
            image: pod.image,
        })
        .collect();

    Some(NamespaceReport {
        namespace: spec.name.clone(),
        display_name: spec.display_name.clone(),
        pods,
        versions,
    })
}

/// Human-readable list output
pub fn render<W: Write>(reports: &[ContextReport], out: &mut W) -> io::Result<()> {
    for report in reports {
        if !report.accessible {
            writeln!(
                out,
                "{} {}",
                format!("=== Context: {} ===", report.context).bold(),
                "(inaccessible)".red()
            )?;
            writeln!(out)?;
            continue;
        }

        writeln!(out, "{}", format!("=== Context: {} ===", report.context).bold())?;
        if report.namespaces.is_empty() {
            writeln!(out, "  no namespaces with pods to report")?;
        }

        for ns in &report.namespaces {
            writeln!(
                out,
                "{}",
                format!("--- {} ({}) ---", ns.display_name, ns.namespace).cyan()
            )?;
            writeln!(
                out,
                "{:<pw$} {:<vw$} {:<sw$} IMAGE",
                "POD",
                "VERSION",
                "SOURCE",
                pw = POD_WIDTH,
                vw = VERSION_WIDTH,
                sw = SOURCE_WIDTH
            )?;
            for pod in &ns.pods {
                writeln!(
                    out,
                    "{:<pw$} {:<vw$} {:<sw$} {}",
                    pod.pod,
                    pod.version,
                    pod.source.to_string(),
                    pod.image.as_deref().unwrap_or("-"),
                    pw = POD_WIDTH,
                    vw = VERSION_WIDTH,
                    sw = SOURCE_WIDTH
                )?;
            }

            let versions: Vec<&str> = ns.versions.iter().map(String::as_str).collect();
            let summary = if versions.is_empty() {
                "none".to_string()
            } else {
                versions.join(", ")
            };
            writeln!(out, "{} {}", "Versions:".green(), summary)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Overrides, Settings};
    use crate::config::settings::NamespaceEntry;
    use crate::k8s::fake::{FakeCluster, FakeContext, PodBuilder};
    use crate::k8s::workloads::OwnerKind;
    use crate::utils::errors::ErrorKind;

    fn config(overrides: Overrides) -> ReportConfig {
        let settings = Settings {
            namespaces: vec![
                NamespaceEntry {
                    name: "apps".to_string(),
                    display_name: Some("Applications".to_string()),
                    filter: None,
                },
                NamespaceEntry {
                    name: "csi-drivers".to_string(),
                    display_name: None,
                    filter: Some("csi-nfs|csi-efs".to_string()),
                },
            ],
            ..Settings::default()
        };
        ReportConfig::build(&settings, &overrides).unwrap()
    }

    fn prod() -> FakeContext {
        FakeContext::default()
            .namespace(
                "apps",
                vec![
                    PodBuilder::new("web-5d8f-a").owner("ReplicaSet", "web-5d8f").build(),
                    PodBuilder::new("web-5d8f-b").owner("ReplicaSet", "web-5d8f").build(),
                    PodBuilder::new("worker-0").label("0.4.2").image("registry/worker:v0.4.0").build(),
                ],
            )
            .namespace(
                "csi-drivers",
                vec![
                    PodBuilder::new("csi-nfs-abcde").image("registry/csi-nfs:v4.6.0").build(),
                    PodBuilder::new("other-pod-123").image("registry/other:v9.9.9").build(),
                ],
            )
            .owner(OwnerKind::ReplicaSet, "web-5d8f", &[("version", "1.8.0")])
    }

    fn run(cluster: &FakeCluster, config: &ReportConfig) -> Result<Vec<ContextReport>, ReportError> {
        let contexts = cluster.contexts();
        tokio_test::block_on(collect(cluster, config, &contexts, &ScanProgress::hidden()))
    }

    #[test]
    fn test_unreachable_context_does_not_abort() {
        let cluster = FakeCluster::new()
            .unreachable("dev")
            .reachable("prod", prod());
        let reports = run(&cluster, &config(Overrides::default())).unwrap();

        assert_eq!(reports.len(), 2);
        assert!(!reports[0].accessible);
        assert!(reports[1].accessible);
        assert_eq!(reports[1].namespaces.len(), 2);
    }

    #[test]
    fn test_single_unreachable_context_is_fatal() {
        let cluster = FakeCluster::new().unreachable("dev");
        let config = config(Overrides {
            context: Some("dev".to_string()),
            ..Overrides::default()
        });
        let err = run(&cluster, &config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContextUnreachable);
    }

    #[test]
    fn test_filter_excludes_pods_from_rows_and_summary() {
        let cluster = FakeCluster::new().reachable("prod", prod());
        let reports = run(&cluster, &config(Overrides::default())).unwrap();

        let csi = &reports[0].namespaces[1];
        assert_eq!(csi.namespace, "csi-drivers");
        assert_eq!(csi.display_name, "csi-drivers");
        let pods: Vec<&str> = csi.pods.iter().map(|p| p.pod.as_str()).collect();
        assert_eq!(pods, vec!["csi-nfs-abcde"]);
        assert!(csi.versions.contains("v4.6.0"));
        assert!(!csi.versions.contains("v9.9.9"));
    }

    #[test]
    fn test_one_pod_list_per_namespace_and_one_owner_lookup() {
        let cluster = FakeCluster::new().reachable("prod", prod());
        let reports = run(&cluster, &config(Overrides::default())).unwrap();

        let apps = &reports[0].namespaces[0];
        assert_eq!(apps.pods[0].version, "1.8.0");
        assert_eq!(apps.pods[1].version, "1.8.0");
        assert_eq!(apps.pods[2].version, "0.4.2");
        assert_eq!(apps.pods[2].source, VersionSource::PodLabel);

        assert_eq!(cluster.owner_lookups(), 1);
        assert_eq!(cluster.calls.borrow().pod_lists.len(), 2);
    }

    #[test]
    fn test_image_tag_summary_can_disagree_with_rows() {
        let cluster = FakeCluster::new().reachable("prod", prod());
        let reports = run(
            &cluster,
            &config(Overrides {
                summary_from_images: true,
                ..Overrides::default()
            }),
        )
        .unwrap();

        let apps = &reports[0].namespaces[0];
        let expected: BTreeSet<String> = ["v0.4.0".to_string()].into_iter().collect();
        assert_eq!(apps.versions, expected);
        assert_eq!(apps.pods[2].version, "0.4.2");
    }

    #[test]
    fn test_missing_and_empty_namespaces_are_skipped() {
        let cluster = FakeCluster::new().reachable(
            "prod",
            FakeContext::default().namespace("csi-drivers", vec![
                PodBuilder::new("other-pod-123").build(),
            ]),
        );
        let reports = run(&cluster, &config(Overrides::default())).unwrap();

        assert!(reports[0].accessible);
        assert!(reports[0].namespaces.is_empty());
        // "apps" is absent, so only csi-drivers was listed
        assert_eq!(cluster.calls.borrow().pod_lists.len(), 1);
    }

    #[test]
    fn test_absent_namespace_does_not_stop_the_next_one() {
        let cluster = FakeCluster::new().reachable(
            "prod",
            FakeContext::default().namespace(
                "csi-drivers",
                vec![PodBuilder::new("csi-nfs-abcde").image("registry/csi-nfs:v4.6.0").build()],
            ),
        );
        let reports = run(&cluster, &config(Overrides::default())).unwrap();

        // "apps" comes first in the configuration and does not exist
        let namespaces = &reports[0].namespaces;
        assert_eq!(namespaces.len(), 1);
        assert_eq!(namespaces[0].namespace, "csi-drivers");
        assert_eq!(namespaces[0].pods[0].version, "v4.6.0");
        assert_eq!(namespaces[0].pods[0].source, VersionSource::ImageTag);
    }

    #[test]
    fn test_json_groups_namespaces_under_contexts() {
        let cluster = FakeCluster::new()
            .unreachable("dev")
            .reachable("prod", prod());
        let reports = run(&cluster, &config(Overrides::default())).unwrap();
        let json = serde_json::to_value(&reports).unwrap();

        assert_eq!(json[0]["context"], "dev");
        assert_eq!(json[0]["accessible"], false);
        assert_eq!(json[0]["namespaces"], serde_json::json!([]));

        let apps = &json[1]["namespaces"][0];
        assert_eq!(json[1]["accessible"], true);
        assert_eq!(apps["namespace"], "apps");
        assert_eq!(apps["display_name"], "Applications");
        assert_eq!(apps["pods"][0]["pod"], "web-5d8f-a");
        assert_eq!(apps["pods"][0]["version"], "1.8.0");
        assert_eq!(apps["pods"][0]["source"], "owner-label");
        assert_eq!(apps["pods"][0]["image"], serde_json::Value::Null);
        assert_eq!(apps["versions"], serde_json::json!(["0.4.2", "1.8.0"]));
    }

    #[test]
    fn test_render_marks_inaccessible_and_prints_rows() {
        colored::control::set_override(false);
        let cluster = FakeCluster::new()
            .unreachable("dev")
            .reachable("prod", prod());
        let reports = run(&cluster, &config(Overrides::default())).unwrap();

        let mut buf = Vec::new();
        render(&reports, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("=== Context: dev === (inaccessible)"));
        assert!(text.contains("--- Applications (apps) ---"));
        assert!(text.contains("web-5d8f-a"));
        assert!(text.contains("owner-label"));
        assert!(text.contains("Versions: 0.4.2, 1.8.0"));
    }
}
