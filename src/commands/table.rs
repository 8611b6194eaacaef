//! Table mode: one row per context, one column per namespace

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use crate::config::{ContextSelection, NamespaceSpec, ReportConfig};
use crate::k8s::cluster::{ClusterApi, ContextSession};
use crate::utils::ScanProgress;
use crate::utils::errors::ReportError;
use crate::version::{NOT_AVAILABLE, VersionResolver};

const INACCESSIBLE: &str = "INACCESSIBLE";

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceVersion {
    pub namespace: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextRow {
    pub context: String,
    pub accessible: bool,
    /// One entry per configured namespace, in configuration order
    pub versions: Vec<NamespaceVersion>,
}

/// Build one row per context
pub async fn collect<C: ClusterApi>(
    cluster: &C,
    config: &ReportConfig,
    contexts: &[String],
    progress: &ScanProgress,
) -> Result<Vec<ContextRow>, ReportError> {
    let mut rows = Vec::with_capacity(contexts.len());

    for context in contexts {
        progress.set_context(context, None);

        let session = match cluster.connect(context).await {
            Ok(session) => session,
            Err(e) if matches!(config.contexts, ContextSelection::Single(_)) => return Err(e),
            Err(e) => {
                progress.suspend(|| crate::log_warn!("{}; marking inaccessible", e));
                rows.push(ContextRow {
                    context: context.clone(),
                    accessible: false,
                    versions: cells(&config.namespaces, |_| INACCESSIBLE.to_string()),
                });
                continue;
            }
        };

        let mut versions = Vec::with_capacity(config.namespaces.len());
        for spec in &config.namespaces {
            progress.set_context(context, Some(&spec.name));
            let version = representative_version(&session, spec, progress).await;
            versions.push(NamespaceVersion {
                namespace: spec.name.clone(),
                version,
            });
        }

        rows.push(ContextRow {
            context: context.clone(),
            accessible: true,
            versions,
        });
    }

    Ok(rows)
}

fn cells(namespaces: &[NamespaceSpec], value: impl Fn(&NamespaceSpec) -> String) -> Vec<NamespaceVersion> {
    namespaces
        .iter()
        .map(|spec| NamespaceVersion {
            namespace: spec.name.clone(),
            version: value(spec),
        })
        .collect()
}

/// Version of the first filtered pod that resolves, else `N/A`
async fn representative_version<S: ContextSession>(
    session: &S,
    spec: &NamespaceSpec,
    progress: &ScanProgress,
) -> String {
    let context = session.context();

    match session.namespace_exists(&spec.name).await {
        Ok(true) => {}
        Ok(false) => {
            let err = ReportError::namespace_absent(context, &spec.name);
            progress.suspend(|| crate::log_warn!("{}", err));
            return NOT_AVAILABLE.to_string();
        }
        Err(e) => {
            progress.suspend(|| crate::log_warn!("{}", e));
            return NOT_AVAILABLE.to_string();
        }
    }

    let pods = match session.list_pods(&spec.name).await {
        Ok(pods) => pods,
        Err(e) => {
            progress.suspend(|| crate::log_warn!("{}", e));
            return NOT_AVAILABLE.to_string();
        }
    };

    let mut resolver = VersionResolver::new(session, &spec.name);
    let mut any_selected = false;
    for pod in pods.iter().filter(|p| spec.admits(&p.name)) {
        any_selected = true;
        let resolved = resolver.resolve(pod).await;
        if resolved.is_known() {
            return resolved.version;
        }
    }

    if !any_selected {
        let err = ReportError::empty_result(context, &spec.name);
        progress.suspend(|| crate::log_warn!("{}", err));
    }
    NOT_AVAILABLE.to_string()
}

/// Human-readable table output, columns sized to the widest cell
pub fn render<W: Write>(rows: &[ContextRow], namespaces: &[NamespaceSpec], out: &mut W) -> io::Result<()> {
    let context_width = rows
        .iter()
        .map(|r| r.context.len())
        .chain(std::iter::once("CONTEXT".len()))
        .max()
        .unwrap_or(0);

    let column_widths: Vec<usize> = namespaces
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            rows.iter()
                .filter_map(|r| r.versions.get(i))
                .map(|cell| cell.version.len())
                .chain(std::iter::once(spec.display_name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut header = format!("{:<w$}", "CONTEXT", w = context_width);
    for (spec, width) in namespaces.iter().zip(&column_widths) {
        header.push_str(&format!("  {:<w$}", spec.display_name, w = *width));
    }
    writeln!(out, "{}", header.trim_end().bold())?;

    for row in rows {
        let mut line = format!("{:<w$}", row.context, w = context_width);
        for (cell, width) in row.versions.iter().zip(&column_widths) {
            line.push_str(&format!("  {:<w$}", cell.version, w = *width));
        }
        let line = line.trim_end().to_string();
        if row.accessible {
            writeln!(out, "{}", line)?;
        } else {
            writeln!(out, "{}", line.red())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::NamespaceEntry;
    use crate::config::{Overrides, Settings};
    use crate::k8s::fake::{FakeCluster, FakeContext, PodBuilder};
    use crate::k8s::workloads::OwnerKind;

    fn config() -> ReportConfig {
        let settings = Settings {
            namespaces: vec![
                NamespaceEntry {
                    name: "ingress-nginx".to_string(),
                    display_name: Some("Ingress".to_string()),
                    filter: None,
                },
                NamespaceEntry {
                    name: "csi-drivers".to_string(),
                    display_name: Some("CSI".to_string()),
                    filter: Some("csi-nfs|csi-efs".to_string()),
                },
                NamespaceEntry {
                    name: "monitoring".to_string(),
                    display_name: None,
                    filter: None,
                },
            ],
            ..Settings::default()
        };
        ReportConfig::build(
            &settings,
            &Overrides {
                table: true,
                ..Overrides::default()
            },
        )
        .unwrap()
    }

    fn cluster() -> FakeCluster {
        FakeCluster::new()
            .reachable(
                "prod",
                FakeContext::default()
                    .namespace(
                        "ingress-nginx",
                        vec![
                            PodBuilder::new("admission-create-x").image("registry/certgen:sha-1").build(),
                            PodBuilder::new("controller-abc").owner("ReplicaSet", "controller-7f").build(),
                        ],
                    )
                    .namespace(
                        "csi-drivers",
                        vec![
                            PodBuilder::new("other-pod-123").label("9.9.9").build(),
                            PodBuilder::new("csi-efs-node-1").image("registry/efs:v2.1.0").build(),
                        ],
                    )
                    .owner(OwnerKind::ReplicaSet, "controller-7f", &[("app.kubernetes.io/version", "1.11.2")]),
            )
            .unreachable("staging")
            .reachable(
                "dev",
                FakeContext::default().namespace("ingress-nginx", Vec::new()),
            )
    }

    fn run(cluster: &FakeCluster) -> Vec<ContextRow> {
        let contexts = cluster.contexts();
        tokio_test::block_on(collect(cluster, &config(), &contexts, &ScanProgress::hidden())).unwrap()
    }

    fn versions(row: &ContextRow) -> Vec<&str> {
        row.versions.iter().map(|c| c.version.as_str()).collect()
    }

    #[test]
    fn test_first_resolvable_pod_is_representative() {
        let rows = run(&cluster());
        assert_eq!(rows[0].context, "prod");
        // The certgen pod resolves to unknown, so the controller pod wins;
        // the filter hides the labelled non-CSI pod
        assert_eq!(versions(&rows[0]), vec!["1.11.2", "v2.1.0", "N/A"]);
    }

    #[test]
    fn test_unreachable_context_gets_inaccessible_row() {
        let rows = run(&cluster());
        assert_eq!(rows.len(), 3);
        assert!(!rows[1].accessible);
        assert_eq!(versions(&rows[1]), vec![INACCESSIBLE; 3]);
        assert!(rows[2].accessible);
        assert_eq!(versions(&rows[2]), vec!["N/A"; 3]);
    }

    #[test]
    fn test_json_rows_keep_namespace_order() {
        let rows = run(&cluster());
        let json = serde_json::to_value(&rows).unwrap();

        assert_eq!(json[0]["context"], "prod");
        assert_eq!(json[0]["accessible"], true);
        assert_eq!(
            json[0]["versions"],
            serde_json::json!([
                {"namespace": "ingress-nginx", "version": "1.11.2"},
                {"namespace": "csi-drivers", "version": "v2.1.0"},
                {"namespace": "monitoring", "version": "N/A"}
            ])
        );
        assert_eq!(json[1]["accessible"], false);
        assert_eq!(json[1]["versions"][0]["version"], "INACCESSIBLE");
    }

    #[test]
    fn test_render_aligns_columns() {
        colored::control::set_override(false);
        let config = config();
        let rows = run(&cluster());

        let mut buf = Vec::new();
        render(&rows, &config.namespaces, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("CONTEXT"));
        assert!(lines[0].contains("Ingress"));
        assert!(lines[0].ends_with("monitoring"));
        assert!(lines[1].starts_with("prod   "));
        assert!(lines[2].contains("INACCESSIBLE"));

        let column = lines[0].find("CSI").unwrap();
        assert_eq!(&lines[1][column..column + 6], "v2.1.0");
    }
}
