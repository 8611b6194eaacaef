//! Prerequisite and reachability checks

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::ContextSelection;
use crate::k8s::cluster::{ClusterApi, KubeCluster};
use crate::k8s::kubeconfig;
use crate::utils::prereqs::{CommonPrereqs, Prerequisite};

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Pass(String),
    Warn(String),
    Fail(String),
}

impl CheckResult {
    pub fn is_error(&self) -> bool {
        matches!(self, CheckResult::Fail(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, CheckResult::Warn(_))
    }

    pub fn display(&self) {
        match self {
            CheckResult::Pass(msg) => {
                println!("  {} {}", "✓".green(), msg);
            }
            CheckResult::Warn(msg) => {
                println!("  {} {}", "⚠".yellow(), msg);
            }
            CheckResult::Fail(msg) => {
                println!("  {} {}", "✗".red(), msg);
            }
        }
    }
}

/// Run every check against a cluster source
///
/// `plugins` are the exec credential commands the selected contexts rely on.
pub async fn run_checks<C: ClusterApi>(
    cluster: &C,
    selection: &ContextSelection,
    plugins: &[String],
) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    let available = cluster.contexts();
    if available.is_empty() {
        checks.push(CheckResult::Fail("No contexts found in kubeconfig".to_string()));
        return checks;
    }
    checks.push(CheckResult::Pass(format!(
        "{} context(s) found in kubeconfig",
        available.len()
    )));

    let selected = match selection {
        ContextSelection::All => available,
        ContextSelection::Single(name) if available.contains(name) => vec![name.clone()],
        ContextSelection::Single(name) => {
            checks.push(CheckResult::Fail(format!("Context '{}' not found", name)));
            return checks;
        }
    };

    let prereqs: Vec<_> = plugins
        .iter()
        .map(|command| CommonPrereqs::exec_plugin(command))
        .collect();
    let refs: Vec<&dyn Prerequisite> = prereqs.iter().map(|p| p as &dyn Prerequisite).collect();
    let (found, missing) = CommonPrereqs::check_all(&refs);
    for name in found {
        checks.push(CheckResult::Pass(format!("Credential plugin '{}' found", name)));
    }
    let plugins_missing = !missing.is_empty();
    for (name, hint) in missing {
        checks.push(CheckResult::Fail(format!(
            "Credential plugin '{}' not found ({})",
            name, hint
        )));
    }
    if plugins_missing {
        // Contexts depending on the plugin would fail with a confusing auth error
        return checks;
    }

    for context in &selected {
        match cluster.connect(context).await {
            Ok(_) => checks.push(CheckResult::Pass(format!("Context '{}' is reachable", context))),
            Err(e) => checks.push(CheckResult::Warn(e.to_string())),
        }
    }

    checks
}

/// Handle the check command; returns whether every check passed without errors
pub async fn check(kubeconfig_path: Option<&Path>, selection: &ContextSelection) -> Result<bool> {
    crate::log_info!("Checking prerequisites...");

    let kc = match kubeconfig::load(kubeconfig_path) {
        Ok(kc) => kc,
        Err(e) => {
            CheckResult::Fail(e.message).display();
            return Ok(false);
        }
    };
    CheckResult::Pass("Kubeconfig loaded".to_string()).display();

    let cluster = KubeCluster::new(kc);
    let contexts = match selection {
        ContextSelection::All => cluster.contexts(),
        ContextSelection::Single(name) => vec![name.clone()],
    };
    let plugins = kubeconfig::exec_plugins(cluster.kubeconfig(), &contexts);

    let checks = run_checks(&cluster, selection, &plugins).await;
    for check in &checks {
        check.display();
    }

    let errors = checks.iter().filter(|c| c.is_error()).count();
    let warnings = checks.iter().filter(|c| c.is_warning()).count();
    println!();
    if errors > 0 {
        println!("{} error(s), {} warning(s)", errors, warnings);
        Ok(false)
    } else if warnings > 0 {
        println!("{} warning(s). Reports will skip inaccessible contexts.", warnings);
        Ok(true)
    } else {
        println!("{}", "All checks passed!".green());
        Ok(true)
    }
}
