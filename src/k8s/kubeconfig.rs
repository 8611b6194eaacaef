//! Kubeconfig loading and context enumeration

use kube::config::Kubeconfig;
use std::path::Path;

use crate::utils::errors::ReportError;

/// Load the kubeconfig from an explicit path, or from KUBECONFIG / ~/.kube/config
pub fn load(path: Option<&Path>) -> Result<Kubeconfig, ReportError> {
    let result = match path {
        Some(p) => Kubeconfig::read_from(p),
        None => Kubeconfig::read(),
    };

    result.map_err(|e| {
        ReportError::invalid_config(format!("Failed to load kubeconfig: {}", e))
            .suggest("Check the KUBECONFIG environment variable")
            .suggest("Use --kubeconfig to point at a kubeconfig file")
    })
}

/// All context names, in kubeconfig order
pub fn context_names(kubeconfig: &Kubeconfig) -> Vec<String> {
    kubeconfig.contexts.iter().map(|c| c.name.clone()).collect()
}

/// Exec credential plugin commands used by the given contexts, deduplicated
pub fn exec_plugins(kubeconfig: &Kubeconfig, contexts: &[String]) -> Vec<String> {
    let mut plugins: Vec<String> = Vec::new();
    for named in &kubeconfig.contexts {
        if !contexts.iter().any(|c| *c == named.name) {
            continue;
        }
        let Some(user) = named.context.as_ref().and_then(|c| c.user.as_deref()) else {
            continue;
        };
        let command = kubeconfig
            .auth_infos
            .iter()
            .find(|a| a.name == user)
            .and_then(|a| a.auth_info.as_ref())
            .and_then(|info| info.exec.as_ref())
            .and_then(|exec| exec.command.as_deref());

        if let Some(command) = command
            && !plugins.iter().any(|p| p == command)
        {
            plugins.push(command.to_string());
        }
    }
    plugins
}
