//! Report error taxonomy with actionable suggestions

use colored::Colorize;
use thiserror::Error;

/// Failure categories the reporter distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingDependency,
    AuthFailure,
    ContextUnreachable,
    NamespaceAbsent,
    EmptyResult,
    LookupFailure,
    NoContexts,
    InvalidConfig,
}

/// Error with a category and suggestions for the operator
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ReportError {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl ReportError {
    /// Create a new error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Add a suggestion to the error
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Display the error with suggestions on stderr
    pub fn display(&self) {
        crate::log_error!("{}", self.message);

        if !self.suggestions.is_empty() {
            eprintln!();
            eprintln!("{}", "Suggestions:".yellow().bold());
            for suggestion in &self.suggestions {
                eprintln!("  {} {}", "→".blue(), suggestion);
            }
        }
    }

    // Common error patterns

    /// Exec credential plugin or other tool missing from PATH
    pub fn missing_dependency(tool: &str, install_hint: &str) -> Self {
        Self::new(
            ErrorKind::MissingDependency,
            format!("Required tool '{}' not found", tool),
        )
        .suggest(format!("Install with: {}", install_hint))
        .suggest("Ensure the tool is in your PATH")
    }

    /// Kubeconfig lists no contexts at all
    pub fn no_contexts() -> Self {
        Self::new(ErrorKind::NoContexts, "No Kubernetes contexts found in kubeconfig")
            .suggest("Check the KUBECONFIG environment variable")
            .suggest("Use --kubeconfig to point at a kubeconfig file")
    }

    /// Context named on the command line is not in the kubeconfig
    pub fn unknown_context(context: &str) -> Self {
        Self::new(
            ErrorKind::ContextUnreachable,
            format!("Context '{}' not found in kubeconfig", context),
        )
        .suggest("List contexts with: kube-versions check")
    }

    /// Context could not be reached
    pub fn context_unreachable(context: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::ContextUnreachable,
            format!("Context '{}' is not accessible: {}", context, reason),
        )
        .suggest("Verify network connectivity to the API server")
        .suggest("Check that your credentials for this context are still valid")
    }

    /// Credentials rejected by the API server
    pub fn auth_failure(context: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::AuthFailure,
            format!("Authentication failed for context '{}': {}", context, reason),
        )
        .suggest("Refresh your credentials (e.g. aws sso login)")
        .suggest("Verify you have read access to pods and namespaces")
    }

    /// Namespace does not exist in a context
    pub fn namespace_absent(context: &str, namespace: &str) -> Self {
        Self::new(
            ErrorKind::NamespaceAbsent,
            format!("Namespace '{}' not found in context '{}'", namespace, context),
        )
    }

    /// Namespace holds no (matching) pods
    pub fn empty_result(context: &str, namespace: &str) -> Self {
        Self::new(
            ErrorKind::EmptyResult,
            format!("No pods found in {}/{}", context, namespace),
        )
    }

    /// Single API call failed
    pub fn lookup_failure(what: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::LookupFailure,
            format!("Failed to look up {}: {}", what, reason),
        )
    }

    /// Settings or filters could not be used
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig, reason)
            .suggest("Print a valid example with: kube-versions config")
    }
}

/// Classify a kube client error raised while talking to a context
pub fn classify_kube_error(context: &str, err: &kube::Error) -> ReportError {
    match err {
        kube::Error::Api(status) if matches!(status.code, 401 | 403) => {
            ReportError::auth_failure(context, &err.to_string())
        }
        kube::Error::Auth(_) => ReportError::auth_failure(context, &err.to_string()),
        _ => ReportError::context_unreachable(context, &err.to_string()),
    }
}

/// Helper to display error and exit
pub fn display_error_and_exit(error: &ReportError) -> ! {
    error.display();
    std::process::exit(1);
}
