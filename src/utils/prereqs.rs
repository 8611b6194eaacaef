//! Prerequisite checking for credential plugins referenced by kubeconfig

use thiserror::Error;

use crate::utils::errors::ReportError;

#[derive(Error, Debug)]
pub enum PrereqError {
    #[error("Tool '{name}' not found")]
    NotFound { name: String, hint: String },
}

/// Trait for checking prerequisites
pub trait Prerequisite {
    /// Name of the prerequisite tool
    fn name(&self) -> &str;

    /// Check if the tool is available
    fn check(&self) -> Result<(), PrereqError>;

    /// Installation hint for the user
    fn install_hint(&self) -> &str;
}

/// Basic prerequisite that checks if a command exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPrereq {
    pub name: String,
    pub hint: String,
}

impl CommandPrereq {
    pub fn new(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: hint.into(),
        }
    }
}

impl Prerequisite for CommandPrereq {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), PrereqError> {
        which::which(&self.name).map_err(|_| PrereqError::NotFound {
            name: self.name.clone(),
            hint: self.hint.clone(),
        })?;
        Ok(())
    }

    fn install_hint(&self) -> &str {
        &self.hint
    }
}

/// Known exec credential plugins
pub struct CommonPrereqs;

impl CommonPrereqs {
    /// Prerequisite for an exec plugin command named in a kubeconfig user
    pub fn exec_plugin(command: &str) -> CommandPrereq {
        // Absolute paths are checked as-is; only the basename picks the hint
        let base = command.rsplit('/').next().unwrap_or(command);
        let hint = match base {
            "aws" => "https://docs.aws.amazon.com/cli/latest/userguide/getting-started-install.html",
            "aws-iam-authenticator" => {
                "https://docs.aws.amazon.com/eks/latest/userguide/install-aws-iam-authenticator.html"
            }
            "gke-gcloud-auth-plugin" => {
                "gcloud components install gke-gcloud-auth-plugin"
            }
            "kubelogin" => "https://azure.github.io/kubelogin/install.html",
            _ => "Install the credential plugin referenced by your kubeconfig",
        };
        CommandPrereq::new(command, hint)
    }

    /// Check all prerequisites and return detailed results
    /// Returns (found_tools, missing_tools)
    pub fn check_all(prereqs: &[&dyn Prerequisite]) -> (Vec<String>, Vec<(String, String)>) {
        let mut found = Vec::new();
        let mut missing = Vec::new();

        for prereq in prereqs {
            match prereq.check() {
                Ok(_) => {
                    found.push(prereq.name().to_string());
                }
                Err(PrereqError::NotFound { name, hint }) => {
                    missing.push((name, hint));
                }
            }
        }

        (found, missing)
    }

    /// Fail with a `MissingDependency` error for the first missing tool
    pub fn require_all(prereqs: &[&dyn Prerequisite]) -> Result<(), ReportError> {
        let (_, missing) = Self::check_all(prereqs);
        match missing.into_iter().next() {
            Some((name, hint)) => Err(ReportError::missing_dependency(&name, &hint)),
            None => Ok(()),
        }
    }
}
