//! Run configuration: namespace table, filters, and context selection

use regex::Regex;

use crate::config::settings::{OutputFormat, Settings, SummarySource};
use crate::utils::errors::ReportError;

/// Compiled pod-name filter for one namespace
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    pattern: Regex,
}

impl NamespaceFilter {
    pub fn new(pattern: &str) -> Result<Self, ReportError> {
        let pattern = Regex::new(pattern).map_err(|e| {
            ReportError::invalid_config(format!("Invalid namespace filter '{}': {}", pattern, e))
        })?;
        Ok(Self { pattern })
    }

    /// Unanchored search, so `csi-nfs` keeps `csi-nfs-node-x2k9p`
    pub fn matches(&self, pod_name: &str) -> bool {
        self.pattern.is_match(pod_name)
    }
}

/// Descriptor for a namespace the reporter visits
#[derive(Debug, Clone)]
pub struct NamespaceSpec {
    pub name: String,
    pub display_name: String,
    pub filter: Option<NamespaceFilter>,
}

impl NamespaceSpec {
    /// Namespace with no filter, displayed under its own name
    pub fn plain(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            filter: None,
        }
    }

    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ReportError> {
        self.filter = Some(NamespaceFilter::new(pattern)?);
        Ok(self)
    }

    /// Whether a pod with this name takes part in the report
    pub fn admits(&self, pod_name: &str) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(pod_name))
    }
}

/// Which kubeconfig contexts to visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSelection {
    All,
    /// A single named context; failing to reach it is fatal
    Single(String),
}

/// Command-line overrides layered on top of settings
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub namespaces: Vec<String>,
    pub context: Option<String>,
    pub table: bool,
    pub output: Option<OutputFormat>,
    pub summary_from_images: bool,
}

/// Everything a report run needs, built once at startup
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub namespaces: Vec<NamespaceSpec>,
    pub contexts: ContextSelection,
    pub table: bool,
    pub output: OutputFormat,
    pub summary_source: SummarySource,
}

impl ReportConfig {
    pub fn build(settings: &Settings, overrides: &Overrides) -> Result<Self, ReportError> {
        let mut configured = Vec::with_capacity(settings.namespaces.len());
        for entry in &settings.namespaces {
            if entry.name.trim().is_empty() {
                return Err(ReportError::invalid_config(
                    "Namespace entries must have a non-empty name",
                ));
            }
            let mut spec = NamespaceSpec::plain(entry.name.trim());
            if let Some(display) = &entry.display_name {
                spec.display_name = display.clone();
            }
            if let Some(pattern) = &entry.filter {
                spec = spec.with_filter(pattern)?;
            }
            configured.push(spec);
        }

        // Overrides reuse configured descriptors so filters still apply
        let namespaces = if overrides.namespaces.is_empty() {
            configured
        } else {
            overrides
                .namespaces
                .iter()
                .flat_map(|arg| arg.split(','))
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    configured
                        .iter()
                        .find(|spec| spec.name == name)
                        .cloned()
                        .unwrap_or_else(|| NamespaceSpec::plain(name))
                })
                .collect()
        };

        if namespaces.is_empty() {
            return Err(ReportError::invalid_config("No namespaces configured"));
        }

        let contexts = match &overrides.context {
            Some(name) => ContextSelection::Single(name.clone()),
            None => ContextSelection::All,
        };

        let summary_source = if overrides.summary_from_images {
            SummarySource::ImageTags
        } else {
            settings.defaults.summary_source
        };

        Ok(Self {
            namespaces,
            contexts,
            table: overrides.table || settings.defaults.table,
            output: overrides.output.unwrap_or(settings.defaults.output),
            summary_source,
        })
    }
}
