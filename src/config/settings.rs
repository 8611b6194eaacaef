//! Configuration file support for kube-versions

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,

    /// Ordered namespace table; the order drives report and table column order
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<NamespaceEntry>,
}

/// Default values for report runs
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Defaults {
    #[serde(default)]
    pub output: OutputFormat,

    /// Use table mode without passing --table
    #[serde(default)]
    pub table: bool,

    #[serde(default)]
    pub summary_source: SummarySource,

    /// Optional kubeconfig path. KUBECONFIG and --kubeconfig take precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,
}

/// One configured namespace
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Regex on pod names; pods that do not match are ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl NamespaceEntry {
    fn new(name: &str, display_name: &str, filter: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            display_name: Some(display_name.to_string()),
            filter: filter.map(str::to_string),
        }
    }
}

/// Output rendering
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the per-namespace distinct version summary comes from
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SummarySource {
    /// Distinct values of the per-pod resolved versions
    #[default]
    Resolved,
    /// Distinct version-looking image tags, ignoring labels and owners
    ImageTags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            namespaces: default_namespaces(),
        }
    }
}

fn default_namespaces() -> Vec<NamespaceEntry> {
    vec![
        NamespaceEntry::new(
            "kube-system",
            "Kube System",
            Some("coredns|aws-node|kube-proxy"),
        ),
        NamespaceEntry::new("ingress-nginx", "Ingress NGINX", None),
        NamespaceEntry::new("cert-manager", "Cert Manager", None),
        NamespaceEntry::new("external-dns", "External DNS", None),
        NamespaceEntry::new("csi-drivers", "CSI Drivers", Some("csi-nfs|csi-efs")),
    ]
}

impl Settings {
    /// Load settings from an explicit path, the standard locations, or defaults
    ///
    /// An explicit path that fails to load is an error; a broken file found in
    /// a standard location falls back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::find_config_file() {
            Some(path) => match Self::load_from_file(&path) {
                Ok(settings) => {
                    crate::log_debug!("Loaded settings from {}", path.display());
                    Ok(settings)
                }
                Err(e) => {
                    crate::log_warn!("Ignoring config file: {:#}", e);
                    Ok(Self::default())
                }
            },
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .kube-versions.toml in current directory
    /// 2. ~/.config/kube-versions/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(".kube-versions.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("kube-versions").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Generate example config file content
    pub fn example_config() -> Result<String> {
        let header = "# kube-versions configuration file\n\
                      # Place this file at ~/.config/kube-versions/config.toml or .kube-versions.toml in your project\n\n";

        let body = toml::to_string_pretty(&Settings::default())
            .context("Failed to serialize example settings")?;

        Ok(format!("{}{}", header, body))
    }
}
