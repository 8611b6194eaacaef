//! Configuration management for kube-versions

pub mod namespaces;
pub mod settings;

pub use namespaces::{ContextSelection, NamespaceFilter, NamespaceSpec, Overrides, ReportConfig};
pub use settings::{OutputFormat, Settings, SummarySource};
