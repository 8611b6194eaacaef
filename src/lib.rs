//! kube-versions - report workload versions across Kubernetes contexts

pub mod commands;
pub mod config;
pub mod k8s;
pub mod utils;
pub mod version;
