//! Kubernetes operations

pub mod cluster;
pub mod kubeconfig;
pub mod pods;
pub mod workloads;

#[cfg(test)]
pub mod fake;

pub use cluster::{ClusterApi, ContextSession, KubeCluster};
pub use pods::{OwnerRef, PodRecord};
pub use workloads::OwnerKind;
