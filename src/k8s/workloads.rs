//! Owning workload kinds and their version labels

use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::str::FromStr;

/// Labels that carry a workload version, in priority order
pub const VERSION_LABELS: [&str; 2] = ["app.kubernetes.io/version", "version"];

/// Annotation consulted after the pod labels
pub const VERSION_ANNOTATION: &str = "app.kubernetes.io/version";

/// First non-empty version label
pub fn version_label(labels: &BTreeMap<String, String>) -> Option<String> {
    VERSION_LABELS
        .iter()
        .filter_map(|key| labels.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Workload kinds whose labels can be looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OwnerKind {
    ReplicaSet,
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
}

impl FromStr for OwnerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ReplicaSet" => Ok(OwnerKind::ReplicaSet),
            "Deployment" => Ok(OwnerKind::Deployment),
            "StatefulSet" => Ok(OwnerKind::StatefulSet),
            "DaemonSet" => Ok(OwnerKind::DaemonSet),
            "Job" => Ok(OwnerKind::Job),
            other => Err(format!("Unsupported owner kind: {}", other)),
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            OwnerKind::ReplicaSet => "ReplicaSet",
            OwnerKind::Deployment => "Deployment",
            OwnerKind::StatefulSet => "StatefulSet",
            OwnerKind::DaemonSet => "DaemonSet",
            OwnerKind::Job => "Job",
        };
        write!(f, "{}", kind)
    }
}

/// Fetch the labels of an owning workload
pub async fn owner_labels(
    client: &Client,
    namespace: &str,
    kind: OwnerKind,
    name: &str,
) -> Result<BTreeMap<String, String>, kube::Error> {
    match kind {
        OwnerKind::ReplicaSet => labels_of::<ReplicaSet>(client, namespace, name).await,
        OwnerKind::Deployment => labels_of::<Deployment>(client, namespace, name).await,
        OwnerKind::StatefulSet => labels_of::<StatefulSet>(client, namespace, name).await,
        OwnerKind::DaemonSet => labels_of::<DaemonSet>(client, namespace, name).await,
        OwnerKind::Job => labels_of::<Job>(client, namespace, name).await,
    }
}

// Metadata-only GET; the spec and status of the workload are never needed
async fn labels_of<K>(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<BTreeMap<String, String>, kube::Error>
where
    K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    <K as Resource>::DynamicType: Default,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let partial = api.get_metadata(name).await?;
    Ok(partial.metadata.labels.unwrap_or_default())
}
