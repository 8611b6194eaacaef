//! Pod records extracted from batched pod lists

use k8s_openapi::api::core::v1::Pod;

use crate::k8s::workloads::{VERSION_ANNOTATION, version_label};

/// Owner reference of a pod, as reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

/// Version-relevant fields of one pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRecord {
    pub name: String,
    pub owner: Option<OwnerRef>,
    pub label_version: Option<String>,
    pub annotation_version: Option<String>,
    pub image: Option<String>,
}

impl PodRecord {
    pub fn from_pod(pod: &Pod) -> Self {
        let meta = &pod.metadata;

        let label_version = meta.labels.as_ref().and_then(version_label);

        let annotation_version = meta
            .annotations
            .as_ref()
            .and_then(|a| a.get(VERSION_ANNOTATION))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        // Prefer the controller reference; fall back to the first owner
        let owner = meta.owner_references.as_ref().and_then(|refs| {
            refs.iter()
                .find(|r| r.controller == Some(true))
                .or_else(|| refs.first())
                .map(|r| OwnerRef {
                    kind: r.kind.clone(),
                    name: r.name.clone(),
                })
        });

        let image = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.containers.first())
            .and_then(|c| c.image.clone());

        Self {
            name: meta.name.clone().unwrap_or_default(),
            owner,
            label_version,
            annotation_version,
            image,
        }
    }
}
