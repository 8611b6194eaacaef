//! Cluster access seam used by the reporters
//!
//! `ClusterApi` enumerates contexts and opens a `ContextSession` per context.
//! The session exposes the three calls the reporters make: namespace
//! existence, a batched pod list, and owner label lookups.

use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::collections::BTreeMap;

use crate::k8s::kubeconfig;
use crate::k8s::pods::PodRecord;
use crate::k8s::workloads::{self, OwnerKind};
use crate::utils::errors::{ReportError, classify_kube_error};

/// Source of cluster contexts
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    type Session: ContextSession;

    /// Context names, in kubeconfig order
    fn contexts(&self) -> Vec<String>;

    /// Open and probe a context; an error means the context is inaccessible
    async fn connect(&self, context: &str) -> Result<Self::Session, ReportError>;
}

/// Calls against one reachable context
#[allow(async_fn_in_trait)]
pub trait ContextSession {
    fn context(&self) -> &str;

    async fn namespace_exists(&self, namespace: &str) -> Result<bool, ReportError>;

    /// One list call per namespace
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, ReportError>;

    /// Labels of the workload owning a pod
    async fn owner_labels(
        &self,
        namespace: &str,
        kind: OwnerKind,
        name: &str,
    ) -> Result<BTreeMap<String, String>, ReportError>;
}

/// `ClusterApi` backed by a kubeconfig and the kube client
pub struct KubeCluster {
    kubeconfig: Kubeconfig,
}

impl KubeCluster {
    pub fn new(kubeconfig: Kubeconfig) -> Self {
        Self { kubeconfig }
    }

    pub fn kubeconfig(&self) -> &Kubeconfig {
        &self.kubeconfig
    }
}

impl ClusterApi for KubeCluster {
    type Session = KubeSession;

    fn contexts(&self) -> Vec<String> {
        kubeconfig::context_names(&self.kubeconfig)
    }

    async fn connect(&self, context: &str) -> Result<KubeSession, ReportError> {
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            ..Default::default()
        };

        let config = Config::from_custom_kubeconfig(self.kubeconfig.clone(), &options)
            .await
            .map_err(|e| ReportError::context_unreachable(context, &e.to_string()))?;

        let client =
            Client::try_from(config).map_err(|e| classify_kube_error(context, &e))?;

        let info = client
            .apiserver_version()
            .await
            .map_err(|e| classify_kube_error(context, &e))?;
        crate::log_debug!("Context {} reachable (server {})", context, info.git_version);

        Ok(KubeSession {
            context: context.to_string(),
            client,
        })
    }
}

/// Connected context
pub struct KubeSession {
    context: String,
    client: Client,
}

impl ContextSession for KubeSession {
    fn context(&self) -> &str {
        &self.context
    }

    async fn namespace_exists(&self, namespace: &str) -> Result<bool, ReportError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get_opt(namespace)
            .await
            .map(|ns| ns.is_some())
            .map_err(|e| {
                ReportError::lookup_failure(&format!("namespace {}", namespace), &e.to_string())
            })
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, ReportError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default()).await.map_err(|e| {
            ReportError::lookup_failure(&format!("pods in {}", namespace), &e.to_string())
        })?;
        crate::log_debug!(
            "{}/{}: fetched {} pods",
            self.context,
            namespace,
            pods.items.len()
        );
        Ok(pods.items.iter().map(PodRecord::from_pod).collect())
    }

    async fn owner_labels(
        &self,
        namespace: &str,
        kind: OwnerKind,
        name: &str,
    ) -> Result<BTreeMap<String, String>, ReportError> {
        workloads::owner_labels(&self.client, namespace, kind, name)
            .await
            .map_err(|e| ReportError::lookup_failure(&format!("{}/{}", kind, name), &e.to_string()))
    }
}
