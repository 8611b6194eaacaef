//! In-memory cluster used by reporter tests

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::k8s::cluster::{ClusterApi, ContextSession};
use crate::k8s::pods::{OwnerRef, PodRecord};
use crate::k8s::workloads::OwnerKind;
use crate::utils::errors::ReportError;

/// Calls observed across all sessions
#[derive(Debug, Default)]
pub struct CallLog {
    pub connects: Vec<String>,
    pub pod_lists: Vec<(String, String)>,
    pub owner_lookups: Vec<(String, OwnerKind, String)>,
}

/// Contents of one reachable context
#[derive(Debug, Default, Clone)]
pub struct FakeContext {
    pub namespaces: BTreeMap<String, Vec<PodRecord>>,
    pub owners: BTreeMap<(OwnerKind, String), BTreeMap<String, String>>,
    pub failing_owners: Vec<String>,
}

impl FakeContext {
    pub fn namespace(mut self, name: &str, pods: Vec<PodRecord>) -> Self {
        self.namespaces.insert(name.to_string(), pods);
        self
    }

    pub fn owner(mut self, kind: OwnerKind, name: &str, labels: &[(&str, &str)]) -> Self {
        let labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.owners.insert((kind, name.to_string()), labels);
        self
    }

    pub fn failing_owner(mut self, name: &str) -> Self {
        self.failing_owners.push(name.to_string());
        self
    }
}

/// Contexts in order; `None` marks an unreachable context
#[derive(Default)]
pub struct FakeCluster {
    contexts: Vec<(String, Option<Rc<FakeContext>>)>,
    pub calls: Rc<RefCell<CallLog>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reachable(mut self, name: &str, context: FakeContext) -> Self {
        self.contexts.push((name.to_string(), Some(Rc::new(context))));
        self
    }

    pub fn unreachable(mut self, name: &str) -> Self {
        self.contexts.push((name.to_string(), None));
        self
    }

    pub fn owner_lookups(&self) -> usize {
        self.calls.borrow().owner_lookups.len()
    }
}

impl ClusterApi for FakeCluster {
    type Session = FakeSession;

    fn contexts(&self) -> Vec<String> {
        self.contexts.iter().map(|(name, _)| name.clone()).collect()
    }

    async fn connect(&self, context: &str) -> Result<FakeSession, ReportError> {
        self.calls.borrow_mut().connects.push(context.to_string());
        match self.contexts.iter().find(|(name, _)| name == context) {
            Some((_, Some(data))) => Ok(FakeSession {
                context: context.to_string(),
                data: Rc::clone(data),
                calls: Rc::clone(&self.calls),
            }),
            Some((_, None)) => Err(ReportError::context_unreachable(context, "connection refused")),
            None => Err(ReportError::unknown_context(context)),
        }
    }
}

pub struct FakeSession {
    context: String,
    data: Rc<FakeContext>,
    calls: Rc<RefCell<CallLog>>,
}

impl ContextSession for FakeSession {
    fn context(&self) -> &str {
        &self.context
    }

    async fn namespace_exists(&self, namespace: &str) -> Result<bool, ReportError> {
        Ok(self.data.namespaces.contains_key(namespace))
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, ReportError> {
        self.calls
            .borrow_mut()
            .pod_lists
            .push((self.context.clone(), namespace.to_string()));
        Ok(self.data.namespaces.get(namespace).cloned().unwrap_or_default())
    }

    async fn owner_labels(
        &self,
        _namespace: &str,
        kind: OwnerKind,
        name: &str,
    ) -> Result<BTreeMap<String, String>, ReportError> {
        self.calls
            .borrow_mut()
            .owner_lookups
            .push((self.context.clone(), kind, name.to_string()));
        if self.data.failing_owners.iter().any(|n| n == name) {
            return Err(ReportError::lookup_failure(name, "forbidden"));
        }
        Ok(self
            .data
            .owners
            .get(&(kind, name.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Pod record builder for tests
pub struct PodBuilder {
    record: PodRecord,
}

impl PodBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            record: PodRecord {
                name: name.to_string(),
                owner: None,
                label_version: None,
                annotation_version: None,
                image: None,
            },
        }
    }

    pub fn owner(mut self, kind: &str, name: &str) -> Self {
        self.record.owner = Some(OwnerRef {
            kind: kind.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn label(mut self, version: &str) -> Self {
        self.record.label_version = Some(version.to_string());
        self
    }

    pub fn annotation(mut self, version: &str) -> Self {
        self.record.annotation_version = Some(version.to_string());
        self
    }

    pub fn image(mut self, image: &str) -> Self {
        self.record.image = Some(image.to_string());
        self
    }

    pub fn build(self) -> PodRecord {
        self.record
    }
}
