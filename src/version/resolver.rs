//! Per-pod version resolution
//!
//! Priority, first non-empty wins:
//! 1. pod label `app.kubernetes.io/version`, then pod label `version`
//! 2. pod annotation `app.kubernetes.io/version`
//! 3. the owning workload's version labels (one lookup per owner, memoized)
//! 4. a version-looking tag at the end of the container image reference
//! 5. `unknown`

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::k8s::cluster::ContextSession;
use crate::k8s::pods::PodRecord;
use crate::k8s::workloads::{OwnerKind, version_label};

/// Sentinel for a pod whose version cannot be determined
pub const UNKNOWN: &str = "unknown";

/// Sentinel for a table cell with no resolvable pod
pub const NOT_AVAILABLE: &str = "N/A";

static IMAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[:@](v?\d+(?:\.\d+)+(?:-[0-9A-Za-z][0-9A-Za-z.-]*)?|latest)$")
        .expect("image tag pattern is valid")
});

/// Version-looking tag of an image reference, e.g. `v1.2.3-rc1` or `latest`
pub fn image_tag_version(image: &str) -> Option<String> {
    IMAGE_TAG
        .captures(image.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Which step of the priority chain produced a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    PodLabel,
    PodAnnotation,
    OwnerLabel,
    ImageTag,
    Unknown,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self {
            VersionSource::PodLabel => "pod-label",
            VersionSource::PodAnnotation => "pod-annotation",
            VersionSource::OwnerLabel => "owner-label",
            VersionSource::ImageTag => "image-tag",
            VersionSource::Unknown => "-",
        };
        write!(f, "{}", source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub source: VersionSource,
}

impl ResolvedVersion {
    fn new(version: impl Into<String>, source: VersionSource) -> Self {
        Self {
            version: version.into(),
            source,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, VersionSource::Unknown)
    }

    pub fn is_known(&self) -> bool {
        self.source != VersionSource::Unknown
    }
}

/// Owner versions for one (context, namespace) pass
///
/// Empty strings are cached as well, so a failing owner is asked only once.
#[derive(Debug, Default)]
pub struct OwnerVersionCache {
    entries: HashMap<(OwnerKind, String), String>,
}

impl OwnerVersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: OwnerKind, name: &str) -> Option<&str> {
        self.entries
            .get(&(kind, name.to_string()))
            .map(String::as_str)
    }

    /// Write-once: an existing entry is never replaced
    pub fn insert(&mut self, kind: OwnerKind, name: &str, version: String) -> &str {
        self.entries
            .entry((kind, name.to_string()))
            .or_insert(version)
            .as_str()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves pod versions within one namespace of one context
pub struct VersionResolver<'a, S: ContextSession> {
    session: &'a S,
    namespace: &'a str,
    cache: OwnerVersionCache,
}

impl<'a, S: ContextSession> VersionResolver<'a, S> {
    pub fn new(session: &'a S, namespace: &'a str) -> Self {
        Self {
            session,
            namespace,
            cache: OwnerVersionCache::new(),
        }
    }

    pub fn cache(&self) -> &OwnerVersionCache {
        &self.cache
    }

    pub async fn resolve(&mut self, pod: &PodRecord) -> ResolvedVersion {
        resolve(self.session, self.namespace, &mut self.cache, pod).await
    }
}

/// Resolve one pod's version; never fails
pub async fn resolve<S: ContextSession>(
    session: &S,
    namespace: &str,
    cache: &mut OwnerVersionCache,
    pod: &PodRecord,
) -> ResolvedVersion {
    if let Some(version) = non_empty(pod.label_version.as_deref()) {
        return ResolvedVersion::new(version, VersionSource::PodLabel);
    }

    if let Some(version) = non_empty(pod.annotation_version.as_deref()) {
        return ResolvedVersion::new(version, VersionSource::PodAnnotation);
    }

    if let Some(version) = owner_version(session, namespace, cache, pod).await {
        return ResolvedVersion::new(version, VersionSource::OwnerLabel);
    }

    if let Some(version) = pod.image.as_deref().and_then(image_tag_version) {
        return ResolvedVersion::new(version, VersionSource::ImageTag);
    }

    ResolvedVersion::unknown()
}

async fn owner_version<S: ContextSession>(
    session: &S,
    namespace: &str,
    cache: &mut OwnerVersionCache,
    pod: &PodRecord,
) -> Option<String> {
    let owner = pod.owner.as_ref()?;
    let kind = owner.kind.parse::<OwnerKind>().ok()?;

    if let Some(cached) = cache.get(kind, &owner.name) {
        return non_empty(Some(cached)).map(str::to_string);
    }

    let version = match session.owner_labels(namespace, kind, &owner.name).await {
        Ok(labels) => version_label(&labels).unwrap_or_default(),
        Err(e) => {
            crate::log_debug!("{}: {}", session.context(), e);
            String::new()
        }
    };

    non_empty(Some(cache.insert(kind, &owner.name, version))).map(str::to_string)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
