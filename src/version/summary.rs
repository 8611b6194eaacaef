//! Distinct-version summaries for a namespace

use std::collections::BTreeSet;

use crate::config::settings::SummarySource;
use crate::k8s::pods::PodRecord;
use crate::version::resolver::{ResolvedVersion, image_tag_version};

/// Distinct versions across already-filtered pods
///
/// `Resolved` reuses the per-pod results so the summary always agrees with
/// the rows; `ImageTags` only looks at image references.
pub fn distinct_versions(
    source: SummarySource,
    pods: &[(PodRecord, ResolvedVersion)],
) -> BTreeSet<String> {
    match source {
        SummarySource::Resolved => pods
            .iter()
            .map(|(_, resolved)| resolved.version.clone())
            .collect(),
        SummarySource::ImageTags => pods
            .iter()
            .filter_map(|(pod, _)| pod.image.as_deref())
            .filter_map(image_tag_version)
            .collect(),
    }
}
