//! Workload version resolution

pub mod resolver;
pub mod summary;

pub use resolver::{
    NOT_AVAILABLE, OwnerVersionCache, ResolvedVersion, UNKNOWN, VersionResolver, VersionSource,
    image_tag_version, resolve,
};
pub use summary::distinct_versions;
