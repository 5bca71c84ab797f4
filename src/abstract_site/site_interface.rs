use async_trait::async_trait;

use crate::file_format::hierarchy::HierarchyForest;
use crate::file_format::implementors::ImplementorRecord;

pub type Result<T> = std::result::Result<T, SiteError>;

// JSON parse errors are sticky data problems.
impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> SiteError {
        SiteError::StickyProblem(ErrorDetails {
            layer: ErrorLayer::DataLayer,
            message: err.to_string(),
        })
    }
}

/// IO errors amount to a 404 for our purposes which means a sticky problem.
impl From<std::io::Error> for SiteError {
    fn from(err: std::io::Error) -> SiteError {
        SiteError::StickyProblem(ErrorDetails {
            layer: ErrorLayer::SiteLayer,
            message: err.to_string(),
        })
    }
}

/// Express whether the error seems to be happening in the tooling or in the
/// generated data.
#[derive(Debug)]
pub enum ErrorLayer {
    /// The request itself has structural issues, like an incorrectly
    /// constructed pipeline or a snapshot name that doesn't exist in the
    /// config.  This should not be used for cases where a lookup results in a
    /// miss (which should instead be part of the result payload), but is
    /// appropriate for cases where the input makes it impossible to return a
    /// hit or a miss.
    BadInput,
    /// The error seems to involve how we're accessing the snapshot (missing
    /// files, unreadable directories), so it may or may not be an issue with
    /// the generated data itself.
    SiteLayer,
    /// The error is in the generated navigation data in question: a malformed
    /// hierarchy or implementor literal, or a fragment-length arity mismatch.
    DataLayer,
    /// Something we believed was structurally impossible happened.
    RuntimeInvariantViolation,
    /// We're not sure if it was a tooling issue or a data issue.
    UnknownLayer,
}

/// SiteError payload to provide details about what went wrong for
/// investigation purposes.  In the future, this could wrap the underlying
/// errors we've seen.
#[derive(Debug)]
pub struct ErrorDetails {
    /// Attempt to distinguish failures due to tooling bugs from failures due
    /// to the documentation generator's output.
    pub layer: ErrorLayer,
    /// Stringified version of the lower level error.
    pub message: String,
}

/// Does a retry make sense or not?
///
/// Every dataset we consume is static output of a documentation generator
/// that is loaded exactly once, so in practice almost everything we produce
/// is sticky; the distinction is kept because it is load-bearing for callers
/// that schedule re-indexing.
#[derive(Debug)]
pub enum SiteError {
    /// An error that will persist for at least this snapshot.  For example a
    /// malformed hierarchy literal.
    StickyProblem(ErrorDetails),
    /// An error that might go away if retried later.  For example a snapshot
    /// directory that is still being written by the generator.
    TransientProblem(ErrorDetails),
    Unsupported,
}

/// Unified exposure for interacting with one generated documentation
/// snapshot's navigation data: its hierarchy forests (Doxygen `hierarchy.js`
/// style) and its implementor registrations (rustdoc `trait.impl` style).
///
/// Two snapshots of the same site are two separate `AbstractSite` instances;
/// their forests are overlapping-but-distinct versions and are never merged.
#[async_trait]
pub trait AbstractSite {
    /// The config name of the snapshot this site exposes.
    fn snapshot_name(&self) -> &str;

    /// Load and validate one hierarchy forest file, identified by its path
    /// relative to the snapshot root (ex: "hierarchy.js").  The file must
    /// exist; asking for an absent file by name is a caller mistake.
    async fn fetch_hierarchy(&self, nav_file: &str) -> Result<HierarchyForest>;

    /// Load every hierarchy forest file the snapshot's config lists,
    /// concatenating their roots in file order.  The generator only emits
    /// some of the configured files for a given project, so absent files
    /// contribute nothing rather than failing the fetch.
    async fn fetch_default_hierarchy(&self) -> Result<HierarchyForest>;

    /// Relative paths of every implementor registration file under the
    /// snapshot's trait.impl directory, in natural lexical order.
    async fn list_trait_impl_files(&self) -> Result<Vec<String>>;

    /// Load and parse one implementor registration file, identified by its
    /// path relative to the trait.impl directory.
    async fn fetch_trait_impl(&self, rel_path: &str) -> Result<ImplementorRecord>;
}
