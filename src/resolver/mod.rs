//! Survey version resolution
//!
//! Matches a submitted response to the schema version it was answered
//! against. The reported version id wins when it is known; otherwise the
//! submission timestamp is matched against the publish windows in tiers:
//!
//! 1. the nearest preceding version that was still active at submission
//! 2. the nearest following version (answered against a version that replaced
//!    an unknown earlier one)
//! 3. the nearest preceding version even though it was already unpublished
//!
//! Versions with `published == 0` never take part in timestamp matching.
//! Ties on `published` go to the version that comes first in the input.

use tracing::{debug, warn};

use crate::models::SurveyVersionPreview;

/// Error during version resolution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("No survey version found for reported id '{reported}' submitted at {submitted_at}")]
    VersionNotFound { reported: String, submitted_at: i64 },
}

/// How a version was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The reported version id exists
    ExactId,
    /// Nearest preceding version, active at submission
    Active,
    /// Fallback: earliest version published after submission
    NearestFollowing,
    /// Fallback: nearest preceding version that was already unpublished
    LastPreceding,
}

impl Resolution {
    /// Whether the match came from one of the fallback tiers
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::NearestFollowing | Resolution::LastPreceding)
    }
}

/// A resolved version together with the tier that produced it
#[derive(Debug, Clone, Copy)]
pub struct ResolvedVersion<'a> {
    pub version: &'a SurveyVersionPreview,
    pub resolution: Resolution,
}

/// Resolve the version a response was answered against.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::models::SurveyVersionPreview;
/// use survey_export_sdk::resolver::resolve;
///
/// let versions = vec![
///     SurveyVersionPreview::new("v1", 100, 200),
///     SurveyVersionPreview::new("v2", 200, 0),
/// ];
/// assert_eq!(resolve("", 150, &versions).unwrap().version_id, "v1");
/// assert_eq!(resolve("", 250, &versions).unwrap().version_id, "v2");
/// assert_eq!(resolve("", 50, &versions).unwrap().version_id, "v1");
/// ```
pub fn resolve<'a>(
    reported_version_id: &str,
    submitted_at: i64,
    versions: &'a [SurveyVersionPreview],
) -> Result<&'a SurveyVersionPreview, ResolveError> {
    resolve_with_tier(reported_version_id, submitted_at, versions).map(|r| r.version)
}

/// Like [`resolve`], also reporting which tier matched
pub fn resolve_with_tier<'a>(
    reported_version_id: &str,
    submitted_at: i64,
    versions: &'a [SurveyVersionPreview],
) -> Result<ResolvedVersion<'a>, ResolveError> {
    if !reported_version_id.is_empty() {
        if let Some(version) = versions.iter().find(|v| v.version_id == reported_version_id) {
            return Ok(ResolvedVersion {
                version,
                resolution: Resolution::ExactId,
            });
        }
        warn!(
            reported = reported_version_id,
            submitted_at, "Reported survey version not found, resolving by timestamp"
        );
    }

    let published = || versions.iter().filter(|v| v.published != 0);

    // Still active at submission, preferring strictly open windows over a
    // window that closed exactly at submission time
    let active = first_max_by_key(
        published().filter(|v| {
            v.published <= submitted_at && (v.unpublished == 0 || v.unpublished >= submitted_at)
        }),
        |v| (v.is_active_at(submitted_at), v.published),
    );
    if let Some(version) = active {
        debug!(version_id = %version.version_id, submitted_at, "Resolved active survey version");
        return Ok(ResolvedVersion {
            version,
            resolution: Resolution::Active,
        });
    }

    let following = first_max_by_key(
        published().filter(|v| v.published >= submitted_at),
        |v| std::cmp::Reverse(v.published),
    );
    if let Some(version) = following {
        warn!(
            version_id = %version.version_id,
            submitted_at, "No active survey version, using nearest following version"
        );
        return Ok(ResolvedVersion {
            version,
            resolution: Resolution::NearestFollowing,
        });
    }

    let preceding = first_max_by_key(
        published().filter(|v| v.published <= submitted_at),
        |v| v.published,
    );
    if let Some(version) = preceding {
        warn!(
            version_id = %version.version_id,
            unpublished = version.unpublished,
            submitted_at,
            "No active survey version, using last unpublished version"
        );
        return Ok(ResolvedVersion {
            version,
            resolution: Resolution::LastPreceding,
        });
    }

    Err(ResolveError::VersionNotFound {
        reported: reported_version_id.to_string(),
        submitted_at,
    })
}

/// Maximum by key where ties keep the first element seen
fn first_max_by_key<'a, I, K, F>(iter: I, key: F) -> Option<&'a SurveyVersionPreview>
where
    I: Iterator<Item = &'a SurveyVersionPreview>,
    K: Ord,
    F: Fn(&SurveyVersionPreview) -> K,
{
    let mut best: Option<(K, &'a SurveyVersionPreview)> = None;
    for version in iter {
        let k = key(version);
        match &best {
            Some((best_key, _)) if k <= *best_key => {}
            _ => best = Some((k, version)),
        }
    }
    best.map(|(_, version)| version)
}
