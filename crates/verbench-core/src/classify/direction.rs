//! Version-direction resolution for failures that could point either way.

use crate::model::{HallucinationKind, TaskCategory};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Phrases marking an API as belonging to an older release.
    static ref OLDER_HINT: Regex = Regex::new(
        r"(?i)\b(deprecated|removed|legacy|outdated|obsolete|older|old|no longer|prior to|pre-v?\d|earlier|previous(ly)?|replaced by|and below|or below)\b"
    )
    .unwrap();
    /// Phrases marking an API as belonging to a newer release.
    static ref NEWER_HINT: Regex = Regex::new(
        r"(?i)(\b(newer|future|not yet|not available|introduced in|added in|new in|upcoming|unreleased|later|or above|and above)\b|\bsince v?\d|\d\+)"
    )
    .unwrap();
}

/// Direction implied by a piece of text; older hints win over newer ones.
pub fn hinted_kind(text: &str) -> Option<HallucinationKind> {
    if OLDER_HINT.is_match(text) {
        Some(HallucinationKind::OutdatedApi)
    } else if NEWER_HINT.is_match(text) {
        Some(HallucinationKind::FutureApi)
    } else {
        None
    }
}

/// True when `fingerprint` mentions `api`, or the last segment of a dotted
/// or path-like `api`, case-insensitively.
pub fn mentions(fingerprint: &str, api: &str) -> bool {
    let fp = fingerprint.to_lowercase();
    let api = api
        .trim()
        .trim_start_matches('<')
        .trim_end_matches("/>")
        .trim_end_matches('>')
        .trim_end_matches("()")
        .trim()
        .to_lowercase();
    if api.is_empty() {
        return false;
    }
    if fp.contains(&api) {
        return true;
    }
    api.rsplit(['.', '/'])
        .next()
        .filter(|last| !last.is_empty() && *last != api)
        .is_some_and(|last| fp.contains(last))
}

/// Resolves a present-but-unwanted API: fingerprints mentioning it, then
/// the other fingerprints, then the failure message, then the task category.
pub fn resolve(
    api: Option<&str>,
    message: &str,
    fingerprints: &[String],
    category: TaskCategory,
) -> HallucinationKind {
    let names_api = |fp: &String| api.is_some_and(|api| mentions(fp, api));
    let (naming, others): (Vec<&String>, Vec<&String>) =
        fingerprints.iter().partition(|fp| names_api(*fp));
    if let Some(kind) = naming.into_iter().chain(others).find_map(|fp| hinted_kind(fp)) {
        return kind;
    }
    if let Some(kind) = hinted_kind(message) {
        return kind;
    }
    match category {
        TaskCategory::BleedingEdge => HallucinationKind::OutdatedApi,
        TaskCategory::VersionLockedWrite => HallucinationKind::FutureApi,
        TaskCategory::VersionLockedAudit => HallucinationKind::VersionMismatch,
    }
}
