//! Version-surface reference snapshots.
//!
//! A snapshot lists what one library version offers. It only feeds the
//! judge prompt; checks never consult it.

use crate::config::EvalConfig;
use crate::errors::ReferenceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionSurface {
    pub library: String,
    pub version: String,
    pub available_apis: Vec<String>,
    pub unavailable_apis: Vec<String>,
    pub hooks: Vec<String>,
    pub types: Vec<String>,
    /// Import path -> names exported from it.
    pub import_paths: BTreeMap<String, Vec<String>>,
    pub notes: Vec<String>,
}

impl VersionSurface {
    pub fn is_empty(&self) -> bool {
        self.available_apis.is_empty()
            && self.unavailable_apis.is_empty()
            && self.hooks.is_empty()
            && self.types.is_empty()
            && self.import_paths.is_empty()
            && self.notes.is_empty()
    }
}

/// Loads `<references[library]>/<version>.json`.
///
/// `Ok(None)` when no directory is configured for the library.
pub fn load_reference(
    cfg: &EvalConfig,
    library: &str,
    version: &str,
) -> Result<Option<VersionSurface>, ReferenceError> {
    let Some(dir) = cfg.references.get(library) else {
        tracing::debug!(library, "no reference directory configured");
        return Ok(None);
    };
    let path: PathBuf = dir.join(format!("{}.json", version));
    if !path.exists() {
        return Err(ReferenceError::NotFound {
            library: library.to_string(),
            version: version.to_string(),
            path,
        });
    }
    let raw = std::fs::read_to_string(&path).map_err(|source| ReferenceError::Io {
        path: path.clone(),
        source,
    })?;
    let mut surface: VersionSurface =
        serde_json::from_str(&raw).map_err(|source| ReferenceError::Parse {
            path: path.clone(),
            source,
        })?;
    if surface.library.is_empty() {
        surface.library = library.to_string();
    }
    if surface.version.is_empty() {
        surface.version = version.to_string();
    }
    Ok(Some(surface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_with(library: &str, dir: PathBuf) -> EvalConfig {
        let mut cfg = EvalConfig::default();
        cfg.references.insert(library.to_string(), dir);
        cfg
    }

    #[test]
    fn unconfigured_library_has_no_reference() {
        let cfg = EvalConfig::default();
        assert_eq!(load_reference(&cfg, "next", "15.0.0").unwrap(), None);
    }

    #[test]
    fn loads_and_fills_identity() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join("15.0.0.json"),
            r#"{"available_apis": ["after"], "import_paths": {"next/server": ["after", "NextResponse"]}}"#,
        )
        .unwrap();
        let surface = load_reference(&config_with("next", tmp.path().to_path_buf()), "next", "15.0.0")
            .unwrap()
            .unwrap();
        assert_eq!(surface.library, "next");
        assert_eq!(surface.version, "15.0.0");
        assert_eq!(surface.import_paths["next/server"].len(), 2);
    }

    #[test]
    fn configured_but_missing_version() {
        let tmp = tempdir().unwrap();
        let err = load_reference(&config_with("next", tmp.path().to_path_buf()), "next", "9.9.9")
            .unwrap_err();
        assert!(matches!(err, ReferenceError::NotFound { .. }));
    }

    #[test]
    fn malformed_snapshot() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("1.0.0.json"), "{ nope").unwrap();
        let err = load_reference(&config_with("zod", tmp.path().to_path_buf()), "zod", "1.0.0")
            .unwrap_err();
        assert!(matches!(err, ReferenceError::Parse { .. }));
    }
}
