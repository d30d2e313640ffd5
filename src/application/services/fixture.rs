//! Fixture store
//!
//! Loads the initial forest from a JSON fixture and writes edited forests back.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Forest;
use crate::infrastructure::traits::FileSystem;

/// Fixture compiled into the binary, used when no fixture path is configured.
pub const BUILTIN_FIXTURE: &str = include_str!("../../../fixtures/hierarchy.json");

/// Non-fatal problem found in a loaded forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureIssue {
    DuplicateId { id: String, count: usize },
    BlankId { name: String },
    BlankName { id: String },
}

impl fmt::Display for FixtureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureIssue::DuplicateId { id, count } => {
                write!(f, "duplicate id '{}' ({} nodes)", id, count)
            }
            FixtureIssue::BlankId { name } => write!(f, "node '{}' has a blank id", name),
            FixtureIssue::BlankName { id } => write!(f, "node '{}' has a blank name", id),
        }
    }
}

/// Service for reading and writing hierarchy fixtures.
pub struct FixtureService {
    fs: Arc<dyn FileSystem>,
}

impl FixtureService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a forest from a JSON fixture file.
    ///
    /// Issues found by [`FixtureService::check`] are logged, not rejected.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Forest> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::Fixture {
                path: path.to_path_buf(),
                message: "not a file".into(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read fixture", path)?;
        let forest = parse(&content, path)?;
        debug!("load: {} nodes in {} roots", forest.node_count(), forest.roots().len());
        for issue in Self::check(&forest) {
            warn!("{}: {}", path.display(), issue);
        }
        Ok(forest)
    }

    /// Load the fixture shipped with the crate.
    pub fn load_builtin() -> ApplicationResult<Forest> {
        parse(BUILTIN_FIXTURE, Path::new("<builtin>"))
    }

    /// Write `forest` as pretty JSON.
    ///
    /// Writes to a sibling temp file first and renames it over `path`.
    /// The temp file is removed again when the rename fails.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn save(&self, path: &Path, forest: &Forest) -> ApplicationResult<()> {
        let json = to_json(forest)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent dir", path)?;
        let tmp = tmp_path(path);
        self.fs
            .write(&tmp, &json)
            .with_path_context("write fixture", &tmp)?;
        if let Err(e) = self.fs.rename(&tmp, path) {
            if let Err(cleanup) = self.fs.remove_file(&tmp) {
                warn!("save: cannot remove {}: {}", tmp.display(), cleanup);
            }
            return Err::<(), _>(e).with_path_context("replace fixture", path);
        }
        Ok(())
    }

    /// Report duplicate ids and blank ids/names.
    pub fn check(forest: &Forest) -> Vec<FixtureIssue> {
        let mut issues: Vec<FixtureIssue> = forest
            .duplicate_ids()
            .into_iter()
            .map(|(id, count)| FixtureIssue::DuplicateId { id, count })
            .collect();
        for (_, node) in forest.iter() {
            if node.id.trim().is_empty() {
                issues.push(FixtureIssue::BlankId {
                    name: node.name.clone(),
                });
            }
            if node.name.trim().is_empty() {
                issues.push(FixtureIssue::BlankName {
                    id: node.id.clone(),
                });
            }
        }
        issues
    }
}

/// Serialize a forest the way fixtures are stored (pretty, trailing newline).
pub fn to_json(forest: &Forest) -> ApplicationResult<String> {
    serde_json::to_string_pretty(forest)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| ApplicationError::OperationFailed {
            context: "serialize forest".into(),
            source: Box::new(e),
        })
}

fn parse(content: &str, path: &Path) -> ApplicationResult<Forest> {
    serde_json::from_str(content).map_err(|e| ApplicationError::Fixture {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_builtin_fixture_when_loaded_then_parses_without_issues() {
        let forest = FixtureService::load_builtin().unwrap();
        assert_eq!(forest.roots().len(), 3);
        assert!(forest.contains("mdl-avanza"));
        assert!(FixtureService::check(&forest).is_empty());
    }

    #[test]
    fn given_malformed_json_when_parsed_then_fixture_error() {
        let err = parse("[{\"id\": 1}]", Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, ApplicationError::Fixture { .. }));
        assert!(err.to_string().starts_with("invalid fixture bad.json"));
    }

    #[test]
    fn given_path_when_tmp_path_then_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/h.json")),
            PathBuf::from("/data/h.json.tmp")
        );
    }
}
