//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dmsh/dmsh.toml`
//! 3. Local config: `<dir>/.dmsh.toml` (working directory by default)
//! 4. Environment variables: `DMSH_*` prefix (`__` separates sections,
//!    e.g. `DMSH_VIEW__DEFAULT_DEPTH`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::IdStrategy;

/// View rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewConfig {
    /// Emit ANSI colors (NO_COLOR still wins)
    pub color: bool,
    /// Levels shown by `tree` and `chart` when `--depth` is not given
    pub default_depth: Option<usize>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            color: true,
            default_depth: None,
        }
    }
}

/// Raw view config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawViewConfig {
    pub color: Option<bool>,
    pub default_depth: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub fixture: Option<PathBuf>,
    pub id_strategy: Option<IdStrategy>,
    pub id_prefix: Option<String>,
    pub view: RawViewConfig,
}

/// Unified configuration for dmsh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Hierarchy fixture (JSON); the built-in fixture is used when unset
    pub fixture: Option<PathBuf>,
    /// How ids of added nodes are generated
    pub id_strategy: IdStrategy,
    /// Prefix of generated ids (default: "new")
    pub id_prefix: String,
    /// View settings
    pub view: ViewConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fixture: None,
            id_strategy: IdStrategy::default(),
            id_prefix: "new".into(),
            view: ViewConfig::default(),
        }
    }
}

/// Get the XDG config directory for dmsh.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dmsh").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dmsh.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".dmsh.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(rest))
        .unwrap_or_else(|| path.to_path_buf())
}

impl Settings {
    /// Overlay wins where it specifies a value.
    ///
    /// A relative `fixture` is resolved against `base` (the config file's dir).
    fn merge_with(&self, overlay: &RawSettings, base: Option<&Path>) -> Self {
        let fixture = overlay.fixture.as_ref().map(|f| {
            let f = expand_tilde(f);
            match base {
                Some(dir) if f.is_relative() => dir.join(f),
                _ => f,
            }
        });
        Self {
            fixture: fixture.or_else(|| self.fixture.clone()),
            id_strategy: overlay.id_strategy.unwrap_or(self.id_strategy),
            id_prefix: overlay
                .id_prefix
                .clone()
                .unwrap_or_else(|| self.id_prefix.clone()),
            view: ViewConfig {
                color: overlay.view.color.unwrap_or(self.view.color),
                default_depth: overlay.view.default_depth.or(self.view.default_depth),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.dmsh.toml` (usually the cwd)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Same as [`Settings::load`] with an explicit global config path.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path.filter(|p| p.exists()) {
            debug!("load: global config {}", global_path.display());
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw, global_path.parent());
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("load: local config {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw, Some(dir));
            }
        }

        // 4. Environment variables (explicit override)
        current.with_env_vars(None)
    }

    /// Apply `DMSH_*` variables as explicit overrides.
    ///
    /// Reads `vars` when given, the process environment otherwise.
    /// `DMSH_ID_PREFIX` sets `id_prefix`, `DMSH_VIEW__COLOR` sets `view.color`.
    pub fn with_env_vars(
        mut self,
        vars: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DMSH")
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("fixture") {
            self.fixture = Some(expand_tilde(Path::new(&val)));
        }
        if let Ok(val) = config.get_string("id_strategy") {
            self.id_strategy = match val.to_ascii_lowercase().as_str() {
                "uuid" => IdStrategy::Uuid,
                "sequence" => IdStrategy::Sequence,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("DMSH_ID_STRATEGY: unknown strategy '{}'", other),
                    })
                }
            };
        }
        if let Ok(val) = config.get_string("id_prefix") {
            self.id_prefix = val;
        }
        if let Ok(val) = config.get_bool("view.color") {
            self.view.color = val;
        }
        if let Ok(val) = config.get::<usize>("view.default_depth") {
            self.view.default_depth = Some(val);
        }

        self.check()
    }

    fn check(self) -> Result<Self, ApplicationError> {
        if self.view.default_depth == Some(0) {
            return Err(ApplicationError::Config {
                message: "view.default_depth must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    /// TOML template with the default values, for `config init`.
    pub fn template() -> Result<String, ApplicationError> {
        let body = toml::to_string_pretty(&Self::default()).map_err(|e| {
            ApplicationError::Config {
                message: e.to_string(),
            }
        })?;
        Ok(format!(
            "# dmsh configuration\n# fixture = \"hierarchy.json\"\n\n{}",
            body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_overlay_when_merging_then_specified_values_win() {
        let raw = RawSettings {
            id_prefix: Some("node".into()),
            view: RawViewConfig {
                default_depth: Some(2),
                ..RawViewConfig::default()
            },
            ..RawSettings::default()
        };
        let merged = Settings::default().merge_with(&raw, None);
        assert_eq!(merged.id_prefix, "node");
        assert_eq!(merged.view.default_depth, Some(2));
        assert!(merged.view.color);
        assert_eq!(merged.id_strategy, IdStrategy::Uuid);
    }

    #[test]
    fn given_relative_fixture_when_merging_then_resolved_against_base() {
        let raw = RawSettings {
            fixture: Some(PathBuf::from("data/h.json")),
            ..RawSettings::default()
        };
        let merged = Settings::default().merge_with(&raw, Some(Path::new("/srv/dms")));
        assert_eq!(merged.fixture, Some(PathBuf::from("/srv/dms/data/h.json")));
    }

    #[test]
    fn given_template_when_parsed_then_round_trips_defaults() {
        let template = Settings::template().unwrap();
        let parsed: Settings = toml::from_str(&template).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
