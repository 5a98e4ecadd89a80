//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/phylodemo/phylodemo.toml`
//! 3. Local config: `./.phylodemo.toml` or an explicit `--config` file
//! 4. Environment variables: `PHYLODEMO_*` prefix
//!
//! Command-line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Default sample count.
pub const DEFAULT_SAMPLES: i64 = 24;
/// Default Newick output path.
pub const DEFAULT_TREE_OUT: &str = "demo_tree.nwk";
/// Default metadata output path.
pub const DEFAULT_METADATA_OUT: &str = "demo_metadata.csv";
/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PHYLODEMO";
/// Local config file name.
pub const LOCAL_CONFIG_FILE: &str = ".phylodemo.toml";

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub samples: Option<i64>,
    pub ultrametric: Option<bool>,
    pub seed: Option<i64>,
    pub tree_out: Option<PathBuf>,
    pub metadata_out: Option<PathBuf>,
}

/// Effective generator configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Settings {
    /// Number of samples (tree leaves); values below 2 are rejected at generation
    pub samples: i64,
    /// Force equal root-to-leaf distances
    pub ultrametric: bool,
    /// Random seed; unset means a fresh seed per run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Newick output path
    pub tree_out: PathBuf,
    /// Metadata CSV output path
    pub metadata_out: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            ultrametric: false,
            seed: None,
            tree_out: PathBuf::from(DEFAULT_TREE_OUT),
            metadata_out: PathBuf::from(DEFAULT_METADATA_OUT),
        }
    }
}

/// Get the XDG config directory for phylodemo.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "phylodemo").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("phylodemo.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Expand `~`, `$VAR` and `${VAR}`; returns the input unchanged if expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
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

impl Settings {
    /// Expand shell variables and tilde in the output paths.
    fn expand_paths(&mut self) {
        self.tree_out = PathBuf::from(expand_env_vars(&self.tree_out.to_string_lossy()));
        self.metadata_out = PathBuf::from(expand_env_vars(&self.metadata_out.to_string_lossy()));
    }

    /// Overlay wins for every field it specifies.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            samples: overlay.samples.unwrap_or(self.samples),
            ultrametric: overlay.ultrametric.unwrap_or(self.ultrametric),
            seed: overlay.seed.or(self.seed),
            tree_out: overlay
                .tree_out
                .clone()
                .unwrap_or_else(|| self.tree_out.clone()),
            metadata_out: overlay
                .metadata_out
                .clone()
                .unwrap_or_else(|| self.metadata_out.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file (must exist); without it
    ///   `./.phylodemo.toml` is used when present
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let local = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Some(local_config_path(Path::new("."))),
        };
        Self::load_from(
            global_config_path().as_deref(),
            local.as_deref(),
            Environment::with_prefix(ENV_PREFIX),
        )
    }

    /// Load from explicit sources; missing files are skipped.
    pub fn load_from(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global.filter(|p| p.exists()) {
            current = current.merge_with(&load_raw_settings(global_path)?);
        }

        // 3. Local config
        if let Some(local_path) = local.filter(|p| p.exists()) {
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply PHYLODEMO_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            samples: lookup(&config, "samples")?,
            ultrametric: lookup(&config, "ultrametric")?,
            seed: lookup(&config, "seed")?,
            tree_out: lookup::<String>(&config, "tree_out")?.map(PathBuf::from),
            metadata_out: lookup::<String>(&config, "metadata_out")?.map(PathBuf::from),
        };
        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        format!(
            r#"# phylodemo configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/phylodemo/phylodemo.toml
#   Local:  ./{LOCAL_CONFIG_FILE} (or --config <file>)
#   Env:    {ENV_PREFIX}_* environment variables (e.g. {ENV_PREFIX}_SAMPLES=48)
#   Flags:  command-line options win over everything

# Number of samples (tree leaves), at least 2
# samples = {DEFAULT_SAMPLES}

# Pad terminal branches so all leaves are equidistant from the root
# ultrametric = false

# Random seed for reproducible output (unset: new tree every run)
# seed = 42

# Output files (~ and $VAR are expanded)
# tree_out = "{DEFAULT_TREE_OUT}"
# metadata_out = "{DEFAULT_METADATA_OUT}"
"#
        )
    }
}

/// Typed value for `key`, `None` if the source does not define it.
fn lookup<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn given_no_sources_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None, env(&[])).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.samples, 24);
        assert!(!settings.ultrametric);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.tree_out, PathBuf::from("demo_tree.nwk"));
        assert_eq!(settings.metadata_out, PathBuf::from("demo_metadata.csv"));
    }

    #[test]
    fn given_global_and_local_when_loading_then_local_wins() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let local = temp.path().join("local.toml");
        std::fs::write(&global, "samples = 10\nseed = 1\n").unwrap();
        std::fs::write(&local, "samples = 12\nultrametric = true\n").unwrap();

        let settings = Settings::load_from(Some(&global), Some(&local), env(&[])).unwrap();

        assert_eq!(settings.samples, 12);
        assert_eq!(settings.seed, Some(1));
        assert!(settings.ultrametric);
    }

    #[test]
    fn given_env_vars_when_loading_then_they_override_files() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("local.toml");
        std::fs::write(&local, "samples = 12\ntree_out = \"a.nwk\"\n").unwrap();

        let settings = Settings::load_from(
            None,
            Some(&local),
            env(&[
                ("PHYLODEMO_SAMPLES", "30"),
                ("PHYLODEMO_SEED", "7"),
                ("PHYLODEMO_TREE_OUT", "b.nwk"),
                ("PHYLODEMO_ULTRAMETRIC", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.samples, 30);
        assert_eq!(settings.seed, Some(7));
        assert!(settings.ultrametric);
        assert_eq!(settings.tree_out, PathBuf::from("b.nwk"));
    }

    #[test]
    fn given_negative_seed_in_file_and_env_when_loading_then_accepted() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("local.toml");
        std::fs::write(&local, "seed = -5\nsamples = -1\n").unwrap();

        let from_file = Settings::load_from(None, Some(&local), env(&[])).unwrap();
        assert_eq!(from_file.seed, Some(-5));
        assert_eq!(from_file.samples, -1);

        let from_env = Settings::load_from(None, None, env(&[("PHYLODEMO_SEED", "-9")])).unwrap();
        assert_eq!(from_env.seed, Some(-9));
    }

    #[test]
    fn given_malformed_env_value_when_loading_then_errors() {
        let result = Settings::load_from(None, None, env(&[("PHYLODEMO_SAMPLES", "many")]));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_invalid_toml_when_loading_then_config_error_names_file() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("broken.toml");
        std::fs::write(&local, "samples = [").unwrap();

        let err = Settings::load_from(None, Some(&local), env(&[])).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn given_missing_explicit_config_when_loading_then_errors() {
        let result = Settings::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_env_var_in_path_when_expand_paths_then_expands_variable() {
        let home = std::env::var("HOME").unwrap_or_default();
        let mut settings = Settings {
            tree_out: PathBuf::from("~/trees/demo.nwk"),
            ..Settings::default()
        };
        settings.expand_paths();
        if !home.is_empty() {
            assert_eq!(settings.tree_out, PathBuf::from(format!("{home}/trees/demo.nwk")));
        }
        assert_eq!(settings.metadata_out, PathBuf::from("demo_metadata.csv"));
    }

    #[test]
    fn given_settings_when_serializing_then_roundtrips_through_raw() {
        let settings = Settings {
            seed: Some(42),
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.samples.is_none());
    }
}
