//! Configuration loading
//!
//! `defaults/nfscope.default.toml` is embedded into every binary. A
//! `nfscope.toml` in the workspace root, `NFSCOPE_*` environment variables and
//! explicit overrides are layered on top, in that order.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;

const DEFAULT_TOML: &str = include_str!("../defaults/nfscope.default.toml");

/// File name looked up in the workspace root
pub const WORKSPACE_CONFIG_FILE: &str = "nfscope.toml";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NfscopeConfig {
    pub workspace: WorkspaceConfig,
    pub cache: CacheConfig,
    pub indexes: IndexConfig,
}

/// File naming conventions inside a workspace
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceConfig {
    pub nf_extension: String,
    pub config_extension: String,
    pub params_config: String,
    pub params_schema: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            nf_extension: "nf".to_string(),
            config_extension: "config".to_string(),
            params_config: "nextflow.config".to_string(),
            params_schema: "nextflow_schema.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub dir: String,
}

impl CacheConfig {
    /// The configured directory, or `<user cache dir>/nfscope`.
    pub fn resolve_dir(&self, workspace_root: &Path) -> PathBuf {
        if !self.dir.is_empty() {
            return PathBuf::from(&self.dir);
        }
        dirs::cache_dir()
            .map(|dir| dir.join("nfscope"))
            .unwrap_or_else(|| workspace_root.join(".nfscope-cache"))
    }
}

/// External commands backing the package and container indexes
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    pub conda_command: Vec<String>,
    pub container_listing_command: Vec<String>,
    pub singularity_base_url: String,
    pub docker_base_url: String,
}

/// Layers configuration sources over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer `nfscope.toml` from the workspace root, if present.
    pub fn with_workspace(self, root: impl AsRef<Path>) -> Self {
        self.with_optional_file(root.as_ref().join(WORKSPACE_CONFIG_FILE))
    }

    /// Layer a configuration file that must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `NFSCOPE_SECTION__KEY` environment variables. Index commands
    /// are split on spaces.
    pub fn with_env(mut self) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix("NFSCOPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(" ")
                .with_list_parse_key("indexes.conda_command")
                .with_list_parse_key("indexes.container_listing_command"),
        );
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<NfscopeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<NfscopeConfig, ConfigError> {
    Loader::new().build()
}

/// Defaults, then the workspace file, then the environment.
pub fn load_for_workspace(root: impl AsRef<Path>) -> Result<NfscopeConfig, ConfigError> {
    Loader::new().with_workspace(root).with_env().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_embedded_toml() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.workspace, WorkspaceConfig::default());
        assert_eq!(config.indexes.conda_command, vec!["conda", "search"]);
        assert_eq!(config.indexes.docker_base_url, "quay.io/biocontainers/");
        assert!(config.cache.dir.is_empty());
    }

    #[test]
    fn test_workspace_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(WORKSPACE_CONFIG_FILE),
            "[workspace]\nparams_config = \"conf/base.config\"\n",
        )
        .unwrap();

        let config = Loader::new().with_workspace(dir.path()).build().unwrap();
        assert_eq!(config.workspace.params_config, "conf/base.config");
        assert_eq!(config.workspace.nf_extension, "nf");
    }

    #[test]
    fn test_missing_workspace_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Loader::new().with_workspace(dir.path()).build().unwrap();
        assert_eq!(config.workspace, WorkspaceConfig::default());
    }

    #[test]
    fn test_required_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let result = Loader::new().with_file(dir.path().join("absent.toml")).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Loader::new()
            .set_override("cache.dir", "/tmp/nfscope-test")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(
            config.cache.resolve_dir(Path::new("/work")),
            PathBuf::from("/tmp/nfscope-test")
        );
    }

    #[test]
    fn test_env_splits_commands_and_keeps_strings() {
        std::env::set_var("NFSCOPE_INDEXES__CONDA_COMMAND", "mamba search --json");
        std::env::set_var("NFSCOPE_CACHE__DIR", "/tmp/nfscope-env-cache");
        let result = Loader::new().with_env().build();
        std::env::remove_var("NFSCOPE_INDEXES__CONDA_COMMAND");
        std::env::remove_var("NFSCOPE_CACHE__DIR");

        let config = result.expect("env config to build");
        assert_eq!(config.indexes.conda_command, vec!["mamba", "search", "--json"]);
        assert_eq!(config.cache.dir, "/tmp/nfscope-env-cache");
    }
}
