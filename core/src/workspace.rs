//! Workspace-wide lookups
//!
//! Finding which file defines a process or workflow: first through the
//! include statement of the calling script, then by walking the workspace.
//! Walk order is not specified, so when several files define the same name
//! any of them may be returned.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::channels::BlockSummary;
use crate::config::WorkspaceConfig;
use crate::error::{ScanError, ScanResult};
use crate::include::{find_include_path, include_suffix, include_target, resolve_alias};

/// A block found somewhere in the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBlock {
    pub path: PathBuf,
    pub summary: BlockSummary,
}

/// A project root and the file conventions used inside it
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: WorkspaceConfig,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: WorkspaceConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// All workflow scripts under the root
    pub fn nf_files(&self) -> Vec<PathBuf> {
        self.files_with_extension(&self.config.nf_extension)
    }

    /// All Nextflow config files under the root
    pub fn config_files(&self) -> Vec<PathBuf> {
        self.files_with_extension(&self.config.config_extension)
    }

    pub fn params_config_path(&self) -> PathBuf {
        self.root.join(&self.config.params_config)
    }

    pub fn params_schema_path(&self) -> PathBuf {
        self.root.join(&self.config.params_schema)
    }

    /// `path` relative to the root, or unchanged if it lies outside it
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// Find the block a script refers to as `name`.
    ///
    /// Aliases are resolved first. If the script includes the name, the
    /// include path is tried relative to the script, then as a suffix of any
    /// workspace file. Without an include, every workflow script is searched.
    pub fn locate_block(
        &self,
        script: &Path,
        script_text: &str,
        name: &str,
    ) -> ScanResult<Option<LocatedBlock>> {
        let name = resolve_alias(script_text, name);

        if let Some(include) = find_include_path(script_text, &name) {
            let script_dir = script.parent().unwrap_or(&self.root);
            let target = include_target(script_dir, &include);
            if target.is_file() {
                return self.summarise(&target, &name);
            }

            debug!(include = %include, "include target missing, searching workspace");
            let suffix = include_suffix(&include);
            let Some(candidate) = self.nf_files().into_iter().find(|p| p.ends_with(&suffix))
            else {
                return Ok(None);
            };
            return self.summarise(&candidate, &name);
        }

        for path in self.nf_files() {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable file");
                    continue;
                }
            };
            if let Some(summary) = BlockSummary::from_text(&text, &name) {
                if !summary.is_empty() {
                    return Ok(Some(LocatedBlock { path, summary }));
                }
            }
        }
        Ok(None)
    }

    fn summarise(&self, path: &Path, name: &str) -> ScanResult<Option<LocatedBlock>> {
        let text = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Ok(BlockSummary::from_text(&text, name).map(|summary| LocatedBlock {
            path: path.to_path_buf(),
            summary,
        }))
    }

    fn files_with_extension(&self, extension: &str) -> Vec<PathBuf> {
        WalkBuilder::new(&self.root)
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "workspace walk error");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == extension))
            .collect()
    }
}
