//! Package and container indexes shared by the completion providers and the
//! fetch commands.

use std::path::Path;

use nfscope_core::config::IndexConfig;
use nfscope_core::index::{conda, containers, CommandSource, CondaPackage, ContainerImage, IndexCache};
use nfscope_core::CacheError;
use tracing::{info, warn};

/// A corrupt blob counts as missing and is replaced by the next fetch
fn cached_or_fetch<T>(
    cached: Result<Option<Vec<T>>, CacheError>,
    fetch: impl FnOnce() -> bool,
) -> Result<Option<Vec<T>>, CacheError> {
    let cached = match cached {
        Err(CacheError::Decode { path, source }) => {
            warn!(path = %path.display(), error = %source, "discarding corrupt index cache");
            None
        }
        other => other?,
    };
    if cached.is_none() {
        fetch();
    }
    Ok(cached)
}

pub struct Indexes {
    conda: IndexCache<CondaPackage>,
    containers: IndexCache<ContainerImage>,
    config: IndexConfig,
}

impl Indexes {
    pub fn new(cache_dir: &Path, config: IndexConfig) -> Self {
        Self {
            conda: IndexCache::new(cache_dir, conda::CACHE_NAME),
            containers: IndexCache::new(cache_dir, containers::CACHE_NAME),
            config,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Cached packages. Starts a background fetch when nothing usable is
    /// cached.
    pub fn conda_packages(&self) -> Result<Option<Vec<CondaPackage>>, CacheError> {
        cached_or_fetch(self.conda.read_cache(), || self.fetch_conda())
    }

    /// Cached images. Starts a background fetch when nothing usable is
    /// cached.
    pub fn container_images(&self) -> Result<Option<Vec<ContainerImage>>, CacheError> {
        cached_or_fetch(self.containers.read_cache(), || self.fetch_containers())
    }

    /// Refresh the package index in the background; `false` if a fetch is
    /// already running.
    pub fn fetch_conda(&self) -> bool {
        let started = self.conda.spawn_fetch(CommandSource::new(
            self.config.conda_command.clone(),
            conda::parse_search_output,
        ));
        if started {
            info!(path = %self.conda.path().display(), "fetching conda index");
        }
        started
    }

    /// Refresh the container index in the background; `false` if a fetch is
    /// already running.
    pub fn fetch_containers(&self) -> bool {
        let started = self.containers.spawn_fetch(CommandSource::new(
            self.config.container_listing_command.clone(),
            containers::parse_listing,
        ));
        if started {
            info!(path = %self.containers.path().display(), "fetching container index");
        }
        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_corrupt_cache_starts_fetch() {
        let fetched = Cell::new(false);
        let corrupt = CacheError::Decode {
            path: "conda_search.json".into(),
            source: serde_json::from_str::<Vec<u8>>("not json").unwrap_err(),
        };
        let cached: Option<Vec<u8>> =
            cached_or_fetch(Err(corrupt), || fetched.replace(true)).unwrap();
        assert!(cached.is_none());
        assert!(fetched.get());
    }

    #[test]
    fn test_cached_records_skip_fetch() {
        let fetched = Cell::new(false);
        let cached = cached_or_fetch(Ok(Some(vec![1u8])), || fetched.replace(true)).unwrap();
        assert_eq!(cached, Some(vec![1]));
        assert!(!fetched.get());
    }

    #[test]
    fn test_io_errors_still_surface() {
        let err = CacheError::Io {
            path: "conda_search.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(cached_or_fetch::<u8>(Err(err), || true).is_err());
    }
}
