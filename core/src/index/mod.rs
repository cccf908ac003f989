//! Disk-cached indexes of installable packages and container images
//!
//! Fetching an index is slow (an external command or a remote listing), so
//! completions only ever read the cached copy. A fetch is started in the
//! background when the cache is absent; [`InFlightGuard`] keeps at most one
//! fetch per cache running.

pub mod conda;
pub mod containers;

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CacheError;

pub use conda::CondaPackage;
pub use containers::ContainerImage;

/// Single-slot guard for an in-flight fetch
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot. Returns `None` if a fetch is already running.
    pub fn try_begin(&self) -> Option<FetchTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchTicket {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of a claimed fetch slot; releases the slot when dropped
#[derive(Debug)]
pub struct FetchTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for FetchTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Somewhere an index can be fetched from
pub trait IndexSource<T>: Send + Sync {
    fn fetch(&self) -> Result<Vec<T>, CacheError>;

    /// Short description for log messages
    fn describe(&self) -> String;
}

/// Runs an external command and parses its standard output
pub struct CommandSource<T> {
    command: Vec<String>,
    parse: fn(&str) -> Vec<T>,
}

impl<T> CommandSource<T> {
    pub fn new(command: Vec<String>, parse: fn(&str) -> Vec<T>) -> Self {
        Self { command, parse }
    }
}

impl<T> IndexSource<T> for CommandSource<T> {
    fn fetch(&self) -> Result<Vec<T>, CacheError> {
        let (program, args) = self.command.split_first().ok_or(CacheError::EmptyCommand)?;
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CacheError::Spawn {
                command: self.describe(),
                source,
            })?;
        if !output.status.success() {
            return Err(CacheError::CommandFailed {
                command: self.describe(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok((self.parse)(&String::from_utf8_lossy(&output.stdout)))
    }

    fn describe(&self) -> String {
        self.command.join(" ")
    }
}

/// A list of records persisted as one JSON blob in the cache directory
pub struct IndexCache<T> {
    path: PathBuf,
    guard: InFlightGuard,
    _records: PhantomData<fn() -> T>,
}

impl<T> Clone for IndexCache<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            guard: self.guard.clone(),
            _records: PhantomData,
        }
    }
}

impl<T> IndexCache<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Cache stored at `<cache_dir>/<name>.json`
    pub fn new(cache_dir: &Path, name: &str) -> Self {
        Self {
            path: cache_dir.join(format!("{name}.json")),
            guard: InFlightGuard::new(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last cached records, or `None` if nothing was cached yet.
    pub fn read_cache(&self) -> Result<Option<Vec<T>>, CacheError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CacheError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    pub fn store(&self, records: &[T]) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let blob = serde_json::to_vec(records)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, blob).map_err(io_err)?;
        fs::rename(&staging, &self.path).map_err(io_err)
    }

    /// Fetch from `source` and replace the cached blob. Blocks the caller.
    pub fn fetch_and_cache(&self, source: &dyn IndexSource<T>) -> Result<usize, CacheError> {
        let records = source.fetch()?;
        self.store(&records)?;
        info!(
            source = %source.describe(),
            count = records.len(),
            path = %self.path.display(),
            "index cached"
        );
        Ok(records.len())
    }

    pub fn try_begin_fetch(&self) -> Option<FetchTicket> {
        self.guard.try_begin()
    }

    pub fn is_fetching(&self) -> bool {
        self.guard.is_busy()
    }
}

impl<T> IndexCache<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Start a fetch on a background thread unless one is already running.
    ///
    /// Returns whether a fetch was started.
    pub fn spawn_fetch<S>(&self, source: S) -> bool
    where
        S: IndexSource<T> + 'static,
    {
        let Some(ticket) = self.try_begin_fetch() else {
            return false;
        };
        let cache = self.clone();
        thread::spawn(move || {
            let _ticket = ticket;
            if let Err(err) = cache.fetch_and_cache(&source) {
                warn!(source = %source.describe(), error = %err, "index fetch failed");
            }
        });
        true
    }
}

#[cfg(test)]
mod tests;
