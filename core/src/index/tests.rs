use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use super::*;

struct FixedSource(Vec<CondaPackage>);

impl IndexSource<CondaPackage> for FixedSource {
    fn fetch(&self) -> Result<Vec<CondaPackage>, CacheError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

/// Blocks inside `fetch` until the test lets it go
struct GatedSource {
    entered: mpsc::Sender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl IndexSource<CondaPackage> for GatedSource {
    fn fetch(&self) -> Result<Vec<CondaPackage>, CacheError> {
        let _ = self.entered.send(());
        let _ = self.release.lock().unwrap().recv();
        Ok(vec![package("gated")])
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

fn package(name: &str) -> CondaPackage {
    CondaPackage {
        name: name.to_string(),
        version: "1.0".to_string(),
        build: "0".to_string(),
        channel: "bioconda".to_string(),
    }
}

fn wait_until_idle(cache: &IndexCache<CondaPackage>) {
    for _ in 0..200 {
        if !cache.is_fetching() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("fetch did not finish");
}

// ============================================================================
// InFlightGuard
// ============================================================================

#[test]
fn test_guard_allows_one_ticket() {
    let guard = InFlightGuard::new();
    let ticket = guard.try_begin().expect("slot should be free");
    assert!(guard.is_busy());
    assert!(guard.try_begin().is_none());

    drop(ticket);
    assert!(!guard.is_busy());
    assert!(guard.try_begin().is_some());
}

#[test]
fn test_guard_is_shared_between_clones() {
    let guard = InFlightGuard::new();
    let other = guard.clone();
    let _ticket = guard.try_begin().unwrap();
    assert!(other.try_begin().is_none());
}

// ============================================================================
// IndexCache
// ============================================================================

#[test]
fn test_read_absent_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache: IndexCache<CondaPackage> = IndexCache::new(dir.path(), conda::CACHE_NAME);
    assert_eq!(cache.read_cache().unwrap(), None);
}

#[test]
fn test_store_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let cache = IndexCache::new(&dir.path().join("nested"), conda::CACHE_NAME);
    cache.store(&[package("fastqc"), package("multiqc")]).unwrap();

    let records = cache.read_cache().unwrap().unwrap();
    assert_eq!(records, vec![package("fastqc"), package("multiqc")]);
    assert!(cache.path().ends_with("nested/conda_search.json"));
}

#[test]
fn test_corrupt_cache_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let cache: IndexCache<CondaPackage> = IndexCache::new(dir.path(), conda::CACHE_NAME);
    fs::write(cache.path(), b"not json").unwrap();
    assert!(matches!(cache.read_cache(), Err(CacheError::Decode { .. })));
}

#[test]
fn test_fetch_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = IndexCache::new(dir.path(), conda::CACHE_NAME);
    let count = cache
        .fetch_and_cache(&FixedSource(vec![package("salmon")]))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(cache.read_cache().unwrap(), Some(vec![package("salmon")]));
}

#[test]
fn test_spawn_fetch_runs_once_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let cache = IndexCache::new(dir.path(), conda::CACHE_NAME);

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let source = GatedSource {
        entered: entered_tx,
        release: Mutex::new(release_rx),
    };

    assert!(cache.spawn_fetch(source));
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!(cache.is_fetching());
    assert!(!cache.spawn_fetch(FixedSource(vec![package("other")])));

    release_tx.send(()).unwrap();
    wait_until_idle(&cache);
    assert_eq!(cache.read_cache().unwrap(), Some(vec![package("gated")]));
    assert!(cache.try_begin_fetch().is_some());
}

// ============================================================================
// CommandSource
// ============================================================================

#[test]
fn test_empty_command() {
    let source = CommandSource::new(Vec::new(), conda::parse_search_output);
    assert!(matches!(source.fetch(), Err(CacheError::EmptyCommand)));
}

#[test]
fn test_missing_program() {
    let source = CommandSource::new(
        vec!["nfscope-no-such-program".to_string(), "search".to_string()],
        conda::parse_search_output,
    );
    let err = source.fetch().unwrap_err();
    assert!(matches!(err, CacheError::Spawn { .. }));
    assert!(err.to_string().contains("nfscope-no-such-program search"));
}
