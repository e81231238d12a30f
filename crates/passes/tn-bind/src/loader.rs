//! Memoized package loading
//!
//! Every distinct import path is loaded at most once per [`PackageLoader`].
//! The first request creates a one-shot slot for the path and, with eager
//! loading, starts the load on a background thread; every later request gets
//! a handle to the same slot. [`LoadHandle::value`] blocks until the load has
//! completed and returns the shared result, so all importers observe the
//! identical `Arc<Package>` or the identical error.

use crate::package::Package;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread;

/// Failure to load a package, shared by every importer of the path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// No package exists at the path
    #[error("cannot find package {path:?}")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// The package exists but could not be loaded
    #[error("package {path:?} is broken: {message}")]
    Broken {
        /// Requested path
        path: String,
        /// Why loading failed
        message: String,
    },
}

/// Where packages come from
///
/// Implementations are called from loader threads and must not call back into
/// the same [`PackageLoader`] for the path being loaded.
pub trait PackageSource: Send + Sync {
    /// Loads the package at a normalized import path
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the package does not exist or is unusable.
    fn load(&self, import_path: &str) -> Result<Package, LoadError>;
}

impl<F> PackageSource for F
where
    F: Fn(&str) -> Result<Package, LoadError> + Send + Sync,
{
    fn load(&self, import_path: &str) -> Result<Package, LoadError> {
        self(import_path)
    }
}

/// Packages held in memory, keyed by import path
#[derive(Debug, Default)]
pub struct MemorySource {
    packages: FxHashMap<String, Package>,
    loads: Mutex<FxHashMap<String, usize>>,
}

impl MemorySource {
    /// Creates an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package under its own import path
    #[must_use]
    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.insert(package.import_path.clone(), package);
        self
    }

    /// How many times `import_path` has been loaded from this source
    pub fn load_count(&self, import_path: &str) -> usize {
        self.loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(import_path)
            .copied()
            .unwrap_or_default()
    }
}

impl PackageSource for MemorySource {
    fn load(&self, import_path: &str) -> Result<Package, LoadError> {
        *self
            .loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(import_path.to_owned())
            .or_default() += 1;
        self.packages
            .get(import_path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: import_path.to_owned(),
            })
    }
}

type LoadResult = Result<Arc<Package>, LoadError>;

#[derive(Debug)]
struct LoadSlot {
    path: String,
    result: OnceLock<LoadResult>,
}

/// Handle to the single load of one import path
#[derive(Clone)]
pub struct LoadHandle {
    slot: Arc<LoadSlot>,
    source: Arc<dyn PackageSource>,
}

impl LoadHandle {
    /// Normalized import path being loaded
    pub fn path(&self) -> &str {
        &self.slot.path
    }

    /// Whether the load has completed
    pub fn is_ready(&self) -> bool {
        self.slot.result.get().is_some()
    }

    /// Waits for the load and returns its result
    ///
    /// Runs the load on the calling thread if no other thread has started it.
    ///
    /// # Errors
    ///
    /// Returns the [`LoadError`] every importer of this path observes.
    pub fn value(&self) -> LoadResult {
        self.slot
            .result
            .get_or_init(|| {
                tracing::debug!(path = %self.slot.path, "loading package");
                self.source.load(&self.slot.path).map(Arc::new)
            })
            .clone()
    }

    /// Whether two handles refer to the same load
    pub fn same_load(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl std::fmt::Debug for LoadHandle {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoadHandle")
            .field("path", &self.slot.path)
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Session-wide cache of package loads, keyed by import path
pub struct PackageLoader {
    source: Arc<dyn PackageSource>,
    slots: Mutex<FxHashMap<String, Arc<LoadSlot>>>,
    eager: bool,
}

impl PackageLoader {
    /// Creates a loader over `source`; `eager` starts loads in the background
    /// as soon as they are requested
    pub fn new(source: Arc<dyn PackageSource>, eager: bool) -> Self {
        Self {
            source,
            slots: Mutex::new(FxHashMap::default()),
            eager,
        }
    }

    /// Requests the package at `import_path`
    pub fn load(&self, import_path: &str) -> LoadHandle {
        let (slot, fresh) = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = slots.get(import_path) {
                (Arc::clone(slot), false)
            } else {
                let slot = Arc::new(LoadSlot {
                    path: import_path.to_owned(),
                    result: OnceLock::new(),
                });
                slots.insert(import_path.to_owned(), Arc::clone(&slot));
                (slot, true)
            }
        };

        let handle = LoadHandle {
            slot,
            source: Arc::clone(&self.source),
        };
        if fresh && self.eager {
            Self::start(handle.clone());
        }
        handle
    }

    fn start(handle: LoadHandle) {
        let path = handle.path().to_owned();
        let spawned = thread::Builder::new()
            .name(format!("load {path}"))
            .spawn(move || {
                if let Err(error) = handle.value() {
                    tracing::debug!(path = handle.path(), %error, "background load failed");
                }
            });
        if let Err(error) = spawned {
            tracing::warn!(%path, %error, "could not start background load, loading on demand");
        }
    }

    /// Number of distinct paths requested so far
    pub fn requested(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl std::fmt::Debug for PackageLoader {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PackageLoader")
            .field("requested", &self.requested())
            .field("eager", &self.eager)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_same_path_loads_once() {
        let source = Arc::new(MemorySource::new().with_package(Package::new("fmt", "fmt", "lib/fmt")));
        let loader = PackageLoader::new(Arc::clone(&source) as Arc<dyn PackageSource>, false);

        let first = loader.load("fmt");
        let second = loader.load("fmt");
        assert!(first.same_load(&second));
        assert!(!first.is_ready());

        let left = first.value().unwrap();
        let right = second.value().unwrap();
        assert!(Arc::ptr_eq(&left, &right));
        assert_eq!(source.load_count("fmt"), 1);
        assert_eq!(loader.requested(), 1);
    }

    #[test]
    fn test_failure_reaches_every_waiter() {
        let source = Arc::new(MemorySource::new());
        let loader = PackageLoader::new(Arc::clone(&source) as Arc<dyn PackageSource>, true);

        let expected = LoadError::NotFound {
            path: "missing".to_owned(),
        };
        assert_eq!(loader.load("missing").value().unwrap_err(), expected);
        assert_eq!(loader.load("missing").value().unwrap_err(), expected);
        assert_eq!(source.load_count("missing"), 1);
    }

    #[test]
    fn test_concurrent_requests_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = move |path: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok::<_, LoadError>(Package::new("slow", path, "lib/slow"))
        };
        let loader = Arc::new(PackageLoader::new(Arc::new(source), true));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                thread::spawn(move || loader.load("example.com/slow").value().unwrap())
            })
            .collect();
        let packages: Vec<Arc<Package>> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(packages.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(packages[0].import_path, "example.com/slow");
    }

    #[test]
    fn test_distinct_paths_load_separately() {
        let source = Arc::new(
            MemorySource::new()
                .with_package(Package::new("a", "x/a", "x/a"))
                .with_package(Package::new("b", "x/b", "x/b")),
        );
        let loader = PackageLoader::new(Arc::clone(&source) as Arc<dyn PackageSource>, true);

        let first = loader.load("x/a");
        let second = loader.load("x/b");
        assert!(!first.same_load(&second));
        assert_eq!(first.value().unwrap().name, "a");
        assert_eq!(second.value().unwrap().name, "b");
        assert!(first.is_ready());
        assert_eq!(loader.requested(), 2);
    }
}
