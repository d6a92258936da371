use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::MorphologyError;
use crate::kernels::{kernel_size, Kernel, KernelShape};

/// A memoizing kernel builder keyed by `(shape, pixel extent)`.
///
/// Kernels depend only on their shape and pixel extent, so the cache hands out the
/// same [`Kernel`] that [`crate::get_kernel`] would build for any diameter. Entries
/// are written once and shared read-only afterwards, which makes the cache safe to
/// share across threads.
///
/// # Example
///
/// ```rust
/// use imageruler_morphology::{get_kernel, KernelCache, KernelShape};
///
/// let cache = KernelCache::new();
/// let a = cache.get(KernelShape::Disk, 4.0).unwrap();
/// let b = cache.get(KernelShape::Disk, 3.5).unwrap();
///
/// assert_eq!(*a, get_kernel(KernelShape::Disk, 4.0).unwrap());
/// assert_eq!(cache.hits(), 1);
/// assert_eq!(cache.misses(), 1);
/// # let _ = b;
/// ```
#[derive(Debug)]
pub struct KernelCache {
    enabled: bool,
    entries: RwLock<HashMap<(KernelShape, usize), Arc<Kernel>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for KernelCache {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelCache {
    /// Create an empty, enabled cache.
    pub fn new() -> Self {
        Self {
            enabled: true,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Create a cache that never stores anything and rebuilds every kernel.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Whether kernels are memoized.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the kernel for `shape` and `diameter`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::InvalidShapeParameter`] if `diameter` is not a
    /// positive finite number.
    pub fn get(&self, shape: KernelShape, diameter: f64) -> Result<Arc<Kernel>, MorphologyError> {
        let size = kernel_size(diameter)?;

        if !self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::new(Kernel::new(shape, size)?));
        }

        // a poisoned lock only means another reader panicked; the map itself is intact
        let cached = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(shape, size))
            .cloned();

        if let Some(kernel) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(kernel);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("building {shape} kernel of size {size}");

        let kernel = Arc::new(Kernel::new(shape, size)?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries.entry((shape, size)).or_insert(kernel).clone())
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that had to build a kernel.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of stored kernels.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no kernel is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored kernel and reset the counters.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
