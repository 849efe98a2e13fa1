use std::sync::{Arc, Mutex, OnceLock};

use super::error::DataSourceError;
use super::loader::{self, SnapshotSources};
use super::model::CombinedDataset;

// ---------------------------------------------------------------------------
// DatasetCache – write-once holder of the combined dataset
// ---------------------------------------------------------------------------

/// Owns the snapshot locations and the combined dataset built from them.
///
/// The first successful [`get_or_load`](Self::get_or_load) reads both
/// sources; every later call returns the same `Arc` without touching the
/// filesystem. Concurrent first callers are serialized so only one load
/// runs. Failures are not stored, there is no invalidation.
#[derive(Debug)]
pub struct DatasetCache {
    sources: SnapshotSources,
    dataset: OnceLock<Arc<CombinedDataset>>,
    load_lock: Mutex<()>,
}

impl DatasetCache {
    pub fn new(sources: SnapshotSources) -> Self {
        Self {
            sources,
            dataset: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    pub fn sources(&self) -> &SnapshotSources {
        &self.sources
    }

    /// Whether a dataset has been loaded already.
    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    pub fn get_or_load(&self) -> Result<Arc<CombinedDataset>, DataSourceError> {
        if let Some(ds) = self.dataset.get() {
            return Ok(Arc::clone(ds));
        }

        // A poisoned lock only means another loader panicked; the cell is
        // still consistent.
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(ds) = self.dataset.get() {
            return Ok(Arc::clone(ds));
        }

        let (first, second) = loader::load(&self.sources)?;
        let dataset = CombinedDataset::from_snapshots(first, second);
        log::info!(
            "Combined dataset: {} listings, {} cities, {} room types, price bounds {}..={}",
            dataset.len(),
            dataset.cities.len(),
            dataset.room_types.len(),
            dataset.price_bounds.min,
            dataset.price_bounds.max
        );

        Ok(Arc::clone(self.dataset.get_or_init(|| Arc::new(dataset))))
    }
}
