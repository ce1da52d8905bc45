use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::{stats::StockRecord, store::SqliteStore};

/// Shared snapshot of the full stock set. Stats endpoints aggregate over an
/// immutable `Arc` they take at request start, so a concurrent refresh never
/// mutates a list mid-aggregation; readers just keep the older snapshot.
#[derive(Clone, Default)]
pub struct SnapshotState {
    inner: Arc<RwLock<Arc<Vec<StockRecord>>>>,
}

impl SnapshotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Arc<Vec<StockRecord>> {
        self.inner.read().clone()
    }

    /// Re-read the full record set from the store. Called at startup, after
    /// every admin mutation, and from the periodic refresh task.
    pub fn refresh(&self, store: &SqliteStore) -> Result<usize> {
        let records = store.fetch_all_stocks()?;
        let n = records.len();
        *self.inner.write() = Arc::new(records);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> SqliteStore {
        let path = std::env::temp_dir().join(format!("uwtrack-snap-{}.sqlite", Uuid::new_v4()));
        let store = SqliteStore::new(path.to_str().unwrap()).unwrap();
        store.init_db().unwrap();
        store
    }

    #[test]
    fn refresh_replaces_snapshot_without_touching_old_readers() {
        let store = temp_store();
        let snap = SnapshotState::new();
        assert!(snap.load().is_empty());

        store
            .upsert_stock(&StockRecord {
                id: "s1".to_string(),
                code: "ABCD".to_string(),
                date: "2024-01-01".to_string(),
                uw: "UW1".to_string(),
                float_pct: None,
                d1: Some(1.0),
                d2: None,
                d3: None,
                d4: None,
                d5: None,
                d6: None,
                d7: None,
            })
            .unwrap();

        let before = snap.load();
        assert_eq!(snap.refresh(&store).unwrap(), 1);
        // The old handle still sees the pre-refresh view.
        assert!(before.is_empty());
        assert_eq!(snap.load().len(), 1);
    }
}
