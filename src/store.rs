use crate::{
    db,
    error::StoreError,
    selection::Selection,
    types::{ArtifactFilter, ArtifactRecord, ArtifactSort},
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

type ChangeCallback = Box<dyn FnMut() + Send>;

/// Durable, deduplicated storage for generated artifacts.
///
/// The store owns the only mutation path to the underlying SQLite database;
/// everything else reads through a [`LiveQuery`] or the convenience getters.
/// At most one record exists per caption: [`save()`](Self::save) is an
/// atomic check-and-insert, and saving an already-stored caption is a
/// defined no-op rather than an error.
///
/// Construct the store once at startup and hand an `Arc<ArtifactStore>` to
/// every consumer.
///
/// # Example
///
/// ```no_run
/// use neural_gallery::{ArtifactStore, ArtifactSort, ArtifactFilter};
///
/// let store = ArtifactStore::open(None).unwrap();
/// store.save("a cat 1", b"preview", b"full").unwrap();
///
/// let mut query = store.open_live_query(ArtifactSort::CreatedAsc, ArtifactFilter::All);
/// query.refresh().unwrap();
/// assert_eq!(query.count(), 1);
/// ```
pub struct ArtifactStore {
    db: Arc<Mutex<Connection>>,
    on_change: Mutex<Option<ChangeCallback>>,
}

impl ArtifactStore {
    /// Open a store backed by the given database file, or an in-memory
    /// database when `path` is `None`.
    pub fn open(path: Option<&Path>) -> Result<Self, StoreError> {
        let conn = db::open_database(path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            on_change: Mutex::new(None),
        })
    }

    /// Persist an artifact unless its caption is already stored.
    ///
    /// Returns `Ok(true)` after a durable insert, `Ok(false)` when the
    /// caption already existed (no-op; the stored bytes are untouched).
    /// Duplicate submission is an expected condition, not an error.
    ///
    /// The change-notification callback fires after every save that changed
    /// the store's contents.
    pub fn save(&self, caption: &str, preview: &[u8], full: &[u8]) -> Result<bool, StoreError> {
        let inserted = {
            let conn = self
                .db
                .lock()
                .map_err(|e| StoreError::Other(e.to_string()))?;
            db::insert_artifact(&conn, caption, preview, full)?
        };

        // Connection lock is released before notifying, so the subscriber
        // can read back through the store immediately.
        if inserted {
            self.notify_changed();
        }
        Ok(inserted)
    }

    /// Attach the contents-changed callback, replacing any previous one.
    ///
    /// The callback signals that a refresh is warranted; it carries no data.
    /// Holders re-pull their [`LiveQuery`] in response (two-step
    /// notify-then-refresh, so a query is never torn mid-iteration).
    pub fn on_change(&self, callback: impl FnMut() + Send + 'static) {
        match self.on_change.lock() {
            Ok(mut slot) => *slot = Some(Box::new(callback)),
            Err(e) => {
                eprintln!("[neural-gallery] WARNING: change-callback mutex poisoned: {}", e);
            }
        }
    }

    fn notify_changed(&self) {
        match self.on_change.lock() {
            Ok(mut slot) => {
                if let Some(cb) = slot.as_mut() {
                    cb();
                }
            }
            Err(e) => {
                eprintln!("[neural-gallery] WARNING: change-callback mutex poisoned: {}", e);
            }
        }
    }

    /// Open a standing query over the store with a fixed ordering and filter.
    ///
    /// The query starts empty: call [`LiveQuery::refresh()`] to load the
    /// current contents. It does not auto-refresh on store changes; listen
    /// via [`on_change()`](Self::on_change) and re-pull.
    pub fn open_live_query(&self, sort: ArtifactSort, filter: ArtifactFilter) -> LiveQuery {
        LiveQuery {
            db: Arc::clone(&self.db),
            sort,
            filter,
            rows: Vec::new(),
        }
    }

    /// Total number of stored artifacts.
    pub fn len(&self) -> Result<u32, StoreError> {
        let conn = self
            .db
            .lock()
            .map_err(|e| StoreError::Other(e.to_string()))?;
        Ok(db::count_artifacts(&conn, &ArtifactFilter::All)?)
    }

    /// Whether the store holds no artifacts.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Look up a single artifact by caption.
    pub fn get(&self, caption: &str) -> Result<Option<ArtifactRecord>, StoreError> {
        let conn = self
            .db
            .lock()
            .map_err(|e| StoreError::Other(e.to_string()))?;
        Ok(db::get_artifact(&conn, caption)?)
    }

    /// Whether an artifact with the given caption is stored.
    pub fn contains(&self, caption: &str) -> Result<bool, StoreError> {
        let conn = self
            .db
            .lock()
            .map_err(|e| StoreError::Other(e.to_string()))?;
        Ok(db::artifact_exists(&conn, caption)?)
    }
}

/// A re-pullable, ordered read cursor over the store's current records.
///
/// `count()` and `record_at()` serve the snapshot taken by the last
/// [`refresh()`](Self::refresh); the snapshot does not move underneath an
/// iterating holder.
pub struct LiveQuery {
    db: Arc<Mutex<Connection>>,
    sort: ArtifactSort,
    filter: ArtifactFilter,
    rows: Vec<ArtifactRecord>,
}

impl LiveQuery {
    /// Re-pull the query from the latest committed store contents.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        let conn = self
            .db
            .lock()
            .map_err(|e| StoreError::Other(e.to_string()))?;
        self.rows = db::list_artifacts(&conn, self.sort, &self.filter)?;
        Ok(())
    }

    /// Number of records as of the last refresh.
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// The record at `position` in the query's ordering, as of the last
    /// refresh. `None` when out of range.
    pub fn record_at(&self, position: usize) -> Option<&ArtifactRecord> {
        self.rows.get(position)
    }

    /// Capture a handoff [`Selection`] for the record at `position`.
    pub fn selection_at(&self, position: usize) -> Option<Selection> {
        self.rows
            .get(position)
            .map(|r| Selection::new(r.caption.clone()))
    }

    /// The ordering this query was opened with.
    pub fn sort(&self) -> ArtifactSort {
        self.sort
    }

    /// The filter this query was opened with.
    pub fn filter(&self) -> &ArtifactFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ArtifactStore {
        ArtifactStore::open(None).unwrap()
    }

    #[test]
    fn test_save_and_get() {
        let store = setup();
        assert!(store.save("cat-1", b"p", b"f").unwrap());

        let record = store.get("cat-1").unwrap().unwrap();
        assert_eq!(record.caption, "cat-1");
        assert_eq!(record.preview, b"p");
        assert_eq!(record.full, b"f");
    }

    #[test]
    fn test_duplicate_save_is_noop() {
        let store = setup();
        assert!(store.save("cat-1", b"first", b"first").unwrap());
        assert!(!store.save("cat-1", b"second", b"second").unwrap());

        assert_eq!(store.len().unwrap(), 1);
        let record = store.get("cat-1").unwrap().unwrap();
        assert_eq!(record.preview, b"first");
    }

    #[test]
    fn test_live_query_requires_refresh() {
        let store = setup();
        store.save("cat-1", b"p", b"f").unwrap();

        let mut query = store.open_live_query(ArtifactSort::CreatedAsc, ArtifactFilter::All);
        // Nothing visible before the initial load.
        assert_eq!(query.count(), 0);

        query.refresh().unwrap();
        assert_eq!(query.count(), 1);
        assert_eq!(query.record_at(0).unwrap().caption, "cat-1");
    }

    #[test]
    fn test_live_query_does_not_auto_refresh() {
        let store = setup();
        let mut query = store.open_live_query(ArtifactSort::CreatedAsc, ArtifactFilter::All);
        query.refresh().unwrap();
        assert_eq!(query.count(), 0);

        store.save("cat-1", b"p", b"f").unwrap();
        // Still the old snapshot until the holder re-pulls.
        assert_eq!(query.count(), 0);

        query.refresh().unwrap();
        assert_eq!(query.count(), 1);
    }

    #[test]
    fn test_record_at_out_of_range() {
        let store = setup();
        let mut query = store.open_live_query(ArtifactSort::CreatedAsc, ArtifactFilter::All);
        query.refresh().unwrap();
        assert!(query.record_at(0).is_none());
    }

    #[test]
    fn test_selection_at_captures_caption() {
        let store = setup();
        store.save("cat-1", b"p", b"f").unwrap();

        let mut query = store.open_live_query(ArtifactSort::CreatedAsc, ArtifactFilter::All);
        query.refresh().unwrap();

        let selection = query.selection_at(0).unwrap();
        assert_eq!(selection.caption(), "cat-1");
        assert!(query.selection_at(1).is_none());
    }
}
