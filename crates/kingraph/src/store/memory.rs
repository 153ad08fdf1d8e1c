use super::{Layout, LayoutCache, RemoteLayoutStore, TreeLayoutRecord};
use crate::error::StoreError;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// In-process cache. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl LayoutCache for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RemoteState {
    records: BTreeMap<i64, TreeLayoutRecord>,
    next_id: i64,
    fetch_error: Option<StoreError>,
    save_error: Option<StoreError>,
    fetches: usize,
    saves: usize,
}

/// In-process remote store with failure injection. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    state: Rc<RefCell<RemoteState>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw record as-is, malformed `layout` strings included.
    pub fn insert_record(&self, record: TreeLayoutRecord) {
        self.state
            .borrow_mut()
            .records
            .insert(record.family_id, record);
    }

    pub fn record(&self, family_id: i64) -> Option<TreeLayoutRecord> {
        self.state.borrow().records.get(&family_id).cloned()
    }

    /// Makes every fetch fail with `error` until cleared with `None`.
    pub fn fail_fetches(&self, error: Option<StoreError>) {
        self.state.borrow_mut().fetch_error = error;
    }

    /// Makes every save fail with `error` until cleared with `None`.
    pub fn fail_saves(&self, error: Option<StoreError>) {
        self.state.borrow_mut().save_error = error;
    }

    pub fn fetch_count(&self) -> usize {
        self.state.borrow().fetches
    }

    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }
}

impl RemoteLayoutStore for MemoryRemote {
    fn fetch_layout(
        &self,
        family_id: i64,
    ) -> LocalBoxFuture<'_, Result<Option<TreeLayoutRecord>, StoreError>> {
        let mut state = self.state.borrow_mut();
        state.fetches += 1;
        let result = match &state.fetch_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.records.get(&family_id).cloned()),
        };
        Box::pin(futures::future::ready(result))
    }

    fn save_layout(
        &self,
        family_id: i64,
        layout: Layout,
    ) -> LocalBoxFuture<'_, Result<TreeLayoutRecord, StoreError>> {
        let mut state = self.state.borrow_mut();
        state.saves += 1;
        let result = match state.save_error.clone() {
            Some(err) => Err(err),
            None => {
                let id = match state.records.get(&family_id).and_then(|r| r.id) {
                    Some(id) => id,
                    None => {
                        state.next_id += 1;
                        state.next_id
                    }
                };
                TreeLayoutRecord::new(Some(id), family_id, &layout).map(|record| {
                    state.records.insert(family_id, record.clone());
                    record
                })
            }
        };
        Box::pin(futures::future::ready(result))
    }
}
