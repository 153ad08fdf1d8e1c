//! Layout persistence: an authoritative remote store per family plus a local fallback cache per
//! layout key.
//!
//! Reads go remote first and refresh the cache on success; any remote miss or failure falls back
//! to the cache. Writes go remote first and refresh the cache on success. Without a family id
//! only the cache is involved.

mod directory;
mod memory;

pub use directory::{DirectoryCache, DirectoryRemote};
pub use memory::{MemoryCache, MemoryRemote};

use crate::error::StoreError;
use futures::future::LocalBoxFuture;
use indexmap::IndexMap;
use kingraph_core::{ComputedLayout, Position};
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

pub const LAYOUT_KEY_PREFIX: &str = "family-tree-layout-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub node_id: String,
    pub x: f64,
    pub y: f64,
}

/// A saved arrangement: one position per node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub positions: Vec<PositionRecord>,
}

impl Layout {
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = (&'a str, Position)>) -> Self {
        Self {
            positions: positions
                .into_iter()
                .map(|(id, p)| PositionRecord {
                    node_id: id.to_string(),
                    x: p.x,
                    y: p.y,
                })
                .collect(),
        }
    }

    /// Position of `id`. When an id repeats the last record wins.
    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions
            .iter()
            .rev()
            .find(|r| r.node_id == id)
            .map(|r| Position::new(r.x, r.y))
    }

    /// Every position keyed by node id, last record winning like [`Layout::get`].
    pub fn by_node_id(&self) -> HashMap<&str, Position> {
        self.positions
            .iter()
            .map(|r| (r.node_id.as_str(), Position::new(r.x, r.y)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Local cache payload: the bare position list.
    pub fn to_cache_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.positions)?)
    }

    /// Reads a local cache payload. Entries in the older `{ "id", "position": { "x", "y" } }`
    /// shape are accepted too.
    pub fn from_cache_json(text: &str) -> Result<Self, StoreError> {
        let entries: Vec<CachedPosition> = serde_json::from_str(text)?;
        Ok(Self {
            positions: entries.into_iter().map(PositionRecord::from).collect(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CachedPosition {
    Record(PositionRecord),
    Legacy { id: String, position: Position },
}

impl From<CachedPosition> for PositionRecord {
    fn from(entry: CachedPosition) -> Self {
        match entry {
            CachedPosition::Record(record) => record,
            CachedPosition::Legacy { id, position } => Self {
                node_id: id,
                x: position.x,
                y: position.y,
            },
        }
    }
}

/// Remote record: the layout travels as a JSON string (`{"positions":[...]}`) inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayoutRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub family_id: i64,
    pub layout: String,
}

impl TreeLayoutRecord {
    pub fn new(id: Option<i64>, family_id: i64, layout: &Layout) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            family_id,
            layout: serde_json::to_string(layout)?,
        })
    }

    pub fn decode(&self) -> Result<Layout, StoreError> {
        Ok(serde_json::from_str(&self.layout)?)
    }
}

/// Authoritative per-family layout store (typically behind a network API).
pub trait RemoteLayoutStore {
    /// `Ok(None)` when the family has no saved layout.
    fn fetch_layout(
        &self,
        family_id: i64,
    ) -> LocalBoxFuture<'_, Result<Option<TreeLayoutRecord>, StoreError>>;

    fn save_layout(
        &self,
        family_id: i64,
        layout: Layout,
    ) -> LocalBoxFuture<'_, Result<TreeLayoutRecord, StoreError>>;
}

/// Local key/value cache of layout payloads.
pub trait LayoutCache {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Remote store for sessions without one: never has a layout, refuses saves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemote;

impl RemoteLayoutStore for NoRemote {
    fn fetch_layout(
        &self,
        _family_id: i64,
    ) -> LocalBoxFuture<'_, Result<Option<TreeLayoutRecord>, StoreError>> {
        Box::pin(futures::future::ready(Ok(None)))
    }

    fn save_layout(
        &self,
        _family_id: i64,
        _layout: Layout,
    ) -> LocalBoxFuture<'_, Result<TreeLayoutRecord, StoreError>> {
        Box::pin(futures::future::ready(Err(StoreError::Unavailable(
            "no remote layout store configured".to_string(),
        ))))
    }
}

/// Where a loaded layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutOrigin {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredLayout {
    pub layout: Layout,
    pub origin: LayoutOrigin,
}

/// Cache key for a view: the family id when known, otherwise the numerically sorted person ids.
pub fn layout_key(family_id: Option<i64>, person_ids: impl IntoIterator<Item = i64>) -> String {
    if let Some(family_id) = family_id {
        return format!("{LAYOUT_KEY_PREFIX}{family_id}");
    }
    let mut ids: Vec<i64> = person_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
    format!("{LAYOUT_KEY_PREFIX}{}", ids.join(","))
}

/// Final node positions: stored positions win for the ids they contain, computed ones fill the
/// rest. Stored ids without a computed counterpart are ignored.
pub fn merge_positions(
    computed: &ComputedLayout,
    stored: Option<&Layout>,
) -> IndexMap<String, Position> {
    let stored = stored.map(Layout::by_node_id).unwrap_or_default();
    computed
        .positions
        .iter()
        .map(|(id, &auto)| {
            let p = stored.get(id.as_str()).copied().unwrap_or(auto);
            (id.clone(), p)
        })
        .collect()
}

pub struct PositionStore {
    remote: Box<dyn RemoteLayoutStore>,
    cache: Box<dyn LayoutCache>,
}

impl PositionStore {
    pub fn new(
        remote: impl RemoteLayoutStore + 'static,
        cache: impl LayoutCache + 'static,
    ) -> Self {
        Self {
            remote: Box::new(remote),
            cache: Box::new(cache),
        }
    }

    pub fn local_only(cache: impl LayoutCache + 'static) -> Self {
        Self::new(NoRemote, cache)
    }

    /// Loads the stored layout for a view. Never fails: retrieval problems are logged and the
    /// next tier is tried, ending in `None` (use the computed layout).
    pub async fn load_layout(&self, family_id: Option<i64>, key: &str) -> Option<StoredLayout> {
        if let Some(family_id) = family_id {
            match self.remote.fetch_layout(family_id).await {
                Ok(Some(record)) => match record.decode() {
                    Ok(layout) => {
                        self.write_local(key, &layout);
                        tracing::debug!(
                            family_id,
                            layout_key = key,
                            positions = layout.len(),
                            "loaded remote layout"
                        );
                        return Some(StoredLayout {
                            layout,
                            origin: LayoutOrigin::Remote,
                        });
                    }
                    Err(err) => {
                        tracing::warn!(family_id, error = %err, "ignoring malformed remote layout");
                    }
                },
                Ok(None) => {
                    tracing::debug!(family_id, "no remote layout");
                }
                Err(err) => {
                    tracing::warn!(family_id, error = %err, "remote layout fetch failed");
                }
            }
        }

        let layout = self.load_local(key)?;
        tracing::debug!(layout_key = key, positions = layout.len(), "loaded cached layout");
        Some(StoredLayout {
            layout,
            origin: LayoutOrigin::Local,
        })
    }

    /// Reads the cached layout under `key`; unreadable or corrupt entries count as absent.
    pub fn load_local(&self, key: &str) -> Option<Layout> {
        let text = match self.cache.read(key) {
            Ok(text) => text?,
            Err(err) => {
                tracing::warn!(layout_key = key, error = %err, "layout cache read failed");
                return None;
            }
        };
        match Layout::from_cache_json(&text) {
            Ok(layout) => Some(layout),
            Err(err) => {
                tracing::warn!(layout_key = key, error = %err, "ignoring corrupt cached layout");
                None
            }
        }
    }

    /// Persists `layout`. With a family id the remote store is authoritative and its failure is
    /// returned; the cache is refreshed on success. Without one the cache write is the save.
    pub async fn save_layout(
        &self,
        family_id: Option<i64>,
        key: &str,
        layout: &Layout,
    ) -> Result<(), StoreError> {
        let Some(family_id) = family_id else {
            self.cache.write(key, &layout.to_cache_json()?)?;
            tracing::debug!(layout_key = key, positions = layout.len(), "saved layout locally");
            return Ok(());
        };

        let record = self.remote.save_layout(family_id, layout.clone()).await?;
        tracing::debug!(
            family_id,
            record_id = ?record.id,
            positions = layout.len(),
            "saved remote layout"
        );
        self.write_local(key, layout);
        Ok(())
    }

    pub fn clear_local(&self, key: &str) -> Result<(), StoreError> {
        self.cache.remove(key)?;
        tracing::debug!(layout_key = key, "cleared cached layout");
        Ok(())
    }

    fn write_local(&self, key: &str, layout: &Layout) {
        let result = layout
            .to_cache_json()
            .and_then(|json| self.cache.write(key, &json));
        if let Err(err) = result {
            tracing::warn!(layout_key = key, error = %err, "layout cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_cache_entries_are_read() {
        let layout = Layout::from_cache_json(
            r#"[{"id":"1","position":{"x":1.5,"y":2}},{"nodeId":"2","x":3,"y":4}]"#,
        )
        .unwrap();
        assert_eq!(layout.get("1"), Some(Position::new(1.5, 2.0)));
        assert_eq!(layout.get("2"), Some(Position::new(3.0, 4.0)));
    }

    #[test]
    fn remote_record_wraps_the_layout_as_a_string() {
        let layout = Layout::from_positions([("1", Position::new(10.0, 20.0))]);
        let record = TreeLayoutRecord::new(None, 7, &layout).unwrap();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"familyId":7,"layout":"{\"positions\":[{\"nodeId\":\"1\",\"x\":10.0,\"y\":20.0}]}"}"#
        );
        assert_eq!(record.decode().unwrap(), layout);
    }

    #[test]
    fn repeated_ids_resolve_to_the_last_record() {
        let layout = Layout::from_positions([
            ("1", Position::new(1.0, 1.0)),
            ("1", Position::new(2.0, 2.0)),
        ]);
        assert_eq!(layout.get("1"), Some(Position::new(2.0, 2.0)));

        let computed = ComputedLayout {
            positions: [("1".to_string(), Position::new(0.0, 0.0))].into_iter().collect(),
        };
        let merged = merge_positions(&computed, Some(&layout));
        assert_eq!(merged["1"], Position::new(2.0, 2.0));
    }
}
