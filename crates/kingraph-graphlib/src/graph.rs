//! The core `Graph` container.

use rustc_hash::FxBuildHasher;
use std::cell::RefCell;

mod adj_cache;
mod edge_key;

use adj_cache::AdjCache;
use edge_key::EdgeKeyView;
pub use edge_key::EdgeKey;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphOptions {
    /// Allow several edges between the same ordered pair, told apart by name.
    pub multigraph: bool,
}

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
}

#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

pub struct Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    options: GraphOptions,

    graph_label: G,
    default_edge_label: Box<dyn Fn() -> E + Send + Sync>,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,

    // Layout passes ask for in/out edges of every node several times per sweep. The cache is
    // rebuilt lazily after any structural mutation.
    generation: u64,
    adj_cache: RefCell<Option<AdjCache>>,
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            default_edge_label: Box::new(E::default),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            generation: 0,
            adj_cache: RefCell::new(None),
        }
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        *self.adj_cache.get_mut() = None;
    }

    fn with_adj<R>(&self, f: impl FnOnce(&AdjCache) -> R) -> R {
        let mut cache = self.adj_cache.borrow_mut();
        let stale = cache
            .as_ref()
            .is_none_or(|c| c.generation != self.generation);
        if stale {
            let endpoints = self.edges.iter().filter_map(|e| {
                let v = *self.node_index.get(&e.key.v)?;
                let w = *self.node_index.get(&e.key.w)?;
                Some((v, w))
            });
            *cache = Some(AdjCache::build(
                self.generation,
                self.nodes.len(),
                self.edges.len(),
                endpoints,
            ));
        }
        match cache.as_ref() {
            Some(c) => f(c),
            None => f(&AdjCache::empty(self.generation, self.nodes.len())),
        }
    }

    fn view<'a>(&self, v: &'a str, w: &'a str, name: Option<&'a str>) -> EdgeKeyView<'a> {
        let name = if self.options.multigraph { name } else { None };
        EdgeKeyView { v, w, name }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn set_default_edge_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.default_edge_label = Box::new(f);
        self
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one without moving it.
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        self.invalidate();
        self.node_index.insert(id.clone(), self.nodes.len());
        self.nodes.push(NodeEntry { id, label });
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        self.set_node(id, N::default())
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(|e| e.key.clone()).collect()
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    /// Inserts an edge, creating missing endpoints. When the edge already exists its label is
    /// replaced only if `label` is `Some`.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let v = v.into();
        let w = w.into();
        self.ensure_node(v.as_str());
        self.ensure_node(w.as_str());

        let name = if self.options.multigraph {
            name.map(Into::into)
        } else {
            None
        };
        let key = EdgeKey { v, w, name };

        if let Some(&idx) = self.edge_index.get(&key) {
            if let Some(label) = label {
                self.edges[idx].label = label;
            }
            return self;
        }

        self.invalidate();
        self.edge_index.insert(key.clone(), self.edges.len());
        let label = label.unwrap_or_else(|| (self.default_edge_label)());
        self.edges.push(EdgeEntry { key, label });
        self
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_index.contains_key(&self.view(v, w, name))
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let idx = *self.edge_index.get(&self.view(v, w, name))?;
        Some(&self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w, key.name.as_deref())
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        let view = self.view(&key.v, &key.w, key.name.as_deref());
        let idx = *self.edge_index.get(&view)?;
        Some(&mut self.edges[idx].label)
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> bool {
        let view = self.view(&key.v, &key.w, key.name.as_deref());
        let Some(idx) = self.edge_index.get(&view).copied() else {
            return false;
        };
        self.invalidate();
        let removed = self.edges.remove(idx);
        self.edge_index.remove(&removed.key);
        for (i, e) in self.edges.iter().enumerate().skip(idx) {
            if let Some(slot) = self.edge_index.get_mut(&e.key) {
                *slot = i;
            }
        }
        true
    }

    /// Removes `id` and every edge incident to it. Remaining nodes and edges keep their relative
    /// order.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(idx) = self.node_index.remove(id) else {
            return false;
        };
        self.invalidate();
        self.nodes.remove(idx);
        for (i, n) in self.nodes.iter().enumerate().skip(idx) {
            if let Some(slot) = self.node_index.get_mut(n.id.as_str()) {
                *slot = i;
            }
        }

        let before = self.edges.len();
        self.edges.retain(|e| e.key.v != id && e.key.w != id);
        if self.edges.len() != before {
            self.edge_index.clear();
            for (i, e) in self.edges.iter().enumerate() {
                self.edge_index.insert(e.key.clone(), i);
            }
        }
        true
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&EdgeKey, &mut E),
    {
        for e in &mut self.edges {
            f(&e.key, &mut e.label);
        }
    }

    /// Outgoing edges of `v`, in edge insertion order.
    pub fn out_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            adj.out_edges(v_ix)
                .iter()
                .map(|&e| self.edges[e].key.clone())
                .collect()
        })
    }

    /// Incoming edges of `v`, in edge insertion order.
    pub fn in_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            adj.in_edges(v_ix)
                .iter()
                .map(|&e| self.edges[e].key.clone())
                .collect()
        })
    }

    /// Distinct successors of `v` in first-edge order.
    pub fn successors(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let Some(&v_ix) = self.node_index.get(v) else {
            return out;
        };
        self.with_adj(|adj| {
            for &e in adj.out_edges(v_ix) {
                let w = self.edges[e].key.w.as_str();
                if !out.contains(&w) {
                    out.push(w);
                }
            }
        });
        out
    }

    /// Distinct predecessors of `v` in first-edge order.
    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let Some(&v_ix) = self.node_index.get(v) else {
            return out;
        };
        self.with_adj(|adj| {
            for &e in adj.in_edges(v_ix) {
                let u = self.edges[e].key.v.as_str();
                if !out.contains(&u) {
                    out.push(u);
                }
            }
        });
        out
    }
}
