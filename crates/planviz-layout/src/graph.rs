//! Compound graph container used by the layout.
//!
//! Nodes and edges keep insertion order, which the layout relies on for deterministic output.
//! Edges are always directed; multigraphs distinguish parallel edges by name. In compound mode a
//! node may have a parent, and a node with children is laid out as a cluster box.

use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphOptions {
    pub multigraph: bool,
    pub compound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }
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

#[derive(Debug, Clone)]
pub struct Graph<N, E, G> {
    options: GraphOptions,
    graph_label: G,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,
    // Edge indices per node position; edges are never removed so these stay valid.
    out: Vec<Vec<usize>>,
    in_: Vec<Vec<usize>>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            out: Vec::new(),
            in_: Vec::new(),
            parent: HashMap::default(),
            children: HashMap::default(),
        }
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

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one (keeping its position).
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.out.push(Vec::new());
        self.in_.push(Vec::new());
        self.node_index.insert(id, idx);
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

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&EdgeKey, &mut E),
    {
        for e in &mut self.edges {
            f(&e.key, &mut e.label);
        }
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

    /// Inserts an edge, creating missing endpoints. Names are ignored unless the graph is a
    /// multigraph.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let (v, w) = (v.into(), w.into());
        self.ensure_node(v.clone());
        self.ensure_node(w.clone());

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

        let idx = self.edges.len();
        let v_idx = self.node_index[&key.v];
        let w_idx = self.node_index[&key.w];
        self.out[v_idx].push(idx);
        self.in_[w_idx].push(idx);
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label: label.unwrap_or_default(),
        });
        self.edge_index.insert(key, idx);
        self
    }

    fn lookup(&self, v: &str, w: &str, name: Option<&str>) -> Option<usize> {
        let name = if self.options.multigraph { name } else { None };
        self.edge_index
            .get(&EdgeKey::new(v, w, name))
            .copied()
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.lookup(v, w, name).is_some()
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        self.lookup(v, w, name).map(|idx| &self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let idx = self.lookup(v, w, name)?;
        Some(&mut self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w, key.name.as_deref())
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        self.edge_mut(&key.v, &key.w, key.name.as_deref())
    }

    /// Outgoing edges of `v`, in insertion order.
    pub fn out_edges(&self, v: &str) -> Vec<&EdgeKey> {
        self.node_index
            .get(v)
            .map(|&idx| self.out[idx].iter().map(|&e| &self.edges[e].key).collect())
            .unwrap_or_default()
    }

    /// Incoming edges of `v`, in insertion order.
    pub fn in_edges(&self, v: &str) -> Vec<&EdgeKey> {
        self.node_index
            .get(v)
            .map(|&idx| self.in_[idx].iter().map(|&e| &self.edges[e].key).collect())
            .unwrap_or_default()
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for e in self.out_edges(v) {
            if !out.contains(&e.w.as_str()) {
                out.push(e.w.as_str());
            }
        }
        out
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for e in self.in_edges(v) {
            if !out.contains(&e.v.as_str()) {
                out.push(e.v.as_str());
            }
        }
        out
    }

    /// Moves `child` under `parent`. No-op on non-compound graphs.
    pub fn set_parent(&mut self, child: impl Into<String>, parent: impl Into<String>) -> &mut Self {
        if !self.options.compound {
            return self;
        }
        let child = child.into();
        let parent = parent.into();
        self.ensure_node(child.clone());
        self.ensure_node(parent.clone());
        if let Some(prev) = self.parent.insert(child.clone(), parent.clone()) {
            if let Some(ch) = self.children.get_mut(&prev) {
                ch.retain(|c| c != &child);
            }
        }
        let entry = self.children.entry(parent).or_default();
        if !entry.iter().any(|c| c == &child) {
            entry.push(child);
        }
        self
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(|s| s.as_str())
    }

    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|v| v.iter().map(|s| s.as_str()).collect::<Vec<_>>())
            .unwrap_or_default()
    }

    /// Nodes without a parent, in insertion order.
    pub fn children_root(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.parent.contains_key(&n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Whether the node has children, i.e. is drawn as a cluster.
    pub fn is_cluster(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }
}
