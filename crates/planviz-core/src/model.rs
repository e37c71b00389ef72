use crate::dot::{AttrTarget, Attrs, DotGraph, EdgeEnd, Stmt, Subgraph};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub type AttrMap = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelKind {
    #[default]
    Text,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Label {
    pub kind: LabelKind,
    pub text: String,
}

impl Label {
    fn from_attrs(attrs: &AttrMap, fallback: &str) -> Self {
        let kind = match attrs.get("labelType").map(String::as_str) {
            Some("html") => LabelKind::Html,
            _ => LabelKind::Text,
        };
        let text = match attrs.get("label") {
            // `\N` is Graphviz shorthand for the element's own id.
            Some(text) => text.replace("\\N", fallback),
            None => fallback.to_string(),
        };
        Self { kind, text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    pub id: String,
    pub label: Label,
    /// Operator name exposed to the drawing (`name` attribute).
    pub name: Option<String>,
    pub tooltip: Option<String>,
    pub class: Option<String>,
    /// Innermost cluster containing this node.
    pub cluster: Option<String>,
    pub attrs: AttrMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEdge {
    pub source: String,
    pub target: String,
    pub attrs: AttrMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCluster {
    pub id: String,
    pub label: Label,
    pub name: Option<String>,
    pub tooltip: Option<String>,
    pub parent: Option<String>,
    /// Direct member nodes, in insertion order.
    pub nodes: Vec<String>,
    /// Direct child clusters, in insertion order.
    pub clusters: Vec<String>,
    pub attrs: AttrMap,
}

/// The query plan graph: nodes, edges and (possibly nested) clusters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanGraph {
    pub id: Option<String>,
    pub directed: bool,
    pub attrs: AttrMap,
    pub nodes: Vec<PlanNode>,
    pub edges: Vec<PlanEdge>,
    pub clusters: Vec<PlanCluster>,
}

impl PlanGraph {
    pub fn node(&self, id: &str) -> Option<&PlanNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&PlanCluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Clusters that are not nested in another cluster.
    pub fn root_clusters(&self) -> impl Iterator<Item = &PlanCluster> {
        self.clusters.iter().filter(|c| c.parent.is_none())
    }

    /// Builds the plan graph from a DOT syntax tree.
    pub fn from_dot(dot: &DotGraph) -> Self {
        let mut builder = Builder {
            graph: PlanGraph {
                id: dot.id.clone(),
                directed: dot.directed,
                ..Default::default()
            },
            node_index: IndexMap::new(),
            anonymous_clusters: 0,
        };
        let mut scope = Scope::default();
        builder.walk(&dot.stmts, &mut scope, &Owner::Root);
        builder.finish()
    }
}

/// Receiver of bare `key=value` and `graph [..]` statements.
enum Owner {
    Root,
    Cluster(String),
    Transparent,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    cluster: Option<String>,
    node_defaults: Attrs,
    edge_defaults: Attrs,
}

struct Builder {
    graph: PlanGraph,
    node_index: IndexMap<String, usize>,
    anonymous_clusters: usize,
}

impl Builder {
    fn walk(&mut self, stmts: &[Stmt], scope: &mut Scope, owner: &Owner) -> IndexSet<String> {
        let mut mentioned: IndexSet<String> = IndexSet::new();
        for stmt in stmts {
            match stmt {
                Stmt::Node { id, attrs } => {
                    self.touch_node(id, scope, Some(attrs));
                    mentioned.insert(id.clone());
                }
                Stmt::Edge { chain, attrs } => {
                    let mut ends: Vec<Vec<String>> = Vec::with_capacity(chain.len());
                    for end in chain {
                        let ids = match end {
                            EdgeEnd::Node(id) => {
                                self.touch_node(id, scope, None);
                                vec![id.clone()]
                            }
                            EdgeEnd::Subgraph(sub) => {
                                self.subgraph(sub, scope).into_iter().collect()
                            }
                        };
                        mentioned.extend(ids.iter().cloned());
                        ends.push(ids);
                    }
                    let mut merged: AttrMap = scope.edge_defaults.iter().cloned().collect();
                    merged.extend(attrs.iter().cloned());
                    for pair in ends.windows(2) {
                        for source in &pair[0] {
                            for target in &pair[1] {
                                self.graph.edges.push(PlanEdge {
                                    source: source.clone(),
                                    target: target.clone(),
                                    attrs: merged.clone(),
                                });
                            }
                        }
                    }
                }
                Stmt::Defaults { target, attrs } => match target {
                    AttrTarget::Node => scope.node_defaults.extend(attrs.iter().cloned()),
                    AttrTarget::Edge => scope.edge_defaults.extend(attrs.iter().cloned()),
                    AttrTarget::Graph => {
                        for (k, v) in attrs {
                            self.assign(owner, k, v);
                        }
                    }
                },
                Stmt::Assign { key, value } => self.assign(owner, key, value),
                Stmt::Subgraph(sub) => {
                    let ids = self.subgraph(sub, scope);
                    mentioned.extend(ids);
                }
            }
        }
        mentioned
    }

    fn assign(&mut self, owner: &Owner, key: &str, value: &str) {
        match owner {
            Owner::Root => {
                self.graph.attrs.insert(key.to_string(), value.to_string());
            }
            Owner::Cluster(id) => {
                if let Some(cluster) = self.graph.clusters.iter_mut().find(|c| &c.id == id) {
                    cluster.attrs.insert(key.to_string(), value.to_string());
                }
            }
            Owner::Transparent => {}
        }
    }

    fn subgraph(&mut self, sub: &Subgraph, outer: &Scope) -> IndexSet<String> {
        let mut inner = outer.clone();
        let mut owner = Owner::Transparent;
        if sub.is_cluster() {
            let id = match &sub.id {
                Some(id) => id.clone(),
                None => {
                    self.anonymous_clusters += 1;
                    format!("cluster_anonymous_{}", self.anonymous_clusters)
                }
            };
            if !self.graph.clusters.iter().any(|c| c.id == id) {
                self.graph.clusters.push(PlanCluster {
                    id: id.clone(),
                    label: Label::default(),
                    name: None,
                    tooltip: None,
                    parent: outer.cluster.clone(),
                    nodes: Vec::new(),
                    clusters: Vec::new(),
                    attrs: AttrMap::new(),
                });
                if let Some(parent) = &outer.cluster {
                    if let Some(p) = self.graph.clusters.iter_mut().find(|c| &c.id == parent) {
                        p.clusters.push(id.clone());
                    }
                }
            }
            inner.cluster = Some(id.clone());
            owner = Owner::Cluster(id);
        }
        self.walk(&sub.stmts, &mut inner, &owner)
    }

    fn touch_node(&mut self, id: &str, scope: &Scope, attrs: Option<&Attrs>) {
        let idx = match self.node_index.get(id) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.nodes.len();
                self.graph.nodes.push(PlanNode {
                    id: id.to_string(),
                    label: Label::default(),
                    name: None,
                    tooltip: None,
                    class: None,
                    cluster: scope.cluster.clone(),
                    attrs: scope.node_defaults.iter().cloned().collect(),
                });
                self.node_index.insert(id.to_string(), idx);
                idx
            }
        };

        let Some(attrs) = attrs else {
            return;
        };

        // A later statement inside a deeper cluster moves the node into that cluster.
        let current = self.graph.nodes[idx].cluster.clone();
        if scope.cluster != current && self.is_nested_in(scope.cluster.as_deref(), current.as_deref())
        {
            self.graph.nodes[idx].cluster = scope.cluster.clone();
        }
        self.graph.nodes[idx].attrs.extend(attrs.iter().cloned());
    }

    /// Whether `inner` is `outer` or a descendant of it (`None` is the root).
    fn is_nested_in(&self, inner: Option<&str>, outer: Option<&str>) -> bool {
        let mut cur = inner.map(str::to_string);
        loop {
            if cur.as_deref() == outer {
                return true;
            }
            let Some(id) = cur else {
                return false;
            };
            cur = self
                .graph
                .clusters
                .iter()
                .find(|c| c.id == id)
                .and_then(|c| c.parent.clone());
        }
    }

    fn finish(mut self) -> PlanGraph {
        for node in &mut self.graph.nodes {
            node.label = Label::from_attrs(&node.attrs, &node.id);
            node.name = node.attrs.get("name").cloned();
            node.tooltip = node.attrs.get("tooltip").cloned();
            node.class = node.attrs.get("class").cloned();
            if let Some(cluster) = &node.cluster {
                if let Some(c) = self.graph.clusters.iter_mut().find(|c| &c.id == cluster) {
                    c.nodes.push(node.id.clone());
                }
            }
        }
        for cluster in &mut self.graph.clusters {
            let fallback = String::new();
            cluster.label = Label::from_attrs(&cluster.attrs, &fallback);
            cluster.name = cluster.attrs.get("name").cloned();
            cluster.tooltip = cluster.attrs.get("tooltip").cloned();
        }
        tracing::debug!(
            nodes = self.graph.nodes.len(),
            edges = self.graph.edges.len(),
            clusters = self.graph.clusters.len(),
            "built plan graph"
        );
        self.graph
    }
}

