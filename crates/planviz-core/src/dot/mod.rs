//! DOT graph description syntax.
//!
//! The plan emitter produces a small subset of Graphviz DOT (a `digraph` with `subgraph cluster*`
//! blocks, node statements with HTML labels, and `a->b` edges). The parser accepts the general
//! grammar so hand-edited descriptions keep working:
//!
//! ```text
//! graph     : [strict] (graph | digraph) [ID] '{' stmt_list '}'
//! stmt      : attr_stmt | edge_stmt | node_stmt | ID '=' ID | subgraph
//! attr_stmt : (graph | node | edge) attr_list
//! edge_stmt : (node_id | subgraph) (edgeop (node_id | subgraph))+ [attr_list]
//! subgraph  : [subgraph [ID]] '{' stmt_list '}'
//! ```
//!
//! Ports (`a:p:n`) are accepted and ignored.

mod lexer;
mod parser;

use serde::{Deserialize, Serialize};

pub use parser::parse_dot;

pub type Attrs = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotGraph {
    pub strict: bool,
    pub directed: bool,
    pub id: Option<String>,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrTarget {
    Graph,
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Node { id: String, attrs: Attrs },
    Edge { chain: Vec<EdgeEnd>, attrs: Attrs },
    Defaults { target: AttrTarget, attrs: Attrs },
    Assign { key: String, value: String },
    Subgraph(Subgraph),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeEnd {
    Node(String),
    Subgraph(Subgraph),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subgraph {
    pub id: Option<String>,
    pub stmts: Vec<Stmt>,
}

impl Subgraph {
    /// Graphviz treats subgraphs named `cluster*` as clusters; the plan emitter additionally
    /// marks them with `isCluster="true"`.
    pub fn is_cluster(&self) -> bool {
        if self
            .id
            .as_deref()
            .is_some_and(|id| id.starts_with("cluster"))
        {
            return true;
        }
        self.stmts.iter().any(|stmt| match stmt {
            Stmt::Assign { key, value } => key == "isCluster" && value == "true",
            Stmt::Defaults {
                target: AttrTarget::Graph,
                attrs,
            } => attrs.iter().any(|(k, v)| k == "isCluster" && v == "true"),
            _ => false,
        })
    }
}
