use super::lexer::{Lexer, Tok, Token};
use super::{AttrTarget, Attrs, DotGraph, EdgeEnd, Stmt, Subgraph};
use crate::error::{Error, Result};

/// Parses a DOT description into its syntax tree.
pub fn parse_dot(text: &str) -> Result<DotGraph> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        directed: true,
    };
    let graph = parser.parse_graph()?;
    tracing::trace!(stmts = graph.stmts.len(), "parsed DOT graph");
    Ok(graph)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    directed: bool,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek2(&self) -> Option<&Tok> {
        self.tokens.get(self.pos + 1).map(|t| &t.tok)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos)?.tok.clone();
        self.pos += 1;
        Some(tok)
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(t) => Error::dot(t.line, t.column, message),
            None => Error::dot(1, 1, message),
        }
    }

    fn expect(&mut self, want: &Tok, what: &str) -> Result<()> {
        match self.peek() {
            Some(tok) if tok == want => {
                self.pos += 1;
                Ok(())
            }
            Some(other) => Err(self.error_here(format!("expected {what}, found {other:?}"))),
            None => Err(self.error_here(format!("expected {what}, found end of input"))),
        }
    }

    fn eat(&mut self, want: &Tok) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_graph(&mut self) -> Result<DotGraph> {
        let strict = self.eat(&Tok::Strict);
        let directed = match self.peek() {
            Some(Tok::Digraph) => true,
            Some(Tok::Graph) => false,
            _ => return Err(self.error_here("expected `graph` or `digraph`")),
        };
        self.pos += 1;
        self.directed = directed;

        let id = match self.peek() {
            Some(Tok::LBrace) => None,
            _ => Some(self.parse_id()?.0),
        };
        self.expect(&Tok::LBrace, "`{`")?;
        let stmts = self.parse_stmt_list()?;
        self.expect(&Tok::RBrace, "`}`")?;

        if self.pos < self.tokens.len() {
            return Err(self.error_here("unexpected content after graph body"));
        }

        Ok(DotGraph {
            strict,
            directed,
            id,
            stmts,
        })
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                None | Some(Tok::RBrace) => return Ok(stmts),
                Some(Tok::Semi) => {
                    self.pos += 1;
                }
                _ => stmts.push(self.parse_stmt()?),
            }
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            Some(Tok::Graph) => {
                self.pos += 1;
                let attrs = self.parse_attr_lists()?;
                Ok(Stmt::Defaults {
                    target: AttrTarget::Graph,
                    attrs,
                })
            }
            Some(Tok::Node) => {
                self.pos += 1;
                let attrs = self.parse_attr_lists()?;
                Ok(Stmt::Defaults {
                    target: AttrTarget::Node,
                    attrs,
                })
            }
            Some(Tok::Edge) => {
                self.pos += 1;
                let attrs = self.parse_attr_lists()?;
                Ok(Stmt::Defaults {
                    target: AttrTarget::Edge,
                    attrs,
                })
            }
            Some(Tok::Subgraph | Tok::LBrace) => {
                let sub = self.parse_subgraph()?;
                if self.at_edge_op() {
                    self.parse_edge_rest(EdgeEnd::Subgraph(sub))
                } else {
                    Ok(Stmt::Subgraph(sub))
                }
            }
            Some(Tok::Id(_) | Tok::Quoted(_) | Tok::Html(_)) => {
                if self.peek2() == Some(&Tok::Eq) {
                    let (key, _) = self.parse_id()?;
                    self.pos += 1;
                    let (value, _) = self.parse_id()?;
                    return Ok(Stmt::Assign { key, value });
                }
                let id = self.parse_node_id()?;
                if self.at_edge_op() {
                    self.parse_edge_rest(EdgeEnd::Node(id))
                } else {
                    let attrs = self.parse_attr_lists()?;
                    Ok(Stmt::Node { id, attrs })
                }
            }
            Some(other) => Err(self.error_here(format!("unexpected token {other:?}"))),
            None => Err(self.error_here("unexpected end of input")),
        }
    }

    fn at_edge_op(&self) -> bool {
        matches!(self.peek(), Some(Tok::DirectedEdge | Tok::UndirectedEdge))
    }

    fn parse_edge_rest(&mut self, first: EdgeEnd) -> Result<Stmt> {
        let mut chain = vec![first];
        while let Some(op) = self.peek().cloned() {
            match op {
                Tok::DirectedEdge if !self.directed => {
                    return Err(self.error_here("`->` used in an undirected graph"));
                }
                Tok::UndirectedEdge if self.directed => {
                    return Err(self.error_here("`--` used in a directed graph"));
                }
                Tok::DirectedEdge | Tok::UndirectedEdge => {
                    self.pos += 1;
                }
                _ => break,
            }
            let end = match self.peek() {
                Some(Tok::Subgraph | Tok::LBrace) => EdgeEnd::Subgraph(self.parse_subgraph()?),
                _ => EdgeEnd::Node(self.parse_node_id()?),
            };
            chain.push(end);
        }
        let attrs = self.parse_attr_lists()?;
        Ok(Stmt::Edge { chain, attrs })
    }

    fn parse_subgraph(&mut self) -> Result<Subgraph> {
        let mut id = None;
        if self.eat(&Tok::Subgraph) && self.peek() != Some(&Tok::LBrace) {
            id = Some(self.parse_id()?.0);
        }
        self.expect(&Tok::LBrace, "`{`")?;
        let stmts = self.parse_stmt_list()?;
        self.expect(&Tok::RBrace, "`}`")?;
        Ok(Subgraph { id, stmts })
    }

    fn parse_node_id(&mut self) -> Result<String> {
        let (id, _) = self.parse_id()?;
        // Ports are irrelevant for layout.
        for _ in 0..2 {
            if !self.eat(&Tok::Colon) {
                break;
            }
            self.parse_id()?;
        }
        Ok(id)
    }

    /// Returns the identifier text and whether it was an HTML string.
    fn parse_id(&mut self) -> Result<(String, bool)> {
        if !matches!(self.peek(), Some(Tok::Id(_) | Tok::Html(_) | Tok::Quoted(_))) {
            return Err(self.error_here("expected identifier"));
        }
        match self.bump() {
            Some(Tok::Id(s)) => Ok((s, false)),
            Some(Tok::Html(s)) => Ok((s, true)),
            Some(Tok::Quoted(s)) => {
                let mut out = s;
                while self.peek() == Some(&Tok::Plus) {
                    match self.peek2() {
                        Some(Tok::Quoted(_)) => {}
                        _ => break,
                    }
                    self.pos += 1;
                    if let Some(Tok::Quoted(next)) = self.bump() {
                        out.push_str(&next);
                    }
                }
                Ok((out, false))
            }
            _ => Err(self.error_here("expected identifier")),
        }
    }

    fn parse_attr_lists(&mut self) -> Result<Attrs> {
        let mut attrs = Attrs::new();
        while self.eat(&Tok::LBracket) {
            loop {
                if self.eat(&Tok::RBracket) {
                    break;
                }
                let (key, _) = self.parse_id()?;
                self.expect(&Tok::Eq, "`=`")?;
                let (value, html) = self.parse_id()?;
                if html && key == "label" {
                    attrs.push(("labelType".to_string(), "html".to_string()));
                }
                attrs.push((key, value));
                if !self.eat(&Tok::Comma) {
                    self.eat(&Tok::Semi);
                }
            }
        }
        Ok(attrs)
    }
}
