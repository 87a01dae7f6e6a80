use std::collections::HashMap;

use petgraph::{
    algo::{has_path_connecting, toposort},
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

/// A directed graph of addressable outputs.
///
/// Nodes are qualified output paths (`indeps.x`, `paraboloid.f`). An edge
/// `a -> b` means output `b` is computed from `a`; its weight is the
/// identifier the expression used for `a`.
#[derive(Debug, Default, Clone)]
pub struct OutputGraph {
    graph: DiGraph<String, String>,
    node_map: HashMap<String, NodeIndex>,
}

/// A single dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection<'a> {
    pub source: &'a str,
    pub target: &'a str,

    /// The identifier as written in the expression.
    pub via: &'a str,
}

impl OutputGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an output node if it is not already present.
    pub fn add_output(&mut self, path: impl Into<String>) {
        self.get_or_add(path.into());
    }

    /// Records that `target` is computed from `source` through identifier `via`.
    ///
    /// Missing nodes are added automatically.
    pub fn connect(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        via: impl Into<String>,
    ) {
        let source = self.get_or_add(source.into());
        let target = self.get_or_add(target.into());
        self.graph.add_edge(source, target, via.into());
    }

    /// Returns output paths in dependency order.
    ///
    /// # Errors
    ///
    /// Returns the path of a node on a cycle if the graph is not acyclic.
    pub fn evaluation_order(&self) -> Result<Vec<&str>, String> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|n| self.graph[n].as_str()).collect())
            .map_err(|cycle| self.graph[cycle.node_id()].clone())
    }

    /// Returns `true` if `target` is `source` or is computed from it.
    #[must_use]
    pub fn depends_on(&self, target: &str, source: &str) -> bool {
        match (self.node_map.get(source), self.node_map.get(target)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Returns every dependency edge in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = Connection<'_>> {
        self.graph.edge_references().map(|edge| Connection {
            source: self.graph[edge.source()].as_str(),
            target: self.graph[edge.target()].as_str(),
            via: edge.weight().as_str(),
        })
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn get_or_add(&mut self, path: String) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&path) {
            return index;
        }
        let index = self.graph.add_node(path.clone());
        self.node_map.insert(path, index);
        index
    }
}
