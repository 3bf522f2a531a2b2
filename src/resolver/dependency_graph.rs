//! Dependency graph over artifact names.
//!
//! Nodes are artifact names of one registry, indexed in the order they were
//! first added, which is the resolver's discovery order. An edge `a → b`
//! means `a` depends on `b`, so `b` is installed first.

use crate::core::DekubeError;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is on the current DFS path.
    Gray,
    /// Node and everything below it are done.
    Black,
}

/// Directed graph of `depends` edges.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if it is not present yet and return its index.
    pub fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), index);
        index
    }

    /// Record that `from` depends on `to`.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Direct dependencies of `index` in the order their edges were added.
    ///
    /// petgraph walks adjacency lists newest-first.
    fn dependencies_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<_> = self.graph.neighbors(index).collect();
        deps.reverse();
        deps
    }

    /// Fail with [`DekubeError::CircularDependency`] if any cycle exists.
    ///
    /// The reported chain starts and ends with the same name, e.g.
    /// `a → b → a`. A self-dependency reads `a → a`.
    ///
    /// # Errors
    ///
    /// Returns the first cycle found, walking nodes in discovery order.
    pub fn detect_cycles(&self) -> Result<(), DekubeError> {
        let mut colors = vec![Color::White; self.graph.node_count()];
        let mut path = Vec::new();

        for node in self.graph.node_indices() {
            if colors[node.index()] == Color::White
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                let chain = cycle
                    .iter()
                    .map(|idx| self.graph[*idx].as_str())
                    .collect::<Vec<_>>()
                    .join(" → ");
                return Err(DekubeError::CircularDependency {
                    chain,
                });
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut [Color],
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors[node.index()] = Color::Gray;
        path.push(node);

        for neighbor in self.dependencies_of(node) {
            match colors[neighbor.index()] {
                Color::Gray => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        colors[node.index()] = Color::Black;
        None
    }

    /// Installation order: every dependency before its dependents, ties
    /// broken by discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::CircularDependency`] if the graph has a cycle.
    pub fn install_order(&self) -> Result<Vec<String>, DekubeError> {
        self.detect_cycles()?;

        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors(idx).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = pending
            .iter()
            .enumerate()
            .filter(|(_, remaining)| **remaining == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            let node = NodeIndex::new(idx);
            order.push(self.graph[node].clone());

            for dependent in self.graph.neighbors_directed(node, Direction::Incoming) {
                let remaining = &mut pending[dependent.index()];
                *remaining -= 1;
                if *remaining == 0 {
                    ready.push(Reverse(dependent.index()));
                }
            }
        }

        Ok(order)
    }
}
