//! Eulerian circuit traversal over a [`DeBruijnGraph`].
//!
//! The graph is never mutated: consumption of edges is tracked in a separate
//! [`EdgeCursors`] structure, so the same graph can be traversed repeatedly.

use std::collections::HashSet;

use crate::error::NotEulerian;
use crate::graph::{DeBruijnGraph, NodeId};
use crate::reconstruct::reconstruct;
use crate::sequence::reverse_complement;
use crate::AssemblyError;

/// Which node a traversal starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartNode {
    /// First-inserted node with an outgoing edge.
    #[default]
    FirstInserted,
    /// Lexicographically smallest node with an outgoing edge.
    Smallest,
}

impl StartNode {
    pub fn select(self, graph: &DeBruijnGraph) -> Option<NodeId> {
        match self {
            Self::FirstInserted => graph.first_node(),
            Self::Smallest => graph.smallest_node(),
        }
    }
}

/// Per-node index of the next unconsumed successor.
///
/// Nodes added to the graph after the cursors were built start with every
/// edge unconsumed. Ids the graph does not hold have no edges.
#[derive(Debug, Clone)]
pub struct EdgeCursors {
    next: Vec<usize>,
}

impl EdgeCursors {
    pub fn new(graph: &DeBruijnGraph) -> Self {
        Self {
            next: vec![0; graph.node_count()],
        }
    }

    /// Consume and return the next outgoing edge of `node`, if any remain.
    pub fn advance(&mut self, graph: &DeBruijnGraph, node: NodeId) -> Option<NodeId> {
        if node >= graph.node_count() {
            return None;
        }
        if node >= self.next.len() {
            self.next.resize(graph.node_count(), 0);
        }
        let cursor = &mut self.next[node];
        let target = graph.successors(node).get(*cursor).copied()?;
        *cursor += 1;
        Some(target)
    }

    pub fn remaining(&self, graph: &DeBruijnGraph, node: NodeId) -> usize {
        if node >= graph.node_count() {
            return 0;
        }
        let used = self.next.get(node).copied().unwrap_or(0);
        graph.out_degree(node).saturating_sub(used)
    }
}

/// Ordered node walk produced by [`find_eulerian_circuit`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Circuit {
    nodes: Vec<NodeId>,
}

impl Circuit {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges walked.
    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// True when the walk ends where it started.
    pub fn is_closed(&self) -> bool {
        matches!((self.nodes.first(), self.nodes.last()), (Some(a), Some(b)) if a == b)
            && self.nodes.len() > 1
    }

    pub fn labels<'g>(&self, graph: &'g DeBruijnGraph) -> Vec<&'g str> {
        self.nodes.iter().map(|&node| graph.label(node)).collect()
    }

    /// The same closed walk started `offset` edges later.
    ///
    /// Open walks cannot be rotated and are returned unchanged.
    pub fn rotate(&self, offset: usize) -> Circuit {
        if !self.is_closed() {
            return self.clone();
        }
        let cycle = &self.nodes[..self.nodes.len() - 1];
        let shift = offset % cycle.len();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        nodes.extend_from_slice(&cycle[shift..]);
        nodes.extend_from_slice(&cycle[..shift]);
        nodes.push(cycle[shift]);
        Circuit { nodes }
    }

    /// Spell the walk back into a nucleotide string.
    pub fn spell(&self, graph: &DeBruijnGraph) -> Result<String, AssemblyError> {
        reconstruct(&self.labels(graph))
    }
}

/// Walk every edge reachable from the first-inserted node exactly once.
pub fn find_eulerian_circuit(graph: &DeBruijnGraph) -> Circuit {
    match graph.first_node() {
        Some(start) => find_eulerian_circuit_from(graph, start),
        None => Circuit::default(),
    }
}

/// Iterative Hierholzer traversal from `start`.
///
/// Successors are consumed in insertion order. On a balanced, connected
/// graph the result is a closed walk using every edge once; otherwise it is
/// a walk over whatever edges are reachable from `start`.
pub fn find_eulerian_circuit_from(graph: &DeBruijnGraph, start: NodeId) -> Circuit {
    let mut cursors = EdgeCursors::new(graph);
    let mut stack = vec![start];
    let mut path = Vec::with_capacity(graph.edge_count() + 1);

    while let Some(&current) = stack.last() {
        match cursors.advance(graph, current) {
            Some(next) => stack.push(next),
            None => {
                path.push(current);
                stack.pop();
            }
        }
    }

    path.reverse();
    Circuit { nodes: path }
}

/// Check the Eulerian-circuit precondition before traversal.
///
/// Every node must be balanced. Edges must form a single weak component,
/// except that with `allow_strand_mirror` two components are accepted when
/// one holds exactly the reverse complements of the other's labels.
pub fn check_eulerian(
    graph: &DeBruijnGraph,
    allow_strand_mirror: bool,
) -> Result<(), NotEulerian> {
    if let Some(&node) = graph.unbalanced_nodes().first() {
        return Err(NotEulerian::Unbalanced {
            node: graph.label(node).to_string(),
            in_degree: graph.in_degree(node),
            out_degree: graph.out_degree(node),
        });
    }

    let components = graph.components();
    match components.len() {
        0 | 1 => Ok(()),
        2 if allow_strand_mirror && is_strand_mirror(graph, &components[0], &components[1]) => {
            Ok(())
        }
        n => Err(NotEulerian::Disconnected { components: n }),
    }
}

fn is_strand_mirror(graph: &DeBruijnGraph, forward: &[NodeId], reverse: &[NodeId]) -> bool {
    if forward.len() != reverse.len() {
        return false;
    }
    let reverse: HashSet<NodeId> = reverse.iter().copied().collect();
    forward.iter().all(|&node| {
        reverse_complement(graph.label(node))
            .ok()
            .and_then(|rc| graph.node_id(&rc))
            .is_some_and(|mirror| reverse.contains(&mirror))
    })
}
