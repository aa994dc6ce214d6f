//! De Bruijn graph over interned (k-1)-mer nodes.
//!
//! Each k-mer becomes one directed edge from its (k-1)-prefix to its
//! (k-1)-suffix. Node labels are stored once in an arena and addressed by
//! [`NodeId`]; successor lists keep insertion order and parallel edges.

use std::collections::{HashMap, VecDeque};

use serde_json::json;

/// Index of a node inside a [`DeBruijnGraph`].
pub type NodeId = usize;

#[derive(Debug, Clone, Default)]
pub struct DeBruijnGraph {
    labels: Vec<String>,
    index: HashMap<String, NodeId>,
    successors: Vec<Vec<NodeId>>,
    in_degree: Vec<usize>,
    edge_count: usize,
}

impl DeBruijnGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an ordered k-mer multiset.
    pub fn from_kmers<I, S>(kmers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        graph.extend_kmers(kmers);
        graph
    }

    /// Add every k-mer of the iterator as an edge, in order.
    pub fn extend_kmers<I, S>(&mut self, kmers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for kmer in kmers {
            self.add_kmer(kmer.as_ref());
        }
    }

    /// Add a single k-mer as a prefix -> suffix edge.
    ///
    /// K-mers shorter than two characters have no distinct prefix and suffix
    /// and are ignored.
    pub fn add_kmer(&mut self, kmer: &str) {
        let (Some((second, _)), Some((last, _))) =
            (kmer.char_indices().nth(1), kmer.char_indices().last())
        else {
            return;
        };
        let source = self.intern(&kmer[..last]);
        let target = self.intern(&kmer[second..]);
        self.successors[source].push(target);
        self.in_degree[target] += 1;
        self.edge_count += 1;
    }

    fn intern(&mut self, label: &str) -> NodeId {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        self.successors.push(Vec::new());
        self.in_degree.push(0);
        id
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of edges, counting parallel edges separately.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    pub fn label(&self, node: NodeId) -> &str {
        &self.labels[node]
    }

    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    /// Successors of `node` in insertion order.
    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        &self.successors[node]
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.in_degree[node]
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.successors[node].len()
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.labels.len()
    }

    /// Nodes whose in-degree differs from their out-degree, in insertion order.
    pub fn unbalanced_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|&node| self.in_degree(node) != self.out_degree(node))
            .collect()
    }

    pub fn is_balanced(&self) -> bool {
        self.unbalanced_nodes().is_empty()
    }

    /// First-inserted node with at least one outgoing edge.
    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes().find(|&node| self.out_degree(node) > 0)
    }

    /// Lexicographically smallest node with at least one outgoing edge.
    pub fn smallest_node(&self) -> Option<NodeId> {
        self.nodes()
            .filter(|&node| self.out_degree(node) > 0)
            .min_by(|&a, &b| self.labels[a].cmp(&self.labels[b]))
    }

    /// Weakly connected components over nodes that carry at least one edge.
    ///
    /// Components are ordered by their smallest node id and each component's
    /// nodes are sorted.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        let n = self.node_count();
        let mut neighbours: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        for source in self.nodes() {
            for &target in &self.successors[source] {
                neighbours[source].push(target);
                neighbours[target].push(source);
            }
        }

        let mut seen = vec![false; n];
        let mut components = Vec::new();
        for start in self.nodes() {
            if seen[start] || neighbours[start].is_empty() {
                continue;
            }
            seen[start] = true;
            let mut queue = VecDeque::from([start]);
            let mut component = Vec::new();
            while let Some(node) = queue.pop_front() {
                component.push(node);
                for &next in &neighbours[node] {
                    if !seen[next] {
                        seen[next] = true;
                        queue.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// JSON edge list with node attributes.
    pub fn to_json(&self) -> serde_json::Value {
        let nodes: Vec<_> = self
            .nodes()
            .map(|node| {
                json!({
                    "id": node,
                    "label": self.labels[node],
                    "in_degree": self.in_degree(node),
                    "out_degree": self.out_degree(node),
                })
            })
            .collect();
        let mut edges = Vec::with_capacity(self.edge_count);
        for source in self.nodes() {
            for &target in &self.successors[source] {
                edges.push(json!({"source": source, "target": target}));
            }
        }
        json!({"nodes": nodes, "edges": edges})
    }
}

/// Build a de Bruijn graph from an ordered k-mer multiset.
pub fn build_graph<I, S>(kmers: I) -> DeBruijnGraph
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DeBruijnGraph::from_kmers(kmers)
}
