//! gasm: circular genome assembly from short reads.
//!
//! Reads are decomposed into k-mers on both strands, the k-mers form a de
//! Bruijn graph over (k-1)-mer nodes, and an Eulerian circuit through that
//! graph is spelled back into a single circular superstring.

pub mod decompress;
pub mod error;
pub mod eulerian;
pub mod graph;
pub mod output;
pub mod reads;
pub mod reconstruct;
pub mod sequence;
pub mod verify;

pub use error::{AssemblyError, EmptyReason, NotEulerian};
pub use eulerian::{
    check_eulerian, find_eulerian_circuit, find_eulerian_circuit_from, Circuit, EdgeCursors,
    StartNode,
};
pub use graph::{build_graph, DeBruijnGraph, NodeId};
pub use reconstruct::reconstruct;
pub use sequence::{generate_kmers, reverse_complement, validate_bases};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// k-mer size suggested when the caller has no better estimate.
pub const DEFAULT_K: usize = 31;

/// Options that govern a single assembly run.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyConfig {
    /// k-mer length; graph nodes are (k-1)-mers.
    pub k: usize,
    /// Add the reverse-complement strand of every read.
    pub include_reverse_complement: bool,
    /// Reject graphs that cannot hold a single Eulerian circuit.
    pub validate: bool,
    /// Where the traversal starts.
    pub start: StartNode,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            include_reverse_complement: true,
            validate: true,
            start: StartNode::FirstInserted,
        }
    }
}

/// Result of one assembly run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Assembly {
    /// Spelled walk, including the (k-1)-base wrap-around of a closed walk.
    pub sequence: String,
    pub k: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub circuit_len: usize,
    pub closed: bool,
}

impl Assembly {
    /// The sequence with the repeated start of a closed walk removed.
    pub fn circular_sequence(&self) -> &str {
        let overlap = self.k.saturating_sub(1);
        if !self.closed || overlap == 0 {
            return &self.sequence;
        }
        let end = self
            .sequence
            .char_indices()
            .rev()
            .nth(overlap - 1)
            .map_or(0, |(idx, _)| idx);
        &self.sequence[..end]
    }
}

/// Assemble `reads` with k-mer length `k` and default options.
pub fn assemble<S: AsRef<str>>(reads: &[S], k: usize) -> Result<String, AssemblyError> {
    let config = AssemblyConfig {
        k,
        ..AssemblyConfig::default()
    };
    assemble_with(reads, &config).map(|assembly| assembly.sequence)
}

/// Assemble `reads` and report statistics alongside the sequence.
pub fn assemble_with<S: AsRef<str>>(
    reads: &[S],
    config: &AssemblyConfig,
) -> Result<Assembly, AssemblyError> {
    let graph = build_read_graph(reads, config)?;
    assemble_graph(&graph, config)
}

/// Build the de Bruijn graph of every read, forward strand first.
pub fn build_read_graph<S: AsRef<str>>(
    reads: &[S],
    config: &AssemblyConfig,
) -> Result<DeBruijnGraph, AssemblyError> {
    if reads.is_empty() {
        return Err(EmptyReason::NoReads.into());
    }
    if config.k < 2 {
        return Err(AssemblyError::InvalidKmerLength { k: config.k });
    }

    let mut graph = DeBruijnGraph::new();
    for read in reads {
        let read = read.as_ref();
        validate_bases(read)?;
        graph.extend_kmers(generate_kmers(read, config.k));
        if config.include_reverse_complement {
            let rc = reverse_complement(read)?;
            graph.extend_kmers(generate_kmers(&rc, config.k));
        }
    }

    if graph.is_empty() {
        return Err(EmptyReason::NoKmers { k: config.k }.into());
    }
    log::debug!(
        "Built de Bruijn graph with {} nodes and {} edges (k = {})",
        graph.node_count(),
        graph.edge_count(),
        config.k
    );
    Ok(graph)
}

/// Traverse an already built graph and spell the result.
pub fn assemble_graph(
    graph: &DeBruijnGraph,
    config: &AssemblyConfig,
) -> Result<Assembly, AssemblyError> {
    let start = config
        .start
        .select(graph)
        .ok_or(AssemblyError::EmptyInput(EmptyReason::NoKmers { k: config.k }))?;
    if config.validate {
        check_eulerian(graph, config.include_reverse_complement)?;
    }

    let circuit = find_eulerian_circuit_from(graph, start);
    log::debug!(
        "Eulerian walk from {} covers {} of {} edges",
        graph.label(start),
        circuit.edge_count(),
        graph.edge_count()
    );
    let sequence = circuit.spell(graph)?;

    Ok(Assembly {
        sequence,
        k: config.k,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        circuit_len: circuit.len(),
        closed: circuit.is_closed(),
    })
}

/// Assemble independent read sets, each with its own graph.
///
/// Results are returned in input order. With the `parallel` feature the sets
/// are processed on the rayon pool.
pub fn assemble_many<S>(
    read_sets: &[Vec<S>],
    config: &AssemblyConfig,
) -> Vec<Result<Assembly, AssemblyError>>
where
    S: AsRef<str> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        read_sets
            .par_iter()
            .map(|reads| assemble_with(reads, config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        read_sets
            .iter()
            .map(|reads| assemble_with(reads, config))
            .collect()
    }
}
