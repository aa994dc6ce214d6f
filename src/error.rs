//! Error types shared by the assembly pipeline.

/// Why an assembly run had nothing to work with.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    #[error("no reads were supplied")]
    NoReads,
    #[error("k-mer length {k} yields no k-mers from any read")]
    NoKmers { k: usize },
    #[error("circuit contains no nodes")]
    EmptyCircuit,
}

/// Reasons a graph cannot be walked as a single Eulerian circuit.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NotEulerian {
    #[error("node {node} has in-degree {in_degree} but out-degree {out_degree}")]
    Unbalanced {
        node: String,
        in_degree: usize,
        out_degree: usize,
    },
    #[error("edges span {components} disconnected components")]
    Disconnected { components: usize },
}

/// Errors returned by the assembly pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("invalid base '{base}' at position {position}")]
    InvalidBase { base: char, position: usize },
    #[error("empty input: {0}")]
    EmptyInput(EmptyReason),
    #[error("k-mer length must be at least 2, got {k}")]
    InvalidKmerLength { k: usize },
    #[error("graph is not Eulerian: {0}")]
    NotEulerian(#[from] NotEulerian),
}

impl From<EmptyReason> for AssemblyError {
    fn from(reason: EmptyReason) -> Self {
        AssemblyError::EmptyInput(reason)
    }
}
