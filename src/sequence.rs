//! Nucleotide helpers: strand normalisation and k-mer decomposition.

use bio::alphabets::dna;

use crate::error::AssemblyError;

#[inline]
fn is_nucleotide(base: char) -> bool {
    matches!(base, 'A' | 'C' | 'G' | 'T')
}

/// Check that `seq` holds only uppercase `A`, `C`, `G` and `T`.
///
/// The first offending character is reported with its character position.
pub fn validate_bases(seq: &str) -> Result<(), AssemblyError> {
    match seq.chars().enumerate().find(|&(_, c)| !is_nucleotide(c)) {
        Some((position, base)) => Err(AssemblyError::InvalidBase { base, position }),
        None => Ok(()),
    }
}

/// Reverse complement of an uppercase DNA string.
pub fn reverse_complement(seq: &str) -> Result<String, AssemblyError> {
    validate_bases(seq)?;
    Ok(seq.bytes().rev().map(|b| dna::complement(b) as char).collect())
}

/// All overlapping windows of length `k`, left to right.
///
/// Returns an empty vector when `k` is zero or longer than the sequence.
pub fn generate_kmers(seq: &str, k: usize) -> Vec<&str> {
    if k == 0 {
        return Vec::new();
    }
    let bounds: Vec<usize> = seq
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(seq.len()))
        .collect();
    if bounds.len() <= k {
        return Vec::new();
    }
    (0..bounds.len() - k)
        .map(|start| &seq[bounds[start]..bounds[start + k]])
        .collect()
}
