//! Post-assembly confirmation against a known reference.

use bio::alignment::distance::levenshtein;
use serde::Serialize;

use crate::sequence::reverse_complement;

/// Edit distance is only computed when both sequences are at most this long.
pub const MAX_DISTANCE_LEN: usize = 20_000;

/// Outcome of comparing an assembled circular sequence with a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceCheck {
    Exact,
    /// The reference read from `offset` wraps around to the assembly.
    Rotation { offset: usize },
    /// As `Rotation`, but against the reverse complement of the reference.
    ReverseComplementRotation { offset: usize },
    EditDistance { distance: u32 },
    Skipped {
        assembled_len: usize,
        reference_len: usize,
    },
}

impl ReferenceCheck {
    /// True for any exact match up to rotation or strand.
    pub fn is_match(&self) -> bool {
        matches!(
            self,
            Self::Exact | Self::Rotation { .. } | Self::ReverseComplementRotation { .. }
        )
    }
}

fn rotation_offset(assembled: &str, reference: &str) -> Option<usize> {
    if assembled.len() != reference.len() || reference.is_empty() {
        return None;
    }
    let doubled = format!("{reference}{reference}");
    doubled.find(assembled)
}

/// Compare a circular assembly with `reference`, allowing rotation and strand.
pub fn compare_to_reference(assembled: &str, reference: &str) -> ReferenceCheck {
    if assembled == reference {
        return ReferenceCheck::Exact;
    }
    if let Some(offset) = rotation_offset(assembled, reference) {
        return ReferenceCheck::Rotation { offset };
    }
    if let Some(offset) = reverse_complement(reference)
        .ok()
        .and_then(|rc| rotation_offset(assembled, &rc))
    {
        return ReferenceCheck::ReverseComplementRotation { offset };
    }
    if assembled.len() <= MAX_DISTANCE_LEN && reference.len() <= MAX_DISTANCE_LEN {
        return ReferenceCheck::EditDistance {
            distance: levenshtein(assembled.as_bytes(), reference.as_bytes()),
        };
    }
    ReferenceCheck::Skipped {
        assembled_len: assembled.len(),
        reference_len: reference.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_rotations_on_both_strands() {
        let reference = "ACGGTTCAGTCA";
        assert_eq!(compare_to_reference(reference, reference), ReferenceCheck::Exact);
        assert_eq!(
            compare_to_reference("TTCAGTCAACGG", reference),
            ReferenceCheck::Rotation { offset: 4 }
        );
        // TGACTGAACCGT rotated by 6
        assert_eq!(
            compare_to_reference("AACCGTTGACTG", reference),
            ReferenceCheck::ReverseComplementRotation { offset: 6 }
        );
    }

    #[test]
    fn falls_back_to_edit_distance() {
        let check = compare_to_reference("ACGTTCAGTCA", "ACGGTTCAGTCA");
        assert_eq!(check, ReferenceCheck::EditDistance { distance: 1 });
        assert!(!check.is_match());
    }

    #[test]
    fn skips_distance_for_long_sequences() {
        let assembled = "A".repeat(MAX_DISTANCE_LEN + 1);
        let check = compare_to_reference(&assembled, "C");
        assert_eq!(
            check,
            ReferenceCheck::Skipped {
                assembled_len: MAX_DISTANCE_LEN + 1,
                reference_len: 1
            }
        );
    }

    #[test]
    fn serialises_with_kind_tag() {
        let value = serde_json::to_value(ReferenceCheck::Rotation { offset: 3 }).unwrap();
        assert_eq!(value["kind"], "rotation");
        assert_eq!(value["offset"], 3);
    }
}
