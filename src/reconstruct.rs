//! Superstring reconstruction from an ordered node walk.

use crate::error::{AssemblyError, EmptyReason};

/// Collapse consecutive overlapping labels into one string.
///
/// The first label seeds the result; every later label overlaps its
/// predecessor by all but one character and contributes only its last one.
pub fn reconstruct<S: AsRef<str>>(labels: &[S]) -> Result<String, AssemblyError> {
    let (seed, rest) = labels
        .split_first()
        .ok_or(AssemblyError::EmptyInput(EmptyReason::EmptyCircuit))?;
    let seed = seed.as_ref();
    let mut assembled = String::with_capacity(seed.len() + rest.len());
    assembled.push_str(seed);
    assembled.extend(rest.iter().filter_map(|label| label.as_ref().chars().last()));
    Ok(assembled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extends_seed_by_last_characters() {
        let labels = ["ACG", "CGG", "GGT", "GTA"];
        assert_eq!(reconstruct(&labels).unwrap(), "ACGGTA");
    }

    #[test]
    fn result_length_is_seed_plus_steps() {
        let labels = vec!["AT".to_string(), "TC".to_string(), "CG".to_string(), "GA".to_string()];
        let assembled = reconstruct(&labels).unwrap();
        assert_eq!(assembled.len(), 2 + labels.len() - 1);
        assert_eq!(assembled, "ATCGA");
    }

    #[test]
    fn single_label_is_returned_verbatim() {
        assert_eq!(reconstruct(&["GATTACA"]).unwrap(), "GATTACA");
    }

    #[test]
    fn empty_walk_is_an_error() {
        let labels: [&str; 0] = [];
        assert_eq!(
            reconstruct(&labels),
            Err(AssemblyError::EmptyInput(EmptyReason::EmptyCircuit))
        );
    }
}
