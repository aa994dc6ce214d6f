//! Writers for assembled sequences.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

fn create_with_parents(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Write `sequence` verbatim, without a trailing newline.
pub fn write_plain(path: &Path, sequence: &str) -> io::Result<()> {
    let mut writer = create_with_parents(path)?;
    writer.write_all(sequence.as_bytes())?;
    writer.flush()
}

/// Write a single FASTA record, wrapping at `line_width` (0 = no wrap).
pub fn write_fasta(path: &Path, header: &str, sequence: &str, line_width: usize) -> io::Result<()> {
    let mut writer = create_with_parents(path)?;
    write_fasta_to(&mut writer, header, sequence, line_width)?;
    writer.flush()
}

pub fn write_fasta_to<W: Write>(
    writer: &mut W,
    header: &str,
    sequence: &str,
    line_width: usize,
) -> io::Result<()> {
    writeln!(writer, ">{header}")?;
    if line_width == 0 || sequence.is_empty() {
        return writeln!(writer, "{sequence}");
    }
    for line in sequence.as_bytes().chunks(line_width) {
        writer.write_all(line)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_fasta_lines() {
        let mut buffer = Vec::new();
        write_fasta_to(&mut buffer, "contig", "ACGTACGTAC", 4).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            ">contig\nACGT\nACGT\nAC\n"
        );
    }

    #[test]
    fn zero_width_keeps_one_line() {
        let mut buffer = Vec::new();
        write_fasta_to(&mut buffer, "c", "ACGTACGT", 0).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), ">c\nACGTACGT\n");
    }

    #[test]
    fn plain_output_is_verbatim_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/assembly.txt");
        write_plain(&path, "ACGGTTCAGTCA").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ACGGTTCAGTCA");
    }
}
