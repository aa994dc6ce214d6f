//! Read ingestion from FASTQ, FASTA or plain sequence-per-line files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;

/// Errors returned while loading reads.
#[derive(thiserror::Error, Debug)]
pub enum ReadsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed record in {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Encountered non-UTF-8 symbols in sequence data from {path}")]
    NonUtf8 { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fastq,
    Fasta,
    Lines,
}

/// Extensions that mark a gzip container.
const GZIP_EXTENSIONS: [&str; 2] = ["gz", "bgz"];

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()?.to_str().map(str::to_ascii_lowercase)
}

/// True when `path` ends in `.gz` or `.bgz`, in any case.
pub fn is_gzip(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| GZIP_EXTENSIONS.contains(&ext.as_str()))
}

impl SequenceFormat {
    fn from_extension(ext: &str) -> Self {
        match ext {
            "fastq" | "fq" => Self::Fastq,
            "fasta" | "fa" | "fna" => Self::Fasta,
            _ => Self::Lines,
        }
    }
}

/// Guess the record format from the file extension, looking through `.gz`.
pub fn infer_format(path: &Path) -> SequenceFormat {
    let inner = if is_gzip(path) {
        path.file_stem().map(Path::new).and_then(lowercase_extension)
    } else {
        lowercase_extension(path)
    };
    inner.map_or(SequenceFormat::Lines, |ext| SequenceFormat::from_extension(&ext))
}

/// Open `path` for buffered reading, decompressing gzip transparently.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, ReadsError> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn uppercase_sequence(bytes: &[u8], path: &Path) -> Result<String, ReadsError> {
    let upper = bytes.to_ascii_uppercase();
    String::from_utf8(upper).map_err(|_| ReadsError::NonUtf8 {
        path: path.to_path_buf(),
    })
}

/// Load every sequence from `path` in file order, uppercased.
pub fn read_sequences(path: &Path) -> Result<Vec<String>, ReadsError> {
    let format = infer_format(path);
    let reader = open_reader(path)?;
    let sequences = parse_sequences(reader, format, path)?;
    log::info!(
        "Loaded {} reads ({:?}) from {}",
        sequences.len(),
        format,
        path.display()
    );
    Ok(sequences)
}

/// Parse sequences from an already opened reader.
///
/// `origin` is only used to label errors.
pub fn parse_sequences<R: BufRead>(
    reader: R,
    format: SequenceFormat,
    origin: &Path,
) -> Result<Vec<String>, ReadsError> {
    let parse_error = |message: String| ReadsError::Parse {
        path: origin.to_path_buf(),
        message,
    };

    let mut sequences = Vec::new();
    match format {
        SequenceFormat::Fastq => {
            for record in fastq::Reader::new(reader).records() {
                let record = record.map_err(|e| parse_error(e.to_string()))?;
                sequences.push(uppercase_sequence(record.seq(), origin)?);
            }
        }
        SequenceFormat::Fasta => {
            for record in fasta::Reader::new(reader).records() {
                let record = record.map_err(|e| parse_error(e.to_string()))?;
                sequences.push(uppercase_sequence(record.seq(), origin)?);
            }
        }
        SequenceFormat::Lines => {
            for line in reader.lines() {
                let line = line?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                sequences.push(trimmed.to_ascii_uppercase());
            }
        }
    }
    Ok(sequences)
}

/// Concatenate all records of a reference file; `None` when it has none.
pub fn load_reference(path: &Path) -> Result<Option<String>, ReadsError> {
    let sequences = read_sequences(path)?;
    if sequences.is_empty() {
        return Ok(None);
    }
    Ok(Some(sequences.concat()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn infers_format_through_gzip_suffix() {
        assert_eq!(infer_format(Path::new("reads.fastq")), SequenceFormat::Fastq);
        assert_eq!(infer_format(Path::new("reads.FQ.gz")), SequenceFormat::Fastq);
        assert_eq!(infer_format(Path::new("ref.fa.bgz")), SequenceFormat::Fasta);
        assert_eq!(infer_format(Path::new("genome.fna")), SequenceFormat::Fasta);
        assert_eq!(infer_format(Path::new("reads.txt")), SequenceFormat::Lines);
        assert_eq!(infer_format(Path::new("reads.gz")), SequenceFormat::Lines);
        assert!(is_gzip(Path::new("reads.fastq.GZ")));
        assert!(!is_gzip(Path::new("reads.fastq")));
    }

    #[test]
    fn parses_fastq_sequence_lines_only() {
        let data = "@r1\nacgt\n+\nIIII\n@r2\nGGCA\n+\nHHHH\n";
        let seqs =
            parse_sequences(Cursor::new(data), SequenceFormat::Fastq, Path::new("mem")).unwrap();
        assert_eq!(seqs, vec!["ACGT", "GGCA"]);
    }

    #[test]
    fn parses_fasta_and_lines() {
        let fasta_data = ">one\nACG\nTTA\n>two\nGG\n";
        let seqs =
            parse_sequences(Cursor::new(fasta_data), SequenceFormat::Fasta, Path::new("mem"))
                .unwrap();
        assert_eq!(seqs, vec!["ACGTTA", "GG"]);

        let lines = "acgt\n\n  ttga  \n";
        let seqs =
            parse_sequences(Cursor::new(lines), SequenceFormat::Lines, Path::new("mem")).unwrap();
        assert_eq!(seqs, vec!["ACGT", "TTGA"]);
    }

    #[test]
    fn malformed_fastq_is_reported_with_origin() {
        let data = "not a header\nACGT\n";
        let err = parse_sequences(Cursor::new(data), SequenceFormat::Fastq, Path::new("bad.fq"))
            .unwrap_err();
        match err {
            ReadsError::Parse { path, .. } => assert_eq!(path, Path::new("bad.fq")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
