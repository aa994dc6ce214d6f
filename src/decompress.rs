//! Streaming gzip decompression with progress reporting.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use flate2::read::MultiGzDecoder;

use crate::reads::is_gzip;

/// Bytes decompressed between progress reports.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Output path for `input`: the `.gz`/`.bgz` extension removed, or `.out`
/// appended when there is none.
pub fn default_output_path(input: &Path) -> PathBuf {
    if is_gzip(input) {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".out");
        PathBuf::from(name)
    }
}

/// Decompress `input` into `output`, calling `progress` with the running
/// total of bytes written after every chunk. Returns the total.
pub fn decompress_file<F>(
    input: &Path,
    output: &Path,
    chunk_size: usize,
    mut progress: F,
) -> io::Result<u64>
where
    F: FnMut(u64),
{
    let mut decoder = MultiGzDecoder::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut written: u64 = 0;

    loop {
        let n = read_chunk(&mut decoder, &mut buffer)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n])?;
        written += n as u64;
        progress(written);
    }
    writer.flush()?;
    Ok(written)
}

// Fill the buffer as far as the stream allows so progress reports land on
// chunk boundaries.
fn read_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Decompression running on a background thread.
pub struct DecompressJob {
    /// Running byte totals, one message per chunk.
    pub progress: Receiver<u64>,
    pub output: PathBuf,
    handle: JoinHandle<io::Result<u64>>,
}

impl DecompressJob {
    /// Block until the worker finishes and return its byte total.
    pub fn wait(self) -> io::Result<u64> {
        self.handle
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "decompression worker panicked"))?
    }
}

/// Start decompressing `input` into `output` on a new thread.
pub fn spawn_decompress(input: PathBuf, output: PathBuf, chunk_size: usize) -> DecompressJob {
    let (sender, progress) = mpsc::channel();
    let target = output.clone();
    let handle = thread::spawn(move || {
        log::info!("Decompressing {} to {}", input.display(), target.display());
        decompress_file(&input, &target, chunk_size, |written| {
            // receiver may have been dropped; the job still runs to completion
            let _ = sender.send(written);
        })
    });
    DecompressJob {
        progress,
        output,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn write_gzip(path: &Path, data: &[u8]) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn strips_compression_suffix() {
        assert_eq!(
            default_output_path(Path::new("reads.fastq.gz")),
            PathBuf::from("reads.fastq")
        );
        assert_eq!(
            default_output_path(Path::new("/data/big.fq.bgz")),
            PathBuf::from("/data/big.fq")
        );
        assert_eq!(
            default_output_path(Path::new("READS.FQ.GZ")),
            PathBuf::from("READS.FQ")
        );
        // stems ending in g or z survive
        assert_eq!(default_output_path(Path::new("zzgg.gz")), PathBuf::from("zzgg"));
        assert_eq!(
            default_output_path(Path::new("reads.fastq")),
            PathBuf::from("reads.fastq.out")
        );
    }

    #[test]
    fn decompresses_with_monotone_progress() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fastq.gz");
        let output = dir.path().join("reads.fastq");
        let data: Vec<u8> = b"@r\nACGT\n+\nIIII\n".repeat(100);
        write_gzip(&input, &data);

        let mut reports = Vec::new();
        let total = decompress_file(&input, &output, 256, |n| reports.push(n)).unwrap();

        assert_eq!(total, data.len() as u64);
        assert_eq!(std::fs::read(&output).unwrap(), data);
        assert_eq!(reports.last().copied(), Some(total));
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(reports[0], 256);
    }

    #[test]
    fn background_job_reports_progress_and_total() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("genome.txt.gz");
        let data = vec![b'A'; 10_000];
        write_gzip(&input, &data);

        let output = default_output_path(&input);
        let job = spawn_decompress(input, output.clone(), 4096);
        let updates: Vec<u64> = job.progress.iter().collect();
        let total = job.wait().unwrap();

        assert_eq!(total, 10_000);
        assert_eq!(updates, vec![4096, 8192, 10_000]);
        assert_eq!(std::fs::read(output).unwrap(), data);
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decompress_file(
            &dir.path().join("absent.gz"),
            &dir.path().join("absent"),
            DEFAULT_CHUNK_SIZE,
            |_| {},
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
