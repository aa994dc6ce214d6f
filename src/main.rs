use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info, LevelFilter};

use gasm::decompress::{default_output_path, spawn_decompress, DEFAULT_CHUNK_SIZE};
use gasm::output::{write_fasta, write_fasta_to, write_plain};
use gasm::reads::{load_reference, read_sequences};
use gasm::verify::{compare_to_reference, ReferenceCheck};
use gasm::{assemble_graph, build_read_graph, Assembly, AssemblyConfig, StartNode, DEFAULT_K};

/// Genome assembly from short reads via de Bruijn graphs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info", global = true)]
    verbose: bool,

    /// Debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Trace output
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble one circular sequence per read file
    Assemble(AssembleArgs),
    /// Decompress a .gz file with progress reporting
    Decompress(DecompressArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartArg {
    /// First node discovered while building the graph
    First,
    /// Lexicographically smallest node
    Smallest,
}

impl From<StartArg> for StartNode {
    fn from(arg: StartArg) -> Self {
        match arg {
            StartArg::First => StartNode::FirstInserted,
            StartArg::Smallest => StartNode::Smallest,
        }
    }
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// FASTQ/FASTA/plain read files, optionally gzipped
    #[arg(required = true)]
    reads: Vec<PathBuf>,

    /// k-mer size (if unsure, use 31)
    #[arg(short, long, default_value_t = DEFAULT_K)]
    k: usize,

    /// Output path for a single read file (default: stdout)
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory receiving one output file per read file
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write FASTA records instead of plain sequence text
    #[arg(long)]
    fasta: bool,

    /// Wrap FASTA lines to this width (0 = no-wrap)
    #[arg(long, default_value_t = 60)]
    fasta_line_width: usize,

    /// Drop the (k-1)-base wrap-around repeated at the end of a closed walk
    #[arg(long)]
    circular: bool,

    /// Start node of the Eulerian traversal
    #[arg(long, value_enum, default_value_t = StartArg::First)]
    start: StartArg,

    /// Skip the balanced-degree and connectivity check
    #[arg(long)]
    no_validate: bool,

    /// Skip adding reverse-complement k-mers
    #[arg(long)]
    no_revcomp: bool,

    /// Optional reference FASTA used for post-assembly confirmation
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Optional output file for the de Bruijn graph (JSON edge list with node attributes)
    #[arg(long)]
    export_graph_json: Option<PathBuf>,

    /// Optional JSON report of assembly statistics
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Assemble several read files concurrently (requires the `parallel` feature)
    #[arg(long, default_value_t = false)]
    threads: bool,

    /// Number of worker threads when --threads is set (default: max available - 1)
    #[arg(long, default_value_t = default_workers())]
    max_workers: usize,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Gzip-compressed input
    input: PathBuf,

    /// Output path (default: input without its .gz extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bytes decompressed between progress reports
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

fn default_workers() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

fn main() {
    let cli = Cli::parse();
    let log_level = if cli.trace {
        LevelFilter::Trace
    } else if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };
    env_logger::Builder::new().filter_level(log_level).init();

    let outcome = match &cli.command {
        Command::Assemble(args) => run_assemble(args),
        Command::Decompress(args) => run_decompress(args),
    };
    if let Err(error) = outcome {
        eprintln!("{}: {error:?}", cli.command.failure_message());
        std::process::exit(1);
    }
}

impl Command {
    fn failure_message(&self) -> &'static str {
        match self {
            Command::Assemble(_) => "Assembly failed",
            Command::Decompress(_) => "Decompression failed",
        }
    }
}

impl AssembleArgs {
    fn config(&self) -> AssemblyConfig {
        AssemblyConfig {
            k: self.k,
            include_reverse_complement: !self.no_revcomp,
            validate: !self.no_validate,
            start: self.start.into(),
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_else(|| "reads".as_ref())
        .to_string_lossy()
        .into_owned()
}

/// Destination for each read file, or `None` for stdout.
///
/// Under `--output-dir` every file is written to `<file name>.<ext>`; two
/// inputs sharing a file name are refused instead of overwriting each other.
fn output_targets(args: &AssembleArgs) -> Result<Vec<Option<PathBuf>>> {
    let extension = if args.fasta { "fasta" } else { "txt" };
    match (&args.output, &args.output_dir) {
        (Some(path), _) => Ok(vec![Some(path.clone())]),
        (None, Some(dir)) => {
            let mut seen = HashMap::new();
            let mut targets = Vec::with_capacity(args.reads.len());
            for input in &args.reads {
                let target = dir.join(format!("{}.{extension}", file_label(input)));
                if let Some(previous) = seen.insert(target.clone(), input) {
                    bail!(
                        "{} and {} would both be written to {}",
                        previous.display(),
                        input.display(),
                        target.display()
                    );
                }
                targets.push(Some(target));
            }
            Ok(targets)
        }
        (None, None) => Ok(vec![None; args.reads.len()]),
    }
}

#[derive(serde::Serialize)]
struct AssemblyReport<'a> {
    input: String,
    #[serde(flatten)]
    assembly: &'a Assembly,
    circular_len: usize,
    reference: Option<ReferenceCheck>,
}

fn assemble_file(path: &Path, config: &AssemblyConfig, graph_json: Option<&Path>) -> Result<Assembly> {
    let reads = read_sequences(path)
        .with_context(|| format!("Failed to parse reads from {}", path.display()))?;
    info!("Building de Bruijn graph for {} (k = {})", path.display(), config.k);
    let graph = build_read_graph(&reads, config)
        .with_context(|| format!("Failed to build graph for {}", path.display()))?;
    info!(
        "Graph has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    if let Some(json_path) = graph_json {
        if let Some(parent) = json_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(json_path)
            .with_context(|| format!("Failed to create {}", json_path.display()))?;
        writeln!(file, "{}", serde_json::to_string_pretty(&graph.to_json())?)?;
        info!("De Bruijn graph written to {}", json_path.display());
    }

    let assembly = assemble_graph(&graph, config)
        .with_context(|| format!("Failed to assemble {}", path.display()))?;
    debug!("Assembled sequence: {}", assembly.sequence);
    Ok(assembly)
}

#[cfg(feature = "parallel")]
fn assemble_all(args: &AssembleArgs, config: &AssemblyConfig) -> Result<Vec<Assembly>> {
    use rayon::prelude::*;

    if !args.threads || args.reads.len() < 2 {
        return assemble_sequentially(args, config);
    }
    if args.export_graph_json.is_some() {
        bail!("--export-graph-json requires a single read file");
    }
    info!("Assembling {} files on {} workers", args.reads.len(), args.max_workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.max_workers)
        .build()
        .context("Failed to build worker pool")?;
    pool.install(|| {
        args.reads
            .par_iter()
            .map(|path| assemble_file(path, config, None))
            .collect()
    })
}

#[cfg(not(feature = "parallel"))]
fn assemble_all(args: &AssembleArgs, config: &AssemblyConfig) -> Result<Vec<Assembly>> {
    if args.threads {
        log::warn!("Built without the `parallel` feature; assembling sequentially");
    }
    assemble_sequentially(args, config)
}

fn assemble_sequentially(args: &AssembleArgs, config: &AssemblyConfig) -> Result<Vec<Assembly>> {
    if args.export_graph_json.is_some() && args.reads.len() > 1 {
        bail!("--export-graph-json requires a single read file");
    }
    args.reads
        .iter()
        .map(|path| assemble_file(path, config, args.export_graph_json.as_deref()))
        .collect()
}

fn run_assemble(args: &AssembleArgs) -> Result<()> {
    if args.output.is_some() && args.reads.len() > 1 {
        bail!("--output accepts a single read file; use --output-dir for several");
    }
    if args.report_json.is_some() && args.reads.len() > 1 {
        bail!("--report-json requires a single read file");
    }
    let targets = output_targets(args)?;
    let config = args.config();
    let reference = args
        .reference
        .as_deref()
        .map(|path| {
            load_reference(path)
                .with_context(|| format!("Failed to load reference {}", path.display()))
        })
        .transpose()?
        .flatten();

    let assemblies = assemble_all(args, &config)?;

    for ((path, assembly), target) in args.reads.iter().zip(&assemblies).zip(&targets) {
        let sequence = if args.circular {
            assembly.circular_sequence()
        } else {
            assembly.sequence.as_str()
        };
        let header = format!("assembled_from_{}", file_label(path));
        emit(args, target.as_deref(), &header, sequence)?;

        let check = reference.as_deref().map(|reference_seq| {
            let check = compare_to_reference(assembly.circular_sequence(), reference_seq);
            report_reference(&check, assembly.circular_sequence().len(), reference_seq.len());
            check
        });

        if let Some(report_path) = &args.report_json {
            let report = AssemblyReport {
                input: path.display().to_string(),
                assembly,
                circular_len: assembly.circular_sequence().len(),
                reference: check,
            };
            let mut file = File::create(report_path)
                .with_context(|| format!("Failed to create {}", report_path.display()))?;
            writeln!(file, "{}", serde_json::to_string_pretty(&report)?)?;
            info!("Assembly report written to {}", report_path.display());
        }
    }
    Ok(())
}

fn emit(args: &AssembleArgs, target: Option<&Path>, header: &str, sequence: &str) -> Result<()> {
    match target {
        Some(path) => {
            let written = if args.fasta {
                write_fasta(path, header, sequence, args.fasta_line_width)
            } else {
                write_plain(path, sequence)
            };
            written.with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Assembled sequence ({} bp) saved to {}", sequence.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            if args.fasta || args.reads.len() > 1 {
                write_fasta_to(&mut handle, header, sequence, args.fasta_line_width)?;
            } else {
                writeln!(handle, "{sequence}")?;
            }
        }
    }
    Ok(())
}

fn report_reference(check: &ReferenceCheck, assembled_len: usize, reference_len: usize) {
    match check {
        ReferenceCheck::Exact => info!(
            "Assembled contig matches the reference sequence exactly ({} bp).",
            assembled_len
        ),
        ReferenceCheck::Rotation { offset } => info!(
            "Assembled contig matches the reference rotated by {} bp.",
            offset
        ),
        ReferenceCheck::ReverseComplementRotation { offset } => info!(
            "Assembled contig matches the reverse-complement reference rotated by {} bp.",
            offset
        ),
        ReferenceCheck::EditDistance { distance } => info!(
            "Edit distance to reference (len {} vs {}): {}",
            assembled_len, reference_len, distance
        ),
        ReferenceCheck::Skipped {
            assembled_len,
            reference_len,
        } => info!(
            "Reference check skipped: assembled length {} or reference length {} exceeds {} bp threshold.",
            assembled_len,
            reference_len,
            gasm::verify::MAX_DISTANCE_LEN
        ),
    }
}

fn run_decompress(args: &DecompressArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    let job = spawn_decompress(args.input.clone(), output.clone(), args.chunk_size);
    for written in job.progress.iter() {
        info!("Decompressed {written} bytes");
    }
    let total = job
        .wait()
        .with_context(|| format!("Error during decompression of {}", args.input.display()))?;
    eprintln!(
        "Decompression completed. File saved as {} ({} bytes)",
        output.display(),
        total
    );
    Ok(())
}
