//! A binary for calling topologically associating domains from a dense Hi-C
//! contact matrix stored as text.
//!
//! ```shell
//! cargo run --release --bin=clustertad --features=binaries matrix.txt.gz
//! ```
//!
//! The matrix is read as one row per line with values separated by
//! whitespace. Blank lines and lines starting with `#` are skipped, and files
//! ending in `.gz` are decompressed on the fly. Non-finite values are replaced
//! with zero before domains are called.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::ValueEnum;
use clap_verbosity_flag::Verbosity;
use clustertad::ContactMatrix;
use clustertad::caller::Builder;
use clustertad::caller::DEFAULT_THRESHOLD;
use clustertad::caller::ShapePolicy;
use clustertad::cluster::DEFAULT_DEPTH;
use clustertad::cluster::Method;
use clustertad::genomic::Region;
use clustertad::separation;
use flate2::read::GzDecoder;
use omics::coordinate::position::Number;
use tracing::info;
use tracing::warn;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

////////////////////////////////////////////////////////////////////////////////////////
// Matrix parsing
////////////////////////////////////////////////////////////////////////////////////////

/// Parses a dense, whitespace-delimited matrix.
fn parse_matrix<R: BufRead>(reader: R) -> Result<ContactMatrix> {
    let mut rows = Vec::new();

    for (i, result) in reader.lines().enumerate() {
        let line = result.with_context(|| format!("reading line {}", i + 1))?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|value| value.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("parsing values on line {}", i + 1))?;

        rows.push(row);
    }

    ContactMatrix::try_from_rows(rows).context("building contact matrix")
}

/// Reads a matrix from `path`, decompressing it if it ends in `.gz`.
fn read_matrix(path: &Path) -> Result<ContactMatrix> {
    let file = File::open(path).context("opening matrix file")?;

    match path.extension().is_some_and(|ext| ext == "gz") {
        true => parse_matrix(BufReader::new(GzDecoder::new(file))),
        false => parse_matrix(BufReader::new(file)),
    }
}

/// Writes one `split<TAB>score` line per split point.
fn write_scores(path: &Path, scores: &[f64]) -> Result<()> {
    let mut file = File::create(path)
        .map(BufWriter::new)
        .context("creating scores file")?;

    for (i, score) in scores.iter().enumerate() {
        writeln!(file, "{}\t{score}", i + 1).context("writing to scores file")?;
    }

    file.flush().context("flushing scores file")
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

/// A linkage method.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Linkage {
    /// Nearest point.
    Single,

    /// Farthest point.
    Complete,

    /// Unweighted pair group (UPGMA).
    Average,

    /// Weighted pair group (WPGMA).
    Weighted,

    /// Minimum variance.
    Ward,
}

impl From<Linkage> for Method {
    fn from(linkage: Linkage) -> Self {
        match linkage {
            Linkage::Single => Method::Single,
            Linkage::Complete => Method::Complete,
            Linkage::Average => Method::Average,
            Linkage::Weighted => Method::Weighted,
            Linkage::Ward => Method::Ward,
        }
    }
}

/// Calls topologically associating domains from a dense contact matrix.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The path to the matrix (optionally gzipped).
    matrix: PathBuf,

    /// If desired, a file to write the domains to as `start<TAB>end` bin
    /// indices. Otherwise, the domains are printed to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// If desired, the genomic region covered by the matrix (e.g.,
    /// `chr1:0-2,500,000`). Domains are then printed to stdout in genomic
    /// coordinates.
    #[arg(short, long)]
    region: Option<Region>,

    /// The size of each bin in base pairs.
    #[arg(long, default_value_t = 10_000)]
    resolution: Number,

    /// The inconsistency threshold at which the dendrogram is cut.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    threshold: f64,

    /// The number of levels considered when computing inconsistency.
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// The linkage method.
    #[arg(short, long, value_enum, default_value_t = Linkage::Ward)]
    method: Linkage,

    /// Whether or not to fail on a non-square matrix rather than reporting no
    /// domains.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// If desired, a file to write the separation score of every split point
    /// to.
    #[arg(short, long)]
    scores: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity,
}

fn throw(args: &Args) -> Result<()> {
    if args.resolution == 0 {
        bail!("resolution must be greater than 0");
    }

    let caller = Builder::new()
        .method(args.method.into())
        .depth(args.depth)
        .context("configuring caller")?
        .threshold(args.threshold)
        .context("configuring caller")?
        .shape_policy(match args.strict {
            true => ShapePolicy::Strict,
            false => ShapePolicy::Sentinel,
        })
        .build();

    let mut matrix = read_matrix(&args.matrix)
        .with_context(|| format!("reading matrix: {}", args.matrix.display()))?;
    let (rows, cols) = matrix.shape();
    info!(rows, cols, "read contact matrix");

    let replaced = matrix.replace_non_finite(0.0);
    if replaced > 0 {
        warn!("replaced {replaced} non-finite value(s) with zero");
    }

    if let Some(path) = &args.scores {
        let scores = separation::scores(&matrix);

        if let Some(total) = separation::total(&matrix) {
            info!("total separation score: {total}");
        }

        write_scores(path, &scores)
            .with_context(|| format!("writing scores: {}", path.display()))?;
    }

    let boundaries = caller
        .call_tads(&mut matrix, args.output.as_deref())
        .context("calling domains")?;

    if boundaries.is_empty() {
        warn!("matrix is not square ({rows}x{cols}): no domains were called");
    } else {
        info!("called {} domain(s)", boundaries.len() - 1);
    }

    let mut stdout = std::io::stdout().lock();

    match &args.region {
        Some(region) => {
            let domains = region
                .domains(&boundaries, args.resolution)
                .context("placing domains on the genome")?;

            for domain in domains {
                writeln!(stdout, "{domain}").context("writing domains")?;
            }
        }
        None if args.output.is_none() => {
            boundaries
                .write_tads(&mut stdout)
                .context("writing domains")?;
        }
        None => {}
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .init(),
    };

    throw(&args)
}
