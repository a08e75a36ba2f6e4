use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{debug, info, LevelFilter};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tfbs_scan_rs::fasta::{self, FastaRecord};
use tfbs_scan_rs::jaspar::{self, MotifRecord, MotifSet};
use tfbs_scan_rs::pssm::build_pssm;
use tfbs_scan_rs::scan::{scan_sequence, Hit, HitPolicy, ScanResult};

#[derive(thiserror::Error, Debug)]
pub enum ScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Scan(#[from] tfbs_scan_rs::error::ScanError),

    #[error("record {record}: {source}")]
    InvalidRecord {
        record: String,
        #[source]
        source: tfbs_scan_rs::error::ScanError,
    },

    #[error("no motif matches {0:?}")]
    MotifNotFound(String),

    #[error("query {query:?} matches {count} motifs, pass a matrix ID to pick one")]
    AmbiguousMotif { query: String, count: usize },

    #[error("unsupported output format: {0:?} (use .csv, .parquet or .json)")]
    UnsupportedOutput(String),
}

#[derive(Parser)]
#[command(
    name = "site-scanner",
    about = "Scans DNA sequences for transcription factor binding sites using JASPAR count matrices",
    long_about = "A tool for locating candidate transcription factor binding sites in DNA sequences. \
                  It loads count matrices from a JASPAR flat file, converts them into log-odds scoring \
                  matrices, scores every sequence window, and reports ranked hits as a table or JSON.",
    version,
    after_help = "Example usage:\n    \
                  site-scanner search motifs.jaspar runx\n    \
                  site-scanner scan promoters.fasta motifs.jaspar --motif MA0002.1 --output hits.csv\n    \
                  site-scanner scan promoter.txt motifs.jaspar --motif arnt --policy relative -v",
    color = clap::ColorChoice::Always
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbosity: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Search a motif file by matrix ID or factor name
    Search(SearchArgs),
    /// Scan sequences for binding sites of one motif
    Scan(ScanArgs),
}

#[derive(Parser, Debug)]
struct SearchArgs {
    /// Path to JASPAR flat file with count matrices
    #[arg(value_name = "MOTIF_FILE")]
    motif_file: PathBuf,

    /// Matrix ID (e.g. MA0002.1) or factor name fragment (e.g. runx)
    #[arg(value_name = "QUERY")]
    query: String,

    /// Maximum number of matches to list
    #[arg(long, default_value = "10")]
    limit: usize,
}

#[derive(Parser, Debug)]
struct ScanArgs {
    /// Path to a FASTA file, or to a text file holding one raw sequence
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Path to JASPAR flat file with count matrices
    #[arg(value_name = "MOTIF_FILE")]
    motif_file: PathBuf,

    /// Matrix ID or factor name of the motif to scan with
    #[arg(long, value_name = "ID_OR_NAME")]
    motif: String,

    /// Path for output file (.csv, .parquet or .json)
    /// Prints a summary to stdout when omitted
    #[arg(long, value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    /// Pseudocount added to every matrix cell before log-odds conversion
    #[arg(long, default_value = "0.1")]
    pseudocount: f64,

    /// Hit selection policy
    #[arg(long, value_enum, default_value = "absolute")]
    policy: PolicyArg,

    /// Scan records containing symbols outside A, C, G, T instead of
    /// rejecting them up front
    #[arg(long)]
    lenient: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
    /// Keep windows with log-odds score above zero
    Absolute,
    /// Keep windows scoring at least 0.8 of the best window
    Relative,
}

impl From<PolicyArg> for HitPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Absolute => HitPolicy::Absolute,
            PolicyArg::Relative => HitPolicy::Relative,
        }
    }
}

/// Per-record scan report, the shape the JSON output serializes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanReport {
    name: String,
    motif_id: String,
    motif_name: String,
    scores: Vec<f64>,
    positions: Vec<usize>,
    top_hits: Vec<Hit>,
}

fn init_logger(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

/// Resolves a motif query to exactly one record: exact matrix ID first,
/// then the search fallback.
fn resolve_motif<'a>(motifs: &'a MotifSet, query: &str) -> Result<&'a MotifRecord, ScannerError> {
    if let Some(record) = motifs.get(query) {
        return Ok(record);
    }
    let matches = motifs.search(query);
    match matches.len() {
        0 => Err(ScannerError::MotifNotFound(query.to_string())),
        1 => Ok(matches[0]),
        count => {
            eprintln!("Motifs matching {:?}:", query);
            for record in &matches {
                eprintln!("    {}  {}", record.matrix_id, record.name);
            }
            Err(ScannerError::AmbiguousMotif {
                query: query.to_string(),
                count,
            })
        }
    }
}

/// Reads scan input as FASTA records, or as a single raw sequence named
/// after the file.
fn load_records(path: &Path) -> Result<Vec<FastaRecord>, ScannerError> {
    let text = fs::read_to_string(path)?;
    if text.trim_start().starts_with('>') {
        Ok(fasta::parse_fasta(&text)?)
    } else {
        let (_, sequence) = fasta::extract_sequence(&text)?;
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sequence".to_string());
        Ok(vec![FastaRecord {
            id,
            description: None,
            sequence,
        }])
    }
}

fn run_search(args: &SearchArgs) -> Result<(), ScannerError> {
    let motifs = jaspar::read_jaspar(&args.motif_file)?;
    info!(
        "loaded {} motifs from {}",
        motifs.len(),
        args.motif_file.display()
    );

    let matches = motifs.search(&args.query);
    if matches.is_empty() {
        println!("No motifs match {:?}", args.query);
        return Ok(());
    }

    println!("{} motifs match {:?}:", matches.len(), args.query);
    for record in matches.iter().take(args.limit) {
        println!(
            "    {}\t{}\tlength {}\tconsensus {}",
            record.matrix_id,
            record.name,
            record.motif_length(),
            record.consensus()
        );
    }
    if matches.len() > args.limit {
        println!("    ... and {} more", matches.len() - args.limit);
    }
    Ok(())
}

fn run_scan(args: &ScanArgs) -> Result<(), ScannerError> {
    let motifs = jaspar::read_jaspar(&args.motif_file)?;
    let motif = resolve_motif(&motifs, &args.motif)?;
    info!(
        "scanning with {} ({}), motif length {}",
        motif.matrix_id,
        motif.name,
        motif.motif_length()
    );

    let matrix = build_pssm(&motif.counts, args.pseudocount)?;
    debug!("highest attainable window score: {:.4}", matrix.max_score());

    let records = load_records(&args.input_file)?;
    println!("{} sequences to scan", records.len());

    if !args.lenient {
        for record in &records {
            fasta::validate_sequence(&record.sequence).map_err(|e| {
                ScannerError::InvalidRecord {
                    record: record.id.clone(),
                    source: e,
                }
            })?;
        }
    }

    let policy: HitPolicy = args.policy.into();
    let results: Vec<ScanResult> = records
        .par_iter()
        .map(|record| scan_sequence(&record.sequence, &matrix, policy))
        .collect();

    let total_hits: usize = results.iter().map(|result| result.hits.len()).sum();
    info!("{} hits across {} sequences", total_hits, records.len());

    match &args.output {
        Some(path) => {
            write_output(path, &records, motif, &results)?;
            println!("Results written to {}", path.display());
        }
        None => print_summary(&records, &results),
    }
    Ok(())
}

fn print_summary(records: &[FastaRecord], results: &[ScanResult]) {
    for (record, result) in records.iter().zip(results) {
        println!(
            "{}: {} windows, {} hits",
            record.id,
            result.scores.len(),
            result.hits.len()
        );
        for hit in result.hits.iter().take(5) {
            println!(
                "    {}-{}  {}  score {:.3}",
                hit.start, hit.end, hit.sequence, hit.score
            );
        }
        if result.hits.len() > 5 {
            println!("    ... and {} more", result.hits.len() - 5);
        }
    }
}

fn write_output(
    path: &Path,
    records: &[FastaRecord],
    motif: &MotifRecord,
    results: &[ScanResult],
) -> Result<(), ScannerError> {
    // Create output directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => {
            let mut df = hits_frame(records, motif, results)?;
            let mut file = fs::File::create(path)?;
            CsvWriter::new(&mut file).finish(&mut df)?;
        }
        "parquet" => {
            let mut df = hits_frame(records, motif, results)?;
            let file = fs::File::create(path)?;
            ParquetWriter::new(file).finish(&mut df)?;
        }
        "json" => {
            let reports: Vec<ScanReport> = records
                .iter()
                .zip(results)
                .map(|(record, result)| ScanReport {
                    name: record.id.clone(),
                    motif_id: motif.matrix_id.clone(),
                    motif_name: motif.name.clone(),
                    scores: result.scores.clone(),
                    positions: result.positions.clone(),
                    top_hits: result.hits.clone(),
                })
                .collect();
            let file = fs::File::create(path)?;
            serde_json::to_writer_pretty(file, &reports)?;
        }
        other => return Err(ScannerError::UnsupportedOutput(other.to_string())),
    }
    Ok(())
}

/// One row per hit: record, motif, start, end, score and the window text.
fn hits_frame(
    records: &[FastaRecord],
    motif: &MotifRecord,
    results: &[ScanResult],
) -> Result<DataFrame, ScannerError> {
    let mut record_ids: Vec<String> = Vec::new();
    let mut motifs: Vec<String> = Vec::new();
    let mut starts: Vec<i64> = Vec::new();
    let mut ends: Vec<i64> = Vec::new();
    let mut scores: Vec<f64> = Vec::new();
    let mut sites: Vec<String> = Vec::new();

    for (record, result) in records.iter().zip(results) {
        for hit in &result.hits {
            record_ids.push(record.id.clone());
            motifs.push(motif.matrix_id.clone());
            starts.push(hit.start as i64);
            ends.push(hit.end as i64);
            scores.push(hit.score);
            sites.push(hit.sequence.clone());
        }
    }

    let df = DataFrame::new(vec![
        Column::new("record".into(), record_ids),
        Column::new("motif".into(), motifs),
        Column::new("start".into(), starts),
        Column::new("end".into(), ends),
        Column::new("score".into(), scores),
        Column::new("site".into(), sites),
    ])?;

    Ok(df)
}

fn main() -> Result<(), ScannerError> {
    let start_time = std::time::Instant::now();

    let cli = Cli::parse();
    init_logger(cli.verbosity);

    match &cli.command {
        Command::Search(args) => run_search(args)?,
        Command::Scan(args) => run_scan(args)?,
    }

    debug!(
        "total execution time: {:.4} seconds",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
