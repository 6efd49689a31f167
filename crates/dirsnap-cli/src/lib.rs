/// Command-line frontend for dirsnap.
///
/// Thin presentation layer: argument parsing, progress rendering, and
/// summary printing. All scanning, aggregation, and persistence logic
/// lives in `dirsnap-core`.
use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;

use dirsnap_core::analysis::{top_dirs, top_files};
use dirsnap_core::model::size::{format_count, format_size};
use dirsnap_core::scanner::progress::ScanProgress;
use dirsnap_core::scanner::start_scan;
use dirsnap_core::{export, snapshot_file_name, Snapshot};

/// Longest path shown on the single-line progress display.
const PROGRESS_PATH_WIDTH: usize = 60;

#[derive(Parser)]
#[command(
    name = "dirsnap",
    version,
    about = "Directory size inventory with persistent snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory tree and save the snapshot.
    Scan {
        /// Root directory to scan.
        root: PathBuf,
        /// Output snapshot path. Defaults to a name derived from the root.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load a snapshot and print a summary.
    Show {
        /// Snapshot file produced by `dirsnap scan`.
        file: PathBuf,
        /// Number of largest directories and files to list.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Export a snapshot to CSV or JSON.
    Export {
        /// Snapshot file produced by `dirsnap scan`.
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Destination file.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan { root, out } => cmd_scan(root, out),
        Command::Show { file, top } => cmd_show(&file, top),
        Command::Export { file, format, out } => cmd_export(&file, format, &out),
    }
}

fn cmd_scan(root: PathBuf, out: Option<PathBuf>) -> anyhow::Result<()> {
    let handle = start_scan(root);
    let mut last_percent = u8::MAX;

    let snapshot = loop {
        match handle.progress_rx.recv() {
            Ok(ScanProgress::Visit {
                display_path,
                percent,
            }) => {
                // Redraw only on percentage changes; per-directory redraws
                // would dominate runtime on fast filesystems.
                if percent != last_percent {
                    last_percent = percent;
                    eprint!(
                        "\r[{percent:>3}%] {:<width$}",
                        truncate_path(&display_path, PROGRESS_PATH_WIDTH),
                        width = PROGRESS_PATH_WIDTH
                    );
                    let _ = io::stderr().flush();
                }
            }
            Ok(ScanProgress::Complete { snapshot, duration }) => {
                eprintln!("\rscan finished in {duration:.2?}");
                break snapshot;
            }
            Ok(ScanProgress::Failed { error }) => {
                eprintln!();
                return Err(error.into());
            }
            Ok(ScanProgress::Cancelled) => {
                eprintln!();
                bail!("scan cancelled");
            }
            Err(_) => bail!("scanner thread exited without reporting a result"),
        }
    };

    let target = out.unwrap_or_else(|| PathBuf::from(snapshot_file_name(&snapshot.root_path)));
    dirsnap_core::save(&snapshot, &target)?;

    print_summary(&snapshot);
    println!("snapshot written to {}", target.display());
    Ok(())
}

fn cmd_show(file: &PathBuf, top: usize) -> anyhow::Result<()> {
    let snapshot = dirsnap_core::load(file)
        .with_context(|| format!("cannot show {}", file.display()))?;

    print_summary(&snapshot);

    if top > 0 {
        println!("\nlargest directories:");
        for dir in top_dirs(&snapshot, top) {
            println!("  {:>10}  {}", format_size(dir.total_size), dir.path);
        }
        println!("\nlargest files:");
        for f in top_files(&snapshot, top) {
            println!("  {:>10}  {}", format_size(f.size), f.path);
        }
    }
    Ok(())
}

fn cmd_export(file: &PathBuf, format: ExportFormat, out: &PathBuf) -> anyhow::Result<()> {
    let snapshot = dirsnap_core::load(file)
        .with_context(|| format!("cannot export {}", file.display()))?;

    match format {
        ExportFormat::Csv => export::export_csv(&snapshot, out)?,
        ExportFormat::Json => export::export_json(&snapshot, out)?,
    }
    println!("exported {} to {}", file.display(), out.display());
    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    let local: chrono::DateTime<chrono::Local> = snapshot.scan_timestamp.into();
    println!("root:        {}", snapshot.root_path);
    println!("scanned at:  {}", local.format("%Y-%m-%d %H:%M:%S"));
    println!(
        "contents:    {} files in {} directories, {} total",
        format_count(snapshot.file_count() as u64),
        format_count(snapshot.directory_count() as u64),
        format_size(snapshot.total_file_bytes())
    );
}

/// Shorten a path for the one-line progress display, keeping the tail
/// (the interesting part while descending).
fn truncate_path(path: &str, max: usize) -> String {
    let count = path.chars().count();
    if count <= max {
        return path.to_string();
    }
    let tail: String = path
        .chars()
        .skip(count - (max.saturating_sub(3)))
        .collect();
    format!("...{tail}")
}
