// src/main.rs
// Command-line application for ISF Reader

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use isf_reader::{IsfFile, PointFormat, ReaderConfig};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "isf_reader",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert Tektronix ISF waveform files to CSV",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Bytes scanned for the textual header
    #[arg(long, default_value_t = isf_reader::config::DEFAULT_HEADER_WINDOW, global = true)]
    header_window: usize,
    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Display ISF file information
    Info { file: PathBuf },
    /// Convert ISF to CSV (`x, y` or `x, y_min, y_max` per line)
    Convert {
        file: PathBuf,
        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Dump header fields before the data
        #[arg(long)]
        head: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();

    let config = ReaderConfig::new().with_header_window(cli.header_window);

    match cli.command {
        Command::Info { file } => {
            let isf = load_or_exit(&file, &config);
            print_file_info(&isf);
        }

        Command::Convert { file, output, head } => {
            let isf = load_or_exit(&file, &config);
            let result = match &output {
                Some(path) => isf.write_csv(path, head),
                None => write_stdout(&isf, head),
            };

            if let Err(e) = result {
                error!("Error writing CSV: {}", e);
                process::exit(1);
            }
            if let Some(path) = output {
                info!(
                    "Converted {} to {} ({} points)",
                    file.display(),
                    path.display(),
                    isf.waveform.len()
                );
            }
        }
    }
}

fn load_or_exit(file: &Path, config: &ReaderConfig) -> IsfFile {
    match IsfFile::load_with(file, config) {
        Ok(isf) => isf,
        Err(e) => {
            error!("Error loading ISF file '{}': {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn write_stdout(isf: &IsfFile, head: bool) -> isf_reader::Result<()> {
    let mut writer = BufWriter::new(io::stdout().lock());
    isf.write_csv_to(&mut writer, head)?;
    writer.flush()?;
    Ok(())
}

fn print_file_info(isf: &IsfFile) {
    println!("ISF File Information");
    println!("====================");
    println!();
    println!("File: {}", isf.file_path);
    println!();

    println!("Header Fields:");
    for (name, value) in isf.header.iter() {
        println!("  {}: {}", name, value);
    }
    println!();

    println!("Data Layout:");
    println!("  Curve data offset: {} bytes", isf.payload.offset);
    println!("  Curve data size: {} bytes", isf.payload.length);
    println!(
        "  Element: {:?} ({:?}, {} bytes), {:?} byte order",
        isf.layout.kind,
        isf.layout.representation(),
        isf.layout.element_width(),
        isf.layout.byte_order
    );
    let point_format = match isf.format() {
        PointFormat::Y => "Y",
        PointFormat::Env => "ENV",
    };
    println!("  Point format: {}", point_format);
    println!("  Samples: {}", isf.samples.len());
    println!("  Points: {}", isf.waveform.len());
    for warning in &isf.warnings {
        println!("  Warning: {}", warning);
    }
    println!();

    let y = isf.waveform.y();
    if !y.is_empty() {
        let min_v = y.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max_v = y.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        println!("Amplitude:");
        println!("  Data range: {:.6e} to {:.6e}", min_v, max_v);
        println!("  Peak-to-peak: {:.6e}", max_v - min_v);
        println!();
    }

    let x = isf.waveform.x();
    if let (Some(first), Some(last)) = (x.first(), x.last()) {
        println!("Horizontal Axis:");
        println!("  First point: {:.12e}", first);
        println!("  Last point: {:.12e}", last);
    }
}
