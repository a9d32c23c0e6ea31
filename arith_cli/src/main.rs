// arith_cli/src/main.rs

//! `arith` - compress or decompress a file with the static arithmetic coder.
//!
//!   arith compress notes.txt            -> notes.txt.arith
//!   arith decompress notes.txt.arith    -> notes.txt
//!   arith compress big.bin -p 24 -o big.ac

mod args;
mod logger;

use std::error::Error;
use std::fmt;
use std::fs;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use arith_coder::Codec;
use log::info;

use args::{Command, Config, Mode};

/// Sizes and timing of one run.
#[derive(Debug)]
struct Report {
    mode: Mode,
    elapsed: Duration,
    original: usize,
    compressed: usize,
    /// Entropy of the input in bytes, compress only.
    entropy_bound: Option<f64>,
}

impl Report {
    fn ratio(&self) -> f64 {
        if self.compressed == 0 {
            0.0
        } else {
            self.original as f64 / self.compressed as f64
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time taken: {:.4} seconds", self.elapsed.as_secs_f64())?;
        match self.mode {
            Mode::Compress => {
                writeln!(f, "Original size: {} bytes", self.original)?;
                writeln!(f, "Compressed size: {} bytes", self.compressed)?;
                writeln!(
                    f,
                    "Size difference: {} bytes",
                    self.original as i64 - self.compressed as i64
                )?;
                if let Some(bound) = self.entropy_bound {
                    writeln!(f, "Entropy bound: {:.0} bytes", bound)?;
                }
            }
            Mode::Decompress => {
                writeln!(f, "Decompressed size: {} bytes", self.original)?;
            }
        }
        write!(f, "Compression ratio: {:.2}", self.ratio())
    }
}

/// Reads the input, runs the codec, and writes the output only once the
/// whole result is available.
fn run(config: &Config) -> Result<Report, Box<dyn Error>> {
    let input = fs::read(&config.input)?;
    let codec = Codec::with_bits(config.precision)?;
    let output_path = config.output_path();

    let start = Instant::now();
    let report = match config.mode {
        Mode::Compress => {
            let (file, table) = codec.compress_with_model(&input)?;
            let elapsed = start.elapsed();
            let bound = table.entropy() * input.len() as f64 / 8.0;
            fs::write(&output_path, &file)?;
            Report {
                mode: config.mode,
                elapsed,
                original: input.len(),
                compressed: file.len(),
                entropy_bound: Some(bound),
            }
        }
        Mode::Decompress => {
            let output = codec.decompress(&input)?;
            let elapsed = start.elapsed();
            fs::write(&output_path, &output)?;
            Report {
                mode: config.mode,
                elapsed,
                original: output.len(),
                compressed: input.len(),
                entropy_bound: None,
            }
        }
    };

    info!(
        "{} '{}' -> '{}' at precision {}",
        match config.mode {
            Mode::Compress => "compressed",
            Mode::Decompress => "decompressed",
        },
        config.input.display(),
        output_path.display(),
        config.precision
    );
    Ok(report)
}

fn main() -> ExitCode {
    let command = match args::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("arith: {}", e);
            eprintln!();
            eprintln!("{}", args::USAGE);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            println!("{}", args::USAGE);
            ExitCode::SUCCESS
        }
        Command::Run(config) => {
            logger::init(config.verbosity);
            match run(&config) {
                Ok(report) => {
                    println!("{}", report);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("arith: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
