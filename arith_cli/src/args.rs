// arith_cli/src/args.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use arith_coder::DEFAULT_PRECISION;
use log::LevelFilter;
use thiserror::Error;

pub const USAGE: &str = "\
arith - static arithmetic coding compressor

Usage: arith <compress|decompress> <INPUT> [OPTIONS]

Options:
  -p, --precision N   Interval precision in bits (default: 16)
  -o, --output PATH   Output file
  -v, --verbose       More log output (repeatable)
  -q, --quiet         No log output
  -h, --help          Show this help

compress writes INPUT.arith unless -o is given.
decompress strips a trailing .arith, or appends .out.
The same precision must be used to compress and decompress a file.";

/// Extension given to compressed files.
pub const EXTENSION: &str = "arith";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing mode (compress or decompress)")]
    MissingMode,
    #[error("unknown mode '{0}'")]
    UnknownMode(String),
    #[error("missing input file")]
    MissingInput,
    #[error("option {0} needs a value")]
    MissingValue(String),
    #[error("invalid precision '{0}'")]
    InvalidPrecision(String),
    #[error("unrecognized argument '{0}'")]
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub precision: u32,
    pub verbosity: LevelFilter,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(Config),
    Help,
}

impl Config {
    /// Where the result is written.
    pub fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        match self.mode {
            Mode::Compress => with_suffix(&self.input, EXTENSION),
            Mode::Decompress => {
                if self.input.extension().map_or(false, |ext| ext == EXTENSION) {
                    self.input.with_extension("")
                } else {
                    with_suffix(&self.input, "out")
                }
            }
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn raise(level: LevelFilter) -> LevelFilter {
    match level {
        LevelFilter::Off | LevelFilter::Error => LevelFilter::Warn,
        LevelFilter::Warn => LevelFilter::Info,
        LevelFilter::Info => LevelFilter::Debug,
        LevelFilter::Debug | LevelFilter::Trace => LevelFilter::Trace,
    }
}

/// Parses arguments, not including the program name.
pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut mode = None;
    let mut input = None;
    let mut output = None;
    let mut precision = DEFAULT_PRECISION;
    let mut verbosity = LevelFilter::Warn;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-p" | "--precision" => {
                let value = args.next().ok_or(UsageError::MissingValue(arg.clone()))?;
                precision = value
                    .parse()
                    .map_err(|_| UsageError::InvalidPrecision(value.clone()))?;
            }
            "-o" | "--output" => {
                let value = args.next().ok_or(UsageError::MissingValue(arg.clone()))?;
                output = Some(PathBuf::from(value));
            }
            "-q" | "--quiet" => verbosity = LevelFilter::Off,
            "-v" | "--verbose" => verbosity = raise(verbosity),
            "-vv" => verbosity = raise(raise(verbosity)),
            "-vvv" => verbosity = LevelFilter::Trace,
            s if s.starts_with('-') && s.len() > 1 => {
                return Err(UsageError::Unrecognized(arg));
            }
            _ if mode.is_none() => {
                mode = Some(match arg.as_str() {
                    "compress" | "c" => Mode::Compress,
                    "decompress" | "d" => Mode::Decompress,
                    _ => return Err(UsageError::UnknownMode(arg)),
                });
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => return Err(UsageError::Unrecognized(arg)),
        }
    }

    Ok(Command::Run(Config {
        mode: mode.ok_or(UsageError::MissingMode)?,
        input: input.ok_or(UsageError::MissingInput)?,
        output,
        precision,
        verbosity,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    fn config(args: &[&str]) -> Config {
        match parse(args).unwrap() {
            Command::Run(config) => config,
            Command::Help => panic!("expected a run command"),
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&["compress", "notes.txt"]);
        assert_eq!(cfg.mode, Mode::Compress);
        assert_eq!(cfg.input, PathBuf::from("notes.txt"));
        assert_eq!(cfg.output, None);
        assert_eq!(cfg.precision, 16);
        assert_eq!(cfg.verbosity, LevelFilter::Warn);
    }

    #[test]
    fn test_options() {
        let cfg = config(&["d", "-p", "24", "in.arith", "--output", "out.bin", "-v"]);
        assert_eq!(cfg.mode, Mode::Decompress);
        assert_eq!(cfg.precision, 24);
        assert_eq!(cfg.output, Some(PathBuf::from("out.bin")));
        assert_eq!(cfg.verbosity, LevelFilter::Info);

        let cfg = config(&["compress", "x", "-vv"]);
        assert_eq!(cfg.verbosity, LevelFilter::Debug);
        let cfg = config(&["compress", "x", "-q"]);
        assert_eq!(cfg.verbosity, LevelFilter::Off);
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["-h"]), Ok(Command::Help));
        assert_eq!(parse(&["compress", "x", "--help"]), Ok(Command::Help));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&[]), Err(UsageError::MissingMode));
        assert_eq!(parse(&["compress"]), Err(UsageError::MissingInput));
        assert_eq!(
            parse(&["squash", "x"]),
            Err(UsageError::UnknownMode("squash".to_string()))
        );
        assert_eq!(
            parse(&["compress", "x", "-p"]),
            Err(UsageError::MissingValue("-p".to_string()))
        );
        assert_eq!(
            parse(&["compress", "x", "-p", "high"]),
            Err(UsageError::InvalidPrecision("high".to_string()))
        );
        assert_eq!(
            parse(&["compress", "x", "--fast"]),
            Err(UsageError::Unrecognized("--fast".to_string()))
        );
        assert_eq!(
            parse(&["compress", "x", "y"]),
            Err(UsageError::Unrecognized("y".to_string()))
        );
    }

    #[test]
    fn test_output_path() {
        let cfg = config(&["compress", "data/report.txt"]);
        assert_eq!(cfg.output_path(), PathBuf::from("data/report.txt.arith"));

        let cfg = config(&["decompress", "data/report.txt.arith"]);
        assert_eq!(cfg.output_path(), PathBuf::from("data/report.txt"));

        let cfg = config(&["decompress", "blob.bin"]);
        assert_eq!(cfg.output_path(), PathBuf::from("blob.bin.out"));

        let cfg = config(&["decompress", "a.arith", "-o", "b"]);
        assert_eq!(cfg.output_path(), PathBuf::from("b"));
    }
}
