use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Clean retail order extracts into typed Parquet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean an order extract and write the result as Parquet
    Run(RunArgs),
    /// Clean an order extract in memory and print the first rows
    Preview(PreviewArgs),
    /// Write a cleaning profile YAML file
    Profile(ProfileArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input CSV/TSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Cleaning profile YAML (defaults to the built-in retail profile)
    #[arg(short = 'p', long = "profile")]
    pub profile: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Pass through catalog columns missing from the input instead of failing
    #[arg(long = "lenient-schema")]
    pub lenient_schema: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Name of this job run, recorded in the output metadata
    #[arg(long = "job-name")]
    pub job_name: String,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Parquet output path; an existing file is replaced
    #[arg(short = 'o', long = "output", default_value = "cleaned_orders.parquet")]
    pub output: PathBuf,
    /// Parquet compression codec
    #[arg(long, value_enum, default_value = "snappy")]
    pub compression: ParquetCompression,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Number of cleaned rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Destination profile YAML path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Add snake_case catalog entries for extra headers found in this file
    #[arg(long = "from-input")]
    pub from_input: Option<PathBuf>,
    /// CSV delimiter character for --from-input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum ParquetCompression {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Uncompressed,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
