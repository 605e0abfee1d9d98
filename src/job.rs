//! The `run` command: read, clean, write.

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};

use crate::{
    cli::{RunArgs, SourceArgs},
    dataset::Table,
    io_utils,
    normalize::NormalizeMode,
    pipeline::{self, CleanReport},
    profile::CleaningProfile,
    sink::{self, SinkOptions},
};

pub(crate) fn load_profile(args: &SourceArgs) -> Result<CleaningProfile> {
    match &args.profile {
        Some(path) => {
            CleaningProfile::load(path).with_context(|| format!("Loading profile from {path:?}"))
        }
        None => Ok(CleaningProfile::retail()),
    }
}

pub(crate) fn normalize_mode(args: &SourceArgs) -> NormalizeMode {
    if args.lenient_schema {
        NormalizeMode::Lenient
    } else {
        NormalizeMode::Strict
    }
}

/// Reads the source and runs the cleaning stages, without writing anything.
pub(crate) fn clean_source(args: &SourceArgs) -> Result<(Table, CleanReport)> {
    let profile = load_profile(args)?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Reading '{}' with delimiter '{}'",
        args.input.display(),
        crate::printable_delimiter(delimiter)
    );
    let table = io_utils::read_table(&args.input, delimiter, encoding)?;
    pipeline::clean(&table, &profile, normalize_mode(args))
        .with_context(|| format!("Cleaning {:?}", args.input))
}

fn log_report(report: &CleanReport) {
    info!(
        "Cleaned {} row(s); renamed {} column(s); derived {}",
        report.output_rows,
        report.renamed.len(),
        report.derived.iter().join(", ")
    );
    for (column, unparsed) in &report.unparsed_dates {
        if *unparsed > 0 {
            warn!("{unparsed} value(s) in '{column}' matched no date format and were nulled");
        }
    }
    for (column, defaulted) in &report.coercion.defaulted {
        if *defaulted > 0 {
            info!("{defaulted} value(s) in '{column}' replaced by the default");
        }
    }
}

pub fn execute(args: &RunArgs) -> Result<()> {
    info!("Starting job '{}'", args.job_name);
    let (cleaned, report) = clean_source(&args.source)?;
    log_report(&report);
    let options = SinkOptions {
        job_name: args.job_name.clone(),
        compression: args.compression,
    };
    sink::write_parquet(&cleaned, &args.output, &options)
        .with_context(|| format!("Writing Parquet output to {:?}", args.output))?;
    info!("Job '{}' committed to {:?}", args.job_name, args.output);
    Ok(())
}
