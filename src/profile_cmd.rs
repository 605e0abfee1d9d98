//! The `profile` command: write the built-in profile, optionally extended
//! with catalog entries for an extract's extra headers.

use anyhow::{Context, Result};
use encoding_rs::UTF_8;
use log::info;

use crate::{cli::ProfileArgs, io_utils, profile::CleaningProfile};

pub fn execute(args: &ProfileArgs) -> Result<()> {
    let mut profile = CleaningProfile::retail();
    if let Some(input) = &args.from_input {
        let delimiter = io_utils::resolve_input_delimiter(input, args.delimiter);
        let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, UTF_8)
            .with_context(|| format!("Reading headers from {input:?}"))?;
        let added = profile.extend_catalog_from_headers(&headers);
        info!("Added {added} catalog column(s) from {input:?}");
    }
    profile
        .save(&args.output)
        .with_context(|| format!("Writing profile to {:?}", args.output))?;
    info!(
        "Profile with {} catalog column(s) written to {:?}",
        profile.catalog.len(),
        args.output
    );
    Ok(())
}
