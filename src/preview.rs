use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, job, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let (cleaned, report) = job::clean_source(&args.source)?;
    let head = cleaned.head(args.rows);
    table::print_table(&head);
    info!(
        "Displayed {} of {} cleaned row(s) from {:?}",
        head.row_count(),
        report.output_rows,
        args.source.input
    );
    Ok(())
}
