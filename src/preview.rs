//! Raw-file preview: the first few rows as a formatted table, headers
//! untouched. Useful for eyeballing an export before deciding on a
//! header mode.

use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, io_utils, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let (headers, rows) =
        io_utils::read_raw_table(&args.input, delimiter, encoding, Some(args.rows))?;

    if headers.is_empty() {
        println!("No data.");
        return Ok(());
    }
    table::print_table(&headers, &rows);
    info!("Displayed {} row(s) from {:?}", rows.len(), args.input);
    Ok(())
}
