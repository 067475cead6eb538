use crate::Result;
use crate::table::Table;
use core::fmt::Write;
use ohno::{IntoAppError, app_err};

/// Encode the table as CSV bytes: a header row in column order, then one line per
/// record with null cells left empty.
///
/// A table without columns encodes to nothing at all.
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    if table.column_count() == 0 {
        return Ok(Vec::new());
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    csv_writer
        .write_record(table.column_names())
        .into_app_err("unable to write CSV header")?;

    for row in table.rows() {
        csv_writer
            .write_record(table.cells(row).map(|cell| cell.unwrap_or_default()))
            .into_app_err("unable to write CSV record")?;
    }

    csv_writer.flush().into_app_err("unable to finish CSV output")?;
    csv_writer
        .into_inner()
        .map_err(|e| app_err!("unable to finish CSV output: {}", e.error()))
}

pub fn generate<W: Write>(table: &Table, writer: &mut W) -> Result<()> {
    let bytes = encode(table)?;
    let text = String::from_utf8(bytes).into_app_err("CSV output is not valid UTF-8")?;
    writer.write_str(&text)?;
    Ok(())
}
