use crate::Result;
use crate::table::Table;
use core::fmt::Write;

/// Write the table as a JSON array of row objects, keys in column order, `null`
/// for absent values.
pub fn generate<W: Write>(table: &Table, writer: &mut W) -> Result<()> {
    write!(writer, "{}", serde_json::to_string_pretty(table.rows())?)?;
    Ok(())
}
