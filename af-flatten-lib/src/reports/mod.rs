//! Report generation for flattened tables
//!
//! Each generator takes the assembled [`Table`](crate::table::Table) and writes
//! one output format:
//! - **Console**: attribute count, a per-row preview, and the table shape
//! - **CSV**: header plus one line per record, the interchange format uploaded to the sink
//! - **JSON**: an array of row objects with `null` for absent values
//!
//! Generators write to any [`core::fmt::Write`], so callers can target strings,
//! files, or the host's output stream alike.

mod console;
mod csv;
mod json;

pub use console::generate as generate_console;
pub use csv::encode as encode_csv;
pub use csv::generate as generate_csv;
pub use json::generate as generate_json;
