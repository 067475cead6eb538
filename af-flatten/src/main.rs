//! Flatten PI AF XML exports into tables and publish them to DataRobot.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use af_flatten_lib::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Host for the command line.
///
/// Console previews and publish summaries go to stdout; publish warnings and
/// configuration failures go to stderr. A failed `validate` ends the process
/// with the given exit code.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
