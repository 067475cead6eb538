//! Command-line interface and orchestration for af-flatten
//!
//! This module implements the CLI commands and wires the library together:
//! loading an AF export, flattening it, writing reports, and publishing the
//! resulting table. It handles argument parsing, configuration management,
//! and the high-level workflows.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **flatten**: Fetch an AF export from a URL or path, flatten it, and write
//!   console, CSV, and/or JSON reports
//! - **publish**: Everything `flatten` does, then upload the table to DataRobot,
//!   rename the dataset, and wait for it to be indexed
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file's syntax and values
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. `flatten` and `publish` share the
//! `common` module, which sets up logging and progress reporting, loads the
//! configuration, and turns the source into a table.
//!
//! Configuration is read from `af-flatten.toml`; command-line options take
//! precedence over it.

mod common;
mod config;
mod flatten;
mod host;
mod init;
mod progress_reporter;
mod publish;
mod run;
mod validate;

#[cfg(debug_assertions)]
pub use config::Config;

pub use flatten::{FlattenArgs, flatten_source};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use publish::{PublishArgs, publish_source};
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
