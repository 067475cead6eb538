#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for af-flatten
//!
//! This library consolidates all functionality for the af-flatten tool, which turns
//! PI AF XML hierarchy exports into flat tables and publishes them to DataRobot.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`hierarchy`]: The element/attribute model and the flattener
//! - [`source`]: Fetching and parsing AF exports
//! - [`table`]: Fixed-order tabular projection of flattened records
//! - [`reports`]: Report generation in multiple formats
//! - [`sink`]: Uploading tables and waiting for them to be indexed

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

/// User agent sent with every HTTP request.
pub(crate) const USER_AGENT: &str = concat!("af-flatten/", env!("CARGO_PKG_VERSION"));

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod hierarchy;

#[cfg(any(debug_assertions, test))]
pub mod progress;
#[cfg(not(any(debug_assertions, test)))]
mod progress;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

#[cfg(any(debug_assertions, test))]
pub mod sink;
#[cfg(not(any(debug_assertions, test)))]
mod sink;

#[cfg(any(debug_assertions, test))]
pub mod source;
#[cfg(not(any(debug_assertions, test)))]
mod source;

pub mod table;

pub use crate::commands::{Host, run};
