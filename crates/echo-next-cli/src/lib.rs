//! # Echo Next CLI
//!
//! Command-line front end for `echo-next-core`: converts files, directory
//! trees or standard input and reports warnings as `path:line:column`.

pub mod cli;
pub mod files;

pub use cli::{command, run, CliArgs};
pub use files::{ConversionSummary, FileConverter, FileWarning};
