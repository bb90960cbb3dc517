#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod recent;
pub mod report;

pub use cli::{execute, run_from_env};
pub use error::{CliError, Result};
