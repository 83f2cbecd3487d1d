//! Content-management commands for the studio portfolio.

pub mod cli;
pub mod commands;
pub mod utils;
