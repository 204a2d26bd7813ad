//! Library side of the `roster` command-line tool.

pub mod commands;
pub mod logging;
pub mod settings;
