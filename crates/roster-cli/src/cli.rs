//! CLI argument definitions for the roster tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Import outstanding-subject rosters and look up trainees",
    long_about = "Import trainee rosters (xlsx, xls, ods, csv) into a record store \
                  and look up the subjects each trainee still has to pass.\n\n\
                  Re-importing a roster updates existing trainees in place."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include trainee identities and names in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a roster file into the record store.
    Import(ImportArgs),

    /// Find a trainee by trainee number, national id or phone.
    Lookup {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// List subjects ordered by level.
    Subjects,

    /// List trainees with their remaining-course counts.
    Trainees {
        /// Keep trainees whose name, ids or phone contain this text.
        #[arg(long = "filter", value_name = "TEXT")]
        filter: Option<String>,
    },

    /// Delete a subject by id.
    DeleteSubject {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Delete a trainee by id.
    DeleteTrainee {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Delete every subject and trainee.
    Clear {
        /// Required; guards against accidental wipes.
        #[arg(long = "yes")]
        yes: bool,
    },

    /// Inspect or create the settings file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Roster file (xlsx, xls, ods, csv or tab-separated text).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Import into an in-memory copy and leave the store untouched.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Operations per committed batch (1-500).
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings as TOML.
    Show,
    /// Print the settings file location.
    Path,
    /// Write a settings file with the defaults.
    Init {
        /// Overwrite an existing settings file.
        #[arg(long = "force")]
        force: bool,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
