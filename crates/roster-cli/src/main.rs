//! Roster CLI.

use std::io::{self, IsTerminal};
use std::path::Path;

use clap::{ColorChoice, Parser};
use roster_cli::commands::{self, ImportRequest};
use roster_cli::logging::{LogConfig, LogFormat, init_logging};
use roster_cli::settings::Settings;
use roster_import::ImportError;
use roster_store::StoreError;
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, ConfigCommand, LogFormatArg, LogLevelArg};
use crate::summary::{print_cleared, print_import, print_lookup, subject_table, trainee_table};

/// A later batch failed after earlier ones were committed.
const EXIT_PARTIAL_IMPORT: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let settings = Settings::load_from(&config_path);
    let exit_code = match run(cli.command, &settings, &config_path) {
        Ok(()) => 0,
        Err(error) => report_error(&error),
    };
    std::process::exit(exit_code);
}

fn run(command: Command, settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    match command {
        Command::Import(args) => {
            let run = commands::import(
                settings,
                &ImportRequest {
                    path: &args.file,
                    dry_run: args.dry_run,
                    batch_size: args.batch_size,
                },
            )?;
            print_import(&run);
        }
        Command::Lookup { query } => {
            let found = commands::lookup(settings, &query)?;
            print_lookup(&query, found.as_ref());
        }
        Command::Subjects => {
            let subjects = commands::list_subjects(settings)?;
            println!("{}", subject_table(&subjects));
            println!("{} subjects", subjects.len());
        }
        Command::Trainees { filter } => {
            let trainees = commands::list_trainees(settings, filter.as_deref())?;
            println!("{}", trainee_table(&trainees));
            println!("{} trainees", trainees.len());
        }
        Command::DeleteSubject { id } => {
            commands::delete_subject(settings, &id)?;
            println!("Deleted subject {id}.");
        }
        Command::DeleteTrainee { id } => {
            commands::delete_trainee(settings, &id)?;
            println!("Deleted trainee {id}.");
        }
        Command::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete every record without --yes");
            }
            print_cleared(commands::clear(settings)?);
        }
        Command::Config(ConfigCommand::Show) => {
            let mut effective = settings.clone();
            effective.store = settings.store_config();
            print!("{}", effective.to_toml().map_err(anyhow::Error::msg)?);
        }
        Command::Config(ConfigCommand::Path) => {
            println!("{}", config_path.display());
        }
        Command::Config(ConfigCommand::Init { force }) => {
            let written = commands::init_config(config_path, force)?;
            println!("Wrote {}", config_path.display());
            if let Some(store_path) = &written.store.path {
                println!("Records will be kept in {}", store_path.display());
            }
        }
    }
    Ok(())
}

/// Prints `error` for the operator and returns the exit code.
fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");

    let import_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ImportError>());
    if let Some(import_error) = import_error {
        eprintln!("{}", import_error.user_message());
        if let Some(suggestion) = import_error.suggestion() {
            eprintln!("hint: {suggestion}");
        }
        return if import_error.is_partial() {
            EXIT_PARTIAL_IMPORT
        } else {
            1
        };
    }

    let store_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>());
    if let Some(suggestion) = store_error.and_then(StoreError::suggestion) {
        eprintln!("hint: {suggestion}");
    }
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
