use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Level of messages written to the log file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[default]
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    /// Same as ERROR
    #[value(name = "CRITICAL")]
    Critical,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => log::LevelFilter::Error,
        }
    }
}

#[derive(Debug, Args)]
pub struct LoggingOptions {
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Write log messages to this file as well
    #[arg(long = "log", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Level of messages written to the log file
    #[arg(long, value_enum, default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
}

/// Compile a case dictionary into OspSystemStructure.xml, SystemStructure.ssd and friends
#[derive(Debug, Parser)]
#[command(name = "ospCaseBuilder", version)]
pub struct CaseBuilderOptions {
    /// The case dictionary
    #[arg(value_name = "caseDict")]
    pub case_dict: PathBuf,

    /// Only report components, FMUs, units, variables and connectors; write no files
    #[arg(long)]
    pub inspect: bool,

    /// Render the dependency graph to callGraph.pdf
    #[arg(long)]
    pub graph: bool,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

/// Convert an OspSystemStructure.xml into a case dictionary
#[derive(Debug, Parser)]
#[command(name = "importSystemStructure", version)]
pub struct ImportOptions {
    /// The OspSystemStructure.xml file
    #[arg(value_name = "systemStructureFile")]
    pub system_structure: PathBuf,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

/// Watch the result files of a running co-simulation and summarise them
#[derive(Debug, Parser)]
#[command(name = "watchCosim", version)]
pub struct WatchOptions {
    /// The watch dictionary written by ospCaseBuilder
    #[arg(value_name = "watchDict")]
    pub watch_dict: PathBuf,

    /// Plot the results (not available)
    #[arg(long)]
    pub plot: bool,

    /// Write the joined table to <simulation name>.zip
    #[arg(long)]
    pub dump: bool,

    /// Drop this many rows from the front of the table
    #[arg(long, value_name = "ROWS")]
    pub skip: Option<usize>,

    /// Keep only this many rows at the end of the table
    #[arg(long, value_name = "ROWS")]
    pub latest: Option<usize>,

    /// Seconds between polls
    #[arg(long, default_value_t = 2.0)]
    pub interval: f64,

    /// Seconds to wait for result files before giving up
    #[arg(long, default_value_t = 600.0)]
    pub timeout: f64,

    #[command(flatten)]
    pub logging: LoggingOptions,
}
