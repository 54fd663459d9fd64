#![doc = include_str!("../README.md")]
#![deny(clippy::all)]

use std::time::Duration;

use anyhow::Context;
use flexi_logger::{Duplicate, FileSpec, Logger, LoggerHandle};
use ospx::{
    compiler::{CaseCompiler, CompileOptions},
    watcher::{WatchConfig, Watcher},
};

pub mod options;

use options::{CaseBuilderOptions, ImportOptions, LoggingOptions, WatchOptions};

fn duplicate(level: log::LevelFilter) -> Duplicate {
    match level {
        log::LevelFilter::Off => Duplicate::None,
        log::LevelFilter::Error => Duplicate::Error,
        log::LevelFilter::Warn => Duplicate::Warn,
        log::LevelFilter::Info => Duplicate::Info,
        log::LevelFilter::Debug => Duplicate::Debug,
        log::LevelFilter::Trace => Duplicate::Trace,
    }
}

/// Start logging to stderr at the `-q`/`-v` level and, with `--log`, to a file at `--log-level`.
/// Keep the returned handle alive until the program ends.
pub fn init_logging(options: &LoggingOptions) -> anyhow::Result<LoggerHandle> {
    let console = options.verbosity.log_level_filter();
    let handle = match &options.log_file {
        Some(path) => {
            let file = log::LevelFilter::from(options.log_level);
            Logger::try_with_str(console.max(file).as_str().to_lowercase())?
                .log_to_file(FileSpec::try_from(path)?.suppress_timestamp())
                .duplicate_to_stderr(duplicate(console))
                .start()?
        }
        None => Logger::try_with_str(console.as_str().to_lowercase())?
            .set_palette("b1;3;2;4;6".to_string())
            .start()?,
    };
    Ok(handle)
}

/// `ospCaseBuilder`
pub fn case_builder(options: CaseBuilderOptions) -> anyhow::Result<()> {
    let compiler = CaseCompiler::new(CompileOptions {
        inspect: options.inspect,
        graph: options.graph,
    });
    let case = compiler
        .compile(&options.case_dict)
        .with_context(|| format!("Compiling {}", options.case_dict.display()))?;
    log::info!("Case {} done", case.name);
    Ok(())
}

/// `importSystemStructure`
pub fn import(options: ImportOptions) -> anyhow::Result<()> {
    let case_dict = ospx::importer::import_system_structure(&options.system_structure)
        .with_context(|| format!("Importing {}", options.system_structure.display()))?;
    log::info!("Wrote {}", case_dict.display());
    Ok(())
}

/// `watchCosim`
pub fn watch(options: WatchOptions) -> anyhow::Result<()> {
    let config = WatchConfig::from_file(&options.watch_dict)
        .with_context(|| format!("Reading {}", options.watch_dict.display()))?;
    let folder = options
        .watch_dict
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());

    let watch_options = ospx::watcher::WatchOptions {
        skip_values: options.skip,
        latest_values: options.latest,
        interval: Duration::from_secs_f64(options.interval.max(0.0)),
        max_wait: Duration::from_secs_f64(options.timeout.max(0.0)),
        dump: options.dump,
        plot: options.plot,
    };
    let table = Watcher::new(config, folder, watch_options).run()?;
    log::info!(
        "Summarised {} columns over {} rows",
        table.columns.len(),
        table.rows.len()
    );
    Ok(())
}
