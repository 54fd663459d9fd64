//! Post-run consolidation of the CSV files written by a simulation master.
//!
//! The watcher reads a `watchDict`, waits for result files in its folder, joins the newest file
//! of every data source on the time column and writes summary statistics to `resultDict`.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    compiler::watch_dict::TIME_COLUMN,
    dict::{self, Dict},
    Error, Result,
};

pub mod data_source;
pub mod table;

pub use data_source::{CsvFile, DataSource};
pub use table::{window_start, ColumnStatistics, Table};

pub const RESULT_DICT: &str = "resultDict";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataSourceSpec {
    #[serde(default)]
    data_columns: Vec<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulationSpec {
    name: Option<String>,
    end_time: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchDictSpec {
    #[serde(default)]
    datasources: IndexMap<String, DataSourceSpec>,
    delimiter: Option<String>,
    #[serde(default)]
    simulation: SimulationSpec,
    time_column: Option<String>,
}

/// Settings read from a `watchDict`
#[derive(Clone, Debug, PartialEq)]
pub struct WatchConfig {
    /// Configured column indices per data source. Empty means all columns.
    pub data_columns: IndexMap<String, Vec<usize>>,
    pub delimiter: u8,
    pub simulation_name: String,
    pub end_time: Option<f64>,
    pub time_column: String,
}

impl WatchConfig {
    pub fn from_dict(watch_dict: &Dict, default_name: &str) -> Result<Self> {
        let spec: WatchDictSpec = serde_json::from_value(Value::Object(watch_dict.clone()))
            .map_err(|e| Error::Case(format!("malformed watchDict: {e}")))?;
        let delimiter = match spec.delimiter.as_deref() {
            None => b',',
            Some(d) if d.len() == 1 => d.as_bytes()[0],
            Some(d) => {
                log::warn!("Unsupported delimiter {d:?}, using ','");
                b','
            }
        };
        Ok(Self {
            data_columns: spec
                .datasources
                .into_iter()
                .map(|(name, source)| (name, source.data_columns))
                .collect(),
            delimiter,
            simulation_name: spec
                .simulation
                .name
                .unwrap_or_else(|| default_name.to_owned()),
            end_time: spec.simulation.end_time.as_ref().and_then(dict::as_f64),
            time_column: spec.time_column.unwrap_or_else(|| TIME_COLUMN.to_owned()),
        })
    }

    /// Read a `watchDict` file. A missing file is [`Error::NotFound`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let watch_dict = dict::read_dict(path)?;
        let default_name = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "simulation".to_owned());
        Self::from_dict(&watch_dict, &default_name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WatchOptions {
    /// Rows dropped from the front of the table
    pub skip_values: Option<usize>,
    /// Rows kept at the tail of the table
    pub latest_values: Option<usize>,
    pub interval: Duration,
    /// Upper bound for waiting on result files and for the polling loop
    pub max_wait: Duration,
    pub dump: bool,
    pub plot: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            skip_values: None,
            latest_values: None,
            interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(600),
            dump: false,
            plot: false,
        }
    }
}

pub struct Watcher {
    pub config: WatchConfig,
    /// Folder holding the result files
    pub folder: PathBuf,
    pub options: WatchOptions,
}

impl Watcher {
    pub fn new(config: WatchConfig, folder: impl Into<PathBuf>, options: WatchOptions) -> Self {
        Self {
            config,
            folder: folder.into(),
            options,
        }
    }

    /// Join the newest result files found right now. The table is windowed by
    /// `skip_values`/`latest_values`.
    pub fn read(&self) -> Result<Table> {
        let files = data_source::discover(&self.folder)?;
        self.read_files(&files)
    }

    fn read_files(&self, files: &IndexMap<String, CsvFile>) -> Result<Table> {
        let mut sources = Vec::with_capacity(files.len());
        for (name, file) in files {
            let configured = self
                .config
                .data_columns
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let Some(source) =
                DataSource::open(file, configured, &self.config.time_column, self.config.delimiter)?
            else {
                continue;
            };
            let rows = source.read_rows(self.config.delimiter)?;
            log::debug!("{name}: {} rows from {}", rows.len(), file.path.display());
            sources.push((source, rows));
        }
        Ok(Table::join(&sources).window(self.options.skip_values, self.options.latest_values))
    }

    /// Write `resultDict` for `table` and return its path.
    pub fn write_results(&self, table: &Table) -> Result<PathBuf> {
        let path = self.folder.join(RESULT_DICT);
        dict::write_dict(&path, &table.result_dict())?;
        Ok(path)
    }

    /// Wait for result files, then read and summarise them every `interval` until neither the
    /// set of files nor the number of rows changed for two consecutive polls, or `max_wait` has
    /// passed. Returns the final table.
    pub fn run(&self) -> Result<Table> {
        let started = Instant::now();
        data_source::wait_for_csv(&self.folder, self.options.max_wait, self.options.interval)?;

        let mut previous = None;
        let mut unchanged = 0;
        let table = loop {
            let files = data_source::discover(&self.folder)?;
            let table = self.read_files(&files)?;
            self.write_results(&table)?;

            let signature = (
                files.values().map(|f| f.path.clone()).collect::<Vec<_>>(),
                table.rows.len(),
            );
            if previous.as_ref() == Some(&signature) {
                unchanged += 1;
            } else {
                unchanged = 0;
            }
            previous = Some(signature);
            log::info!(
                "{} data sources, {} rows, {} columns",
                files.len(),
                table.rows.len(),
                table.columns.len()
            );

            if unchanged >= 2 {
                break table;
            }
            if started.elapsed() >= self.options.max_wait {
                log::warn!("Stopped watching after {:?}", self.options.max_wait);
                break table;
            }
            std::thread::sleep(self.options.interval);
        };

        if self.options.dump {
            let path = self
                .folder
                .join(format!("{}.zip", self.config.simulation_name));
            table.dump(&path, &self.config.simulation_name, self.config.delimiter)?;
        }
        if self.options.plot {
            log::warn!("Plotting is not available, use the dumped table or resultDict instead");
        }
        Ok(table)
    }
}
