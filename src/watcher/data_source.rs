//! Discovery of simulation result CSVs and selection of their columns.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
    time::{Duration, Instant},
};

use indexmap::IndexMap;
use regex::Regex;

use crate::{Error, Result};

/// `<dataSource>_YYYYMMDD_HHMMSS_<microseconds>.csv`
static CSV_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+)_(?P<date>\d{8})_(?P<time>\d{6})_(?P<micro>\d+)\.csv$").unwrap()
});

/// Columns never selected by default
const STEP_COUNT: &str = "StepCount";
const SETTINGS_PREFIX: &str = "settings";

/// A result file written by the simulation master
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvFile {
    pub data_source: String,
    pub path: PathBuf,
    /// `(date, time, microseconds)` from the file name
    pub stamp: (u32, u32, u64),
}

impl CsvFile {
    pub fn parse(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let captures = CSV_FILE.captures(file_name)?;
        Some(Self {
            data_source: captures["name"].to_owned(),
            path: path.to_path_buf(),
            stamp: (
                captures["date"].parse().ok()?,
                captures["time"].parse().ok()?,
                captures["micro"].parse().ok()?,
            ),
        })
    }
}

/// The newest result file per data source in `folder`, ordered by data source name.
pub fn discover(folder: &Path) -> Result<IndexMap<String, CsvFile>> {
    let mut newest: IndexMap<String, CsvFile> = IndexMap::new();
    for entry in std::fs::read_dir(folder)? {
        let Some(file) = CsvFile::parse(&entry?.path()) else {
            continue;
        };
        match newest.get(&file.data_source) {
            Some(existing) if existing.stamp >= file.stamp => {}
            _ => {
                newest.insert(file.data_source.clone(), file);
            }
        }
    }
    newest.sort_keys();
    Ok(newest)
}

/// Poll `folder` every `interval` until at least one result file exists.
pub fn wait_for_csv(
    folder: &Path,
    timeout: Duration,
    interval: Duration,
) -> Result<IndexMap<String, CsvFile>> {
    let started = Instant::now();
    loop {
        let files = discover(folder)?;
        if !files.is_empty() {
            log::debug!("Found {} data sources", files.len());
            return Ok(files);
        }
        if started.elapsed() >= timeout {
            return Err(Error::Timeout(format!(
                "no result files appeared in {} within {timeout:?}",
                folder.display()
            )));
        }
        log::info!("Waiting for result files in {}", folder.display());
        std::thread::sleep(interval);
    }
}

/// The columns read from one result file. The abscissa comes first.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSource {
    pub name: String,
    pub path: PathBuf,
    /// Indices into the CSV record
    pub columns: Vec<usize>,
    /// Header names of `columns`
    pub headers: Vec<String>,
}

impl DataSource {
    /// Read the header of `file` and select `configured` columns, or all columns other than
    /// `StepCount` and `settings*` when none are configured. The column named `time_column` is
    /// the abscissa; without one the first column is used. Returns `None` while the file has no
    /// header line yet.
    pub fn open(
        file: &CsvFile,
        configured: &[usize],
        time_column: &str,
        delimiter: u8,
    ) -> Result<Option<Self>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_path(&file.path)?;
        let header: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        if header.is_empty() {
            log::debug!("{}: no header yet", file.path.display());
            return Ok(None);
        }

        let abscissa = header.iter().position(|h| h == time_column).unwrap_or_else(|| {
            log::warn!(
                "{}: no column {time_column}, using {:?} as abscissa",
                file.path.display(),
                header.first()
            );
            0
        });

        let mut columns = vec![abscissa];
        if configured.is_empty() {
            columns.extend((0..header.len()).filter(|&i| {
                i != abscissa && header[i] != STEP_COUNT && !header[i].starts_with(SETTINGS_PREFIX)
            }));
        } else {
            for &index in configured {
                if index >= header.len() {
                    log::warn!(
                        "{}: column {index} out of range ({} columns)",
                        file.path.display(),
                        header.len()
                    );
                } else if !columns.contains(&index) {
                    columns.push(index);
                }
            }
        }

        Ok(Some(Self {
            name: file.data_source.clone(),
            path: file.path.clone(),
            headers: columns.iter().map(|&i| header[i].clone()).collect(),
            columns,
        }))
    }

    /// Header of the abscissa column
    pub fn abscissa(&self) -> &str {
        &self.headers[0]
    }

    /// `<dataSource>|<column>` for every selected column except the abscissa
    pub fn display_names(&self) -> Vec<String> {
        self.headers[1..]
            .iter()
            .map(|h| format!("{}|{h}", self.name))
            .collect()
    }

    /// Rows of the selected columns. Rows with an unparsable abscissa are skipped; other
    /// unparsable cells become `None`.
    pub fn read_rows(&self, delimiter: u8) -> Result<Vec<(f64, Vec<Option<f64>>)>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cell = |i: usize| record.get(i).and_then(|v| v.trim().parse::<f64>().ok());
            let Some(x) = cell(self.columns[0]) else {
                continue;
            };
            rows.push((x, self.columns[1..].iter().map(|&i| cell(i)).collect()));
        }
        Ok(rows)
    }
}
