//! The joined result table and its summary statistics.

use std::{fs::File, io::Write, path::Path};

use indexmap::IndexMap;
use serde_json::{json, Value};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{dict::Dict, Result};

use super::data_source::DataSource;

/// Columns of several data sources joined on a shared abscissa, sorted by abscissa.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub abscissa: String,
    pub columns: Vec<String>,
    pub rows: Vec<(f64, Vec<Option<f64>>)>,
}

/// First row of a window over `total` rows: `max(skip, total - latest)`. Zero or absent values
/// disable either bound.
pub fn window_start(total: usize, skip: Option<usize>, latest: Option<usize>) -> usize {
    let from_skip = skip.unwrap_or(0);
    let from_latest = match latest {
        Some(latest) if latest > 0 => total.saturating_sub(latest),
        _ => 0,
    };
    from_skip.max(from_latest).min(total)
}

impl Table {
    /// Join the rows of `sources` on their abscissa values. The abscissa is named after the
    /// first source's time column.
    pub fn join(sources: &[(DataSource, Vec<(f64, Vec<Option<f64>>)>)]) -> Self {
        let mut table = Table {
            abscissa: sources
                .first()
                .map(|(source, _)| source.abscissa().to_owned())
                .unwrap_or_default(),
            ..Default::default()
        };

        let width: usize = sources.iter().map(|(s, _)| s.columns.len() - 1).sum();
        let mut index: IndexMap<u64, usize> = IndexMap::new();
        let mut offset = 0;
        for (source, rows) in sources {
            table.columns.extend(source.display_names());
            for (x, values) in rows {
                let row = *index.entry(x.to_bits()).or_insert_with(|| {
                    table.rows.push((*x, vec![None; width]));
                    table.rows.len() - 1
                });
                let cells = &mut table.rows[row].1[offset..];
                for (cell, value) in cells.iter_mut().zip(values) {
                    *cell = *value;
                }
            }
            offset += source.columns.len() - 1;
        }
        table.rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        table
    }

    /// The rows from [`window_start`] on
    pub fn window(&self, skip: Option<usize>, latest: Option<usize>) -> Table {
        let start = window_start(self.rows.len(), skip, latest);
        Table {
            abscissa: self.abscissa.clone(),
            columns: self.columns.clone(),
            rows: self.rows[start..].to_vec(),
        }
    }

    /// Values of the column at `index`, skipping empty cells
    pub fn values(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(move |(_, row)| row.get(index).copied().flatten())
    }

    /// Statistics of every data column that has at least one value
    pub fn statistics(&self) -> IndexMap<String, ColumnStatistics> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let values: Vec<f64> = self.values(i).collect();
                ColumnStatistics::from_values(&values).map(|s| (name.clone(), s))
            })
            .collect()
    }

    /// `resultDict` contents: statistics keyed by column name
    pub fn result_dict(&self) -> Dict {
        self.statistics()
            .into_iter()
            .map(|(name, statistics)| (name, Value::from(statistics)))
            .collect()
    }

    /// The table as CSV text, abscissa first. Empty cells are left blank.
    pub fn to_csv(&self, delimiter: u8) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(std::iter::once(&self.abscissa).chain(&self.columns))?;
        for (x, row) in &self.rows {
            let cells = std::iter::once(x.to_string()).chain(
                row.iter()
                    .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(cells)?;
        }
        writer
            .into_inner()
            .map_err(|e| crate::Error::Io(e.into_error()))
    }

    /// Write the table as `<name>.csv` into a deflate-compressed zip archive at `path`.
    pub fn dump(&self, path: &Path, name: &str, delimiter: u8) -> Result<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(format!("{name}.csv"), options)?;
        zip.write_all(&self.to_csv(delimiter)?)?;
        zip.finish()?;
        log::info!("Dumped {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnStatistics {
    pub latest_value: f64,
    pub first_value: f64,
    pub mean: f64,
    /// Sample standard deviation, zero for a single value
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStatistics {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first_value, &latest_value) = (values.first()?, values.last()?);
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let stdev = if values.len() > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(Self {
            latest_value,
            first_value,
            mean,
            stdev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

impl From<ColumnStatistics> for Value {
    fn from(s: ColumnStatistics) -> Self {
        json!({
            "latestValue": s.latest_value,
            "firstValue": s.first_value,
            "mean": s.mean,
            "stdev": s.stdev,
            "min": s.min,
            "max": s.max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(10, None, None, 0)]
    #[case(10, Some(3), None, 3)]
    #[case(10, None, Some(4), 6)]
    #[case(10, Some(8), Some(4), 8)]
    #[case(10, Some(0), Some(0), 0)]
    #[case(10, Some(20), None, 10)]
    #[case(10, None, Some(20), 0)]
    fn test_window_start(
        #[case] total: usize,
        #[case] skip: Option<usize>,
        #[case] latest: Option<usize>,
        #[case] expected: usize,
    ) {
        assert_eq!(window_start(total, skip, latest), expected);
    }

    #[test]
    fn test_statistics() {
        let stats = ColumnStatistics::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.first_value, 2.0);
        assert_eq!(stats.latest_value, 9.0);
        assert_approx_eq!(f64, stats.mean, 5.0, ulps = 2);
        assert_approx_eq!(f64, stats.stdev, (32.0f64 / 7.0).sqrt(), ulps = 4);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);

        assert!(ColumnStatistics::from_values(&[]).is_none());
        assert_eq!(ColumnStatistics::from_values(&[1.0]).unwrap().stdev, 0.0);
    }

    #[test]
    fn test_window_and_csv() {
        let table = Table {
            abscissa: "Time".to_owned(),
            columns: vec!["a|x".to_owned(), "b|y".to_owned()],
            rows: vec![
                (0.0, vec![Some(1.0), None]),
                (0.5, vec![Some(2.0), Some(3.0)]),
            ],
        };
        let tail = table.window(None, Some(1));
        assert_eq!(tail.rows, [(0.5, vec![Some(2.0), Some(3.0)])]);

        let csv = String::from_utf8(table.to_csv(b',').unwrap()).unwrap();
        assert_eq!(csv, "Time,a|x,b|y\n0,1,\n0.5,2,3\n");
    }
}
