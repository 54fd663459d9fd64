use std::{io::Read, time::Duration};

use float_cmp::assert_approx_eq;
use indexmap::IndexMap;
use ospx::{
    dict::{self, lookup},
    watcher::{WatchConfig, WatchOptions, Watcher, RESULT_DICT},
};
use pretty_assertions::assert_eq;

fn config(data_columns: IndexMap<String, Vec<usize>>) -> WatchConfig {
    WatchConfig {
        data_columns,
        delimiter: b',',
        simulation_name: "demo".to_owned(),
        end_time: None,
        time_column: "Time".to_owned(),
    }
}

fn options() -> WatchOptions {
    WatchOptions {
        interval: Duration::ZERO,
        max_wait: Duration::from_secs(5),
        ..Default::default()
    }
}

fn write_sources(folder: &std::path::Path) {
    std::fs::write(
        folder.join("src1_20240101_120000_000001.csv"),
        "Time,StepCount,a\n0.0,0,1.0\n0.5,1,2.0\n1.0,2,3.0\n",
    )
    .unwrap();
    std::fs::write(
        folder.join("src2_20240101_120000_000001.csv"),
        "Time,StepCount,b\n0.0,0,10.0\n0.5,1,20.0\n1.0,2,60.0\n",
    )
    .unwrap();
}

#[test_log::test]
fn test_join_two_sources() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());

    let watcher = Watcher::new(config(IndexMap::new()), dir.path(), options());
    let table = watcher.read().unwrap();
    assert_eq!(table.abscissa, "Time");
    assert_eq!(table.columns, ["src1|a", "src2|b"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[1], (0.5, vec![Some(2.0), Some(20.0)]));

    let path = watcher.write_results(&table).unwrap();
    let results = dict::read_dict(&path).unwrap();
    let stat = |key: &str| lookup(&results, key).and_then(dict::as_f64).unwrap();
    assert_approx_eq!(f64, stat("src1|a.min"), 1.0);
    assert_approx_eq!(f64, stat("src1|a.max"), 3.0);
    assert_approx_eq!(f64, stat("src1|a.mean"), 2.0, ulps = 2);
    assert_approx_eq!(f64, stat("src2|b.min"), 10.0);
    assert_approx_eq!(f64, stat("src2|b.max"), 60.0);
    assert_approx_eq!(f64, stat("src2|b.mean"), 30.0, ulps = 2);
    assert_approx_eq!(f64, stat("src2|b.latestValue"), 60.0);
}

#[test_log::test]
fn test_newest_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());
    std::fs::write(
        dir.path().join("src1_20240102_080000_000001.csv"),
        "Time,StepCount,a\n0.0,0,7.0\n",
    )
    .unwrap();

    let table = Watcher::new(config(IndexMap::new()), dir.path(), options())
        .read()
        .unwrap();
    let a: Vec<_> = table.values(0).collect();
    assert_eq!(a, [7.0]);
}

#[test_log::test]
fn test_source_without_header_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());
    std::fs::write(dir.path().join("src3_20240101_120000_000001.csv"), "").unwrap();

    let table = Watcher::new(config(IndexMap::new()), dir.path(), options())
        .read()
        .unwrap();
    assert_eq!(table.columns, ["src1|a", "src2|b"]);
    assert_eq!(table.rows.len(), 3);
}

#[test_log::test]
fn test_configured_columns_and_window() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());

    let data_columns = IndexMap::from([("src1".to_owned(), vec![2])]);
    let watcher = Watcher::new(
        config(data_columns),
        dir.path(),
        WatchOptions {
            latest_values: Some(2),
            ..options()
        },
    );
    let table = watcher.read().unwrap();
    assert_eq!(table.columns, ["src1|a", "src2|b"]);
    let abscissa: Vec<_> = table.rows.iter().map(|(x, _)| *x).collect();
    assert_eq!(abscissa, [0.5, 1.0]);
}

#[test_log::test]
fn test_run_until_stable() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());

    let watcher = Watcher::new(
        config(IndexMap::new()),
        dir.path(),
        WatchOptions {
            dump: true,
            ..options()
        },
    );
    let table = watcher.run().unwrap();
    assert_eq!(table.rows.len(), 3);
    assert!(dir.path().join(RESULT_DICT).is_file());

    let mut archive =
        zip::ZipArchive::new(std::fs::File::open(dir.path().join("demo.zip")).unwrap()).unwrap();
    let mut csv = String::new();
    archive
        .by_name("demo.csv")
        .unwrap()
        .read_to_string(&mut csv)
        .unwrap();
    assert!(csv.starts_with("Time,src1|a,src2|b\n"));
}

#[test_log::test]
fn test_run_times_out_without_results() {
    let dir = tempfile::tempdir().unwrap();
    let watcher = Watcher::new(
        config(IndexMap::new()),
        dir.path(),
        WatchOptions {
            interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(50),
            ..Default::default()
        },
    );
    assert!(matches!(watcher.run(), Err(ospx::Error::Timeout(_))));
}
