//! Removal of results left in a case folder by earlier compiles and runs.

use std::path::{Path, PathBuf};

use crate::Result;

/// Files produced by the compiler or by simulation runs. A leading `*` matches any prefix.
pub const RESULT_PATTERNS: [&str; 9] = [
    "*.csv",
    "*.out",
    "*.xml",
    "*.fmu",
    "*callGraph",
    "*.pdf",
    "watchDict",
    "statisticsDict",
    "*.zip",
];

/// Files starting with this prefix are never removed
pub const PRESERVE_PREFIX: &str = "test_";

fn matches(pattern: &str, file_name: &str) -> bool {
    match pattern.strip_prefix('*') {
        Some(suffix) => file_name.ends_with(suffix),
        None => file_name == pattern,
    }
}

/// Whether `file_name` is a result file that should be removed.
pub fn is_result_file(file_name: &str, keep_fmus: bool) -> bool {
    if file_name.starts_with(PRESERVE_PREFIX) {
        return false;
    }
    if keep_fmus && matches("*.fmu", file_name) {
        return false;
    }
    RESULT_PATTERNS.iter().any(|p| matches(p, file_name))
}

/// Remove result files from `folder` (not recursively) and return the removed paths, sorted.
/// With `keep_fmus`, FMU archives stay in place.
pub fn clean(folder: &Path, keep_fmus: bool) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_result_file(&file_name, keep_fmus) {
            std::fs::remove_file(entry.path())?;
            log::debug!("Removed {file_name}");
            removed.push(entry.path());
        }
    }
    removed.sort();
    if !removed.is_empty() {
        log::info!("Cleaned {} files from {}", removed.len(), folder.display());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("results_20240101_120000_000001.csv", false, true)]
    #[case("OspSystemStructure.xml", false, true)]
    #[case("adder.fmu", false, true)]
    #[case("adder.fmu", true, false)]
    #[case("callGraph", false, true)]
    #[case("callGraph.pdf", false, true)]
    #[case("watchDict", false, true)]
    #[case("statisticsDict", false, true)]
    #[case("demo.zip", false, true)]
    #[case("caseDict", false, false)]
    #[case("test_reference.xml", false, false)]
    #[case("notes.txt", false, false)]
    fn test_is_result_file(#[case] name: &str, #[case] keep_fmus: bool, #[case] expected: bool) {
        assert_eq!(is_result_file(name, keep_fmus), expected);
    }

    #[test]
    fn test_clean_folder() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["caseDict", "out.csv", "test_keep.csv", "a.fmu", "watchDict"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.xml")).unwrap();

        let removed = clean(dir.path(), true).unwrap();
        let names: Vec<_> = removed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["out.csv", "watchDict"]);
        assert!(dir.path().join("a.fmu").exists());
        assert!(dir.path().join("test_keep.csv").exists());
        assert!(dir.path().join("sub.xml").is_dir());

        assert!(clean(dir.path(), true).unwrap().is_empty());
    }
}
