//! Hierarchical case dictionaries.
//!
//! A dictionary is an ordered `serde_json` object tree. Files ending in `.json` are read and
//! written as JSON; everything else uses the native text format of [`parser`] and [`writer`].

use std::path::Path;

use serde_json::{Map, Value};

use crate::{Error, Result};

pub mod parser;
pub mod writer;

pub type Dict = Map<String, Value>;

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read a dictionary file. A missing file is [`Error::NotFound`].
pub fn read_dict(path: impl AsRef<Path>) -> Result<Dict> {
    let path = path.as_ref();
    if !path.is_file() {
        log::error!("Dictionary {} does not exist", path.display());
        return Err(Error::NotFound(path.to_path_buf()));
    }
    log::debug!("Reading dictionary {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_dict(&text, is_json(path)).map_err(|message| Error::DictParse {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_dict(text: &str, json: bool) -> Result<Dict, String> {
    if !json {
        return parser::parse_document(text);
    }
    match serde_json::from_str::<Value>(text).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected an object at the top level, found {other}")),
    }
}

/// Write a dictionary file, replacing any existing file.
pub fn write_dict(path: impl AsRef<Path>, dict: &Dict) -> Result<()> {
    let path = path.as_ref();
    let text = if is_json(path) {
        serde_json::to_string_pretty(dict)?
    } else {
        writer::to_dict_string(dict)
    };
    std::fs::write(path, text)?;
    log::debug!("Wrote dictionary {}", path.display());
    Ok(())
}

/// Look up a dotted key path such as `run.simulation.stopTime`.
pub fn lookup<'a>(dict: &'a Dict, key_path: &str) -> Option<&'a Value> {
    let mut keys = key_path.split('.');
    let first = dict.get(keys.next()?)?;
    keys.try_fold(first, |value, key| value.as_object()?.get(key))
}

/// Numeric view of a value; numeric strings such as `'0.01'` are accepted as well.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Textual view of a scalar value
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dict(dir.path().join("caseDict")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_json_and_native() {
        let dir = tempfile::tempdir().unwrap();
        let dict = json!({"run": {"simulation": {"stopTime": 10}}});
        let dict = dict.as_object().unwrap();

        for name in ["caseDict", "caseDict.json"] {
            let path = dir.path().join(name);
            write_dict(&path, dict).unwrap();
            assert_eq!(&read_dict(&path).unwrap(), dict);
        }
        let native = std::fs::read_to_string(dir.path().join("caseDict")).unwrap();
        assert!(native.starts_with(writer::BANNER));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken");
        std::fs::write(&path, "a { b 1;").unwrap();
        assert!(matches!(
            read_dict(&path).unwrap_err(),
            Error::DictParse { .. }
        ));
    }

    #[test]
    fn test_lookup() {
        let dict = json!({"run": {"simulation": {"stopTime": 10, "stepSize": "0.5"}}});
        let dict = dict.as_object().unwrap();
        assert_eq!(lookup(dict, "run.simulation.stopTime"), Some(&json!(10)));
        assert_eq!(lookup(dict, "run.missing"), None);
        assert_eq!(lookup(dict, "run.simulation.stepSize").and_then(as_f64), Some(0.5));
    }
}
