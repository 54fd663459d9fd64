//! Writer for the native dictionary text format.

use std::fmt::{self, Write};

use itertools::Itertools;
use serde_json::{Map, Value};

use super::parser::scalar_from_bare;

const INDENT: &str = "    ";

/// Header written at the top of every generated dictionary
pub const BANNER: &str = "\
/*---------------------------------*- C++ -*----------------------------------*\\
filetype dictionary; coding utf-8; version 0.1; local --; purpose --;
\\*----------------------------------------------------------------------------*/
";

/// Render a dictionary, banner included.
pub fn to_dict_string(map: &Map<String, Value>) -> String {
    let mut out = String::from(BANNER);
    // Formatting into a `String` cannot fail
    let _ = write_entries(&mut out, map, 0);
    out
}

fn write_entries(out: &mut String, map: &Map<String, Value>, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    let width = map
        .iter()
        .filter(|(_, v)| !v.is_object())
        .map(|(k, _)| format_string(k).len())
        .max()
        .unwrap_or(0);

    for (key, value) in map {
        let key = format_string(key);
        match value {
            Value::Object(inner) => {
                writeln!(out, "{pad}{key}")?;
                writeln!(out, "{pad}{{")?;
                write_entries(out, inner, depth + 1)?;
                writeln!(out, "{pad}}}")?;
            }
            Value::Array(items) if items.iter().any(|v| v.is_object() || v.is_array()) => {
                writeln!(out, "{pad}{key}")?;
                writeln!(out, "{pad}(")?;
                for item in items {
                    write_item(out, item, depth + 1)?;
                }
                writeln!(out, "{pad});")?;
            }
            scalar => {
                writeln!(out, "{pad}{key:<width$} {};", format_inline(scalar))?;
            }
        }
    }
    Ok(())
}

fn write_item(out: &mut String, item: &Value, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    match item {
        Value::Object(inner) => {
            writeln!(out, "{pad}{{")?;
            write_entries(out, inner, depth + 1)?;
            writeln!(out, "{pad}}}")?;
        }
        Value::Array(items) if items.iter().any(|v| v.is_object() || v.is_array()) => {
            writeln!(out, "{pad}(")?;
            for item in items {
                write_item(out, item, depth + 1)?;
            }
            writeln!(out, "{pad})")?;
        }
        other => {
            writeln!(out, "{pad}{}", format_inline(other))?;
        }
    }
    Ok(())
}

fn format_inline(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format_string(s),
        Value::Array(items) => format!("({})", items.iter().map(format_inline).join(" ")),
        Value::Object(map) => {
            let inner = map
                .iter()
                .map(|(k, v)| format!("{} {};", format_string(k), format_inline(v)))
                .join(" ");
            format!("{{ {inner} }}")
        }
    }
}

/// Quote a string when it would not read back as the same string.
fn format_string(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s.contains(|c: char| c.is_whitespace() || "{}();'\",".contains(c))
        || s.contains("//")
        || s.contains("/*")
        || s.starts_with('#')
        || !scalar_from_bare(s).is_string();
    if !needs_quotes {
        s.to_owned()
    } else if s.contains('\'') {
        format!("\"{s}\"")
    } else {
        format!("'{s}'")
    }
}
