//! Dependency graph of a system in the DOT language.

use std::{
    fmt::Write,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::{system::System, tools::GraphRenderer};

pub const DOT_FILE: &str = "callGraph";
pub const PDF_FILE: &str = "callGraph.pdf";

static INPUT_NODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(INP|inp)").unwrap());
static OPERATOR_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(add|sub|subtract|mul|multiply|div|divide|sum|gain|integrator|diff|neg)(_|\d|$)")
        .unwrap()
});

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn node_style(name: &str) -> &'static str {
    if INPUT_NODE.is_match(name) {
        r##"shape=parallelogram, style=filled, fillcolor="#c6e2ff""##
    } else if OPERATOR_NODE.is_match(name) {
        r##"shape=circle, style=filled, fillcolor="#ffe4b5""##
    } else {
        r##"shape=box, style="rounded,filled", fillcolor="#f0f0f0""##
    }
}

/// One node per component and one edge per valid connection.
pub fn to_dot(system: &System) -> String {
    let mut dot = String::new();
    // Formatting into a `String` cannot fail
    let _ = write_dot(&mut dot, system);
    dot
}

fn write_dot(dot: &mut String, system: &System) -> std::fmt::Result {
    writeln!(dot, "digraph callGraph {{")?;
    writeln!(dot, "    rankdir=LR;")?;
    writeln!(dot, "    node [fontname=\"Helvetica\", fontsize=10];")?;
    writeln!(dot, "    edge [fontname=\"Helvetica\", fontsize=8];")?;
    for component in system.components.values() {
        let step_size = component
            .step_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_owned());
        let label = format!(
            "{}\n{}\nstepSize {step_size}",
            component.name,
            component.fmu.file_name()
        );
        writeln!(
            dot,
            "    {} [label={}, {}];",
            quote(&component.name),
            quote(&label),
            node_style(&component.name)
        )?;
    }
    for (connection, _) in system.valid_connections() {
        let label = format!(
            "{}-->\n{}",
            connection.source.variable_name(),
            connection.target.variable_name()
        );
        writeln!(
            dot,
            "    {} -> {} [label={}];",
            quote(&connection.source.component),
            quote(&connection.target.component),
            quote(&label)
        )?;
    }
    writeln!(dot, "}}")
}

/// Write the DOT source to `folder/callGraph` and render `folder/callGraph.pdf`. Failures are
/// logged and yield `None`.
pub fn render(folder: &Path, system: &System, renderer: &dyn GraphRenderer) -> Option<PathBuf> {
    let source = folder.join(DOT_FILE);
    if let Err(err) = std::fs::write(&source, to_dot(system)) {
        log::error!("Could not write {}: {err}", source.display());
        return None;
    }
    let pdf = folder.join(PDF_FILE);
    match renderer.render(&source, &pdf) {
        Ok(()) => {
            log::info!("Rendered {}", pdf.display());
            Some(pdf)
        }
        Err(err) => {
            log::error!("Graph rendering failed: {err}");
            None
        }
    }
}
