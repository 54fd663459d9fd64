//! `watchDict`: the data sources `watchCosim` reads after a run.
//!
//! Simulation masters log one CSV per component with the columns `Time`, `StepCount` and then
//! the logged variables. `dataColumns` holds the indices of the output variables; the time
//! column is found by its header name (`timeColumn`), not by position.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::{
    dict::{self, Dict},
    model_description::Causality,
    simulation::Simulation,
    system::System,
    Result,
};

pub const FILE_NAME: &str = "watchDict";
pub const TIME_COLUMN: &str = "Time";

/// Index of the first variable column, after `Time` and `StepCount`
const FIRST_VARIABLE_COLUMN: usize = 2;

pub fn watch_dict(
    name: &str,
    system: &System,
    simulation: Option<&Simulation>,
    post_processing: Option<&Value>,
) -> Dict {
    let mut data_sources = Map::new();
    for component in system.components.values() {
        let outputs = component
            .variables
            .values()
            .filter(|v| v.causality_or_default() == Causality::Output)
            .count();
        let columns: Vec<usize> =
            (FIRST_VARIABLE_COLUMN..FIRST_VARIABLE_COLUMN + outputs).collect();
        data_sources.insert(component.name.clone(), json!({ "dataColumns": columns }));
    }

    let mut simulation_section = Map::new();
    simulation_section.insert("name".to_owned(), Value::from(name));
    if let Some(end_time) = simulation.and_then(|s| s.stop_time) {
        simulation_section.insert("endTime".to_owned(), Value::from(end_time));
    }

    let mut watch_dict = Dict::new();
    watch_dict.insert("datasources".to_owned(), Value::Object(data_sources));
    watch_dict.insert("delimiter".to_owned(), Value::from(","));
    watch_dict.insert("simulation".to_owned(), Value::Object(simulation_section));
    watch_dict.insert("timeColumn".to_owned(), Value::from(TIME_COLUMN));
    if let Some(plots) = post_processing.and_then(|p| p.get("plots")) {
        watch_dict.insert("postProcessing".to_owned(), json!({ "plots": plots }));
    }
    watch_dict
}

pub fn write(
    folder: &Path,
    name: &str,
    system: &System,
    simulation: Option<&Simulation>,
    post_processing: Option<&Value>,
) -> Result<PathBuf> {
    let path = folder.join(FILE_NAME);
    dict::write_dict(&path, &watch_dict(name, system, simulation, post_processing))?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections() {
        let simulation = Simulation {
            stop_time: Some(5.0),
            ..Default::default()
        };
        let post_processing = json!({"plots": {"force": {"xColumn": "Time"}}, "other": 1});
        let dict = watch_dict(
            "demo",
            &System::default(),
            Some(&simulation),
            Some(&post_processing),
        );
        assert_eq!(dict["delimiter"], json!(","));
        assert_eq!(dict["timeColumn"], json!("Time"));
        assert_eq!(dict["simulation"], json!({"name": "demo", "endTime": 5.0}));
        assert_eq!(
            dict["postProcessing"],
            json!({"plots": {"force": {"xColumn": "Time"}}})
        );
    }
}
