//! `statisticsDict`: counts and names of everything the compiled system contains.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::{
    dict::{self, Dict},
    simulation::Simulation,
    system::System,
    Result,
};

pub const FILE_NAME: &str = "statisticsDict";

fn summary<'a>(names: impl IntoIterator<Item = &'a String>) -> Value {
    let names: Vec<_> = names.into_iter().cloned().collect();
    json!({ "count": names.len(), "names": names })
}

pub fn statistics(name: &str, system: &System, simulation: Option<&Simulation>) -> Dict {
    let mut settings = Map::new();
    settings.insert("name".to_owned(), Value::from(name));
    if let Some(simulation) = simulation {
        let times = [
            ("startTime", simulation.start_time),
            ("stopTime", simulation.stop_time),
            ("baseStepSize", simulation.base_step_size),
        ];
        for (key, value) in times {
            if let Some(value) = value {
                settings.insert(key.to_owned(), Value::from(value));
            }
        }
        if let Some(algorithm) = simulation.algorithm {
            settings.insert("algorithm".to_owned(), Value::from(algorithm.to_string()));
        }
    }

    let mut statistics = Dict::new();
    statistics.insert("simulation".to_owned(), Value::Object(settings));
    statistics.insert("components".to_owned(), summary(system.components.keys()));
    statistics.insert("connections".to_owned(), summary(system.connections.keys()));
    statistics.insert("connectors".to_owned(), summary(system.connectors().keys()));
    statistics.insert("fmus".to_owned(), summary(system.fmus().keys()));
    statistics.insert("units".to_owned(), summary(system.units().keys()));
    statistics.insert("variables".to_owned(), summary(system.variables().keys()));
    statistics
}

pub fn write(
    folder: &Path,
    name: &str,
    system: &System,
    simulation: Option<&Simulation>,
) -> Result<PathBuf> {
    let path = folder.join(FILE_NAME);
    dict::write_dict(&path, &statistics(name, system, simulation))?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
