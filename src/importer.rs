//! Conversion of an existing `OspSystemStructure.xml` back into a case dictionary.

use std::path::{Component as PathComponent, Path, PathBuf};

use indexmap::IndexMap;
use osp_schema::system_structure::{
    Connection, OspSystemStructure, Simulator, TypedValue, VariableEndpoint,
    VariableGroupEndpoint,
};
use serde_json::{json, Map, Value};

use crate::{
    dict::{self, parser::scalar_from_bare, Dict},
    system::ConnectorType,
    Error, Result,
};

/// Prefix of the written case dictionary's file name
pub const IMPORTED_PREFIX: &str = "caseDict_imported_from_";

/// Import `path` and write `caseDict_imported_from_<file name>` next to it.
///
/// Only `OspSystemStructure.xml` files are supported. Signal connections are rejected with
/// [`Error::UnsupportedConnection`] before anything is written.
pub fn import_system_structure(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if !path.is_file() {
        log::error!("System structure {} does not exist", path.display());
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let path = &if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("xml") => {}
        Some("ssd") => {
            log::error!("Importing SystemStructure.ssd is not supported yet");
            return Err(Error::UnsupportedFormat(path.to_path_buf()));
        }
        _ => {
            log::error!("{} is not an OspSystemStructure.xml file", path.display());
            return Err(Error::UnsupportedFormat(path.to_path_buf()));
        }
    }

    let text = std::fs::read_to_string(path)?;
    let structure: OspSystemStructure = osp_schema::deserialize(&text)?;
    let folder = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let case_dict = case_dict(&structure, folder, &name)?;

    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().replace('.', "_"))
        .unwrap_or_default();
    let target = folder.join(format!("{IMPORTED_PREFIX}{file_name}"));
    dict::write_dict(&target, &case_dict)?;
    log::info!("Imported {} into {}", path.display(), target.display());
    Ok(target)
}

/// Connectors synthesised per component, keyed by connector name
type ComponentConnectors = IndexMap<String, IndexMap<String, Value>>;

/// Build the case dictionary for `structure`, whose FMU sources are relative to `folder`.
pub fn case_dict(structure: &OspSystemStructure, folder: &Path, name: &str) -> Result<Dict> {
    let mut connectors = ComponentConnectors::new();
    let mut connections = Map::new();

    for connection in structure.connections.iter().flat_map(|c| &c.connections) {
        let endpoints: Vec<(&str, &str, &str)> = match connection {
            Connection::Variable(c) => c
                .variables
                .iter()
                .map(|VariableEndpoint { simulator, name }| {
                    (simulator.as_str(), name.as_str(), "variable")
                })
                .collect(),
            Connection::VariableGroup(c) => c
                .variable_groups
                .iter()
                .map(|VariableGroupEndpoint { simulator, name }| {
                    (simulator.as_str(), name.as_str(), "variableGroup")
                })
                .collect(),
            Connection::Signal(_) | Connection::SignalGroup(_) => {
                log::error!("{} is not supported", connection.tag());
                return Err(Error::UnsupportedConnection(connection.tag().to_owned()));
            }
        };
        let [source, target] = endpoints.as_slice() else {
            log::error!(
                "Skipping {} with {} endpoints, expected 2",
                connection.tag(),
                endpoints.len()
            );
            continue;
        };

        for ((simulator, variable, key), connector_type) in
            [(source, ConnectorType::Output), (target, ConnectorType::Input)]
        {
            connectors
                .entry(simulator.to_string())
                .or_default()
                .entry(variable.to_string())
                .or_insert_with(|| {
                    let mut connector = Map::new();
                    connector.insert(key.to_string(), Value::from(*variable));
                    connector.insert("type".to_owned(), Value::from(connector_type.to_string()));
                    Value::Object(connector)
                });
        }

        let connection_name = unique_name(&connections, &format!("{}_to_{}", source.0, target.0));
        connections.insert(
            connection_name,
            json!({
                "source": {"component": source.0, "connector": source.1},
                "target": {"component": target.0, "connector": target.1},
            }),
        );
    }

    let sources: Vec<PathBuf> = structure
        .simulators
        .simulators
        .iter()
        .map(|s| normalize(&folder.join(&s.source)))
        .collect();
    let lib_source = common_root(&sources).unwrap_or_else(|| normalize(folder));

    let mut components = Map::new();
    for (simulator, source) in structure.simulators.simulators.iter().zip(&sources) {
        components.insert(
            simulator.name.clone(),
            component(simulator, source, &lib_source, connectors.get(&simulator.name)),
        );
    }

    let mut simulation = Map::new();
    simulation.insert("name".to_owned(), Value::from(name));
    for (key, value) in [
        ("startTime", structure.start_time.as_ref().map(|t| t.as_str())),
        ("baseStepSize", structure.base_step_size.as_ref().map(|t| t.as_str())),
        ("algorithm", structure.algorithm.as_ref().map(|a| a.as_str())),
    ] {
        if let Some(value) = value {
            simulation.insert(key.to_owned(), scalar_from_bare(value.trim()));
        }
    }

    let mut case = Dict::new();
    case.insert(
        "_environment".to_owned(),
        json!({ "libSource": relative_to(&lib_source, &normalize(folder)) }),
    );
    case.insert(
        "systemStructure".to_owned(),
        json!({ "connections": connections, "components": components }),
    );
    case.insert("run".to_owned(), json!({ "simulation": simulation }));
    Ok(case)
}

fn component(
    simulator: &Simulator,
    source: &Path,
    lib_source: &Path,
    connectors: Option<&IndexMap<String, Value>>,
) -> Value {
    let mut component = Map::new();
    if let Some(connectors) = connectors {
        let connectors: Map<_, _> = connectors
            .iter()
            .map(|(name, connector)| (name.clone(), connector.clone()))
            .collect();
        component.insert("connectors".to_owned(), Value::Object(connectors));
    }
    component.insert(
        "fmu".to_owned(),
        Value::from(relative_to(source, lib_source)),
    );
    if let Some(step_size) = simulator.step_size {
        component.insert("stepSize".to_owned(), Value::from(step_size));
    }
    if let Some(initial_values) = &simulator.initial_values {
        let initialize: Map<_, _> = initial_values
            .initial_values
            .iter()
            .map(|initial_value| {
                let start = match &initial_value.value {
                    TypedValue::Real(v) => Value::from(v.value),
                    TypedValue::Integer(v) => Value::from(v.value),
                    TypedValue::Boolean(v) => Value::from(v.value),
                    TypedValue::String(v) => Value::from(v.value.as_str()),
                };
                (initial_value.variable.clone(), json!({ "start": start }))
            })
            .collect();
        if !initialize.is_empty() {
            component.insert("initialize".to_owned(), Value::Object(initialize));
        }
    }
    Value::Object(component)
}

/// `base`, or `base_02`, `base_03`, ... if taken
fn unique_name(taken: &Map<String, Value>, base: &str) -> String {
    if !taken.contains_key(base) {
        return base.to_owned();
    }
    (2..)
        .map(|n| format!("{base}_{n:02}"))
        .find(|name| !taken.contains_key(name))
        .unwrap_or_else(|| base.to_owned())
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            PathComponent::CurDir => {}
            PathComponent::ParentDir => {
                let ends_in_name = matches!(
                    normalized.components().next_back(),
                    Some(PathComponent::Normal(_))
                );
                if ends_in_name {
                    normalized.pop();
                } else {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Deepest directory containing all `files`
fn common_root(files: &[PathBuf]) -> Option<PathBuf> {
    let mut parents = files.iter().filter_map(|f| f.parent());
    let first = parents.next()?.to_path_buf();
    Some(parents.fold(first, |root, parent| {
        root.components()
            .zip(parent.components())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect()
    }))
}

/// `path` relative to `base` with `/` separators. Both are expected to be normalized; paths
/// without a common prefix are returned unchanged.
fn relative_to(path: &Path, base: &Path) -> String {
    let path: Vec<_> = path.components().collect();
    let base: Vec<_> = base.components().collect();
    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();
    if common == 0 {
        return path.iter().collect::<PathBuf>().to_string_lossy().into_owned();
    }
    let parts: Vec<String> = std::iter::repeat_n("..".to_owned(), base.len() - common)
        .chain(
            path[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();
    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name() {
        let mut taken = Map::new();
        assert_eq!(unique_name(&taken, "A_to_B"), "A_to_B");
        taken.insert("A_to_B".to_owned(), Value::Null);
        assert_eq!(unique_name(&taken, "A_to_B"), "A_to_B_02");
        taken.insert("A_to_B_02".to_owned(), Value::Null);
        assert_eq!(unique_name(&taken, "A_to_B"), "A_to_B_03");
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            normalize(Path::new("/cases/demo/../lib/./a.fmu")),
            PathBuf::from("/cases/lib/a.fmu")
        );
        let root = common_root(&[
            PathBuf::from("/cases/lib/a.fmu"),
            PathBuf::from("/cases/lib/sub/b.fmu"),
        ]);
        assert_eq!(root, Some(PathBuf::from("/cases/lib")));
        assert_eq!(
            relative_to(Path::new("/cases/lib/sub/b.fmu"), Path::new("/cases/lib")),
            "sub/b.fmu"
        );
        assert_eq!(relative_to(Path::new("/cases/lib"), Path::new("/cases/lib")), ".");
        assert_eq!(
            relative_to(Path::new("/cases/lib"), Path::new("/cases/demo")),
            "../lib"
        );
        assert_eq!(common_root(&[]), None);
    }

    #[test]
    fn test_case_dict() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<OspSystemStructure xmlns="http://opensimulationplatform.com/MSMI/OSPSystemStructure" version="0.1">
    <StartTime>0.0</StartTime>
    <BaseStepSize>0.01</BaseStepSize>
    <Algorithm>fixedStep</Algorithm>
    <Simulators>
        <Simulator name="A" source="../lib/adder.fmu" stepSize="0.01">
            <InitialValues>
                <InitialValue variable="k"><Real value="2.5"/></InitialValue>
                <InitialValue variable="n"><Integer value="4"/></InitialValue>
            </InitialValues>
        </Simulator>
        <Simulator name="B" source="../lib/printer.fmu"/>
    </Simulators>
    <Connections>
        <VariableConnection>
            <Variable simulator="A" name="out"/>
            <Variable simulator="B" name="in"/>
        </VariableConnection>
        <VariableConnection>
            <Variable simulator="A" name="out"/>
            <Variable simulator="B" name="x"/>
        </VariableConnection>
    </Connections>
</OspSystemStructure>
"#;
        let structure: OspSystemStructure = osp_schema::deserialize(xml).unwrap();
        let dict = case_dict(&structure, Path::new("/cases/demo"), "OspSystemStructure").unwrap();
        let value = Value::Object(dict);

        assert_eq!(value["_environment"]["libSource"], json!("../lib"));
        assert_eq!(
            value["run"]["simulation"],
            json!({"name": "OspSystemStructure", "startTime": 0.0, "baseStepSize": 0.01, "algorithm": "fixedStep"})
        );

        let components = &value["systemStructure"]["components"];
        assert_eq!(components["A"]["fmu"], json!("adder.fmu"));
        assert_eq!(components["A"]["stepSize"], json!(0.01));
        assert_eq!(
            components["A"]["initialize"],
            json!({"k": {"start": 2.5}, "n": {"start": 4}})
        );
        assert_eq!(
            components["A"]["connectors"],
            json!({"out": {"variable": "out", "type": "output"}})
        );
        assert_eq!(
            components["B"]["connectors"],
            json!({"in": {"variable": "in", "type": "input"}, "x": {"variable": "x", "type": "input"}})
        );

        let connections = value["systemStructure"]["connections"].as_object().unwrap();
        let names: Vec<_> = connections.keys().cloned().collect();
        assert_eq!(names, ["A_to_B", "A_to_B_02"]);
        assert_eq!(
            connections["A_to_B"],
            json!({"source": {"component": "A", "connector": "out"}, "target": {"component": "B", "connector": "in"}})
        );
    }
}
