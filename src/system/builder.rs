//! Construction of a [`System`] from the `systemStructure` section of a case dictionary.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    dict::as_f64,
    fmu::Fmu,
    model_description::{ScalarVariable, StartValue},
    tools::ProxyTool,
    Error, Result,
};

use super::{
    component::{Component, RemoteAccess},
    connection::{Connection, Endpoint},
    connector::{Connector, ConnectorType},
    System,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentSpec {
    fmu: String,
    step_size: Option<Value>,
    #[serde(rename = "generate_proxy", alias = "generateProxy", default)]
    generate_proxy: bool,
    remote_access: Option<RemoteAccessSpec>,
    #[serde(default)]
    initialize: IndexMap<String, Value>,
    #[serde(default)]
    connectors: IndexMap<String, ConnectorSpec>,
}

#[derive(Debug, Deserialize)]
struct RemoteAccessSpec {
    host: Option<String>,
    port: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct InitialValueSpec {
    causality: Option<String>,
    variability: Option<String>,
    start: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectorSpec {
    variable: Option<String>,
    variable_group: Option<String>,
    #[serde(rename = "type")]
    connector_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectionSpec {
    source: EndpointSpec,
    target: EndpointSpec,
}

#[derive(Debug, Deserialize)]
struct EndpointSpec {
    component: String,
    connector: Option<String>,
    variable: Option<String>,
}

/// Builds components and connections, resolving FMUs in `fmu_folder`.
pub struct SystemBuilder<'a> {
    fmu_folder: PathBuf,
    proxy_tool: &'a dyn ProxyTool,
}

impl<'a> SystemBuilder<'a> {
    pub fn new(fmu_folder: impl Into<PathBuf>, proxy_tool: &'a dyn ProxyTool) -> Self {
        Self {
            fmu_folder: fmu_folder.into(),
            proxy_tool,
        }
    }

    /// Build the system. Malformed components and connections are logged and skipped; an FMU
    /// that cannot be found is an error.
    pub fn build(&self, system_structure: &Value) -> Result<System> {
        let mut system = System::default();

        for (name, spec) in section(system_structure, "components") {
            let spec: ComponentSpec = match serde_json::from_value(spec.clone()) {
                Ok(spec) => spec,
                Err(err) => {
                    log::error!("Skipping component {name}: {err}");
                    continue;
                }
            };
            let component = self.component(name, spec)?;
            log::debug!("Added component {}", component.name);
            system.components.insert(component.name.clone(), component);
        }

        for (name, spec) in section(system_structure, "connections") {
            let spec: ConnectionSpec = match serde_json::from_value(spec.clone()) {
                Ok(spec) => spec,
                Err(err) => {
                    log::error!("Skipping connection {name}: {err}");
                    continue;
                }
            };
            let source = resolve_endpoint(&system, name, "source", &spec.source);
            let target = resolve_endpoint(&system, name, "target", &spec.target);
            if let (Some(source), Some(target)) = (source, target) {
                log::debug!("Added connection {name}");
                system
                    .connections
                    .insert(name.clone(), Connection::new(name.clone(), source, target));
            }
        }

        Ok(system)
    }

    /// FMUs are copied into the case folder by file name. When the library is the case folder
    /// itself nothing is copied and the declared relative path is used.
    fn fmu_path(&self, fmu: &str) -> PathBuf {
        let declared = self.fmu_folder.join(fmu);
        match declared.file_name() {
            Some(file_name) if self.fmu_folder.join(file_name).is_file() => {
                self.fmu_folder.join(file_name)
            }
            _ => declared,
        }
    }

    fn component(&self, name: &str, spec: ComponentSpec) -> Result<Component> {
        let path = self.fmu_path(&spec.fmu);
        if !path.is_file() {
            log::error!("Component {name}: FMU {} not found", path.display());
            return Err(Error::NotFound(path));
        }
        let mut fmu = Fmu::from_path(&path)?;
        let mut name = name.to_owned();

        let remote_access = spec
            .remote_access
            .and_then(|remote| remote_access(&name, remote));

        if spec.generate_proxy {
            match &remote_access {
                Some(remote) => {
                    let original = fmu.file.clone();
                    fmu = fmu.proxify(&remote.host, remote.port, self.proxy_tool);
                    if fmu.file != original {
                        name = format!("{name}-proxy");
                    }
                }
                None => log::warn!("Component {name}: generate_proxy requires remoteAccess"),
            }
        }

        let initial_values = spec
            .initialize
            .iter()
            .filter_map(|(variable, value)| {
                initial_value(&name, variable, value).map(|v| (variable.clone(), v))
            })
            .collect();

        let connectors = spec
            .connectors
            .into_iter()
            .map(|(key, spec)| {
                let mut connector = Connector::new(key.clone());
                if let Some(variable) = spec.variable {
                    connector.set_variable(variable);
                }
                if let Some(group) = spec.variable_group {
                    connector.set_variable_group(group);
                }
                if connector.binding.is_none() {
                    log::warn!("Component {name}: connector {key} names no variable or group");
                }
                connector.connector_type =
                    spec.connector_type.as_deref().and_then(|t| match t.parse::<ConnectorType>() {
                        Ok(connector_type) => Some(connector_type),
                        Err(err) => {
                            log::warn!("Component {name}: connector {key}: {err}");
                            None
                        }
                    });
                (key, connector)
            })
            .collect();

        let mut component = Component::new(name, fmu, initial_values, connectors);
        component.step_size = spec.step_size.as_ref().and_then(as_f64);
        component.remote_access = remote_access;
        Ok(component)
    }
}

/// Entries of `systemStructure.<key>`, if it is a block
fn section<'v>(
    system_structure: &'v Value,
    key: &str,
) -> impl Iterator<Item = (&'v String, &'v Value)> {
    system_structure
        .get(key)
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|map| map.iter())
}

/// An override from `initialize.<variable>`. A plain value is taken as the start value.
fn initial_value(component: &str, name: &str, value: &Value) -> Option<ScalarVariable> {
    let spec = match value {
        Value::Object(_) => match serde_json::from_value::<InitialValueSpec>(value.clone()) {
            Ok(spec) => spec,
            Err(err) => {
                log::error!("Component {component}: skipping initial value {name}: {err}");
                return None;
            }
        },
        start => InitialValueSpec {
            start: Some(start.clone()),
            ..Default::default()
        },
    };

    let mut variable = ScalarVariable::new(name);
    if let Some(causality) = &spec.causality {
        variable.set_causality_str(causality);
    }
    if let Some(variability) = &spec.variability {
        variable.set_variability_str(variability);
    }
    if let Some(start) = &spec.start {
        match StartValue::from_json(start) {
            Some(start) => variable.set_start(start),
            None => log::warn!("Component {component}: {name}: unsupported start value {start}"),
        }
    }
    Some(variable)
}

/// Find the component of an endpoint, accepting the `-proxy` name of a proxied component.
fn find_component<'s>(system: &'s System, name: &str) -> Option<&'s Component> {
    system
        .components
        .get(name)
        .or_else(|| system.components.get(&format!("{name}-proxy")))
}

fn resolve_endpoint(
    system: &System,
    connection: &str,
    role: &str,
    spec: &EndpointSpec,
) -> Option<Endpoint> {
    let Some(component) = find_component(system, &spec.component) else {
        log::error!(
            "Connection {connection}: {role} component {} does not exist, connection dropped",
            spec.component
        );
        return None;
    };

    match (&spec.connector, &spec.variable) {
        (Some(connector), None) => {
            let found = component.connectors.get(connector).or_else(|| {
                system
                    .components
                    .values()
                    .find_map(|other| other.connectors.get(connector))
            });
            match found {
                Some(found) => Some(Endpoint::connector(&component.name, found.clone())),
                None => {
                    log::error!(
                        "Connection {connection}: {role} connector {connector} not found, connection dropped"
                    );
                    None
                }
            }
        }
        (None, Some(variable)) => match component.variable(variable) {
            Some(found) => Some(Endpoint::variable(&component.name, found.clone())),
            None => {
                log::error!(
                    "Connection {connection}: {role} variable {variable} not found in {}, connection dropped",
                    component.name
                );
                None
            }
        },
        (Some(_), Some(_)) => {
            log::error!(
                "Connection {connection}: {role} names both a connector and a variable, connection dropped"
            );
            None
        }
        (None, None) => {
            log::error!(
                "Connection {connection}: {role} names neither a connector nor a variable, connection dropped"
            );
            None
        }
    }
}

fn remote_access(component: &str, remote: RemoteAccessSpec) -> Option<RemoteAccess> {
    let (Some(host), Some(port)) = (remote.host, remote.port) else {
        log::warn!("Component {component}: incomplete remoteAccess, needs host and port");
        return None;
    };
    match as_f64(&port) {
        Some(p) if p.fract() == 0.0 && (1.0..=f64::from(u16::MAX)).contains(&p) => {
            Some(RemoteAccess {
                host,
                port: p as u16,
            })
        }
        _ => {
            log::warn!("Component {component}: invalid remoteAccess port {port}");
            None
        }
    }
}
