//! The in-memory system structure: components, their connectors and the connections between them.

use indexmap::IndexMap;

use crate::{
    fmu::Fmu,
    model_description::{ScalarVariable, Unit},
};

mod builder;
mod component;
mod connection;
mod connector;

pub use builder::SystemBuilder;
pub use component::{Component, RemoteAccess};
pub use connection::{Connection, ConnectionKind, Endpoint, EndpointTarget};
pub use connector::{Connector, ConnectorBinding, ConnectorType, UNKNOWN};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct System {
    pub components: IndexMap<String, Component>,
    pub connections: IndexMap<String, Connection>,
}

impl System {
    /// FMUs used by the components, keyed by file name
    pub fn fmus(&self) -> IndexMap<String, &Fmu> {
        self.components
            .values()
            .map(|c| (c.fmu.file_name(), &c.fmu))
            .collect()
    }

    /// Units of all components, keyed by name. The first definition of a name wins.
    pub fn units(&self) -> IndexMap<String, &Unit> {
        let mut units = IndexMap::new();
        for unit in self.components.values().flat_map(|c| c.units.values()) {
            units.entry(unit.name.clone()).or_insert(unit);
        }
        units
    }

    /// Variables of all components, keyed by name
    pub fn variables(&self) -> IndexMap<String, &ScalarVariable> {
        let mut variables = IndexMap::new();
        for variable in self.components.values().flat_map(|c| c.variables.values()) {
            variables.entry(variable.name.clone()).or_insert(variable);
        }
        variables
    }

    /// Connectors of all components, keyed by name
    pub fn connectors(&self) -> IndexMap<String, &Connector> {
        let mut connectors = IndexMap::new();
        for connector in self.components.values().flat_map(|c| c.connectors.values()) {
            connectors.entry(connector.name.clone()).or_insert(connector);
        }
        connectors
    }

    /// Connections that pass validation, with their kind. Invalid ones are logged.
    pub fn valid_connections(&self) -> Vec<(&Connection, ConnectionKind)> {
        self.connections
            .values()
            .filter_map(|connection| match connection.validate() {
                Ok(kind) => Some((connection, kind)),
                Err(err) => {
                    log::error!("Skipping invalid connection: {err}");
                    None
                }
            })
            .collect()
    }
}
