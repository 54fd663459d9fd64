use indexmap::IndexMap;

use crate::{
    fmu::Fmu,
    model_description::{DataType, ScalarVariable, Unit},
};

use super::connector::Connector;

/// Address of the host running a proxied FMU
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteAccess {
    pub host: String,
    pub port: u16,
}

/// An instance of an FMU in the system structure.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub name: String,
    pub fmu: Fmu,
    pub step_size: Option<f64>,
    pub remote_access: Option<RemoteAccess>,
    /// Parameter overrides, holding only the overridden fields
    pub initial_values: IndexMap<String, ScalarVariable>,
    pub connectors: IndexMap<String, Connector>,
    /// The FMU's units
    pub units: IndexMap<String, Unit>,
    /// The FMU's variables with `initial_values` applied
    pub variables: IndexMap<String, ScalarVariable>,
}

impl Component {
    /// Create a component, reconciling `initial_values` and `connectors` with the FMU's variables.
    pub fn new(
        name: impl Into<String>,
        fmu: Fmu,
        initial_values: IndexMap<String, ScalarVariable>,
        connectors: IndexMap<String, Connector>,
    ) -> Self {
        let name = name.into();
        let units = fmu.units();
        let mut variables = fmu.variables();

        let initial_values: IndexMap<_, _> = initial_values
            .into_iter()
            .map(|(key, initial_value)| {
                let initial_value = match variables.get_mut(&key) {
                    Some(variable) => {
                        let initial_value = reconcile(&name, variable, initial_value);
                        variable.overlay(&initial_value);
                        initial_value
                    }
                    None => {
                        log::warn!(
                            "{name}: initial value for {key}, which is not a variable of {}",
                            fmu.file_name()
                        );
                        initial_value
                    }
                };
                (key, initial_value)
            })
            .collect();

        let connectors = connectors
            .into_iter()
            .filter(|(key, connector)| match connector.variable() {
                Some(variable) if !variables.contains_key(variable) => {
                    log::error!(
                        "{name}: connector {key} refers to unknown variable {variable}, dropped"
                    );
                    false
                }
                _ => true,
            })
            .collect();

        Self {
            name,
            fmu,
            step_size: None,
            remote_access: None,
            initial_values,
            connectors,
            units,
            variables,
        }
    }

    /// Look up a variable, falling back to an override for a variable the FMU does not declare.
    pub fn variable(&self, name: &str) -> Option<&ScalarVariable> {
        self.variables
            .get(name)
            .or_else(|| self.initial_values.get(name))
    }
}

/// Align an override with the FMU's declaration of the variable: the data type comes from the
/// FMU, and integer start values are widened to real or narrowed to boolean where lossless.
fn reconcile(
    component: &str,
    variable: &ScalarVariable,
    mut initial_value: ScalarVariable,
) -> ScalarVariable {
    let Some(data_type) = variable.data_type else {
        return initial_value;
    };
    if let Some(start) = initial_value.start.take() {
        let start = start.coerce(data_type);
        let compatible = start.data_type() == data_type
            || (data_type == DataType::Enumeration && start.data_type() == DataType::Integer);
        if !compatible {
            log::warn!(
                "{component}: start value {start} of {} does not match its type {data_type}",
                variable.name
            );
        }
        initial_value.start = Some(start);
        if compatible || initial_value.data_type.is_none() {
            initial_value.data_type = Some(data_type);
        }
    } else if initial_value.data_type.is_none() {
        initial_value.data_type = Some(data_type);
    }
    initial_value
}
