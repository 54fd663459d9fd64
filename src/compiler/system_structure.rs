//! `OspSystemStructure.xml`

use std::path::{Path, PathBuf};

use osp_schema::system_structure as schema;

use crate::{
    model_description::{DataType, ScalarVariable, StartValue},
    simulation::Simulation,
    system::{Component, ConnectionKind, Endpoint, System},
    Result,
};

pub const FILE_NAME: &str = "OspSystemStructure.xml";

pub fn osp_system_structure(
    system: &System,
    simulation: Option<&Simulation>,
) -> schema::OspSystemStructure {
    let mut structure = schema::OspSystemStructure::new();

    if let Some(simulation) = simulation {
        structure.start_time = simulation.start_time.map(|t| t.to_string().into());
        structure.base_step_size = simulation.base_step_size.map(|t| t.to_string().into());
        structure.algorithm = simulation.algorithm.map(|a| a.to_string().into());
    }

    structure.simulators.simulators = system.components.values().map(simulator).collect();

    let connections: Vec<_> = system
        .valid_connections()
        .into_iter()
        .map(|(connection, kind)| match kind {
            ConnectionKind::Variable => {
                schema::Connection::Variable(schema::VariableConnection {
                    variables: vec![
                        variable_endpoint(&connection.source),
                        variable_endpoint(&connection.target),
                    ],
                })
            }
            ConnectionKind::VariableGroup => {
                schema::Connection::VariableGroup(schema::VariableGroupConnection {
                    variable_groups: vec![
                        group_endpoint(&connection.source),
                        group_endpoint(&connection.target),
                    ],
                })
            }
        })
        .collect();
    if !connections.is_empty() {
        structure.connections = Some(schema::Connections { connections });
    }

    structure
}

fn simulator(component: &Component) -> schema::Simulator {
    let initial_values: Vec<_> = component
        .initial_values
        .values()
        .filter_map(|variable| initial_value(&component.name, variable))
        .collect();
    schema::Simulator {
        name: component.name.clone(),
        source: component.fmu.file_name(),
        step_size: component.step_size,
        initial_values: (!initial_values.is_empty()).then_some(schema::InitialValues {
            initial_values,
        }),
    }
}

fn initial_value(component: &str, variable: &ScalarVariable) -> Option<schema::InitialValue> {
    let start = variable.start.clone()?;
    let Some(data_type) = variable.data_type else {
        log::error!(
            "{component}: initial value of {} has no data type, omitted",
            variable.name
        );
        return None;
    };
    let value = match start.coerce(data_type) {
        StartValue::Real(value) => schema::TypedValue::Real(schema::RealValue { value }),
        StartValue::Integer(value) => schema::TypedValue::Integer(schema::IntegerValue { value }),
        StartValue::Boolean(value) => schema::TypedValue::Boolean(schema::BooleanValue { value }),
        StartValue::String(value) if data_type == DataType::String => {
            schema::TypedValue::String(schema::StringValue { value })
        }
        StartValue::String(value) => {
            log::error!(
                "{component}: initial value {value:?} of {} is not a {data_type}, omitted",
                variable.name
            );
            return None;
        }
    };
    Some(schema::InitialValue {
        variable: variable.name.clone(),
        value,
    })
}

fn variable_endpoint(endpoint: &Endpoint) -> schema::VariableEndpoint {
    schema::VariableEndpoint {
        simulator: endpoint.component.clone(),
        name: endpoint.variable_name().to_owned(),
    }
}

fn group_endpoint(endpoint: &Endpoint) -> schema::VariableGroupEndpoint {
    schema::VariableGroupEndpoint {
        simulator: endpoint.component.clone(),
        name: endpoint.variable_name().to_owned(),
    }
}

/// Write `OspSystemStructure.xml` into `folder`.
pub fn write(folder: &Path, system: &System, simulation: Option<&Simulation>) -> Result<PathBuf> {
    let path = folder.join(FILE_NAME);
    let xml = osp_schema::serialize(&osp_system_structure(system, simulation), true)?;
    std::fs::write(&path, xml)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_value_types() {
        let mut x = ScalarVariable::new("x");
        x.set_start(StartValue::Real(1.5));
        let value = initial_value("C", &x).unwrap();
        assert_eq!(value.variable, "x");
        assert_eq!(
            value.value,
            schema::TypedValue::Real(schema::RealValue { value: 1.5 })
        );

        let mut on = ScalarVariable::new("on");
        on.data_type = Some(DataType::Boolean);
        on.start = Some(StartValue::Integer(1));
        assert_eq!(
            initial_value("C", &on).unwrap().value,
            schema::TypedValue::Boolean(schema::BooleanValue { value: true })
        );
    }

    #[test]
    fn test_initial_value_skipped() {
        let mut untyped = ScalarVariable::new("u");
        untyped.start = Some(StartValue::Real(1.0));
        assert!(initial_value("C", &untyped).is_none());

        let mut causality_only = ScalarVariable::new("v");
        causality_only.set_causality_str("parameter");
        assert!(initial_value("C", &causality_only).is_none());
    }

    #[test]
    fn test_simulation_settings() {
        let simulation = Simulation {
            start_time: Some(0.0),
            base_step_size: Some(0.01),
            algorithm: Some(crate::simulation::Algorithm::FixedStep),
            ..Default::default()
        };
        let structure = osp_system_structure(&System::default(), Some(&simulation));
        assert_eq!(structure.start_time.as_ref().map(|t| t.as_str()), Some("0"));
        assert_eq!(structure.base_step_size.as_ref().map(|t| t.as_str()), Some("0.01"));
        assert_eq!(structure.algorithm.as_ref().map(|t| t.as_str()), Some("fixedStep"));
        assert!(structure.connections.is_none());
    }
}
