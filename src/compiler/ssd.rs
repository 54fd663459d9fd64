//! `SystemStructure.ssd`

use std::path::{Path, PathBuf};

use osp_schema::ssd as schema;

use crate::{
    simulation::Simulation,
    system::{Component, System},
    Result,
};

pub const FILE_NAME: &str = "SystemStructure.ssd";

pub fn system_structure_description(
    name: &str,
    system: &System,
    simulation: Option<&Simulation>,
) -> schema::SystemStructureDescription {
    let connections: Vec<_> = system
        .connections
        .values()
        .map(|connection| schema::Connection {
            start_element: connection.source.component.clone(),
            start_connector: connection.source.variable_name().to_owned(),
            end_element: connection.target.component.clone(),
            end_connector: connection.target.variable_name().to_owned(),
        })
        .collect();

    let ssd_system = schema::System {
        name: name.to_owned(),
        description: Some(name.to_owned()),
        elements: schema::Elements {
            components: system.components.values().map(component).collect(),
        },
        connections: (!connections.is_empty()).then_some(schema::Connections { connections }),
    };

    let mut description = schema::SystemStructureDescription::new(name, ssd_system);
    description.default_experiment = simulation.map(default_experiment);
    description
}

fn component(component: &Component) -> schema::Component {
    let connectors: Vec<_> = component
        .connectors
        .values()
        .map(|connector| schema::Connector {
            name: connector.variable_name().to_owned(),
            kind: connector.connector_type.map(|t| t.to_string()),
            real: Some(schema::RealType::default()),
        })
        .collect();
    schema::Component {
        name: component.name.clone(),
        source: component.fmu.file_name(),
        connectors: (!connectors.is_empty()).then_some(schema::Connectors { connectors }),
    }
}

fn default_experiment(simulation: &Simulation) -> schema::DefaultExperiment {
    let start_time = simulation.start_time.map(|t| t.to_string());
    let stop_time = simulation.stop_time.map(|t| t.to_string());
    schema::DefaultExperiment {
        start_time: start_time.clone(),
        stop_time: stop_time.clone(),
        annotations: Some(schema::Annotations {
            annotations: vec![schema::Annotation {
                r#type: schema::OSP_ANNOTATION_TYPE.to_owned(),
                algorithm: Some(schema::Algorithm {
                    fixed_step: Some(schema::FixedStepAlgorithm {
                        base_step_size: simulation.base_step_size.map(|t| t.to_string()),
                        start_time,
                        stop_time,
                    }),
                }),
            }],
        }),
    }
}

/// Write `SystemStructure.ssd` into `folder`.
pub fn write(
    folder: &Path,
    name: &str,
    system: &System,
    simulation: Option<&Simulation>,
) -> Result<PathBuf> {
    let path = folder.join(FILE_NAME);
    let xml = osp_schema::serialize(&system_structure_description(name, system, simulation), true)?;
    std::fs::write(&path, xml)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
