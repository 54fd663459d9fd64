//! Tests for the `osp_schema::serialize` and `osp_schema::deserialize` functions.

use osp_schema::{
    deserialize,
    model_description::{
        BaseUnit, GenericGroup, GroupVariable, OspModelDescription, Unit, OSP_MODEL_DESCRIPTION_NS,
    },
    serialize,
    ssd::{
        Algorithm, Annotation, Annotations, Component, Connection, Connections, DefaultExperiment,
        Elements, FixedStepAlgorithm, System, SystemStructureDescription, OSP_ANNOTATION_TYPE,
        SSD_NS,
    },
    system_structure::{
        self, InitialValue, InitialValues, OspSystemStructure, RealValue, Simulator, TypedValue,
        VariableConnection, VariableEndpoint, OSP_SYSTEM_STRUCTURE_NS,
    },
};
use pretty_assertions::assert_eq;

fn sample_structure() -> OspSystemStructure {
    let mut structure = OspSystemStructure::new();
    structure.start_time = Some("0".to_owned().into());
    structure.base_step_size = Some("0.01".to_owned().into());
    structure.algorithm = Some("fixedStep".to_owned().into());
    structure.simulators.simulators = vec![
        Simulator {
            name: "A".to_owned(),
            source: "a.fmu".to_owned(),
            step_size: Some(0.01),
            initial_values: Some(InitialValues {
                initial_values: vec![InitialValue {
                    variable: "k".to_owned(),
                    value: TypedValue::Real(RealValue { value: 2.5 }),
                }],
            }),
        },
        Simulator {
            name: "B".to_owned(),
            source: "b.fmu".to_owned(),
            step_size: Some(0.01),
            initial_values: None,
        },
    ];
    structure.connections = Some(system_structure::Connections {
        connections: vec![system_structure::Connection::Variable(VariableConnection {
            variables: vec![
                VariableEndpoint {
                    simulator: "A".to_owned(),
                    name: "y".to_owned(),
                },
                VariableEndpoint {
                    simulator: "B".to_owned(),
                    name: "u".to_owned(),
                },
            ],
        })],
    });
    structure
}

#[test]
fn test_system_structure() {
    let structure = sample_structure();
    let xml = serialize(&structure, true).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(OSP_SYSTEM_STRUCTURE_NS));
    assert!(xml.contains("<StartTime>0</StartTime>"));
    assert!(xml.contains("<Algorithm>fixedStep</Algorithm>"));

    let parsed: OspSystemStructure = deserialize(&xml).unwrap();
    assert_eq!(parsed, structure);
}

#[test]
fn test_system_structure_element_order() {
    let xml = serialize(&sample_structure(), true).unwrap();
    let position = |needle: &str| xml.find(needle).unwrap();
    assert!(position("<StartTime>") < position("<BaseStepSize>"));
    assert!(position("<BaseStepSize>") < position("<Algorithm>"));
    assert!(position("<Algorithm>") < position("<Simulators>"));
    assert!(position("<Simulators>") < position("<Connections>"));
}

#[test]
fn test_model_description() {
    let mut description = OspModelDescription::new();
    description.unit_definitions.units.push(Unit {
        name: "N".to_owned(),
        base_unit: Some(BaseUnit {
            kg: Some(1),
            m: Some(1),
            s: Some(-2),
            ..Default::default()
        }),
        display_unit: None,
    });
    description.variable_groups.groups.push(GenericGroup {
        name: "Force".to_owned(),
        variables: vec![GroupVariable {
            reference: "F".to_owned(),
            unit: Some("N".to_owned()),
        }],
    });

    let xml = serialize(&description, true).unwrap();
    assert!(xml.contains(OSP_MODEL_DESCRIPTION_NS));
    assert!(xml.contains(r#"<BaseUnit kg="1" m="1" s="-2"/>"#));
    assert!(xml.contains(r#"<Variable ref="F" unit="N"/>"#));

    let parsed: OspModelDescription = deserialize(&xml).unwrap();
    assert_eq!(parsed, description);
}

#[test]
fn test_ssd() {
    let system = System {
        name: "demo".to_owned(),
        description: None,
        elements: Elements {
            components: vec![Component {
                name: "A".to_owned(),
                source: "a.fmu".to_owned(),
                connectors: None,
            }],
        },
        connections: Some(Connections {
            connections: vec![Connection {
                start_element: "A".to_owned(),
                start_connector: "y".to_owned(),
                end_element: "A".to_owned(),
                end_connector: "u".to_owned(),
            }],
        }),
    };
    let mut ssd = SystemStructureDescription::new("demo", system);
    ssd.default_experiment = Some(DefaultExperiment {
        start_time: Some("0".to_owned()),
        stop_time: Some("10".to_owned()),
        annotations: Some(Annotations {
            annotations: vec![Annotation {
                r#type: OSP_ANNOTATION_TYPE.to_owned(),
                algorithm: Some(Algorithm {
                    fixed_step: Some(FixedStepAlgorithm {
                        base_step_size: Some("0.01".to_owned()),
                        start_time: Some("0".to_owned()),
                        stop_time: Some("10".to_owned()),
                    }),
                }),
            }],
        }),
    });

    let xml = serialize(&ssd, true).unwrap();
    assert!(xml.contains(&format!(r#"xmlns:ssd="{SSD_NS}""#)));
    assert!(xml.contains("<ssd:System name=\"demo\">"));
    assert!(xml.contains("<osp:FixedStepAlgorithm baseStepSize=\"0.01\""));

    let parsed: SystemStructureDescription = deserialize(&xml).unwrap();
    assert_eq!(parsed, ssd);
}
