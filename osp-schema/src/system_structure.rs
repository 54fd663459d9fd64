//! `OspSystemStructure.xml`, the system configuration read by OSP simulation masters.

use hard_xml::{XmlRead, XmlWrite};

pub const OSP_SYSTEM_STRUCTURE_NS: &str =
    "http://opensimulationplatform.com/MSMI/OSPSystemStructure";
pub const OSP_SYSTEM_STRUCTURE_VERSION: &str = "0.1";

/// Root element. Children are emitted in declaration order, which is the order required by the
/// OSP schema.
#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "OspSystemStructure")]
pub struct OspSystemStructure {
    #[xml(attr = "xmlns")]
    pub xmlns: Option<String>,
    #[xml(attr = "version")]
    pub version: Option<String>,

    #[xml(child = "StartTime")]
    pub start_time: Option<StartTime>,
    #[xml(child = "BaseStepSize")]
    pub base_step_size: Option<BaseStepSize>,
    #[xml(child = "Algorithm")]
    pub algorithm: Option<Algorithm>,

    #[xml(child = "Simulators")]
    pub simulators: Simulators,
    #[xml(child = "Connections")]
    pub connections: Option<Connections>,
}

impl OspSystemStructure {
    /// An empty structure carrying the OSP namespace and version
    pub fn new() -> Self {
        Self {
            xmlns: Some(OSP_SYSTEM_STRUCTURE_NS.to_owned()),
            version: Some(OSP_SYSTEM_STRUCTURE_VERSION.to_owned()),
            ..Default::default()
        }
    }
}

// Text-only children are modelled as `child` elements rather than `flatten_text`, since hard-xml
// writes flattened text after every `child` field.
macro_rules! text_element {
    ($name:ident, $tag:literal) => {
        #[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
        #[xml(tag = $tag)]
        pub struct $name {
            #[xml(text)]
            pub value: String,
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.value
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self { value }
            }
        }
    };
}

text_element!(StartTime, "StartTime");
text_element!(BaseStepSize, "BaseStepSize");
text_element!(Algorithm, "Algorithm");

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Simulators")]
pub struct Simulators {
    #[xml(child = "Simulator")]
    pub simulators: Vec<Simulator>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Simulator")]
pub struct Simulator {
    #[xml(attr = "name")]
    pub name: String,
    /// Path of the FMU, relative to the system structure file
    #[xml(attr = "source")]
    pub source: String,
    #[xml(attr = "stepSize")]
    pub step_size: Option<f64>,
    #[xml(child = "InitialValues")]
    pub initial_values: Option<InitialValues>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "InitialValues")]
pub struct InitialValues {
    #[xml(child = "InitialValue")]
    pub initial_values: Vec<InitialValue>,
}

#[derive(Clone, Debug, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "InitialValue")]
pub struct InitialValue {
    #[xml(attr = "variable")]
    pub variable: String,
    #[xml(child = "Real", child = "Integer", child = "Boolean", child = "String")]
    pub value: TypedValue,
}

/// The typed child of an `InitialValue`, e.g. `<Real value="1.5"/>`
#[derive(Clone, Debug, PartialEq, XmlRead, XmlWrite)]
pub enum TypedValue {
    #[xml(tag = "Real")]
    Real(RealValue),
    #[xml(tag = "Integer")]
    Integer(IntegerValue),
    #[xml(tag = "Boolean")]
    Boolean(BooleanValue),
    #[xml(tag = "String")]
    String(StringValue),
}

#[derive(Clone, Debug, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Real")]
pub struct RealValue {
    #[xml(attr = "value")]
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Integer")]
pub struct IntegerValue {
    #[xml(attr = "value")]
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Boolean")]
pub struct BooleanValue {
    #[xml(attr = "value")]
    pub value: bool,
}

#[derive(Clone, Debug, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "String")]
pub struct StringValue {
    #[xml(attr = "value")]
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Connections")]
pub struct Connections {
    #[xml(
        child = "VariableConnection",
        child = "VariableGroupConnection",
        child = "SignalConnection",
        child = "SignalGroupConnection"
    )]
    pub connections: Vec<Connection>,
}

/// Connection kinds defined by the OSP schema. Only variable and variable-group connections are
/// produced by the compiler; the signal kinds are parsed so that they can be rejected on import.
#[derive(Clone, Debug, PartialEq, XmlRead, XmlWrite)]
pub enum Connection {
    #[xml(tag = "VariableConnection")]
    Variable(VariableConnection),
    #[xml(tag = "VariableGroupConnection")]
    VariableGroup(VariableGroupConnection),
    #[xml(tag = "SignalConnection")]
    Signal(SignalConnection),
    #[xml(tag = "SignalGroupConnection")]
    SignalGroup(SignalGroupConnection),
}

impl Connection {
    /// The element name of this connection kind
    pub fn tag(&self) -> &'static str {
        match self {
            Connection::Variable(_) => "VariableConnection",
            Connection::VariableGroup(_) => "VariableGroupConnection",
            Connection::Signal(_) => "SignalConnection",
            Connection::SignalGroup(_) => "SignalGroupConnection",
        }
    }
}

/// Source first, then target.
#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "VariableConnection")]
pub struct VariableConnection {
    #[xml(child = "Variable")]
    pub variables: Vec<VariableEndpoint>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Variable")]
pub struct VariableEndpoint {
    #[xml(attr = "simulator")]
    pub simulator: String,
    #[xml(attr = "name")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "VariableGroupConnection")]
pub struct VariableGroupConnection {
    #[xml(child = "VariableGroup")]
    pub variable_groups: Vec<VariableGroupEndpoint>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "VariableGroup")]
pub struct VariableGroupEndpoint {
    #[xml(attr = "simulator")]
    pub simulator: String,
    #[xml(attr = "name")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "SignalConnection")]
pub struct SignalConnection {
    #[xml(child = "Variable")]
    pub variables: Vec<VariableEndpoint>,
    #[xml(child = "Signal")]
    pub signals: Vec<SignalEndpoint>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Signal")]
pub struct SignalEndpoint {
    #[xml(attr = "function")]
    pub function: String,
    #[xml(attr = "name")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "SignalGroupConnection")]
pub struct SignalGroupConnection {
    #[xml(child = "VariableGroup")]
    pub variable_groups: Vec<VariableGroupEndpoint>,
    #[xml(child = "SignalGroup")]
    pub signal_groups: Vec<SignalGroupEndpoint>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "SignalGroup")]
pub struct SignalGroupEndpoint {
    #[xml(attr = "function")]
    pub function: String,
    #[xml(attr = "name")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_value() {
        let xml = r#"<InitialValue variable="x"><Real value="1.5"/></InitialValue>"#;
        let iv = InitialValue::from_str(xml).unwrap();
        assert_eq!(iv.variable, "x");
        assert_eq!(iv.value, TypedValue::Real(RealValue { value: 1.5 }));
    }

    #[test]
    fn test_connection_tags() {
        let xml = r#"<Connections>
            <VariableConnection>
                <Variable simulator="A" name="out"/>
                <Variable simulator="B" name="in"/>
            </VariableConnection>
            <SignalConnection>
                <Variable simulator="A" name="out"/>
                <Signal function="sum" name="in1"/>
            </SignalConnection>
        </Connections>"#;
        let connections = Connections::from_str(xml).unwrap();
        let tags: Vec<_> = connections.connections.iter().map(Connection::tag).collect();
        assert_eq!(tags, ["VariableConnection", "SignalConnection"]);
    }
}
