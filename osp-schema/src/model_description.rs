//! `<component>_OspModelDescription.xml`: unit definitions and variable groups of a single FMU.

use hard_xml::{XmlRead, XmlWrite};

pub const OSP_MODEL_DESCRIPTION_NS: &str =
    "https://opensimulationplatform.com/xsd/OspModelDescription-1.0.0.xsd";
pub const OSP_MODEL_DESCRIPTION_VERSION: &str = "1.0";

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ospModelDescription")]
pub struct OspModelDescription {
    #[xml(attr = "xmlns")]
    pub xmlns: Option<String>,
    #[xml(attr = "version")]
    pub version: Option<String>,
    #[xml(child = "UnitDefinitions")]
    pub unit_definitions: UnitDefinitions,
    #[xml(child = "VariableGroups")]
    pub variable_groups: VariableGroups,
}

impl OspModelDescription {
    pub fn new() -> Self {
        Self {
            xmlns: Some(OSP_MODEL_DESCRIPTION_NS.to_owned()),
            version: Some(OSP_MODEL_DESCRIPTION_VERSION.to_owned()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "UnitDefinitions")]
pub struct UnitDefinitions {
    #[xml(child = "Unit")]
    pub units: Vec<Unit>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Unit")]
pub struct Unit {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(child = "BaseUnit")]
    pub base_unit: Option<BaseUnit>,
    #[xml(child = "DisplayUnit")]
    pub display_unit: Option<DisplayUnit>,
}

/// SI base unit exponents. Absent exponents are zero; absent factor and offset are 1 and 0.
#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "BaseUnit")]
pub struct BaseUnit {
    #[xml(attr = "kg")]
    pub kg: Option<i32>,
    #[xml(attr = "m")]
    pub m: Option<i32>,
    #[xml(attr = "s")]
    pub s: Option<i32>,
    #[xml(attr = "A")]
    pub a: Option<i32>,
    #[xml(attr = "K")]
    pub k: Option<i32>,
    #[xml(attr = "mol")]
    pub mol: Option<i32>,
    #[xml(attr = "cd")]
    pub cd: Option<i32>,
    #[xml(attr = "rad")]
    pub rad: Option<i32>,
    #[xml(attr = "factor")]
    pub factor: Option<f64>,
    #[xml(attr = "offset")]
    pub offset: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "DisplayUnit")]
pub struct DisplayUnit {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(attr = "factor")]
    pub factor: Option<f64>,
    #[xml(attr = "offset")]
    pub offset: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "VariableGroups")]
pub struct VariableGroups {
    #[xml(child = "Generic")]
    pub groups: Vec<GenericGroup>,
}

/// A group of one variable. The group name carries the variable's physical quantity, or
/// `UNKNOWN` when the FMU does not declare one.
#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Generic")]
pub struct GenericGroup {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(child = "Variable")]
    pub variables: Vec<GroupVariable>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "Variable")]
pub struct GroupVariable {
    #[xml(attr = "ref")]
    pub reference: String,
    #[xml(attr = "unit")]
    pub unit: Option<String>,
}
