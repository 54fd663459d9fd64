//! A subset of the SSP `SystemStructureDescription` (`.ssd`) with the OSP algorithm annotation.
//!
//! Element names are written with their conventional namespace prefixes (`ssd:`, `ssc:`,
//! `osp:`), matching the `xmlns:*` declarations on the root element.

use hard_xml::{XmlRead, XmlWrite};

pub const SSD_NS: &str = "http://ssp-standard.org/SSP1/SystemStructureDescription";
pub const SSC_NS: &str = "http://ssp-standard.org/SSP1/SystemStructureCommon";
pub const SSV_NS: &str = "http://ssp-standard.org/SSP1/SystemStructureParameterValues";
pub const OSP_ANNOTATIONS_NS: &str = "http://opensimulationplatform.com/SSP/OSPAnnotations";
pub const OSP_ANNOTATION_TYPE: &str = "com.opensimulationplatform";
pub const SSD_VERSION: &str = "1.0";

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:SystemStructureDescription")]
pub struct SystemStructureDescription {
    #[xml(attr = "xmlns:ssd")]
    pub xmlns_ssd: Option<String>,
    #[xml(attr = "xmlns:ssc")]
    pub xmlns_ssc: Option<String>,
    #[xml(attr = "xmlns:ssv")]
    pub xmlns_ssv: Option<String>,
    #[xml(attr = "xmlns:osp")]
    pub xmlns_osp: Option<String>,
    #[xml(attr = "version")]
    pub version: String,
    #[xml(attr = "name")]
    pub name: String,

    #[xml(child = "ssd:System")]
    pub system: System,
    #[xml(child = "ssd:DefaultExperiment")]
    pub default_experiment: Option<DefaultExperiment>,
}

impl SystemStructureDescription {
    /// A description with all namespace declarations in place
    pub fn new(name: impl Into<String>, system: System) -> Self {
        Self {
            xmlns_ssd: Some(SSD_NS.to_owned()),
            xmlns_ssc: Some(SSC_NS.to_owned()),
            xmlns_ssv: Some(SSV_NS.to_owned()),
            xmlns_osp: Some(OSP_ANNOTATIONS_NS.to_owned()),
            version: SSD_VERSION.to_owned(),
            name: name.into(),
            system,
            default_experiment: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:System")]
pub struct System {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(attr = "description")]
    pub description: Option<String>,
    #[xml(child = "ssd:Elements")]
    pub elements: Elements,
    #[xml(child = "ssd:Connections")]
    pub connections: Option<Connections>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:Elements")]
pub struct Elements {
    #[xml(child = "ssd:Component")]
    pub components: Vec<Component>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:Component")]
pub struct Component {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(attr = "source")]
    pub source: String,
    #[xml(child = "ssd:Connectors")]
    pub connectors: Option<Connectors>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:Connectors")]
pub struct Connectors {
    #[xml(child = "ssd:Connector")]
    pub connectors: Vec<Connector>,
}

/// A connector named after the FMU variable it exposes
#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:Connector")]
pub struct Connector {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(attr = "kind")]
    pub kind: Option<String>,
    #[xml(child = "ssc:Real")]
    pub real: Option<RealType>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssc:Real")]
pub struct RealType {
    #[xml(attr = "unit")]
    pub unit: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:Connections")]
pub struct Connections {
    #[xml(child = "ssd:Connection")]
    pub connections: Vec<Connection>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:Connection")]
pub struct Connection {
    #[xml(attr = "startElement")]
    pub start_element: String,
    #[xml(attr = "startConnector")]
    pub start_connector: String,
    #[xml(attr = "endElement")]
    pub end_element: String,
    #[xml(attr = "endConnector")]
    pub end_connector: String,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:DefaultExperiment")]
pub struct DefaultExperiment {
    #[xml(attr = "startTime")]
    pub start_time: Option<String>,
    #[xml(attr = "stopTime")]
    pub stop_time: Option<String>,
    #[xml(child = "ssd:Annotations")]
    pub annotations: Option<Annotations>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssd:Annotations")]
pub struct Annotations {
    #[xml(child = "ssc:Annotation")]
    pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "ssc:Annotation")]
pub struct Annotation {
    #[xml(attr = "type")]
    pub r#type: String,
    #[xml(child = "osp:Algorithm")]
    pub algorithm: Option<Algorithm>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "osp:Algorithm")]
pub struct Algorithm {
    #[xml(child = "osp:FixedStepAlgorithm")]
    pub fixed_step: Option<FixedStepAlgorithm>,
}

#[derive(Clone, Debug, Default, PartialEq, XmlRead, XmlWrite)]
#[xml(tag = "osp:FixedStepAlgorithm")]
pub struct FixedStepAlgorithm {
    #[xml(attr = "baseStepSize")]
    pub base_step_size: Option<String>,
    #[xml(attr = "startTime")]
    pub start_time: Option<String>,
    #[xml(attr = "stopTime")]
    pub stop_time: Option<String>,
}
