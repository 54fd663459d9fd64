//! Reading and editing the FMI 2.0 `modelDescription.xml` of an FMU.
//!
//! The document is kept as an ordered [`XmlElement`] tree, so that writing it back after an edit
//! changes nothing but the edited attributes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::{
    archive::{self, MODEL_DESCRIPTION},
    xml::XmlElement,
    Error, Result,
};

mod unit;
mod variable;

pub use unit::{BaseUnit, DisplayUnit, Unit};
pub use variable::{Causality, DataType, ScalarVariable, StartValue, Variability};

/// Variable name prefixes reserved for tool-internal variables
const EXCLUDED_PREFIXES: [&str; 2] = ["_", "settings"];

const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The `DefaultExperiment` element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Experiment {
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
    pub tolerance: Option<f64>,
    pub step_size: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelDescription {
    pub root: XmlElement,
}

impl std::str::FromStr for ModelDescription {
    type Err = Error;

    fn from_str(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        if root.name != "fmiModelDescription" {
            return Err(Error::ModelDescription(format!(
                "unexpected root element <{}>",
                root.name
            )));
        }
        Ok(Self { root })
    }
}

impl ModelDescription {
    /// Read `modelDescription.xml` out of an FMU archive
    pub fn from_fmu(fmu: &Path) -> Result<Self> {
        let xml = archive::read_entry(fmu, MODEL_DESCRIPTION)?.ok_or_else(|| {
            Error::ModelDescription(format!("{} has no {MODEL_DESCRIPTION}", fmu.display()))
        })?;
        xml.parse()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.root.attr("modelName")
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.root.attr(key)
    }

    /// Set `modelName` and the `modelIdentifier` of every interface type.
    pub fn set_model_name(&mut self, name: &str) {
        self.root.set_attr("modelName", name);
        for interface in ["CoSimulation", "ModelExchange"] {
            if let Some(element) = self.root.child_mut(interface) {
                element.set_attr("modelIdentifier", name);
            }
        }
    }

    /// `modelIdentifier` of the co-simulation interface
    pub fn model_identifier(&self) -> Option<&str> {
        self.root
            .child("CoSimulation")
            .and_then(|cs| cs.attr("modelIdentifier"))
    }

    /// Unit definitions keyed by name. Of several units with the same name, the first is kept.
    pub fn units(&self) -> IndexMap<String, Unit> {
        let mut units = IndexMap::new();
        let Some(definitions) = self.root.child("UnitDefinitions") else {
            return units;
        };
        for element in definitions.children_named("Unit") {
            let unit = Unit::from_element(element);
            if units.contains_key(&unit.name) {
                log::debug!("Ignoring duplicate unit definition {}", unit.name);
                continue;
            }
            units.insert(unit.name.clone(), unit);
        }
        units
    }

    /// Scalar variables keyed by name, excluding tool-internal variables (names starting with `_`
    /// or `settings`).
    pub fn variables(&self) -> IndexMap<String, ScalarVariable> {
        self.scalar_variable_elements()
            .filter_map(|element| {
                let variable = variable_from_element(element)?;
                Some((variable.name.clone(), variable))
            })
            .collect()
    }

    pub fn default_experiment(&self) -> Option<Experiment> {
        let element = self.root.child("DefaultExperiment")?;
        let real = |key: &str| element.attr(key).and_then(|v| v.trim().parse().ok());
        Some(Experiment {
            start_time: real("startTime"),
            stop_time: real("stopTime"),
            tolerance: real("tolerance"),
            step_size: real("stepSize"),
        })
    }

    fn scalar_variable_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.root
            .child("ModelVariables")
            .into_iter()
            .flat_map(|mv| mv.children_named("ScalarVariable"))
    }

    /// Write start values, causality and variability of `overrides` into the matching
    /// `ScalarVariable` elements. Returns one line per change.
    pub fn update_start_values(
        &mut self,
        overrides: &IndexMap<String, ScalarVariable>,
    ) -> Vec<String> {
        let mut changes = Vec::new();
        let Some(model_variables) = self.root.child_mut("ModelVariables") else {
            log::warn!("Model description has no ModelVariables, no start values updated");
            return changes;
        };

        for (name, update) in overrides {
            let Some(element) = model_variables
                .elements_mut()
                .find(|e| e.name == "ScalarVariable" && e.attr("name") == Some(name.as_str()))
            else {
                log::warn!("Variable {name} not found in model description, not updated");
                continue;
            };

            if let Some(start) = &update.start {
                let type_element = element.elements_mut().find(|child| match update.data_type {
                    Some(data_type) => child.name == data_type.to_string(),
                    None => child.name.parse::<DataType>().is_ok(),
                });
                match type_element {
                    Some(type_element) => {
                        let old = type_element.attr("start").unwrap_or("None").to_owned();
                        type_element.set_attr("start", start.to_string());
                        changes.push(format!("{name}.start: {old} -> {start}"));
                    }
                    None => log::warn!("Variable {name} has no matching type element for start"),
                }
            }
            if let Some(causality) = update.causality {
                let old = element.attr("causality").unwrap_or("None").to_owned();
                element.set_attr("causality", causality.to_string());
                changes.push(format!("{name}.causality: {old} -> {causality}"));
            }
            if let Some(variability) = update.variability {
                let old = element.attr("variability").unwrap_or("None").to_owned();
                element.set_attr("variability", variability.to_string());
                changes.push(format!("{name}.variability: {old} -> {variability}"));
            }
        }

        for change in &changes {
            log::info!("Updated {change}");
        }
        changes
    }

    /// Record an edit: `author` becomes the current user, `generationDateAndTime` becomes `now`
    /// and `summary` is appended to `description`.
    pub fn log_update(&mut self, summary: &str, now: DateTime<Utc>) {
        if let Some(author) = current_user() {
            self.root.set_attr("author", author);
        }
        self.root.set_attr(
            "generationDateAndTime",
            now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        );
        let description = match self.root.attr("description") {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{summary}"),
            _ => summary.to_owned(),
        };
        self.root.set_attr("description", description);
    }

    /// Serialize, making sure the `xsi` namespace is declared on the root element.
    pub fn to_xml(&self) -> Result<String> {
        let mut root = self.root.clone();
        if root.attr("xmlns:xsi").is_none() {
            root.attributes.insert(0, ("xmlns:xsi".to_owned(), XSI_NS.to_owned()));
        }
        root.to_xml_string()
    }

    /// Replace `modelDescription.xml` inside `fmu` and write a copy next to it as
    /// `<stem>_ModelDescription.xml`. Returns the path of that copy.
    pub fn write_to_fmu(&self, fmu: &Path) -> Result<PathBuf> {
        let xml = self.to_xml()?;
        archive::remove_entries(fmu, &[MODEL_DESCRIPTION])
            .and_then(|fmu| archive::add_entry(&fmu, MODEL_DESCRIPTION, &xml))
            .ok_or_else(|| {
                Error::Archive(format!("could not update {MODEL_DESCRIPTION} in {}", fmu.display()))
            })?;

        let stem = fmu
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sibling = fmu.with_file_name(format!("{stem}_ModelDescription.xml"));
        std::fs::write(&sibling, xml)?;
        Ok(sibling)
    }
}

fn current_user() -> Option<String> {
    let key = if cfg!(windows) { "USERNAME" } else { "USER" };
    std::env::var(key).ok().filter(|user| !user.is_empty())
}

fn variable_from_element(element: &XmlElement) -> Option<ScalarVariable> {
    let name = element.attr("name")?;
    if EXCLUDED_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return None;
    }

    let mut variable = ScalarVariable::new(name);
    if let Some(causality) = element.attr("causality") {
        variable.set_causality_str(causality);
    }
    if let Some(variability) = element.attr("variability") {
        variable.set_variability_str(variability);
    }
    variable.value_reference = element
        .attr("valueReference")
        .and_then(|v| v.trim().parse().ok());
    variable.description = element.attr("description").map(str::to_owned);

    let typed = element
        .elements()
        .find_map(|child| Some((child.name.parse::<DataType>().ok()?, child)));
    if let Some((data_type, child)) = typed {
        variable.data_type = Some(data_type);
        variable.quantity = child.attr("quantity").map(str::to_owned);
        variable.unit = child.attr("unit").map(str::to_owned);
        variable.display_unit = child.attr("displayUnit").map(str::to_owned);
        variable.start = child
            .attr("start")
            .and_then(|start| StartValue::parse(start, data_type));
    }
    Some(variable)
}
