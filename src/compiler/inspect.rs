//! Tabular report of a set-up case, logged instead of writing outputs.

use comfy_table::{presets::UTF8_FULL, Table};

use crate::system::{Component, System};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn components_table(system: &System) -> Table {
    let mut table = table(&["Component", "FMU", "Step size", "Remote access"]);
    for component in system.components.values() {
        table.add_row(vec![
            component.name.clone(),
            component.fmu.file_name(),
            text(component.step_size),
            text(
                component
                    .remote_access
                    .as_ref()
                    .map(|r| format!("{}:{}", r.host, r.port)),
            ),
        ]);
    }
    table
}

pub fn fmu_table(component: &Component) -> Table {
    let description = &component.fmu.model_description;
    let mut table = table(&["Attribute", "Value"]);
    for key in [
        "modelName",
        "fmiVersion",
        "guid",
        "author",
        "generationTool",
        "generationDateAndTime",
        "description",
    ] {
        if let Some(value) = description.attribute(key) {
            table.add_row(vec![key, value]);
        }
    }
    if let Some(experiment) = component.fmu.default_experiment() {
        for (key, value) in [
            ("startTime", experiment.start_time),
            ("stopTime", experiment.stop_time),
            ("tolerance", experiment.tolerance),
            ("stepSize", experiment.step_size),
        ] {
            if let Some(value) = value {
                table.add_row(vec![format!("DefaultExperiment.{key}"), value.to_string()]);
            }
        }
    }
    table
}

pub fn units_table(component: &Component) -> Table {
    let mut table = table(&["Unit", "Base unit", "Display unit"]);
    for unit in component.units.values() {
        let base_unit = unit.base_unit.as_ref().map(|base| {
            let mut parts: Vec<String> = base
                .exponents()
                .iter()
                .filter(|(_, exponent)| *exponent != 0)
                .map(|(key, exponent)| format!("{key}={exponent}"))
                .collect();
            if base.factor != 1.0 {
                parts.push(format!("factor={}", base.factor));
            }
            if base.offset != 0.0 {
                parts.push(format!("offset={}", base.offset));
            }
            parts.join(" ")
        });
        let display_unit = unit.display_unit.as_ref().map(|d| d.name.clone());
        table.add_row(vec![unit.name.clone(), text(base_unit), text(display_unit)]);
    }
    table
}

pub fn variables_table(component: &Component) -> Table {
    let mut table = table(&[
        "Variable",
        "Type",
        "Causality",
        "Variability",
        "Start",
        "Unit",
        "Quantity",
    ]);
    for variable in component.variables.values() {
        table.add_row(vec![
            variable.name.clone(),
            text(variable.data_type),
            text(variable.causality),
            text(variable.variability),
            text(variable.start.as_ref()),
            text(variable.unit.as_ref()),
            text(variable.quantity.as_ref()),
        ]);
    }
    table
}

pub fn connectors_table(component: &Component) -> Table {
    let mut table = table(&["Connector", "Variable", "Variable group", "Type"]);
    for connector in component.connectors.values() {
        table.add_row(vec![
            connector.name.clone(),
            text(connector.variable()),
            text(connector.variable_group()),
            text(connector.connector_type),
        ]);
    }
    table
}

/// Log the report for every component of `system`.
pub fn inspect(system: &System) {
    log::info!("Components\n{}", components_table(system));
    for component in system.components.values() {
        log::info!("{}: FMU attributes\n{}", component.name, fmu_table(component));
        if !component.units.is_empty() {
            log::info!("{}: unit definitions\n{}", component.name, units_table(component));
        }
        log::info!("{}: variables\n{}", component.name, variables_table(component));
        if !component.connectors.is_empty() {
            log::info!("{}: connectors\n{}", component.name, connectors_table(component));
        }
    }
}
