//! `<component>_OspModelDescription.xml`

use std::path::{Path, PathBuf};

use osp_schema::model_description as schema;

use crate::{
    model_description::{BaseUnit, DisplayUnit, Unit},
    system::{Component, UNKNOWN},
    Result,
};

/// Unit definitions and one generic variable group per variable of `component`.
pub fn osp_model_description(component: &Component) -> schema::OspModelDescription {
    let mut description = schema::OspModelDescription::new();

    description.unit_definitions.units = component.units.values().map(unit).collect();

    description.variable_groups.groups = component
        .variables
        .values()
        .map(|variable| {
            let quantity = variable.quantity.clone().unwrap_or_else(|| {
                log::warn!(
                    "{}: variable {} has no quantity, group named {UNKNOWN}",
                    component.name,
                    variable.name
                );
                UNKNOWN.to_owned()
            });
            let unit = variable.unit.clone().unwrap_or_else(|| {
                log::warn!("{}: variable {} has no unit", component.name, variable.name);
                UNKNOWN.to_owned()
            });
            schema::GenericGroup {
                name: quantity,
                variables: vec![schema::GroupVariable {
                    reference: variable.name.clone(),
                    unit: Some(unit),
                }],
            }
        })
        .collect();

    description
}

fn unit(unit: &Unit) -> schema::Unit {
    schema::Unit {
        name: unit.name.clone(),
        base_unit: unit.base_unit.as_ref().map(base_unit),
        display_unit: unit.display_unit.as_ref().map(display_unit),
    }
}

/// Only non-zero exponents and non-default factor/offset are written.
fn base_unit(base_unit: &BaseUnit) -> schema::BaseUnit {
    let [kg, m, s, a, k, mol, cd, rad] = base_unit
        .exponents()
        .map(|(_, exponent)| (exponent != 0).then_some(exponent));
    schema::BaseUnit {
        kg,
        m,
        s,
        a,
        k,
        mol,
        cd,
        rad,
        factor: (base_unit.factor != 1.0).then_some(base_unit.factor),
        offset: (base_unit.offset != 0.0).then_some(base_unit.offset),
    }
}

fn display_unit(display_unit: &DisplayUnit) -> schema::DisplayUnit {
    schema::DisplayUnit {
        name: display_unit.name.clone(),
        factor: (display_unit.factor != 1.0).then_some(display_unit.factor),
        offset: (display_unit.offset != 0.0).then_some(display_unit.offset),
    }
}

/// Write `<component>_OspModelDescription.xml` into `folder`.
pub fn write(folder: &Path, component: &Component) -> Result<PathBuf> {
    let path = folder.join(format!("{}_OspModelDescription.xml", component.name));
    let xml = osp_schema::serialize(&osp_model_description(component), true)?;
    std::fs::write(&path, xml)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
