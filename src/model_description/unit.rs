use crate::xml::XmlElement;

/// Exponents of the SI base units plus `rad`, with a linear conversion to the base unit:
/// `base_value = factor * unit_value + offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseUnit {
    pub kg: i32,
    pub m: i32,
    pub s: i32,
    pub a: i32,
    pub k: i32,
    pub mol: i32,
    pub cd: i32,
    pub rad: i32,
    pub factor: f64,
    pub offset: f64,
}

impl Default for BaseUnit {
    fn default() -> Self {
        Self {
            kg: 0,
            m: 0,
            s: 0,
            a: 0,
            k: 0,
            mol: 0,
            cd: 0,
            rad: 0,
            factor: 1.0,
            offset: 0.0,
        }
    }
}

impl BaseUnit {
    /// Exponents keyed by their attribute name, in schema order
    pub fn exponents(&self) -> [(&'static str, i32); 8] {
        [
            ("kg", self.kg),
            ("m", self.m),
            ("s", self.s),
            ("A", self.a),
            ("K", self.k),
            ("mol", self.mol),
            ("cd", self.cd),
            ("rad", self.rad),
        ]
    }

    pub fn from_element(element: &XmlElement) -> Self {
        let exponent = |key: &str| {
            element
                .attr(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0)
        };
        let real = |key: &str, default: f64| {
            element
                .attr(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        Self {
            kg: exponent("kg"),
            m: exponent("m"),
            s: exponent("s"),
            a: exponent("A"),
            k: exponent("K"),
            mol: exponent("mol"),
            cd: exponent("cd"),
            rad: exponent("rad"),
            factor: real("factor", 1.0),
            offset: real("offset", 0.0),
        }
    }
}

/// `display_value = factor * unit_value + offset`
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayUnit {
    pub name: String,
    pub factor: f64,
    pub offset: f64,
}

impl DisplayUnit {
    pub fn from_element(element: &XmlElement) -> Self {
        let real = |key: &str, default: f64| {
            element
                .attr(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        Self {
            name: element.attr("name").unwrap_or_default().to_owned(),
            factor: real("factor", 1.0),
            offset: real("offset", 0.0),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Unit {
    pub name: String,
    pub base_unit: Option<BaseUnit>,
    pub display_unit: Option<DisplayUnit>,
}

impl Unit {
    /// Read a `<Unit>` element of an FMI 2.0 `UnitDefinitions` block
    pub fn from_element(element: &XmlElement) -> Self {
        Self {
            name: element.attr("name").unwrap_or_default().to_owned(),
            base_unit: element.child("BaseUnit").map(BaseUnit::from_element),
            display_unit: element.child("DisplayUnit").map(DisplayUnit::from_element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_from_element() {
        let element = XmlElement::parse(
            r#"<Unit name="degC">
                <BaseUnit K="1" offset="273.15"/>
                <DisplayUnit name="degF" factor="1.8" offset="32"/>
            </Unit>"#,
        )
        .unwrap();
        let unit = Unit::from_element(&element);
        assert_eq!(unit.name, "degC");
        let base = unit.base_unit.unwrap();
        assert_eq!(base.k, 1);
        assert_eq!(base.kg, 0);
        assert_eq!(base.factor, 1.0);
        assert_eq!(base.offset, 273.15);
        let display = unit.display_unit.unwrap();
        assert_eq!(display.name, "degF");
        assert_eq!(display.factor, 1.8);
    }
}
