use std::{fmt::Display, str::FromStr};

use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Real,
    Integer,
    Boolean,
    String,
    Enumeration,
}

impl DataType {
    pub const ALL: [DataType; 5] = [
        DataType::Real,
        DataType::Integer,
        DataType::Boolean,
        DataType::String,
        DataType::Enumeration,
    ];
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Real" => Ok(DataType::Real),
            "Integer" => Ok(DataType::Integer),
            "Boolean" => Ok(DataType::Boolean),
            "String" => Ok(DataType::String),
            "Enumeration" => Ok(DataType::Enumeration),
            _ => Err(format!("Invalid data type: {}", s)),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataType::Real => "Real",
            DataType::Integer => "Integer",
            DataType::Boolean => "Boolean",
            DataType::String => "String",
            DataType::Enumeration => "Enumeration",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Causality {
    Parameter,
    CalculatedParameter,
    Input,
    Output,
    #[default]
    Local,
    Independent,
    StructuralParameter,
}

impl FromStr for Causality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parameter" => Ok(Causality::Parameter),
            "calculatedParameter" => Ok(Causality::CalculatedParameter),
            "input" => Ok(Causality::Input),
            "output" => Ok(Causality::Output),
            "local" => Ok(Causality::Local),
            "independent" => Ok(Causality::Independent),
            "structuralParameter" => Ok(Causality::StructuralParameter),
            _ => Err(format!("Invalid causality: {}", s)),
        }
    }
}

impl Display for Causality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Causality::Parameter => "parameter",
            Causality::CalculatedParameter => "calculatedParameter",
            Causality::Input => "input",
            Causality::Output => "output",
            Causality::Local => "local",
            Causality::Independent => "independent",
            Causality::StructuralParameter => "structuralParameter",
        };
        write!(f, "{}", s)
    }
}

/// Time dependency of a variable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variability {
    Constant,
    Fixed,
    Tunable,
    Discrete,
    Continuous,
}

impl FromStr for Variability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Variability::Constant),
            "fixed" => Ok(Variability::Fixed),
            "tunable" => Ok(Variability::Tunable),
            "discrete" => Ok(Variability::Discrete),
            "continuous" => Ok(Variability::Continuous),
            _ => Err(format!("Invalid variability: {}", s)),
        }
    }
}

impl Display for Variability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Variability::Constant => "constant",
            Variability::Fixed => "fixed",
            Variability::Tunable => "tunable",
            Variability::Discrete => "discrete",
            Variability::Continuous => "continuous",
        };
        write!(f, "{}", s)
    }
}

/// A scalar start value
#[derive(Clone, Debug, PartialEq)]
pub enum StartValue {
    Real(f64),
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl StartValue {
    /// The data type implied by the runtime type of the value
    pub fn data_type(&self) -> DataType {
        match self {
            StartValue::Real(_) => DataType::Real,
            StartValue::Integer(_) => DataType::Integer,
            StartValue::Boolean(_) => DataType::Boolean,
            StartValue::String(_) => DataType::String,
        }
    }

    /// Parse an attribute value as the given data type. Enumeration values are integers.
    pub fn parse(text: &str, data_type: DataType) -> Option<Self> {
        let text = text.trim();
        match data_type {
            DataType::Real => text.parse().ok().map(StartValue::Real),
            DataType::Integer | DataType::Enumeration => {
                text.parse().ok().map(StartValue::Integer)
            }
            DataType::Boolean => match text {
                "true" | "True" | "1" => Some(StartValue::Boolean(true)),
                "false" | "False" | "0" => Some(StartValue::Boolean(false)),
                _ => None,
            },
            DataType::String => Some(StartValue::String(text.to_owned())),
        }
    }

    /// Convert a dictionary value. Integral numbers become `Integer`, other numbers `Real`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(StartValue::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(StartValue::Integer(i)),
                None => n.as_f64().map(StartValue::Real),
            },
            Value::String(s) => Some(StartValue::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            StartValue::Real(r) => Value::from(*r),
            StartValue::Integer(i) => Value::from(*i),
            StartValue::Boolean(b) => Value::from(*b),
            StartValue::String(s) => Value::from(s.as_str()),
        }
    }

    /// Coerce the value towards `data_type` where the conversion is lossless: integers widen to
    /// reals, integer 0/1 become booleans and quoted numbers are parsed. Other combinations are
    /// returned unchanged.
    pub fn coerce(self, data_type: DataType) -> Self {
        match (self, data_type) {
            (StartValue::Integer(i), DataType::Real) => StartValue::Real(i as f64),
            (StartValue::Integer(0), DataType::Boolean) => StartValue::Boolean(false),
            (StartValue::Integer(1), DataType::Boolean) => StartValue::Boolean(true),
            (StartValue::String(s), data_type) if data_type != DataType::String => {
                StartValue::parse(&s, data_type).unwrap_or(StartValue::String(s))
            }
            (value, _) => value,
        }
    }
}

impl Display for StartValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartValue::Real(r) => write!(f, "{}", r),
            StartValue::Integer(i) => write!(f, "{}", i),
            StartValue::Boolean(b) => write!(f, "{}", b),
            StartValue::String(s) => write!(f, "{}", s),
        }
    }
}

/// An FMI 2.0 scalar variable. For parameter overrides only the overridden fields are set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScalarVariable {
    pub name: String,
    pub data_type: Option<DataType>,
    pub causality: Option<Causality>,
    pub variability: Option<Variability>,
    pub start: Option<StartValue>,
    pub value_reference: Option<u32>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub display_unit: Option<String>,
}

impl ScalarVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the start value. When no data type is set yet, it is inferred from the value.
    pub fn set_start(&mut self, start: StartValue) {
        if self.data_type.is_none() {
            self.data_type = Some(start.data_type());
        }
        self.start = Some(start);
    }

    /// Set the causality from its attribute spelling. Invalid values are rejected with a warning
    /// and the previous causality is kept.
    pub fn set_causality_str(&mut self, causality: &str) {
        match causality.parse() {
            Ok(causality) => self.causality = Some(causality),
            Err(err) => log::warn!("{}: {err}. Keeping {:?}", self.name, self.causality),
        }
    }

    pub fn set_variability_str(&mut self, variability: &str) {
        match variability.parse() {
            Ok(variability) => self.variability = Some(variability),
            Err(err) => log::warn!("{}: {err}. Keeping {:?}", self.name, self.variability),
        }
    }

    pub fn set_data_type_str(&mut self, data_type: &str) {
        match data_type.parse() {
            Ok(data_type) => self.data_type = Some(data_type),
            Err(err) => log::warn!("{}: {err}. Keeping {:?}", self.name, self.data_type),
        }
    }

    /// Causality, with the FMI default
    pub fn causality_or_default(&self) -> Causality {
        self.causality.unwrap_or_default()
    }

    /// Copy every field that is set on `other` onto `self`.
    pub fn overlay(&mut self, other: &ScalarVariable) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(
            data_type,
            causality,
            variability,
            start,
            value_reference,
            description,
            quantity,
            unit,
            display_unit
        );
    }
}
