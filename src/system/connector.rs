use std::{fmt::Display, str::FromStr};

/// Sentinel returned by [`Connector::variable_name`] for an unbound connector
pub const UNKNOWN: &str = "UNKNOWN";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorType {
    Input,
    Output,
}

impl FromStr for ConnectorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(ConnectorType::Input),
            "output" => Ok(ConnectorType::Output),
            _ => Err(format!("Invalid connector type: {}", s)),
        }
    }
}

impl Display for ConnectorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorType::Input => write!(f, "input"),
            ConnectorType::Output => write!(f, "output"),
        }
    }
}

/// What a connector exposes: one scalar variable or one variable group
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectorBinding {
    Variable(String),
    VariableGroup(String),
}

/// A named port of a component
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub name: String,
    pub binding: Option<ConnectorBinding>,
    pub connector_type: Option<ConnectorType>,
}

impl Connector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: None,
            connector_type: None,
        }
    }

    /// Bind to a scalar variable, replacing a variable group binding.
    pub fn set_variable(&mut self, variable: impl Into<String>) {
        if let Some(ConnectorBinding::VariableGroup(group)) = &self.binding {
            log::warn!(
                "Connector {}: variable group {group} is replaced by a variable",
                self.name
            );
        }
        self.binding = Some(ConnectorBinding::Variable(variable.into()));
    }

    /// Bind to a variable group, replacing a scalar variable binding.
    pub fn set_variable_group(&mut self, group: impl Into<String>) {
        if let Some(ConnectorBinding::Variable(variable)) = &self.binding {
            log::warn!(
                "Connector {}: variable {variable} is replaced by a variable group",
                self.name
            );
        }
        self.binding = Some(ConnectorBinding::VariableGroup(group.into()));
    }

    pub fn variable(&self) -> Option<&str> {
        match &self.binding {
            Some(ConnectorBinding::Variable(variable)) => Some(variable),
            _ => None,
        }
    }

    pub fn variable_group(&self) -> Option<&str> {
        match &self.binding {
            Some(ConnectorBinding::VariableGroup(group)) => Some(group),
            _ => None,
        }
    }

    pub fn is_single_connector(&self) -> bool {
        matches!(self.binding, Some(ConnectorBinding::Variable(_)))
    }

    pub fn is_group_connector(&self) -> bool {
        matches!(self.binding, Some(ConnectorBinding::VariableGroup(_)))
    }

    /// The bound variable or variable group, or [`UNKNOWN`]
    pub fn variable_name(&self) -> &str {
        match &self.binding {
            Some(ConnectorBinding::Variable(name) | ConnectorBinding::VariableGroup(name)) => name,
            None => UNKNOWN,
        }
    }
}
