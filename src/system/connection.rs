use crate::model_description::{Causality, ScalarVariable};

use super::connector::{Connector, ConnectorType};

/// What an endpoint refers to inside its component
#[derive(Clone, Debug, PartialEq)]
pub enum EndpointTarget {
    Connector(Connector),
    Variable(ScalarVariable),
}

/// One end of a connection: a component plus either a connector or a variable of it.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub component: String,
    pub target: EndpointTarget,
}

impl Endpoint {
    pub fn connector(component: impl Into<String>, connector: Connector) -> Self {
        Self {
            component: component.into(),
            target: EndpointTarget::Connector(connector),
        }
    }

    pub fn variable(component: impl Into<String>, variable: ScalarVariable) -> Self {
        Self {
            component: component.into(),
            target: EndpointTarget::Variable(variable),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.component.is_empty()
    }

    /// Name of the variable or variable group this endpoint resolves to
    pub fn variable_name(&self) -> &str {
        match &self.target {
            EndpointTarget::Connector(connector) => connector.variable_name(),
            EndpointTarget::Variable(variable) => &variable.name,
        }
    }

    fn shape(&self) -> Shape {
        match &self.target {
            EndpointTarget::Variable(variable) => {
                Shape::Single(direction_of_causality(variable.causality))
            }
            EndpointTarget::Connector(connector) if connector.is_single_connector() => {
                Shape::Single(connector.connector_type)
            }
            EndpointTarget::Connector(connector) if connector.is_group_connector() => {
                Shape::Group(connector.connector_type)
            }
            EndpointTarget::Connector(_) => Shape::Unbound,
        }
    }
}

fn direction_of_causality(causality: Option<Causality>) -> Option<ConnectorType> {
    match causality {
        Some(Causality::Output) => Some(ConnectorType::Output),
        Some(Causality::Input) => Some(ConnectorType::Input),
        _ => None,
    }
}

enum Shape {
    Single(Option<ConnectorType>),
    Group(Option<ConnectorType>),
    Unbound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionKind {
    Variable,
    VariableGroup,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub name: String,
    pub source: Endpoint,
    pub target: Endpoint,
}

impl Connection {
    pub fn new(name: impl Into<String>, source: Endpoint, target: Endpoint) -> Self {
        Self {
            name: name.into(),
            source,
            target,
        }
    }

    /// Both endpoints resolve to scalar variables, directly or through single connectors.
    pub fn is_variable_connection(&self) -> bool {
        matches!(
            (self.source.shape(), self.target.shape()),
            (Shape::Single(_), Shape::Single(_))
        )
    }

    /// Both endpoints are variable group connectors.
    pub fn is_variable_group_connection(&self) -> bool {
        matches!(
            (self.source.shape(), self.target.shape()),
            (Shape::Group(_), Shape::Group(_))
        )
    }

    /// Classify the connection. Mixed shapes, unbound connectors and, where both directions are
    /// known, anything other than output to input are rejected.
    pub fn validate(&self) -> Result<ConnectionKind, String> {
        if !self.source.is_valid() || !self.target.is_valid() {
            return Err(format!("connection {} has an endpoint without component", self.name));
        }
        let (kind, source, target) = match (self.source.shape(), self.target.shape()) {
            (Shape::Single(source), Shape::Single(target)) => {
                (ConnectionKind::Variable, source, target)
            }
            (Shape::Group(source), Shape::Group(target)) => {
                (ConnectionKind::VariableGroup, source, target)
            }
            (Shape::Unbound, _) | (_, Shape::Unbound) => {
                return Err(format!(
                    "connection {} uses a connector without variable or variable group",
                    self.name
                ))
            }
            _ => {
                return Err(format!(
                    "connection {} mixes a variable with a variable group",
                    self.name
                ))
            }
        };
        if let (Some(source), Some(target)) = (source, target) {
            if source != ConnectorType::Output || target != ConnectorType::Input {
                return Err(format!(
                    "connection {} runs from {source} to {target}, expected output to input",
                    self.name
                ));
            }
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, causality: Causality) -> ScalarVariable {
        let mut variable = ScalarVariable::new(name);
        variable.causality = Some(causality);
        variable
    }

    fn connector(name: &str, group: bool, connector_type: Option<ConnectorType>) -> Connector {
        let mut connector = Connector::new(name);
        if group {
            connector.set_variable_group(name);
        } else {
            connector.set_variable(name);
        }
        connector.connector_type = connector_type;
        connector
    }

    #[test]
    fn test_variable_connection() {
        let connection = Connection::new(
            "c",
            Endpoint::variable("A", variable("y", Causality::Output)),
            Endpoint::variable("B", variable("u", Causality::Input)),
        );
        assert!(connection.is_variable_connection());
        assert_eq!(connection.validate(), Ok(ConnectionKind::Variable));
        assert_eq!(connection.source.variable_name(), "y");
    }

    #[test]
    fn test_direction_mismatch() {
        let connection = Connection::new(
            "c",
            Endpoint::variable("A", variable("u", Causality::Input)),
            Endpoint::variable("B", variable("y", Causality::Output)),
        );
        assert!(connection.validate().is_err());

        // Unknown direction on one side is not checked
        let connection = Connection::new(
            "c",
            Endpoint::variable("A", variable("p", Causality::Parameter)),
            Endpoint::connector("B", connector("u", false, None)),
        );
        assert_eq!(connection.validate(), Ok(ConnectionKind::Variable));
    }

    #[test]
    fn test_group_connection() {
        let connection = Connection::new(
            "g",
            Endpoint::connector("A", connector("force", true, Some(ConnectorType::Output))),
            Endpoint::connector("B", connector("force", true, Some(ConnectorType::Input))),
        );
        assert!(connection.is_variable_group_connection());
        assert!(!connection.is_variable_connection());
        assert_eq!(connection.validate(), Ok(ConnectionKind::VariableGroup));
    }

    #[test]
    fn test_mixed_shapes_rejected() {
        let connection = Connection::new(
            "m",
            Endpoint::connector("A", connector("force", true, None)),
            Endpoint::variable("B", variable("u", Causality::Input)),
        );
        assert!(!connection.is_variable_connection());
        assert!(!connection.is_variable_group_connection());
        assert!(connection.validate().is_err());
    }
}
