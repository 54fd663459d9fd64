use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::dict::{as_f64, Dict};

/// Co-simulation master algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    #[default]
    FixedStep,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixedStep" => Ok(Algorithm::FixedStep),
            _ => Err(format!("Invalid algorithm: {}", s)),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::FixedStep => write!(f, "fixedStep"),
        }
    }
}

/// Simulation settings from `run.simulation`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Simulation {
    pub name: Option<String>,
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
    pub base_step_size: Option<f64>,
    pub algorithm: Option<Algorithm>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulationSpec {
    name: Option<serde_json::Value>,
    start_time: Option<serde_json::Value>,
    stop_time: Option<serde_json::Value>,
    base_step_size: Option<serde_json::Value>,
    algorithm: Option<String>,
}

impl Simulation {
    /// Read `run.simulation` from a case dictionary. Returns `None` if the section is absent.
    pub fn from_dict(case_dict: &Dict) -> Option<Self> {
        let section = crate::dict::lookup(case_dict, "run.simulation")?;
        let spec: SimulationSpec = match serde_json::from_value(section.clone()) {
            Ok(spec) => spec,
            Err(err) => {
                log::error!("Ignoring malformed run.simulation: {err}");
                return None;
            }
        };

        let number = |key: &str, value: &Option<serde_json::Value>| {
            let value = value.as_ref()?;
            let number = as_f64(value);
            if number.is_none() {
                log::warn!("run.simulation.{key}: {value} is not a number");
            }
            number
        };
        let algorithm = spec.algorithm.as_deref().and_then(|a| match a.parse() {
            Ok(algorithm) => Some(algorithm),
            Err(err) => {
                log::warn!("run.simulation.algorithm: {err}");
                None
            }
        });

        Some(Self {
            name: spec.name.as_ref().and_then(crate::dict::as_text),
            start_time: number("startTime", &spec.start_time),
            stop_time: number("stopTime", &spec.stop_time),
            base_step_size: number("baseStepSize", &spec.base_step_size),
            algorithm,
        })
    }
}
