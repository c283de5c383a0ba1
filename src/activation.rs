use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KernelError;

/// Closed catalogue of nonlinearities a cell can apply at each point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Identity,
    Sigmoid,
    Tanh,
    Relu,
}

impl Activation {
    pub const ALL: [Activation; 4] = [
        Activation::Identity,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Relu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Relu => "relu",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = KernelError;

    /// The empty string selects identity, matching layer configs that leave
    /// the activation unset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "identity" => Ok(Activation::Identity),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::Relu),
            other => Err(KernelError::UnknownActivation(other.to_string())),
        }
    }
}

/// The three selectors a cell step consumes.
///
/// - `node`: applied to the raw cell input
/// - `gate`: applied to the input, forget and output gates
/// - `state`: applied to the cell state to produce the activated state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellActivations {
    pub node: Activation,
    pub gate: Activation,
    pub state: Activation,
}

impl CellActivations {
    pub fn new(node: Activation, gate: Activation, state: Activation) -> Self {
        CellActivations { node, gate, state }
    }

    /// All three selectors set to identity; the step becomes plain polynomial arithmetic.
    pub fn identity() -> Self {
        CellActivations::new(Activation::Identity, Activation::Identity, Activation::Identity)
    }

    /// Parse from three names, e.g. `("tanh", "sigmoid", "tanh")`.
    pub fn from_names(node: &str, gate: &str, state: &str) -> Result<Self, KernelError> {
        Ok(CellActivations::new(node.parse()?, gate.parse()?, state.parse()?))
    }
}

impl Default for CellActivations {
    fn default() -> Self {
        CellActivations::new(Activation::Tanh, Activation::Sigmoid, Activation::Tanh)
    }
}
