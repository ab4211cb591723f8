use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The model allow-list for a chat session.
///
/// The session cycles through these in order; there is no support for
/// arbitrary model strings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// GPT-4o.
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,

    /// GPT-4 Turbo.
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
}

impl Model {
    /// Every selectable model, in cycling order.
    pub const ALL: &'static [Model] = &[Model::Gpt4o, Model::Gpt4Turbo];

    /// Returns the next model in the allow-list, wrapping around.
    pub fn next(self) -> Model {
        let index = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Gpt4o => write!(f, "gpt-4o"),
            Model::Gpt4Turbo => write!(f, "gpt-4-turbo"),
        }
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gpt-4o" => Ok(Model::Gpt4o),
            "gpt-4-turbo" => Ok(Model::Gpt4Turbo),
            _ => Err(Error::validation(
                format!("unknown model {s:?} (expected one of: gpt-4o, gpt-4-turbo)"),
                Some("model".to_string()),
            )),
        }
    }
}
