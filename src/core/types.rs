use serde::{Deserialize, Serialize};

/// A point in a template space, in millimetres.
pub type Point = [f64; 3];

/// Ordered transform identifiers, first edge nearest the source space.
pub type TransformChain = Vec<String>;

/// Template spaces served by current deployments.
pub const KNOWN_SPACES: [&str; 4] = [
    "MNI 152 ICBM 2009c Nonlinear Asymmetric",
    "MNI Colin 27",
    "Big Brain (Histology)",
    "Infant Atlas",
];

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    ValidationError,
    UnknownSpace,
    NotReachable,
    GraphError,
    ToolExecutionError,
    TimeoutError,
    ParseError,
    ConfigError,
    IoError,
    InternalError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Coordinate convention of mesh vertices handed to the external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputCoords {
    #[default]
    Auto,
    Lpi,
    Ras,
}

impl InputCoords {
    pub fn as_str(self) -> &'static str {
        match self {
            InputCoords::Auto => "auto",
            InputCoords::Lpi => "lpi",
            InputCoords::Ras => "ras",
        }
    }
}

impl std::fmt::Display for InputCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InputCoords {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "auto" => Ok(InputCoords::Auto),
            "lpi" => Ok(InputCoords::Lpi),
            "ras" => Ok(InputCoords::Ras),
            other => Err(format!(
                "invalid input_coords '{}'; supported values are auto, lpi, ras",
                other
            )),
        }
    }
}
