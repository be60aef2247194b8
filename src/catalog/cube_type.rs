use serde::{Deserialize, Serialize};

/// Scalar types the metadata endpoint declares on measures and dimensions.
///
/// The backend is free to grow new type names; anything unrecognized parses
/// to [`CubeType::Unknown`] so discovery keeps working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeType {
    String,
    Number,
    Boolean,
    Time,
    Geo,
    Unknown,
}

impl From<&str> for CubeType {
    fn from(s: &str) -> Self {
        match s {
            "string" => CubeType::String,
            "number" => CubeType::Number,
            "boolean" => CubeType::Boolean,
            "time" => CubeType::Time,
            "geo" => CubeType::Geo,
            _ => CubeType::Unknown,
        }
    }
}

/// Semantic base types exposed to the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Text,
    Number,
    Boolean,
    DateTime,
    Unknown,
}

impl CubeType {
    pub fn base_type(self) -> BaseType {
        match self {
            CubeType::String => BaseType::Text,
            CubeType::Number => BaseType::Number,
            CubeType::Boolean => BaseType::Boolean,
            CubeType::Time => BaseType::DateTime,
            CubeType::Geo | CubeType::Unknown => BaseType::Unknown,
        }
    }

    /// The canonical `time` type doubles as the creation-time marker.
    pub fn is_creation_time(self) -> bool {
        matches!(self, CubeType::Time)
    }
}
