//! Serde records for the objects embedded in `StatusSave`.
//!
//! Unmodelled keys land in a flattened `extra` map and are written back as
//! they were read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::position::Position;
use crate::Properties;

/// One entry of `StatusSave.Elements`.
///
/// Circuit and electromagnetism saves name the model under `ModelID`,
/// celestial saves under `Model`. Both are optional here so either kind
/// round-trips through the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredElement {
    #[serde(rename = "ModelID", default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(rename = "Model", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "Identifier", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(rename = "Position")]
    pub position: Position,
    #[serde(rename = "Rotation", default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Position>,
    #[serde(rename = "Properties", default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredElement {
    /// Keys the named fields above map to.
    pub const FIELDS: [&'static str; 6] = [
        "ModelID",
        "Model",
        "Identifier",
        "Position",
        "Rotation",
        "Properties",
    ];
}

/// One entry of `StatusSave.Wires`; circuit saves only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StoredWire {
    pub source: String,
    pub source_pin: u8,
    pub target: String,
    pub target_pin: u8,
    #[serde(default)]
    pub color_name: String,
}
