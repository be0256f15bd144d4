use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SavError};
use crate::position::Position;
use crate::ExperimentType;

/// Decoded `CameraSave` document.
///
/// `vision_center` and `target_rotation` are in model `(x, y, z)` order; the
/// file stores them as native `"x,z,y"` strings. `mode` and `distance` stay
/// `None` when the file lacks them. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(rename = "Mode", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<i64>,
    #[serde(rename = "Distance", default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(rename = "VisionCenter")]
    pub vision_center: Position,
    #[serde(rename = "TargetRotation")]
    pub target_rotation: Position,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Camera {
    /// Framing the simulator uses for a fresh experiment of each type.
    pub fn default_for(experiment_type: ExperimentType) -> Self {
        let (mode, distance, center, rotation) = match experiment_type {
            ExperimentType::Circuit => (0, 2.7, (0.0, -0.45, 1.08), (50.0, 0.0, 0.0)),
            ExperimentType::Celestial => (2, 2.75, (0.0, 0.0, 1.08), (90.0, 0.0, 0.0)),
            ExperimentType::Electromagnetism => (0, 3.25, (0.0, 0.0, 0.88), (90.0, 0.0, 0.0)),
        };
        let pos = |(x, y, z): (f64, f64, f64)| Position::new(x, y, z).unwrap_or_default();
        Self {
            mode: Some(mode),
            distance: Some(distance),
            vision_center: pos(center),
            target_rotation: pos(rotation),
            extra: Map::new(),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|err| SavError::InvalidFormat(format!("CameraSave: {err}")))
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Keys of the stored camera that are not modelled here.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
