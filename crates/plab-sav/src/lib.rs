//! Data model and save-file codec for Physics-Lab experiments.
//!
//! A Physics-Lab save (`.sav`) is a JSON document whose `Experiment` region
//! carries two *embedded* JSON documents encoded as strings:
//!
//! * `StatusSave`: the placed elements and, for circuits, the wires.
//! * `CameraSave`: the camera framing.
//!
//! [`document::SaveDocument`] performs the two-stage decode/encode and keeps
//! every field this crate does not model, so that a file read and written
//! back is equivalent to the file it came from. The decoded object graph lives in
//! [`graph::ExperimentGraph`]: an ordered [`registry::ElementRegistry`] with a
//! position index, plus a deduplicating [`wire::WireSet`] for circuits.

pub mod camera;
pub mod catalogue;
pub mod coords;
pub mod document;
pub mod element;
pub mod error;
pub mod graph;
pub mod identifier;
pub mod instrument;
pub mod position;
pub mod registry;
mod stored;
pub mod template;
pub mod wire;

use std::fmt;

pub use camera::Camera;
pub use catalogue::{Catalogue, ModelSpec};
pub use coords::CoordinateMode;
pub use document::SaveDocument;
pub use element::{Element, ElementId};
pub use error::{Result, SavError};
pub use graph::ExperimentGraph;
pub use instrument::InstrumentSettings;
pub use position::Position;
pub use registry::ElementRegistry;
pub use wire::{Pin, Wire, WireColor, WireSet};

/// String-keyed property bag of an element, kept in insertion order.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// The three experiment kinds a save file can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperimentType {
    Circuit,
    Celestial,
    Electromagnetism,
}

impl ExperimentType {
    /// Value of the `Type` field in the save document.
    pub const fn code(self) -> i64 {
        match self {
            ExperimentType::Circuit => 0,
            ExperimentType::Celestial => 3,
            ExperimentType::Electromagnetism => 4,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(ExperimentType::Circuit),
            3 => Ok(ExperimentType::Celestial),
            4 => Ok(ExperimentType::Electromagnetism),
            other => Err(SavError::UnknownExperimentType(other)),
        }
    }

    /// Key under which an element stores its model name.
    pub const fn model_key(self) -> &'static str {
        match self {
            ExperimentType::Celestial => "Model",
            ExperimentType::Circuit | ExperimentType::Electromagnetism => "ModelID",
        }
    }

    /// Returns `TypeMismatch` unless `self` is `expected`.
    pub fn require(self, expected: ExperimentType) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(SavError::TypeMismatch {
                expected,
                found: self,
            })
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentType::Circuit => write!(f, "circuit"),
            ExperimentType::Celestial => write!(f, "celestial"),
            ExperimentType::Electromagnetism => write!(f, "electromagnetism"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_roundtrip() {
        for ty in [
            ExperimentType::Circuit,
            ExperimentType::Celestial,
            ExperimentType::Electromagnetism,
        ] {
            assert_eq!(ExperimentType::from_code(ty.code()).unwrap(), ty);
        }
        assert!(matches!(
            ExperimentType::from_code(7),
            Err(SavError::UnknownExperimentType(7))
        ));
    }

    #[test]
    fn require_reports_both_types() {
        let err = ExperimentType::Celestial
            .require(ExperimentType::Circuit)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation requires a circuit experiment, found celestial"
        );
    }
}
