use std::fmt;

use serde_json::{Map, Value};

use crate::catalogue::ModelSpec;
use crate::error::Result;
use crate::identifier::new_identifier;
use crate::position::Position;
use crate::stored::StoredElement;
use crate::template;
use crate::{ExperimentType, Properties};

/// Handle to an element owned by an [`crate::ElementRegistry`].
///
/// A handle carries the tag of the registry that issued it and is never
/// reused there, so stale handles and handles from another experiment fail
/// to resolve instead of aliasing some other element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId {
    pub(crate) registry: u64,
    pub(crate) index: u64,
}

impl ElementId {
    pub(crate) const fn new(registry: u64, index: u64) -> Self {
        Self { registry, index }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.registry, self.index)
    }
}

/// A placed element.
///
/// `position` is always in native coordinates. `extra` holds the keys of the
/// stored element object that are not modelled here (or a type skeleton for
/// new elements) and passes through encode untouched. `rotation` stays
/// `None` when the file had none, so encoding does not invent one.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    experiment_type: ExperimentType,
    model_id: String,
    identifier: String,
    position: Position,
    rotation: Option<Position>,
    is_big: bool,
    properties: Properties,
    /// Write `Properties` even when empty.
    keep_properties: bool,
    extra: Map<String, Value>,
}

impl Element {
    pub fn new(spec: &ModelSpec, experiment_type: ExperimentType, position: Position) -> Self {
        let mut extra = template::element_skeleton(experiment_type);
        let keep_properties = extra.contains_key("Properties");
        for key in StoredElement::FIELDS {
            extra.remove(key);
        }
        Self {
            experiment_type,
            model_id: spec.model_id.to_string(),
            identifier: new_identifier(),
            position,
            rotation: spec.default_rotation(experiment_type),
            is_big: spec.is_big,
            properties: spec.default_properties(),
            keep_properties,
            extra,
        }
    }

    /// Element for a record read from a save, once its model is known to be `spec`.
    pub(crate) fn from_stored(
        spec: &ModelSpec,
        experiment_type: ExperimentType,
        stored: StoredElement,
    ) -> Self {
        let StoredElement {
            model_id,
            model,
            identifier,
            position,
            rotation,
            properties,
            mut extra,
        } = stored;
        // The other type's model key is not ours to interpret.
        let foreign = match experiment_type {
            ExperimentType::Celestial => model_id.map(|name| ("ModelID", name)),
            ExperimentType::Circuit | ExperimentType::Electromagnetism => {
                model.map(|name| ("Model", name))
            }
        };
        if let Some((key, name)) = foreign {
            extra.insert(key.to_string(), Value::String(name));
        }
        Self {
            experiment_type,
            model_id: spec.model_id.to_string(),
            identifier: identifier.unwrap_or_else(new_identifier),
            position,
            rotation,
            is_big: spec.is_big,
            keep_properties: properties.is_some(),
            properties: properties.unwrap_or_default(),
            extra,
        }
    }

    pub fn experiment_type(&self) -> ExperimentType {
        self.experiment_type
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Native position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Only the registry may move elements, so the position index stays in sync.
    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Rotation in degrees; zero when the element does not store one.
    pub fn rotation(&self) -> Position {
        self.rotation.unwrap_or(Position::ORIGIN)
    }

    pub fn stored_rotation(&self) -> Option<Position> {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Position) {
        self.rotation = Some(rotation);
    }

    pub fn is_big(&self) -> bool {
        self.is_big
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Fields of the stored element object that are not modelled here.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub(crate) fn to_stored(&self) -> StoredElement {
        let name = Some(self.model_id.clone());
        let (model_id, model) = match self.experiment_type {
            ExperimentType::Celestial => (None, name),
            ExperimentType::Circuit | ExperimentType::Electromagnetism => (name, None),
        };
        StoredElement {
            model_id,
            model,
            identifier: Some(self.identifier.clone()),
            position: self.position,
            rotation: self.rotation,
            properties: (self.keep_properties || !self.properties.is_empty())
                .then(|| self.properties.clone()),
            extra: self.extra.clone(),
        }
    }

    /// Serialise into the element object stored in `StatusSave.Elements`.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_stored())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;
    use rust_decimal_macros::dec;

    #[test]
    fn new_circuit_element_serialises_native_order() {
        let catalogue = Catalogue::builtin();
        let spec = catalogue
            .lookup(ExperimentType::Circuit, "Logic Input")
            .unwrap();
        let pos = Position::from_decimals(dec!(0.15), dec!(0.3), dec!(0.1));
        let element = Element::new(spec, ExperimentType::Circuit, pos);

        let json = element.to_json().unwrap();
        assert_eq!(json["ModelID"], "Logic Input");
        assert_eq!(json["Position"], "0.15,0.1,0.3");
        assert_eq!(json["Rotation"], "0,180,0");
        assert_eq!(json["Identifier"].as_str().unwrap().len(), 33);
        assert_eq!(json["IsBroken"], false);
    }

    #[test]
    fn celestial_elements_use_model_key_without_rotation() {
        let catalogue = Catalogue::builtin();
        let spec = catalogue.lookup(ExperimentType::Celestial, "Earth").unwrap();
        let element = Element::new(spec, ExperimentType::Celestial, Position::ORIGIN);

        let json = element.to_json().unwrap();
        assert_eq!(json["Model"], "Earth");
        assert!(json.get("ModelID").is_none());
        assert!(json.get("Rotation").is_none());
        assert!(json.get("Properties").is_none());
    }

    #[test]
    fn properties_are_written_back() {
        let catalogue = Catalogue::builtin();
        let spec = catalogue
            .lookup(ExperimentType::Electromagnetism, "Positive Charge")
            .unwrap();
        let mut element = Element::new(spec, ExperimentType::Electromagnetism, Position::ORIGIN);
        element.set_property("电荷量", 2.5);

        assert_eq!(element.to_json().unwrap()["Properties"]["电荷量"], 2.5);
    }

    #[test]
    fn stored_elements_keep_what_they_had() {
        let catalogue = Catalogue::builtin();
        let spec = catalogue
            .lookup(ExperimentType::Electromagnetism, "Positive Charge")
            .unwrap();
        let stored: StoredElement = serde_json::from_value(serde_json::json!({
            "ModelID": "Positive Charge",
            "Identifier": "charge-1",
            "Position": "0,0,0",
            "Model": "stray",
            "Velocity": "1,0,0"
        }))
        .unwrap();
        let element = Element::from_stored(spec, ExperimentType::Electromagnetism, stored);
        assert_eq!(element.identifier(), "charge-1");
        assert!(element.stored_rotation().is_none());
        assert_eq!(element.rotation(), Position::ORIGIN);

        let json = element.to_json().unwrap();
        assert!(json.get("Rotation").is_none());
        assert!(json.get("Properties").is_none());
        assert_eq!(json["Model"], "stray");
        assert_eq!(json["Velocity"], "1,0,0");
        assert_eq!(json["ModelID"], "Positive Charge");
    }
}
