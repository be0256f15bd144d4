//! Two-stage codec for the save document.
//!
//! Stage one is the outer document, kept as a raw JSON object so that fields
//! the library does not model survive a round trip. Stage two is the pair of
//! JSON strings embedded in the `Experiment` region (`StatusSave` and
//! `CameraSave`), decoded into an [`ExperimentGraph`] and re-encoded from it.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::camera::Camera;
use crate::catalogue::{Catalogue, SIMPLE_INSTRUMENT};
use crate::element::{Element, ElementId};
use crate::error::{Result, SavError};
use crate::graph::ExperimentGraph;
use crate::instrument::{self, InstrumentSettings};
use crate::stored::{StoredElement, StoredWire};
use crate::template;
use crate::wire::{Pin, Wire, WireColor};
use crate::ExperimentType;

/// Field the remote API uses to tag object types; never part of a save.
pub const PROTOCOL_TYPE_TAG: &str = "$type";

const EXPERIMENT: &str = "Experiment";
const SUMMARY: &str = "Summary";
const STATUS_SAVE: &str = "StatusSave";
const CAMERA_SAVE: &str = "CameraSave";
const INTERNAL_NAME: &str = "InternalName";
const LOCK: &str = "锁定";

fn invalid(msg: impl Into<String>) -> SavError {
    SavError::InvalidFormat(msg.into())
}

fn into_object(value: Value, what: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(invalid(format!("{what} is not an object: {other}"))),
    }
}

fn type_of(region: &Map<String, Value>) -> Result<ExperimentType> {
    let code = region
        .get("Type")
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid("experiment has no numeric 'Type'"))?;
    ExperimentType::from_code(code)
}

fn template_object(experiment_type: ExperimentType) -> Map<String, Value> {
    match template::document(experiment_type) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Outer save document.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveDocument {
    root: Map<String, Value>,
}

impl SaveDocument {
    /// Blank document for a new experiment.
    pub fn new(experiment_type: ExperimentType) -> Self {
        Self {
            root: template_object(experiment_type),
        }
    }

    /// Accept either a full `.sav` document or a bare `Experiment` region (as
    /// exported by the app), which is wrapped in the template of its type.
    pub fn from_value(value: Value) -> Result<Self> {
        let obj = into_object(value, "save document")?;
        let mut root = if obj.contains_key(EXPERIMENT) {
            obj
        } else {
            let experiment_type = type_of(&obj)?;
            log::debug!("Wrapping bare {experiment_type} experiment region in template");
            let mut root = template_object(experiment_type);
            root.insert(EXPERIMENT.into(), Value::Object(obj));
            root
        };

        let experiment = root
            .get(EXPERIMENT)
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("'Experiment' is not an object"))?;
        let experiment_type = type_of(experiment)?;
        for key in [STATUS_SAVE, CAMERA_SAVE] {
            if !experiment.get(key).is_some_and(Value::is_string) {
                return Err(invalid(format!("Experiment.{key} is not an embedded JSON string")));
            }
        }

        if root.get(SUMMARY).is_none_or(Value::is_null) {
            root.insert(SUMMARY.into(), template::default_summary(experiment_type));
        }
        Ok(Self { root })
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Build a document from the remote API's summary and experiment payloads.
    pub fn from_remote(summary: Value, experiment: Value) -> Result<Self> {
        let mut summary = into_object(summary, "remote summary")?;
        let mut experiment = into_object(experiment, "remote experiment")?;
        summary.remove(PROTOCOL_TYPE_TAG);
        experiment.remove(PROTOCOL_TYPE_TAG);

        let mut doc = Self::new(type_of(&experiment)?);
        doc.root.insert(EXPERIMENT.into(), Value::Object(experiment));
        doc.root.insert(SUMMARY.into(), Value::Object(summary));
        Self::from_value(Value::Object(doc.root))
    }

    pub fn as_value(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    fn experiment(&self) -> Result<&Map<String, Value>> {
        self.root
            .get(EXPERIMENT)
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("'Experiment' is not an object"))
    }

    fn experiment_mut(&mut self) -> Result<&mut Map<String, Value>> {
        self.root
            .get_mut(EXPERIMENT)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| invalid("'Experiment' is not an object"))
    }

    pub fn experiment_type(&self) -> Result<ExperimentType> {
        type_of(self.experiment()?)
    }

    pub fn internal_name(&self) -> Option<&str> {
        self.root.get(INTERNAL_NAME).and_then(Value::as_str)
    }

    pub fn summary(&self) -> Option<&Map<String, Value>> {
        self.root.get(SUMMARY).and_then(Value::as_object)
    }

    fn summary_mut(&mut self) -> Option<&mut Map<String, Value>> {
        if !self.root.get(SUMMARY).is_some_and(Value::is_object) {
            let ty = self.experiment_type().unwrap_or(ExperimentType::Circuit);
            self.root
                .insert(SUMMARY.into(), template::default_summary(ty));
        }
        self.root.get_mut(SUMMARY).and_then(Value::as_object_mut)
    }

    /// Set the experiment's name, as shown in the app and matched by name lookups.
    pub fn entitle(&mut self, name: &str) {
        self.root
            .insert(INTERNAL_NAME.into(), Value::String(name.to_string()));
        if let Some(summary) = self.summary_mut() {
            summary.insert("Subject".into(), Value::String(name.to_string()));
        }
    }

    pub fn set_description<S: AsRef<str>>(&mut self, lines: &[S]) {
        let lines = lines
            .iter()
            .map(|l| Value::String(l.as_ref().to_string()))
            .collect();
        if let Some(summary) = self.summary_mut() {
            summary.insert("Description".into(), Value::Array(lines));
        }
    }

    fn embedded(&self, key: &str) -> Result<Value> {
        let text = self
            .experiment()?
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("Experiment.{key} is not an embedded JSON string")))?;
        Ok(serde_json::from_str(text)?)
    }

    /// Decoded `StatusSave` object.
    pub fn status_save(&self) -> Result<Map<String, Value>> {
        into_object(self.embedded(STATUS_SAVE)?, STATUS_SAVE)
    }

    pub fn camera(&self) -> Result<Camera> {
        Camera::from_json(&self.embedded(CAMERA_SAVE)?)
    }

    /// Decode the elements, wires and camera into an object graph.
    pub fn decode(&self, catalogue: &Catalogue) -> Result<ExperimentGraph> {
        let experiment_type = self.experiment_type()?;
        let status = self.status_save()?;
        let mut graph = ExperimentGraph::with_camera(experiment_type, self.camera()?);

        let elements: Vec<&Value> = match status.get("Elements") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(list)) => list.iter().collect(),
            // Celestial saves key bodies by identifier.
            Some(Value::Object(map)) => map.values().collect(),
            Some(other) => return Err(invalid(format!("StatusSave.Elements is {other}"))),
        };

        let mut by_identifier: HashMap<String, ElementId> = HashMap::new();
        for value in elements {
            let element = decode_element(catalogue, experiment_type, value)?;
            let identifier = element.identifier().to_string();
            let id = graph.insert_decoded(element);
            by_identifier.insert(identifier, id);
        }

        if experiment_type == ExperimentType::Circuit {
            if let Some(wires) = status.get("Wires").and_then(Value::as_array) {
                for value in wires {
                    graph.insert_decoded_wire(decode_wire(&by_identifier, value)?);
                }
            }
        }

        log::debug!(
            "Decoded {} experiment: {} element(s), {} wire(s)",
            experiment_type,
            graph.elements().len(),
            graph.wires().len()
        );
        Ok(graph)
    }

    /// Write `graph` back into the embedded documents, keeping every
    /// unmodelled field of the existing `StatusSave` and `CameraSave`.
    pub fn encode(&mut self, graph: &ExperimentGraph) -> Result<()> {
        let experiment_type = self.experiment_type()?;
        graph.experiment_type().require(experiment_type)?;

        let mut status = self
            .status_save()
            .or_else(|_| into_object(template::empty_status(experiment_type), STATUS_SAVE))?;

        let elements = graph.elements();
        let encoded_elements = match experiment_type {
            ExperimentType::Celestial => Value::Object(
                elements
                    .iter()
                    .map(|(_, e)| Ok((e.identifier().to_string(), e.to_json()?)))
                    .collect::<Result<Map<String, Value>>>()?,
            ),
            ExperimentType::Circuit | ExperimentType::Electromagnetism => Value::Array(
                elements
                    .iter()
                    .map(|(_, e)| e.to_json())
                    .collect::<Result<Vec<Value>>>()?,
            ),
        };
        status.insert("Elements".into(), encoded_elements);

        if experiment_type == ExperimentType::Circuit {
            let identifier = |id: ElementId| -> Result<String> {
                elements
                    .get(id)
                    .map(|e| e.identifier().to_string())
                    .ok_or_else(|| SavError::UnresolvedReference(id.to_string()))
            };
            let wires = graph
                .wires()
                .iter()
                .map(|w| {
                    Ok(StoredWire {
                        source: identifier(w.source.element)?,
                        source_pin: w.source.index,
                        target: identifier(w.target.element)?,
                        target_pin: w.target.index,
                        color_name: w.color.native_name().to_string(),
                    })
                })
                .collect::<Result<Vec<StoredWire>>>()?;
            status.insert("Wires".into(), serde_json::to_value(wires)?);
        }

        let experiment = self.experiment_mut()?;
        experiment.insert(
            STATUS_SAVE.into(),
            Value::String(serde_json::to_string(&status)?),
        );
        experiment.insert(
            CAMERA_SAVE.into(),
            Value::String(serde_json::to_string(graph.camera())?),
        );
        experiment.insert("Components".into(), elements.len().into());
        Ok(())
    }
}

fn decode_element(
    catalogue: &Catalogue,
    experiment_type: ExperimentType,
    value: &Value,
) -> Result<Element> {
    let stored = StoredElement::deserialize(value)
        .map_err(|err| invalid(format!("bad element {value}: {err}")))?;
    let model_key = experiment_type.model_key();
    let model_id = match experiment_type {
        ExperimentType::Celestial => stored.model.as_deref(),
        ExperimentType::Circuit | ExperimentType::Electromagnetism => stored.model_id.as_deref(),
    }
    .ok_or_else(|| invalid(format!("element has no '{model_key}'")))?;
    let spec = catalogue.lookup(experiment_type, model_id)?;
    let is_instrument =
        experiment_type == ExperimentType::Circuit && spec.model_id == SIMPLE_INSTRUMENT;
    let mut element = Element::from_stored(spec, experiment_type, stored);

    if is_instrument {
        let stored_props = element.properties().clone();
        let mut props = InstrumentSettings::from_properties(&stored_props)?.to_properties();
        for (key, value) in stored_props {
            if !props.contains_key(&key) && !key.starts_with(instrument::PITCH) {
                props.insert(key, value);
            }
        }
        *element.properties_mut() = props;
    } else if experiment_type == ExperimentType::Circuit {
        element.set_property(LOCK, 1.0);
    }
    Ok(element)
}

fn decode_wire(by_identifier: &HashMap<String, ElementId>, value: &Value) -> Result<Wire> {
    let stored = StoredWire::deserialize(value)
        .map_err(|err| invalid(format!("bad wire {value}: {err}")))?;
    let element = |identifier: &str| -> Result<ElementId> {
        by_identifier
            .get(identifier)
            .copied()
            .ok_or_else(|| SavError::UnresolvedReference(identifier.to_string()))
    };
    let color = WireColor::from_native(&stored.color_name)
        .ok_or_else(|| invalid(format!("unknown wire colour '{}'", stored.color_name)))?;
    Ok(Wire::new(
        Pin::new(element(&stored.source)?, stored.source_pin),
        Pin::new(element(&stored.target)?, stored.target_pin),
        color,
    ))
}
