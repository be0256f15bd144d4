use crate::camera::Camera;
use crate::catalogue::{canonical_name, Catalogue, SIMPLE_INSTRUMENT};
use crate::coords::{self, CoordinateMode};
use crate::element::{Element, ElementId};
use crate::error::{Result, SavError};
use crate::instrument::{self, InstrumentSettings};
use crate::position::Position;
use crate::registry::ElementRegistry;
use crate::wire::{Pin, Wire, WireColor, WireSet};
use crate::ExperimentType;

/// The in-memory object graph of one experiment.
///
/// Wires and the element-grid origin only exist for circuits; the wire
/// operations return `TypeMismatch` on other experiment types.
#[derive(Debug, Clone)]
pub struct ExperimentGraph {
    experiment_type: ExperimentType,
    elements: ElementRegistry,
    wires: WireSet,
    camera: Camera,
    /// Native offset added to grid placements.
    grid_origin: Position,
}

impl ExperimentGraph {
    pub fn new(experiment_type: ExperimentType) -> Self {
        Self::with_camera(experiment_type, Camera::default_for(experiment_type))
    }

    pub(crate) fn with_camera(experiment_type: ExperimentType, camera: Camera) -> Self {
        Self {
            experiment_type,
            elements: ElementRegistry::new(),
            wires: WireSet::new(),
            camera,
            grid_origin: Position::ORIGIN,
        }
    }

    pub fn experiment_type(&self) -> ExperimentType {
        self.experiment_type
    }

    pub fn elements(&self) -> &ElementRegistry {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn wires(&self) -> &WireSet {
        &self.wires
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn grid_origin(&self) -> Position {
        self.grid_origin
    }

    /// Move the element-grid origin (native units). Circuit only.
    pub fn set_grid_origin(&mut self, origin: Position) -> Result<()> {
        self.experiment_type.require(ExperimentType::Circuit)?;
        self.grid_origin = origin;
        Ok(())
    }

    fn to_native(&self, position: Position, is_big: bool, mode: CoordinateMode) -> Result<Position> {
        match mode {
            CoordinateMode::Native => Ok(position),
            CoordinateMode::Grid => {
                self.experiment_type.require(ExperimentType::Circuit)?;
                Ok(coords::to_native(position, is_big) + self.grid_origin)
            }
        }
    }

    /// Create an element by model id or legacy class name.
    ///
    /// `x`, `y`, `z` are interpreted according to `mode`; grid coordinates are
    /// only valid for circuits.
    pub fn create_element(
        &mut self,
        catalogue: &Catalogue,
        name: &str,
        x: f64,
        y: f64,
        z: f64,
        mode: CoordinateMode,
    ) -> Result<ElementId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SavError::ArgumentType("element name is empty".into()));
        }
        if self.experiment_type == ExperimentType::Circuit
            && canonical_name(name) == canonical_name(SIMPLE_INSTRUMENT)
        {
            return self.create_instrument(
                catalogue,
                x,
                y,
                z,
                mode,
                InstrumentSettings::default(),
            );
        }
        let position = Position::new(x, y, z)?;
        let spec = catalogue.lookup(self.experiment_type, name)?;
        let native = self.to_native(position, spec.is_big, mode)?;
        let element = Element::new(spec, self.experiment_type, native);
        log::debug!("Created {} at {}", element.model_id(), native);
        Ok(self.elements.insert(element))
    }

    /// Create a "Simple Instrument" with explicit settings. Circuit only.
    pub fn create_instrument(
        &mut self,
        catalogue: &Catalogue,
        x: f64,
        y: f64,
        z: f64,
        mode: CoordinateMode,
        settings: InstrumentSettings,
    ) -> Result<ElementId> {
        self.experiment_type.require(ExperimentType::Circuit)?;
        let position = Position::new(x, y, z)?;
        let spec = catalogue.lookup(ExperimentType::Circuit, SIMPLE_INSTRUMENT)?;
        let native = self.to_native(position, spec.is_big, mode)?;
        let mut element = Element::new(spec, ExperimentType::Circuit, native);
        *element.properties_mut() = settings.to_properties();
        Ok(self.elements.insert(element))
    }

    pub(crate) fn insert_decoded(&mut self, element: Element) -> ElementId {
        self.elements.insert(element)
    }

    /// Instrument settings of an element, or `None` for other models.
    pub fn instrument(&self, id: ElementId) -> Option<Result<InstrumentSettings>> {
        let element = self.elements.get(id)?;
        (element.model_id() == SIMPLE_INSTRUMENT)
            .then(|| InstrumentSettings::from_properties(element.properties()))
    }

    pub fn set_instrument(&mut self, id: ElementId, settings: &InstrumentSettings) -> Result<()> {
        let element = self.require_element_mut(id)?;
        if element.model_id() != SIMPLE_INSTRUMENT {
            return Err(SavError::ArgumentType(format!(
                "element {id} is a {}, not a {SIMPLE_INSTRUMENT}",
                element.model_id()
            )));
        }
        let mut props = settings.to_properties();
        for (key, value) in element.properties() {
            if !props.contains_key(key) && !key.starts_with(instrument::PITCH) {
                props.insert(key.clone(), value.clone());
            }
        }
        *element.properties_mut() = props;
        Ok(())
    }

    fn require_element(&self, id: ElementId) -> Result<&Element> {
        self.elements
            .get(id)
            .ok_or_else(|| SavError::UnresolvedReference(id.to_string()))
    }

    fn require_element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| SavError::UnresolvedReference(id.to_string()))
    }

    /// Position of an element in grid coordinates. Circuit only.
    pub fn grid_position(&self, id: ElementId) -> Result<Position> {
        self.experiment_type.require(ExperimentType::Circuit)?;
        let element = self.require_element(id)?;
        Ok(coords::to_grid(
            element.position() - self.grid_origin,
            element.is_big(),
        ))
    }

    pub fn move_element(
        &mut self,
        id: ElementId,
        x: f64,
        y: f64,
        z: f64,
        mode: CoordinateMode,
    ) -> Result<()> {
        let position = Position::new(x, y, z)?;
        let is_big = self.require_element(id)?.is_big();
        let native = self.to_native(position, is_big, mode)?;
        self.elements.move_to(id, native);
        Ok(())
    }

    /// Elements at a position given in `mode` coordinates.
    pub fn elements_at(&self, x: f64, y: f64, z: f64, mode: CoordinateMode) -> Result<Vec<&Element>> {
        let position = Position::new(x, y, z)?;
        match mode {
            CoordinateMode::Native => Ok(self.elements.at(&position)),
            CoordinateMode::Grid => {
                let small = self.to_native(position, false, mode)?;
                let big = self.to_native(position, true, mode)?;
                let mut found: Vec<&Element> = self
                    .elements
                    .at(&small)
                    .into_iter()
                    .filter(|e| !e.is_big())
                    .collect();
                found.extend(self.elements.at(&big).into_iter().filter(|e| e.is_big()));
                Ok(found)
            }
        }
    }

    /// Remove an element together with every wire attached to it.
    pub fn remove_element(&mut self, id: ElementId) -> Result<Element> {
        let element = self
            .elements
            .remove(id)
            .ok_or_else(|| SavError::UnresolvedReference(id.to_string()))?;
        let dropped = self.wires.remove_touching(id);
        if dropped > 0 {
            log::debug!("Removed {dropped} wire(s) attached to {id}");
        }
        Ok(element)
    }

    pub fn clear_elements(&mut self) {
        self.elements.clear();
        self.wires.clear();
    }

    /// Connect two pins. Connecting an equivalent pair again is a no-op.
    pub fn connect(&mut self, a: Pin, b: Pin, color: WireColor) -> Result<Wire> {
        self.experiment_type.require(ExperimentType::Circuit)?;
        self.require_element(a.element)?;
        self.require_element(b.element)?;
        let wire = Wire::new(a, b, color);
        self.wires.insert(wire);
        Ok(wire)
    }

    pub fn disconnect(&mut self, wire: &Wire) -> Result<bool> {
        self.experiment_type.require(ExperimentType::Circuit)?;
        Ok(self.wires.remove(wire))
    }

    /// Drop every wire.
    pub fn clear_wires(&mut self) -> Result<()> {
        self.experiment_type.require(ExperimentType::Circuit)?;
        self.wires.clear();
        Ok(())
    }

    pub(crate) fn insert_decoded_wire(&mut self, wire: Wire) {
        self.wires.insert(wire);
    }
}
