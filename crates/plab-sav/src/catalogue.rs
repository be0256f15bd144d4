//! Registry of known element models.
//!
//! Element constructors are looked up by canonical name: the model id with
//! surrounding whitespace trimmed and spaces/hyphens replaced by `_`, so
//! `"Logic Input"`, `" Logic-Input"` and `"Logic_Input"` all resolve to the
//! same entry. A few models are also reachable through legacy aliases
//! (`NE555`, `eight_bit_Input`, ...).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{Result, SavError};
use crate::position::Position;
use crate::{ExperimentType, Properties};

/// Model id of the circuit instrument element, which has its own constructor.
pub const SIMPLE_INSTRUMENT: &str = "Simple Instrument";

/// Default construction data for one element model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub model_id: String,
    /// Large footprint; affects the grid transform's vertical offset.
    pub is_big: bool,
    pub properties: Properties,
}

impl ModelSpec {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            is_big: false,
            properties: Properties::new(),
        }
    }

    pub fn big(mut self) -> Self {
        self.is_big = true;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn default_properties(&self) -> Properties {
        self.properties.clone()
    }

    /// Rotation a fresh element starts with; celestial bodies have none.
    pub fn default_rotation(&self, experiment_type: ExperimentType) -> Option<Position> {
        match experiment_type {
            // Stored as "0,180,0": a half turn about the vertical axis.
            ExperimentType::Circuit => Some(Position::from_decimals(
                0.into(),
                0.into(),
                180.into(),
            )),
            ExperimentType::Electromagnetism => Some(Position::ORIGIN),
            ExperimentType::Celestial => None,
        }
    }
}

/// Normalise a user-supplied model name to its lookup key.
pub fn canonical_name(name: &str) -> String {
    name.trim().replace([' ', '-'], "_")
}

#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    models: HashMap<(ExperimentType, String), ModelSpec>,
}

static BUILTIN: Lazy<Catalogue> = Lazy::new(builtin_catalogue);

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The models shipped with the simulator.
    pub fn builtin() -> &'static Catalogue {
        &BUILTIN
    }

    pub fn register(&mut self, experiment_type: ExperimentType, spec: ModelSpec) -> &mut Self {
        let key = canonical_name(&spec.model_id);
        self.models.insert((experiment_type, key), spec);
        self
    }

    /// Make `alias` resolve to the already registered `model_id`.
    pub fn alias(
        &mut self,
        experiment_type: ExperimentType,
        alias: &str,
        model_id: &str,
    ) -> Result<&mut Self> {
        let spec = self.lookup(experiment_type, model_id)?.clone();
        self.models
            .insert((experiment_type, canonical_name(alias)), spec);
        Ok(self)
    }

    pub fn lookup(&self, experiment_type: ExperimentType, name: &str) -> Result<&ModelSpec> {
        self.models
            .get(&(experiment_type, canonical_name(name)))
            .ok_or_else(|| SavError::UnknownModel {
                experiment_type,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, experiment_type: ExperimentType, name: &str) -> bool {
        self.lookup(experiment_type, name).is_ok()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

const HIGH_LEVEL: &str = "高电平";
const LOW_LEVEL: &str = "低电平";
const MAX_CURRENT: &str = "最大电流";
const LOCK: &str = "锁定";

fn logic(model_id: &str) -> ModelSpec {
    ModelSpec::new(model_id)
        .with_property(HIGH_LEVEL, 3.0)
        .with_property(LOW_LEVEL, 0.0)
        .with_property(MAX_CURRENT, 0.1)
        .with_property(LOCK, 1.0)
}

fn builtin_catalogue() -> Catalogue {
    use ExperimentType::*;

    let mut c = Catalogue::new();

    c.register(
        Circuit,
        ModelSpec::new("Logic Input")
            .with_property(HIGH_LEVEL, 3.0)
            .with_property(LOW_LEVEL, 0.0)
            .with_property(LOCK, 1.0)
            .with_property("开关", 0.0),
    );
    c.register(
        Circuit,
        ModelSpec::new("Logic Output")
            .with_property("状态", 0.0)
            .with_property(HIGH_LEVEL, 3.0)
            .with_property(LOW_LEVEL, 0.0)
            .with_property(LOCK, 1.0),
    );
    for gate in [
        "Yes Gate",
        "No Gate",
        "Or Gate",
        "And Gate",
        "Nor Gate",
        "Nand Gate",
        "Xor Gate",
        "Xnor Gate",
        "Imp Gate",
        "Nimp Gate",
        "Schmitt Trigger",
    ] {
        c.register(Circuit, logic(gate));
    }
    for big in [
        "Half Adder",
        "Full Adder",
        "Half Subtractor",
        "Full Subtractor",
        "Multiplier",
        "D Flipflop",
        "T Flipflop",
        "Real-T Flipflop",
        "JK Flipflop",
        "Counter",
        "Random Generator",
        "8bit Input",
        "8bit Display",
        "555 Timer",
    ] {
        c.register(Circuit, logic(big).big());
    }
    c.register(
        Circuit,
        ModelSpec::new("Battery Source")
            .with_property("最大功率", 16.2)
            .with_property("电压", 3.0)
            .with_property("内阻", 0.5),
    );
    c.register(
        Circuit,
        ModelSpec::new("Student Source")
            .with_property("交流电压", 3.0)
            .with_property("直流电压", 3.0)
            .with_property("开关", 0.0)
            .with_property("频率", 50.0),
    );
    c.register(
        Circuit,
        ModelSpec::new("Resistor")
            .with_property("安全电流", 1e10)
            .with_property("电阻", 10.0)
            .with_property(LOCK, 1.0),
    );
    c.register(
        Circuit,
        ModelSpec::new("Basic Capacitor")
            .with_property("耐压", 16.0)
            .with_property("电容", 1e-5)
            .with_property("内阻", 5.0)
            .with_property(LOCK, 1.0),
    );
    c.register(
        Circuit,
        ModelSpec::new("Basic Inductor")
            .with_property("电感", 0.05)
            .with_property("内阻", 1e-6)
            .with_property("电流", 0.0)
            .with_property(LOCK, 1.0),
    );
    for switch in [
        "Simple Switch",
        "SPDT Switch",
        "DPDT Switch",
        "Push Switch",
        "Air Switch",
    ] {
        c.register(
            Circuit,
            ModelSpec::new(switch)
                .with_property("开关", 0.0)
                .with_property(LOCK, 1.0),
        );
    }
    for plain in [
        "Fuse Component",
        "Incandescent Lamp",
        "Basic Diode",
        "Light-Emitting Diode",
        "Ground Component",
        "Electric Bell",
        "Buzzer",
        "Relay Component",
        "N-MOSFET",
        "P-MOSFET",
        "Operational Amplifier",
        "Sinewave Source",
        "Square Source",
        "Triangle Source",
        "Sawtooth Source",
        "Pulse Source",
        "Ammeter",
        "Voltmeter",
        "Simple Ammeter",
        "Simple Voltmeter",
        "Galvanometer",
        "Microammeter",
        "Multimeter",
        "Electricity Meter",
        "Resistance Box",
    ] {
        c.register(Circuit, ModelSpec::new(plain).with_property(LOCK, 1.0));
    }
    c.register(
        Circuit,
        ModelSpec::new(SIMPLE_INSTRUMENT).with_property(LOCK, 1.0),
    );

    for body in [
        "Sun",
        "Mercury",
        "Venus",
        "Earth",
        "Moon",
        "Mars",
        "Jupiter",
        "Saturn",
        "Uranus",
        "Neptune",
        "Pluto",
        "Comet",
        "Star",
        "Black Hole",
    ] {
        c.register(Celestial, ModelSpec::new(body));
    }

    for charge in [
        "Negative Charge",
        "Positive Charge",
        "Negative Test Charge",
        "Positive Test Charge",
    ] {
        c.register(
            Electromagnetism,
            ModelSpec::new(charge)
                .with_property("电荷量", 1.0)
                .with_property("质量", 0.1)
                .with_property(LOCK, 1.0),
        );
    }
    for magnet in ["Bar Magnet", "Compass", "Uniform Magnetic Field"] {
        c.register(
            Electromagnetism,
            ModelSpec::new(magnet)
                .with_property("强度", 1.0)
                .with_property(LOCK, 1.0),
        );
    }

    // Legacy class names of the elements whose model id does not normalise to them.
    for (alias, model_id) in [
        ("NE555", "555 Timer"),
        ("eight_bit_Input", "8bit Input"),
        ("eight_bit_Display", "8bit Display"),
    ] {
        if let Err(err) = c.alias(Circuit, alias, model_id) {
            log::warn!("Skipping catalogue alias {alias}: {err}");
        }
    }

    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalises_names() {
        assert_eq!(canonical_name("  Logic Input "), "Logic_Input");
        assert_eq!(canonical_name("Real-T Flipflop"), "Real_T_Flipflop");
        assert_eq!(canonical_name("8bit_Input"), "8bit_Input");
    }

    #[test]
    fn lookup_accepts_every_spelling() {
        let c = Catalogue::builtin();
        let a = c.lookup(ExperimentType::Circuit, "Logic Input").unwrap();
        let b = c.lookup(ExperimentType::Circuit, "Logic_Input").unwrap();
        let d = c.lookup(ExperimentType::Circuit, "Logic-Input").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, d);
    }

    #[test]
    fn special_names_resolve_to_dedicated_models() {
        let c = Catalogue::builtin();
        for (name, model_id) in [
            ("555_Timer", "555 Timer"),
            ("NE555", "555 Timer"),
            ("8bit_Input", "8bit Input"),
            ("eight_bit_Display", "8bit Display"),
        ] {
            let spec = c.lookup(ExperimentType::Circuit, name).unwrap();
            assert_eq!(spec.model_id, model_id);
            assert!(spec.is_big);
        }
    }

    #[test]
    fn lookup_is_scoped_by_experiment_type() {
        let c = Catalogue::builtin();
        assert!(c.contains(ExperimentType::Celestial, "Earth"));
        assert!(!c.contains(ExperimentType::Circuit, "Earth"));

        let err = c
            .lookup(ExperimentType::Electromagnetism, "Flux Capacitor")
            .unwrap_err();
        assert!(matches!(err, SavError::UnknownModel { .. }));
    }

    #[test]
    fn custom_models_can_be_registered() {
        let mut c = Catalogue::new();
        assert!(c.is_empty());
        c.register(
            ExperimentType::Circuit,
            ModelSpec::new("Tesla Coil").big().with_property("电压", 1e5),
        );
        c.alias(ExperimentType::Circuit, "coil", "Tesla Coil").unwrap();

        let spec = c.lookup(ExperimentType::Circuit, "coil").unwrap();
        assert!(spec.is_big);
        assert_eq!(spec.properties["电压"], 1e5);
        assert_eq!(c.len(), 2);
    }
}
