//! Settings of the circuit "Simple Instrument" element.
//!
//! The element stores its primary note under `音高` and every further note of
//! a chord under `音高1`, `音高2`, ... in the property bag.

use serde_json::Value;

use crate::error::{Result, SavError};
use crate::Properties;

pub const INSTRUMENT: &str = "乐器";
pub const PITCH: &str = "音高";
pub const VELOCITY: &str = "音量";
pub const RATED_VOLTAGE: &str = "额定电压";
pub const IDEAL_MODE: &str = "理想模式";
pub const PULSE: &str = "脉冲";
const LOCK: &str = "锁定";

/// Highest MIDI note number.
pub const MAX_PITCH: i64 = 127;

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSettings {
    /// General MIDI program number.
    pub instrument: i64,
    /// Notes in insertion order; the first one is the primary pitch.
    pitches: Vec<i64>,
    pub velocity: f64,
    pub rated_voltage: f64,
    pub is_ideal: bool,
    /// Play once per rising edge instead of while powered.
    pub is_single: bool,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            instrument: 0,
            pitches: vec![60],
            velocity: 1.0,
            rated_voltage: 3.0,
            is_ideal: false,
            is_single: true,
        }
    }
}

fn check_pitch(pitch: i64) -> Result<i64> {
    if (0..=MAX_PITCH).contains(&pitch) {
        Ok(pitch)
    } else {
        Err(SavError::ArgumentType(format!(
            "pitch {pitch} is outside 0..={MAX_PITCH}"
        )))
    }
}

fn number(props: &Properties, key: &str) -> Result<f64> {
    props
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            SavError::InvalidFormat(format!("Simple Instrument is missing numeric property '{key}'"))
        })
}

impl InstrumentSettings {
    pub fn new(pitch: i64) -> Result<Self> {
        Ok(Self {
            pitches: vec![check_pitch(pitch)?],
            ..Self::default()
        })
    }

    pub fn pitch(&self) -> i64 {
        self.pitches[0]
    }

    pub fn pitches(&self) -> &[i64] {
        &self.pitches
    }

    /// Add a note to the chord. Duplicates are kept; order is significant.
    pub fn add_note(&mut self, pitch: i64) -> Result<&mut Self> {
        self.pitches.push(check_pitch(pitch)?);
        Ok(self)
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity.clamp(0.0, 1.0);
        self
    }

    /// Rebuild settings from a stored property bag.
    ///
    /// Every key with the `音高` prefix contributes a note, in bag order; the
    /// bare `音高` key is the primary pitch and is not repeated.
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let instrument = props.get(INSTRUMENT).and_then(Value::as_f64).unwrap_or(0.0) as i64;
        let mut settings = Self {
            instrument,
            pitches: vec![check_pitch(number(props, PITCH)? as i64)?],
            velocity: number(props, VELOCITY)?,
            rated_voltage: number(props, RATED_VOLTAGE)?,
            is_ideal: number(props, IDEAL_MODE)? != 0.0,
            is_single: number(props, PULSE)? != 0.0,
        };
        for (key, value) in props {
            if key.starts_with(PITCH) && key != PITCH {
                let pitch = value.as_f64().ok_or_else(|| {
                    SavError::InvalidFormat(format!("pitch '{key}' is not a number"))
                })?;
                settings.add_note(pitch as i64)?;
            }
        }
        Ok(settings)
    }

    pub fn to_properties(&self) -> Properties {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let mut props = Properties::new();
        props.insert(INSTRUMENT.into(), (self.instrument as f64).into());
        props.insert(PITCH.into(), (self.pitch() as f64).into());
        props.insert(VELOCITY.into(), self.velocity.into());
        props.insert(RATED_VOLTAGE.into(), self.rated_voltage.into());
        props.insert(IDEAL_MODE.into(), flag(self.is_ideal).into());
        props.insert(PULSE.into(), flag(self.is_single).into());
        props.insert(LOCK.into(), 1.0.into());
        for (i, pitch) in self.pitches.iter().enumerate().skip(1) {
            props.insert(format!("{PITCH}{i}"), (*pitch as f64).into());
        }
        props
    }
}
