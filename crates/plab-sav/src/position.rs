use std::fmt;
use std::ops::{Add, Sub};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SavError};

/// Number of fractional digits every stored coordinate is rounded to.
pub const PRECISION: u32 = 4;

/// Round a coordinate to the canonical precision.
///
/// Fails on NaN and infinities, which have no place in a save file.
pub fn round_data(value: f64) -> Result<Decimal> {
    Decimal::from_f64(value)
        .map(round_decimal)
        .ok_or_else(|| SavError::ArgumentType(format!("coordinate {value} is not a finite number")))
}

pub(crate) fn round_decimal(value: Decimal) -> Decimal {
    value.round_dp(PRECISION).normalize()
}

/// An `(x, y, z)` triple rounded to [`PRECISION`] on construction.
///
/// Equality and hashing are exact on the rounded values, which makes the type
/// usable as a map key for the element position index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    x: Decimal,
    y: Decimal,
    z: Decimal,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: Decimal::ZERO,
        y: Decimal::ZERO,
        z: Decimal::ZERO,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        Ok(Self {
            x: round_data(x)?,
            y: round_data(y)?,
            z: round_data(z)?,
        })
    }

    pub fn from_decimals(x: Decimal, y: Decimal, z: Decimal) -> Self {
        Self {
            x: round_decimal(x),
            y: round_decimal(y),
            z: round_decimal(z),
        }
    }

    pub fn x(&self) -> Decimal {
        self.x
    }

    pub fn y(&self) -> Decimal {
        self.y
    }

    pub fn z(&self) -> Decimal {
        self.z
    }

    pub fn to_f64(&self) -> (f64, f64, f64) {
        let f = |d: Decimal| d.to_f64().unwrap_or_default();
        (f(self.x), f(self.y), f(self.z))
    }

    /// Parse a native `"x,z,y"` vector string into model `(x, y, z)` order.
    ///
    /// The simulator uses a left-handed axis order, so the second and third
    /// components are swapped here.
    pub fn parse_native(text: &str) -> Result<Self> {
        let parts = text
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>().map_err(|_| {
                    SavError::InvalidFormat(format!("bad coordinate '{part}' in vector '{text}'"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        match parts.as_slice() {
            [x, z, y] => Self::new(*x, *y, *z),
            _ => Err(SavError::InvalidFormat(format!(
                "expected 3 components in vector '{text}', found {}",
                parts.len()
            ))),
        }
    }

    /// Format in native `"x,z,y"` order; the inverse of [`Position::parse_native`].
    pub fn to_native_string(&self) -> String {
        format!("{},{},{}", self.x, self.z, self.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::from_decimals(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::from_decimals(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Stored as the native `"x,z,y"` string.
impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_native_string())
    }
}

struct NativeVector;

impl Visitor<'_> for NativeVector {
    type Value = Position;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a native \"x,z,y\" vector string")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<Position, E> {
        Position::parse_native(text).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(NativeVector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_to_four_digits() {
        let p = Position::new(0.123456, -1.00004, 2.0).unwrap();
        assert_eq!(p.x(), dec!(0.1235));
        assert_eq!(p.y(), dec!(-1));
        assert_eq!(p.z(), dec!(2));
    }

    #[test]
    fn float_noise_collapses_to_same_key() {
        let a = Position::new(0.15 * 3.0, 0.0, 0.0).unwrap();
        let b = Position::new(0.45, 0.0, 0.0).unwrap();
        assert_eq!(a, b);

        let mut h1 = std::collections::hash_map::DefaultHasher::new();
        let mut h2 = std::collections::hash_map::DefaultHasher::new();
        std::hash::Hash::hash(&a, &mut h1);
        std::hash::Hash::hash(&b, &mut h2);
        assert_eq!(std::hash::Hasher::finish(&h1), std::hash::Hasher::finish(&h2));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            Position::new(f64::NAN, 0.0, 0.0),
            Err(SavError::ArgumentType(_))
        ));
        assert!(Position::new(0.0, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn serde_uses_the_native_string() {
        let p = Position::from_decimals(dec!(1), dec!(2), dec!(3));
        assert_eq!(serde_json::to_value(p).unwrap(), "1,3,2");
        let back: Position = serde_json::from_str("\"1,3,2\"").unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<Position>("\"1,2\"").is_err());
        assert!(serde_json::from_str::<Position>("[1, 2, 3]").is_err());
    }

    #[test]
    fn native_string_swaps_y_and_z() {
        let p = Position::parse_native("1.5,2,-0.25").unwrap();
        assert_eq!(p, Position::from_decimals(dec!(1.5), dec!(-0.25), dec!(2)));
        assert_eq!(p.to_native_string(), "1.5,2,-0.25");
    }

    #[test]
    fn native_string_tolerates_spaces_and_exponents() {
        let p = Position::parse_native(" 0, 1E-05 ,3 ").unwrap();
        assert_eq!(p.y(), dec!(3));
        assert_eq!(p.z(), dec!(0));
    }

    #[test]
    fn native_string_requires_three_components() {
        assert!(matches!(
            Position::parse_native("1,2"),
            Err(SavError::InvalidFormat(_))
        ));
        assert!(Position::parse_native("a,b,c").is_err());
    }

    #[test]
    fn arithmetic_rounds() {
        let a = Position::from_decimals(dec!(0.1), dec!(0.2), dec!(0.3));
        let b = Position::from_decimals(dec!(0.05), dec!(0.05), dec!(0.05));
        assert_eq!(a + b, Position::from_decimals(dec!(0.15), dec!(0.25), dec!(0.35)));
        assert_eq!((a + b) - b, a);
    }
}
