//! Element-grid coordinate system.
//!
//! One grid unit on x and y is the footprint of a logic gate (0.15 by 0.075
//! native units); one unit on z is 0.1 native units. Large elements such as
//! multipliers sit 0.045 higher on y so that they line up with small ones.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::SavError;
use crate::position::Position;

pub const X_UNIT: Decimal = dec!(0.15);
pub const Y_UNIT: Decimal = dec!(0.075);
pub const Z_UNIT: Decimal = dec!(0.1);
pub const BIG_ELEMENT_Y_OFFSET: Decimal = dec!(0.045);

/// Which coordinate system caller-supplied element coordinates are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateMode {
    #[default]
    Native,
    Grid,
}

impl FromStr for CoordinateMode {
    type Err = SavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(CoordinateMode::Native),
            "grid" | "element" => Ok(CoordinateMode::Grid),
            other => Err(SavError::ArgumentType(format!(
                "unknown coordinate mode '{other}'"
            ))),
        }
    }
}

/// Convert grid coordinates to native coordinates.
pub fn to_native(grid: Position, is_big: bool) -> Position {
    let mut y = grid.y() * Y_UNIT;
    if is_big {
        y += BIG_ELEMENT_Y_OFFSET;
    }
    Position::from_decimals(grid.x() * X_UNIT, y, grid.z() * Z_UNIT)
}

/// Convert native coordinates to grid coordinates; the inverse of [`to_native`].
pub fn to_grid(native: Position, is_big: bool) -> Position {
    let mut y = native.y();
    if is_big {
        y -= BIG_ELEMENT_Y_OFFSET;
    }
    Position::from_decimals(native.x() / X_UNIT, y / Y_UNIT, native.z() / Z_UNIT)
}
