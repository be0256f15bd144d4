use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::element::ElementId;
use crate::error::SavError;

/// A connection point: an element plus its pin index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin {
    pub element: ElementId,
    pub index: u8,
}

impl Pin {
    pub fn new(element: ElementId, index: u8) -> Self {
        Self { element, index }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.element, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WireColor {
    Black,
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
}

impl WireColor {
    /// `ColorName` value written to the save file.
    pub const fn native_name(self) -> &'static str {
        match self {
            WireColor::Black => "黑色导线",
            WireColor::Blue => "蓝色导线",
            WireColor::Red => "红色导线",
            WireColor::Green => "绿色导线",
            WireColor::Yellow => "黄色导线",
        }
    }

    /// Decode a stored `ColorName`; only its first character is significant.
    pub fn from_native(name: &str) -> Option<Self> {
        match name.chars().next()? {
            '黑' => Some(WireColor::Black),
            '蓝' => Some(WireColor::Blue),
            '红' => Some(WireColor::Red),
            '绿' => Some(WireColor::Green),
            '黄' => Some(WireColor::Yellow),
            _ => None,
        }
    }
}

impl FromStr for WireColor {
    type Err = SavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(WireColor::Black),
            "blue" => Ok(WireColor::Blue),
            "red" => Ok(WireColor::Red),
            "green" => Ok(WireColor::Green),
            "yellow" => Ok(WireColor::Yellow),
            _ => WireColor::from_native(s)
                .ok_or_else(|| SavError::ArgumentType(format!("unknown wire color '{s}'"))),
        }
    }
}

impl fmt::Display for WireColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireColor::Black => "black",
            WireColor::Blue => "blue",
            WireColor::Red => "red",
            WireColor::Green => "green",
            WireColor::Yellow => "yellow",
        };
        f.write_str(name)
    }
}

/// An undirected, coloured connection between two pins.
///
/// Equality, ordering and hashing ignore endpoint order, so `(a, b, c)` and
/// `(b, a, c)` are the same wire.
#[derive(Debug, Clone, Copy)]
pub struct Wire {
    pub source: Pin,
    pub target: Pin,
    pub color: WireColor,
}

impl Wire {
    pub fn new(source: Pin, target: Pin, color: WireColor) -> Self {
        Self {
            source,
            target,
            color,
        }
    }

    fn key(&self) -> (Pin, Pin, WireColor) {
        if self.source <= self.target {
            (self.source, self.target, self.color)
        } else {
            (self.target, self.source, self.color)
        }
    }

    pub fn touches(&self, element: ElementId) -> bool {
        self.source.element == element || self.target.element == element
    }
}

impl PartialEq for Wire {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Wire {}

impl Hash for Wire {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Wire {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wire {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {} ({})", self.source, self.target, self.color)
    }
}

/// Deduplicating set of wires, iterated in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireSet {
    wires: BTreeSet<Wire>,
}

impl WireSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an equivalent wire was already present.
    pub fn insert(&mut self, wire: Wire) -> bool {
        self.wires.insert(wire)
    }

    pub fn remove(&mut self, wire: &Wire) -> bool {
        self.wires.remove(wire)
    }

    pub fn contains(&self, wire: &Wire) -> bool {
        self.wires.contains(wire)
    }

    /// Drop every wire attached to `element`, returning how many were removed.
    pub fn remove_touching(&mut self, element: ElementId) -> usize {
        let before = self.wires.len();
        self.wires.retain(|w| !w.touches(element));
        before - self.wires.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter()
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn clear(&mut self) {
        self.wires.clear();
    }
}

impl<'a> IntoIterator for &'a WireSet {
    type Item = &'a Wire;
    type IntoIter = std::collections::btree_set::Iter<'a, Wire>;

    fn into_iter(self) -> Self::IntoIter {
        self.wires.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pin(id: u64, index: u8) -> Pin {
        Pin::new(ElementId::new(0, id), index)
    }

    #[test]
    fn swapped_endpoints_are_equal() {
        let a = Wire::new(pin(1, 0), pin(2, 1), WireColor::Red);
        let b = Wire::new(pin(2, 1), pin(1, 0), WireColor::Red);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);

        let mut hashed = HashSet::new();
        hashed.insert(a);
        assert!(!hashed.insert(b));
    }

    #[test]
    fn color_distinguishes_wires() {
        let a = Wire::new(pin(1, 0), pin(2, 0), WireColor::Red);
        let b = Wire::new(pin(1, 0), pin(2, 0), WireColor::Blue);
        assert_ne!(a, b);
    }

    #[test]
    fn set_dedupes_in_either_direction() {
        let mut set = WireSet::new();
        assert!(set.insert(Wire::new(pin(1, 0), pin(2, 0), WireColor::Blue)));
        assert!(!set.insert(Wire::new(pin(1, 0), pin(2, 0), WireColor::Blue)));
        assert!(!set.insert(Wire::new(pin(2, 0), pin(1, 0), WireColor::Blue)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_touching_drops_attached_wires() {
        let mut set = WireSet::new();
        set.insert(Wire::new(pin(1, 0), pin(2, 0), WireColor::Blue));
        set.insert(Wire::new(pin(3, 0), pin(1, 1), WireColor::Red));
        set.insert(Wire::new(pin(2, 1), pin(3, 1), WireColor::Green));

        assert_eq!(set.remove_touching(ElementId::new(0, 1)), 2);
        assert_eq!(set.len(), 1);
        assert!(set.iter().all(|w| !w.touches(ElementId::new(0, 1))));
    }

    #[test]
    fn colors_parse_from_english_and_native_names() {
        assert_eq!("blue".parse::<WireColor>().unwrap(), WireColor::Blue);
        assert_eq!("Yellow".parse::<WireColor>().unwrap(), WireColor::Yellow);
        assert_eq!("红色导线".parse::<WireColor>().unwrap(), WireColor::Red);
        assert_eq!("黑".parse::<WireColor>().unwrap(), WireColor::Black);
        assert!("purple".parse::<WireColor>().is_err());

        for color in [
            WireColor::Black,
            WireColor::Blue,
            WireColor::Red,
            WireColor::Green,
            WireColor::Yellow,
        ] {
            assert_eq!(WireColor::from_native(color.native_name()), Some(color));
        }
    }
}
