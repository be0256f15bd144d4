use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::{Element, ElementId};
use crate::position::Position;

static NEXT_REGISTRY_TAG: AtomicU64 = AtomicU64::new(1);

/// Ordered element storage with a secondary index by native position.
///
/// Every element in `elements` appears exactly once in the bucket of
/// `by_position` for its current position, and buckets are never empty.
/// Each registry has a process-unique tag stamped into the handles it issues.
#[derive(Debug, Clone)]
pub struct ElementRegistry {
    tag: u64,
    elements: Vec<(ElementId, Element)>,
    by_position: HashMap<Position, Vec<ElementId>>,
    next_id: u64,
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self {
            tag: NEXT_REGISTRY_TAG.fetch_add(1, Ordering::Relaxed),
            elements: Vec::new(),
            by_position: HashMap::new(),
            next_id: 0,
        }
    }
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` was issued by this registry (it may since have been removed).
    pub fn owns(&self, id: ElementId) -> bool {
        id.registry == self.tag
    }

    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId::new(self.tag, self.next_id);
        self.next_id += 1;
        self.by_position
            .entry(element.position())
            .or_default()
            .push(id);
        self.elements.push((id, element));
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slot(id).map(|i| &self.elements[i].1)
    }

    /// Mutable access for property and rotation edits; use
    /// [`ElementRegistry::move_to`] to change the position.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let i = self.slot(id)?;
        Some(&mut self.elements[i].1)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.slot(id).is_some()
    }

    fn slot(&self, id: ElementId) -> Option<usize> {
        if !self.owns(id) {
            return None;
        }
        self.elements.iter().position(|(eid, _)| *eid == id)
    }

    /// Elements at a native position, in insertion order.
    pub fn at(&self, position: &Position) -> Vec<&Element> {
        self.ids_at(position)
            .iter()
            .filter_map(|id| self.get(*id))
            .collect()
    }

    pub fn ids_at(&self, position: &Position) -> &[ElementId] {
        self.by_position
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Element at `index` in creation order.
    pub fn nth(&self, index: usize) -> Option<(ElementId, &Element)> {
        self.elements.get(index).map(|(id, e)| (*id, e))
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, e)| e.identifier() == identifier)
            .map(|(id, _)| *id)
    }

    /// Move an element, keeping the position index in sync.
    pub fn move_to(&mut self, id: ElementId, position: Position) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        let old = self.elements[i].1.position();
        if old == position {
            return true;
        }
        self.unindex(id, &old);
        self.by_position.entry(position).or_default().push(id);
        self.elements[i].1.set_position(position);
        true
    }

    /// Remove an element from both the sequence and the index.
    ///
    /// Returns `None`, leaving both untouched, if the element is unknown.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let i = self.slot(id)?;
        let position = self.elements[i].1.position();
        self.unindex(id, &position);
        Some(self.elements.remove(i).1)
    }

    fn unindex(&mut self, id: ElementId, position: &Position) {
        if let Some(bucket) = self.by_position.get_mut(position) {
            bucket.retain(|eid| *eid != id);
            if bucket.is_empty() {
                self.by_position.remove(position);
            }
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.by_position.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter().map(|(id, e)| (*id, e))
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().map(|(id, _)| *id)
    }

    /// Checks the sequence/index invariant.
    pub fn is_consistent(&self) -> bool {
        let indexed: usize = self.by_position.values().map(Vec::len).sum();
        indexed == self.elements.len()
            && self.by_position.values().all(|b| !b.is_empty())
            && self
                .elements
                .iter()
                .all(|(id, e)| self.ids_at(&e.position()).contains(id))
    }
}
