//! Arena of live contact pairs keyed by canonical pair identity.

use std::collections::HashMap;

use tracing::debug;

use super::collider::ColliderView;
use super::contact::{ContactPair, PairId};

/// Owns every live [`ContactPair`].
///
/// Pairs live in slots of a flat arena; a hash index maps each [`PairId`] to
/// its slot, and retired slots go on a free list for reuse. A reused slot
/// always receives a freshly built pair, so warm-start impulses never leak
/// from one contact episode into the next.
///
/// Iteration follows slot order, which is deterministic for a given
/// sequence of `resolve`/`retire` calls.
#[derive(Debug, Default)]
pub struct PairRegistry {
    slots: Vec<Option<ContactPair>>,
    index: HashMap<PairId, usize>,
    free: Vec<usize>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pair for `a`/`b`, creating it with zeroed impulses if absent.
    ///
    /// Argument order does not matter. The flag is `true` when the pair was
    /// created by this call.
    pub fn resolve(&mut self, a: &ColliderView, b: &ColliderView) -> (&mut ContactPair, bool) {
        let (a, b) = if a.id > b.id { (a, b) } else { (b, a) };
        let id = PairId::new(a.id, b.id);
        let existing = self.index.get(&id).copied();
        let (slot, created) = match existing {
            Some(slot) => (slot, false),
            None => {
                let slot = self.free.pop().unwrap_or_else(|| {
                    self.slots.push(None);
                    self.slots.len() - 1
                });
                self.index.insert(id, slot);
                debug!(pair = %id, slot, "contact pair created");
                (slot, true)
            }
        };
        // Occupied slots keep their pair; vacant ones get a cold one.
        let pair = self.slots[slot].get_or_insert_with(|| ContactPair::new(a, b));
        (pair, created)
    }

    /// Remove a pair and drop its cached impulses.
    pub fn retire(&mut self, id: PairId) -> Option<ContactPair> {
        let slot = self.index.remove(&id)?;
        let pair = self.slots[slot].take();
        self.free.push(slot);
        debug!(pair = %id, slot, "contact pair retired");
        pair
    }

    /// Ids of pairs whose last positive test is older than `stamp`.
    pub fn stale(&self, stamp: u64) -> Vec<PairId> {
        self.iter()
            .filter(|pair| pair.last_seen() < stamp)
            .map(ContactPair::id)
            .collect()
    }

    #[inline]
    pub fn contains(&self, id: PairId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: PairId) -> Option<&ContactPair> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_ref()
    }

    /// Number of live pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactPair> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ContactPair> {
        self.slots.iter_mut().flatten()
    }
}
