//! The layer store: an ordered sequence of text layers.
//!
//! Sequence position is the z-order (later = drawn on top); there is no
//! separate ordering key. Every mutation builds a new sequence and swaps it
//! in whole, so readers holding a `snapshot()` never observe a partial
//! update. Operations naming an unknown id are no-ops and keep the existing
//! snapshot (`ptr_eq` stays true).

use crate::canvas::CanvasSize;
use crate::id::LayerId;
use crate::model::{LayerPatch, TextLayer};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Arc<[TextLayer]>,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    pub fn new() -> Self {
        Self {
            layers: Arc::from(Vec::new()),
        }
    }

    /// Current immutable snapshot of the sequence.
    pub fn snapshot(&self) -> Arc<[TextLayer]> {
        Arc::clone(&self.layers)
    }

    /// True if both stores share the same snapshot (no mutation in between).
    pub fn ptr_eq(&self, other: &LayerStore) -> bool {
        Arc::ptr_eq(&self.layers, &other.layers)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextLayer> {
        self.layers.iter()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn get(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    fn replace(&mut self, layers: Vec<TextLayer>) {
        self.layers = Arc::from(layers);
    }

    /// Append a default layer positioned relative to `canvas`; returns its id.
    /// The caller makes it the selection.
    pub fn add(&mut self, canvas: CanvasSize) -> LayerId {
        let mut id = LayerId::generate();
        // Interned ids from the UI could collide with a generated name.
        while self.contains(id) {
            id = LayerId::generate();
        }
        let mut next = self.layers.to_vec();
        next.push(TextLayer::new(id, canvas));
        self.replace(next);
        log::debug!("store: added {id} ({} layers)", self.len());
        id
    }

    /// Replace the patched fields of layer `id`. Returns false (no-op) if the
    /// id is absent or the patch names nothing.
    pub fn update(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        let Some(index) = self.index_of(id) else {
            log::debug!("store: update of unknown {id} ignored");
            return false;
        };
        if patch.is_empty() {
            return false;
        }
        let mut next = self.layers.to_vec();
        patch.apply(&mut next[index]);
        self.replace(next);
        true
    }

    /// Delete layer `id`. Order of the rest is unchanged.
    pub fn remove(&mut self, id: LayerId) -> bool {
        if !self.contains(id) {
            log::debug!("store: remove of unknown {id} ignored");
            return false;
        }
        let next: Vec<TextLayer> = self.layers.iter().filter(|l| l.id != id).cloned().collect();
        self.replace(next);
        log::debug!("store: removed {id} ({} layers)", self.len());
        true
    }

    /// Swap `id` one position later (towards the top). No-op at the end.
    pub fn move_forward(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.layers.len() => {
                self.swap(i, i + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap `id` one position earlier (towards the bottom). No-op at the start.
    pub fn move_backward(&mut self, id: LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                self.swap(i, i - 1);
                true
            }
            _ => false,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        let mut next = self.layers.to_vec();
        next.swap(a, b);
        self.replace(next);
        log::debug!("store: swapped positions {a} and {b}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_with(n: usize) -> (LayerStore, Vec<LayerId>) {
        let mut store = LayerStore::new();
        let ids = (0..n).map(|_| store.add(CanvasSize::default())).collect();
        (store, ids)
    }

    #[test]
    fn add_appends_in_order() {
        let (store, ids) = store_with(3);
        assert_eq!(store.ids(), ids);
    }

    #[test]
    fn update_unknown_id_keeps_snapshot() {
        let (mut store, _) = store_with(2);
        let before = store.clone();
        assert!(!store.update(LayerId::intern("ghost"), &LayerPatch::text("x")));
        assert!(store.ptr_eq(&before));
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let (mut store, ids) = store_with(1);
        let before = store.clone();
        assert!(!store.update(ids[0], &LayerPatch::default()));
        assert!(store.ptr_eq(&before));
    }

    #[test]
    fn update_leaves_other_layers_identical() {
        let (mut store, ids) = store_with(3);
        let before = store.snapshot();
        store.update(ids[1], &LayerPatch::text("Hello"));
        assert_eq!(store.get(ids[1]).unwrap().text, "Hello");
        assert_eq!(store.get(ids[0]), Some(&before[0]));
        assert_eq!(store.get(ids[2]), Some(&before[2]));
    }

    #[test]
    fn remove_closes_the_gap() {
        let (mut store, ids) = store_with(3);
        assert!(store.remove(ids[1]));
        assert_eq!(store.ids(), vec![ids[0], ids[2]]);
        assert!(!store.remove(ids[1]));
    }

    #[test]
    fn moves_are_no_ops_at_the_boundaries() {
        let (mut store, ids) = store_with(3);
        let before = store.clone();
        assert!(!store.move_forward(ids[2]));
        assert!(!store.move_backward(ids[0]));
        assert!(!store.move_forward(LayerId::intern("missing")));
        assert!(store.ptr_eq(&before));
    }

    #[test]
    fn forward_then_backward_restores_order() {
        let (mut store, ids) = store_with(4);
        store.move_forward(ids[1]);
        assert_eq!(store.ids(), vec![ids[0], ids[2], ids[1], ids[3]]);
        store.move_backward(ids[1]);
        assert_eq!(store.ids(), ids);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutations() {
        let (mut store, ids) = store_with(2);
        let snap = store.snapshot();
        store.remove(ids[0]);
        assert_eq!(snap.len(), 2);
        assert_eq!(store.len(), 1);
    }
}
