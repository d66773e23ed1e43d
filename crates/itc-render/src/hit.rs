//! Hit testing: point → layer lookup.
//!
//! Walks text nodes front-to-back and tests the point against each node's
//! text box in node-local space, so rotation and scale are honoured. The
//! background and the image are never hit targets: a miss means the click
//! landed on empty canvas.

use crate::scene::Scene;
use itc_core::id::LayerId;
use kurbo::Point;

/// Find the topmost layer at canvas position (px, py).
pub fn hit_test(scene: &Scene, px: f32, py: f32) -> Option<LayerId> {
    let p = Point::new(px as f64, py as f64);
    scene
        .texts
        .iter()
        .rev()
        .find(|node| {
            let t = node.transform();
            // Zero scale collapses the box; nothing to hit.
            if t.determinant().abs() < f64::EPSILON {
                return false;
            }
            let local = t.inverse() * p;
            node.local_bounds().contains(local)
        })
        .map(|node| node.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itc_core::{CanvasSize, Color, LayerPatch, LayerStore};

    const CANVAS: CanvasSize = CanvasSize::new(200.0, 200.0);

    fn place(store: &mut LayerStore, patch: LayerPatch) -> LayerId {
        let id = store.add(CANVAS);
        store.update(id, &patch);
        id
    }

    fn at(x: f32, y: f32) -> LayerPatch {
        LayerPatch {
            x: Some(x),
            y: Some(y),
            ..LayerPatch::default()
        }
    }

    fn scene(store: &LayerStore) -> Scene {
        Scene::compose(&store.snapshot(), CANVAS, Color::WHITE, true, None)
    }

    #[test]
    fn miss_on_empty_canvas() {
        let mut store = LayerStore::new();
        place(&mut store, at(0.0, 0.0));
        // Default text box is 200 wide and 36 tall.
        assert_eq!(hit_test(&scene(&store), 100.0, 150.0), None);
    }

    #[test]
    fn topmost_layer_wins() {
        let mut store = LayerStore::new();
        let a = place(&mut store, at(0.0, 0.0));
        let b = place(&mut store, at(0.0, 10.0));
        assert_eq!(hit_test(&scene(&store), 50.0, 20.0), Some(b));
        store.move_backward(b);
        assert_eq!(hit_test(&scene(&store), 50.0, 20.0), Some(a));
        // Only `a` covers y = 5.
        assert_eq!(hit_test(&scene(&store), 50.0, 5.0), Some(a));
    }

    #[test]
    fn rotation_is_respected() {
        let mut store = LayerStore::new();
        let mut patch = at(100.0, 0.0);
        patch.rotation = Some(90.0);
        let a = place(&mut store, patch);
        // Rotated 90° clockwise about (100, 0): the box now extends down
        // the canvas and to the left of the anchor.
        assert_eq!(hit_test(&scene(&store), 90.0, 150.0), Some(a));
        assert_eq!(hit_test(&scene(&store), 150.0, 10.0), None);
    }

    #[test]
    fn scale_grows_the_hit_area() {
        let mut store = LayerStore::new();
        let mut patch = at(0.0, 0.0);
        patch.scale = Some(2.0);
        let a = place(&mut store, patch);
        assert_eq!(hit_test(&scene(&store), 10.0, 60.0), Some(a));
    }
}
