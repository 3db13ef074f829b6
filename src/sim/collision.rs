//! Collision detection for rectangular entities
//!
//! Both rectangles are shrunk by the tolerance before the overlap test, so a
//! shot that merely grazes a target resolves in the target's favor.

use super::rect::Rect;
use crate::consts::COLLISION_TOLERANCE;

/// Check whether two entities collide, using the default tolerance
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    overlaps_with_tolerance(a, b, COLLISION_TOLERANCE)
}

/// Check whether two rectangles intersect on both axes after insetting
/// each side by `tolerance`
///
/// Symmetric in `a` and `b`. Touching edges never count as a hit.
pub fn overlaps_with_tolerance(a: &Rect, b: &Rect, tolerance: f32) -> bool {
    a.left() + tolerance < b.right()
        && a.right() - tolerance > b.left()
        && a.top() + tolerance < b.bottom()
        && a.bottom() - tolerance > b.top()
}
