//! Narrowphase collision detection: closed-set dispatch over 2D shape pairs.

use glam::Vec2;

use crate::ecs::components::physics::ColliderShape;

use super::contact::ContactInfo;

/// Exact contact test between two colliders.
///
/// Implementations must be deterministic for a given configuration and
/// return a unit normal pointing from A to B with a non-negative overlap.
/// `None` means "not in contact".
pub trait NarrowPhase {
    fn test(
        &self,
        shape_a: &ColliderShape,
        center_a: Vec2,
        shape_b: &ColliderShape,
        center_b: Vec2,
    ) -> Option<ContactInfo>;
}

/// Default narrow phase for [`ColliderShape`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeNarrowPhase;

impl NarrowPhase for ShapeNarrowPhase {
    #[inline]
    fn test(
        &self,
        shape_a: &ColliderShape,
        center_a: Vec2,
        shape_b: &ColliderShape,
        center_b: Vec2,
    ) -> Option<ContactInfo> {
        detect_collision(shape_a, center_a, shape_b, center_b)
    }
}

/// Normal used when two shape centers coincide.
const FALLBACK_NORMAL: Vec2 = Vec2::Y;

/// Circle-circle test. Touching circles are in contact with zero overlap.
pub fn circle_circle(
    center_a: Vec2,
    radius_a: f32,
    center_b: Vec2,
    radius_b: f32,
) -> Option<ContactInfo> {
    let diff = center_b - center_a;
    let dist_sq = diff.length_squared();
    let min_dist = radius_a + radius_b;

    if dist_sq > min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 {
        diff / dist
    } else {
        FALLBACK_NORMAL
    };

    Some(ContactInfo {
        normal,
        overlap: min_dist - dist,
    })
}

/// Circle-box test with the circle as shape A.
pub fn circle_box(
    center_a: Vec2,
    radius: f32,
    center_b: Vec2,
    half_extents: Vec2,
) -> Option<ContactInfo> {
    // Circle center in box-local space
    let local = center_a - center_b;
    let closest = local.clamp(-half_extents, half_extents);

    if closest == local {
        // Center inside the box: push out through the nearest face
        let depth_x = half_extents.x - local.x.abs();
        let depth_y = half_extents.y - local.y.abs();
        let (axis, depth) = if depth_x < depth_y {
            (Vec2::new(sign(local.x), 0.0), depth_x)
        } else {
            (Vec2::new(0.0, sign(local.y)), depth_y)
        };
        // `axis` points from box to circle; the normal runs circle to box.
        return Some(ContactInfo {
            normal: -axis,
            overlap: depth + radius,
        });
    }

    let diff = closest - local;
    let dist_sq = diff.length_squared();
    if dist_sq > radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 {
        diff / dist
    } else {
        // Center exactly on the boundary: use the face the center sits on
        let on_x = (local.x.abs() - half_extents.x).abs() <= 1e-6;
        if on_x {
            Vec2::new(-sign(local.x), 0.0)
        } else {
            Vec2::new(0.0, -sign(local.y))
        }
    };

    Some(ContactInfo {
        normal,
        overlap: radius - dist,
    })
}

/// Box-box test on axis-aligned boxes (SAT over the two world axes).
pub fn box_box(
    center_a: Vec2,
    half_a: Vec2,
    center_b: Vec2,
    half_b: Vec2,
) -> Option<ContactInfo> {
    let t = center_b - center_a;
    let overlap_x = half_a.x + half_b.x - t.x.abs();
    let overlap_y = half_a.y + half_b.y - t.y.abs();

    if overlap_x < 0.0 || overlap_y < 0.0 {
        return None;
    }

    // Separate along the axis of least penetration, pointing from A to B
    if overlap_x < overlap_y {
        Some(ContactInfo {
            normal: Vec2::new(sign(t.x), 0.0),
            overlap: overlap_x,
        })
    } else {
        Some(ContactInfo {
            normal: Vec2::new(0.0, sign(t.y)),
            overlap: overlap_y,
        })
    }
}

/// Detect collision between two shapes, dispatching on the shape pair.
pub fn detect_collision(
    shape_a: &ColliderShape,
    center_a: Vec2,
    shape_b: &ColliderShape,
    center_b: Vec2,
) -> Option<ContactInfo> {
    match (*shape_a, *shape_b) {
        (ColliderShape::Circle { radius: ra }, ColliderShape::Circle { radius: rb }) => {
            circle_circle(center_a, ra, center_b, rb)
        }
        (ColliderShape::Circle { radius }, ColliderShape::Box { half_extents }) => {
            circle_box(center_a, radius, center_b, half_extents)
        }
        (ColliderShape::Box { half_extents }, ColliderShape::Circle { radius }) => {
            circle_box(center_b, radius, center_a, half_extents).map(|info| ContactInfo {
                normal: -info.normal,
                overlap: info.overlap,
            })
        }
        (
            ColliderShape::Box {
                half_extents: half_a,
            },
            ColliderShape::Box {
                half_extents: half_b,
            },
        ) => box_box(center_a, half_a, center_b, half_b),
    }
}

/// Like `f32::signum`, but zero maps to `+1` so normals never vanish.
#[inline]
fn sign(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}
