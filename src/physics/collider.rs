//! Collider bounds and world-space resolution for collision detection.

use glam::Vec2;

use crate::ecs::components::physics::{Collider, ColliderId, ColliderShape, RigidBody2D};

/// Axis-aligned bounding box for broadphase collision detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb2 {
    /// Test whether two AABBs overlap. Touching boxes overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb2) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

impl ColliderShape {
    /// Compute the world-space AABB for this shape centered at `center`.
    #[inline]
    pub fn compute_aabb(&self, center: Vec2) -> Aabb2 {
        let extent = match self {
            ColliderShape::Circle { radius } => Vec2::splat(*radius),
            ColliderShape::Box { half_extents } => *half_extents,
        };
        Aabb2 {
            min: center - extent,
            max: center + extent,
        }
    }
}

/// A collider resolved against its body for the current step.
#[derive(Debug, Clone, Copy)]
pub struct ColliderView {
    pub entity: hecs::Entity,
    pub id: ColliderId,
    pub body: hecs::Entity,
    pub shape: ColliderShape,
    /// World-space shape center (body position + collider offset).
    pub center: Vec2,
    pub is_sensor: bool,
}

impl ColliderView {
    pub fn new(entity: hecs::Entity, collider: &Collider, body: &RigidBody2D) -> Self {
        Self {
            entity,
            id: collider.id,
            body: collider.body,
            shape: collider.shape,
            center: body.position + collider.offset,
            is_sensor: collider.is_sensor,
        }
    }

    /// Look up a collider entity and its body. `None` if either is gone.
    pub fn resolve(world: &hecs::World, entity: hecs::Entity) -> Option<Self> {
        let collider = *world.get::<&Collider>(entity).ok()?;
        let body = world.get::<&RigidBody2D>(collider.body).ok()?;
        Some(Self::new(entity, &collider, &body))
    }

    #[inline]
    pub fn aabb(&self) -> Aabb2 {
        self.shape.compute_aabb(self.center)
    }
}
