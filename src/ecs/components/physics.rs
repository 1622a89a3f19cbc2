//! Physics components for ECS entities.

use std::fmt;

use glam::Vec2;

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Immovable.
    Static,
    /// Moved by its own velocity, but never pushed by contacts.
    Kinematic,
}

/// 2D rigid body component.
///
/// Only the contact solver and the integrator write to `position` and
/// `linear_velocity`; everything else is owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody2D {
    pub body_type: RigidBodyType,
    pub position: Vec2,
    pub linear_velocity: Vec2,
    /// Inverse mass. Zero for static, kinematic and infinite-mass bodies.
    pub inv_mass: f32,
    pub force_accumulator: Vec2,
    /// Linear damping factor (default: 0.0).
    pub linear_damping: f32,
    /// Friction coefficient (0.0 - 1.0).
    pub friction: f32,
    /// Coefficient of restitution (0.0 - 1.0).
    pub bounce: f32,
    /// Gravity scale (default: 1.0).
    pub gravity_scale: f32,
}

impl RigidBody2D {
    /// Create a new dynamic rigid body with the given mass.
    ///
    /// A non-positive mass produces an infinite-mass body.
    pub fn new_dynamic(mass: f32) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Vec2::ZERO,
            linear_velocity: Vec2::ZERO,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            force_accumulator: Vec2::ZERO,
            linear_damping: 0.0,
            friction: 0.5,
            bounce: 0.0,
            gravity_scale: 1.0,
        }
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            position: Vec2::ZERO,
            linear_velocity: Vec2::ZERO,
            inv_mass: 0.0,
            force_accumulator: Vec2::ZERO,
            linear_damping: 0.0,
            friction: 0.5,
            bounce: 0.0,
            gravity_scale: 0.0,
        }
    }

    /// Create a new kinematic rigid body.
    pub fn new_kinematic() -> Self {
        Self {
            body_type: RigidBodyType::Kinematic,
            ..Self::new_static()
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        self.bounce = bounce;
        self
    }

    /// Mass of the body, or `0.0` when the body has infinite mass.
    #[inline]
    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 {
            1.0 / self.inv_mass
        } else {
            0.0
        }
    }
}

/// Stable identifier of a collider, used to build pair identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(pub u32);

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out collider ids that are unique for the lifetime of the generator.
#[derive(Debug, Default)]
pub struct ColliderIdGenerator {
    next: u32,
}

impl ColliderIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` once the id space is exhausted.
    pub fn next_id(&mut self) -> Option<ColliderId> {
        let id = ColliderId(self.next);
        self.next = self.next.checked_add(1)?;
        Some(id)
    }
}

/// Collider shape. Shapes are axis-aligned; bodies do not rotate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

/// Collision detection component.
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub id: ColliderId,
    /// Entity carrying the owning [`RigidBody2D`]. May be the collider's own entity.
    pub body: hecs::Entity,
    pub shape: ColliderShape,
    /// Offset from the body's position.
    pub offset: Vec2,
    /// If true, generates contact events but no physics response.
    pub is_sensor: bool,
}

impl Collider {
    pub fn new(id: ColliderId, body: hecs::Entity, shape: ColliderShape) -> Self {
        Self {
            id,
            body,
            shape,
            offset: Vec2::ZERO,
            is_sensor: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }
}
