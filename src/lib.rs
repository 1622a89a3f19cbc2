//! Rein Arcade
//!
//! A 2D contact solver for arcade-style rigid bodies, built on hecs.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **ecs** - Components stored in the caller's `hecs::World` (bodies, colliders)
//! 2. **physics** - Contact pairs, narrowphase, sequential impulse solver and
//!    the fixed-timestep [`PhysicsWorld`] driver
//!
//! # Example
//!
//! ```
//! use rein_arcade::prelude::*;
//!
//! let mut world = World::new();
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
//!
//! let ground = world.spawn((RigidBody2D::new_static().with_position(Vec2::new(0.0, -0.5)),));
//! physics
//!     .attach_collider(&mut world, ground, ColliderShape::Box { half_extents: Vec2::new(10.0, 0.5) })
//!     .unwrap();
//!
//! let ball = world.spawn((RigidBody2D::new_dynamic(1.0).with_position(Vec2::new(0.0, 3.0)),));
//! physics
//!     .attach_collider(&mut world, ball, ColliderShape::Circle { radius: 0.5 })
//!     .unwrap();
//!
//! for _ in 0..120 {
//!     physics.step(&mut world, 1.0 / 60.0);
//! }
//! assert!(world.get::<&RigidBody2D>(ball).unwrap().position.y > 0.0);
//! ```

pub mod ecs;
pub mod physics;

pub use physics::{ContactSettings, PhysicsConfig, PhysicsError, PhysicsWorld};

pub use glam;
pub use hecs;

/// Commonly used types.
pub mod prelude {
    pub use crate::ecs::prelude::*;
    pub use crate::physics::contact::{ContactEvent, PairId};
    pub use crate::physics::{ContactSettings, PhysicsConfig, PhysicsError, PhysicsWorld};
    pub use glam::Vec2;
}
