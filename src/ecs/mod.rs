//! hecs ECS integration: components the physics world reads and writes.

pub mod components;

pub mod prelude {
    pub use super::components::physics::{
        Collider, ColliderId, ColliderShape, RigidBody2D, RigidBodyType,
    };
    pub use hecs::{Entity, World};
}
