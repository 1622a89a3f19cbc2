//! Rigid body integration functions.

use glam::Vec2;

use crate::ecs::components::physics::{RigidBody2D, RigidBodyType};

/// Apply gravity force to all dynamic rigid bodies.
pub fn apply_gravity(world: &mut hecs::World, gravity: Vec2) {
    for (_, rb) in world.query_mut::<&mut RigidBody2D>() {
        if rb.body_type == RigidBodyType::Dynamic && rb.inv_mass > 0.0 {
            rb.force_accumulator += gravity * rb.mass() * rb.gravity_scale;
        }
    }
}

/// Integrate velocities using semi-implicit Euler: v += (F/m) * dt.
pub fn integrate_velocities(world: &mut hecs::World, dt: f32) {
    for (_, rb) in world.query_mut::<&mut RigidBody2D>() {
        if rb.body_type != RigidBodyType::Dynamic || rb.inv_mass <= 0.0 {
            continue;
        }

        rb.linear_velocity += rb.force_accumulator * rb.inv_mass * dt;
        rb.linear_velocity *= (1.0 - rb.linear_damping).max(0.0);
    }
}

/// Integrate positions: p += v * dt.
///
/// Kinematic bodies move with their velocity; static bodies never move.
pub fn integrate_positions(world: &mut hecs::World, dt: f32) {
    for (_, rb) in world.query_mut::<&mut RigidBody2D>() {
        if rb.body_type == RigidBodyType::Static {
            continue;
        }
        rb.position += rb.linear_velocity * dt;
    }
}

/// Clear force accumulators on all rigid bodies.
pub fn clear_forces(world: &mut hecs::World) {
    for (_, rb) in world.query_mut::<&mut RigidBody2D>() {
        rb.force_accumulator = Vec2::ZERO;
    }
}
