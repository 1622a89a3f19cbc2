//! Sequential impulse contact solver passes over the pair registry.
//!
//! Each pass visits every solvable pair in registry order. The passes must
//! run in this order within a step: [`pre_solve`] for all pairs, then the
//! velocity iterations, then position integration, then the position
//! iterations.

use tracing::trace;

use crate::ecs::components::physics::RigidBody2D;

use super::contact::ContactPair;
use super::registry::PairRegistry;
use super::settings::ContactSettings;

/// Compute solve coefficients and warm start every solvable pair.
pub fn pre_solve(registry: &mut PairRegistry, world: &mut hecs::World, settings: &ContactSettings) {
    for pair in registry.iter_mut().filter(|p| p.is_solvable()) {
        let solved = with_bodies(world, pair, |pair, a, b| pair.pre_solve(a, b, settings));
        if solved && pair.effective_mass() == 0.0 {
            trace!(pair = %pair.id(), "skipping contact between immovable bodies");
        }
    }
}

/// Run `iterations` velocity passes over all solvable pairs.
pub fn solve_velocities(registry: &mut PairRegistry, world: &mut hecs::World, iterations: u32) {
    for _ in 0..iterations {
        for pair in registry.iter_mut().filter(|p| p.is_solvable()) {
            with_bodies(world, pair, |pair, a, b| pair.solve_velocity(a, b));
        }
    }
}

/// Run `iterations` position-correction passes over all solvable pairs.
pub fn solve_positions(
    registry: &mut PairRegistry,
    world: &mut hecs::World,
    settings: &ContactSettings,
    iterations: u32,
) {
    for _ in 0..iterations {
        for pair in registry.iter_mut().filter(|p| p.is_solvable()) {
            with_bodies(world, pair, |pair, a, b| pair.solve_position(a, b, settings));
        }
    }
}

/// Copy both bodies of `pair` out of the world, run `f`, and write them back.
///
/// Returns `false` (and runs nothing) if either body is missing or both
/// colliders share a body.
fn with_bodies<F>(world: &mut hecs::World, pair: &mut ContactPair, f: F) -> bool
where
    F: FnOnce(&mut ContactPair, &mut RigidBody2D, &mut RigidBody2D),
{
    let (entity_a, entity_b) = pair.bodies();
    if entity_a == entity_b {
        return false;
    }

    let (mut a, mut b) = {
        let a = world.get::<&RigidBody2D>(entity_a).ok().map(|rb| *rb);
        let b = world.get::<&RigidBody2D>(entity_b).ok().map(|rb| *rb);
        match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        }
    };

    f(pair, &mut a, &mut b);

    if let Ok(mut rb) = world.get::<&mut RigidBody2D>(entity_a) {
        *rb = a;
    }
    if let Ok(mut rb) = world.get::<&mut RigidBody2D>(entity_b) {
        *rb = b;
    }
    true
}
