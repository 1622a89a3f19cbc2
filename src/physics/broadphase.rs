//! Broadphase collision detection using sort-and-sweep over AABBs.

use crate::ecs::components::physics::{Collider, RigidBody2D};

use super::collider::{Aabb2, ColliderView};

/// Sweep-and-prune broadphase along the x axis.
///
/// Produces candidate collider-entity pairs for the narrow phase. The pair
/// order inside each tuple is not significant.
#[derive(Debug, Default)]
pub struct SweepAndPrune {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    collider: hecs::Entity,
    body: hecs::Entity,
    aabb: Aabb2,
    immovable: bool,
    is_sensor: bool,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find all pairs of collider entities whose AABBs overlap.
    ///
    /// Skips colliders sharing a body, and pairs where neither body can move
    /// unless one side is a sensor.
    pub fn find_pairs(&mut self, world: &hecs::World) -> Vec<(hecs::Entity, hecs::Entity)> {
        self.entries.clear();
        for (entity, collider) in world.query::<&Collider>().iter() {
            let Ok(body) = world.get::<&RigidBody2D>(collider.body) else {
                continue;
            };
            let view = ColliderView::new(entity, collider, &body);
            self.entries.push(Entry {
                collider: entity,
                body: collider.body,
                aabb: view.aabb(),
                immovable: body.inv_mass <= 0.0,
                is_sensor: collider.is_sensor,
            });
        }

        self.entries
            .sort_by(|a, b| a.aabb.min.x.total_cmp(&b.aabb.min.x));

        let mut pairs = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                // Sorted by min.x: nothing further along can overlap on x
                if b.aabb.min.x > a.aabb.max.x {
                    break;
                }
                if a.body == b.body {
                    continue;
                }
                if a.immovable && b.immovable && !(a.is_sensor || b.is_sensor) {
                    continue;
                }
                if a.aabb.overlaps(&b.aabb) {
                    pairs.push((a.collider, b.collider));
                }
            }
        }

        pairs
    }
}
