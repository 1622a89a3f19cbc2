//! Scene builders shared by the physics benchmarks.

use glam::Vec2;
use rein_arcade::ecs::components::physics::{ColliderShape, RigidBody2D};
use rein_arcade::{PhysicsConfig, PhysicsWorld};

/// Deterministic pseudo-random sequence (xorshift32) so runs are comparable.
pub struct XorShift(u32);

impl XorShift {
    pub fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    /// Next value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        (self.0 >> 8) as f32 / (1u32 << 24) as f32
    }
}

fn spawn(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    body: RigidBody2D,
    shape: ColliderShape,
) -> anyhow::Result<hecs::Entity> {
    let entity = world.spawn((body,));
    physics.attach_collider(world, entity, shape)?;
    Ok(entity)
}

/// `n` dynamic circles packed into a square so many of them touch.
pub fn setup_circle_world(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    let mut physics = PhysicsWorld::new(PhysicsConfig::default())?;
    let side = (n as f32).sqrt().ceil().max(1.0);
    let mut rng = XorShift::new(7);

    for _ in 0..n {
        let pos = Vec2::new(rng.next_f32(), rng.next_f32()) * side;
        spawn(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(pos),
            ColliderShape::Circle { radius: 0.5 },
        )?;
    }
    Ok((world, physics))
}

/// Same density as [`setup_circle_world`] but spread ten times wider.
pub fn setup_sparse_world(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    let mut physics = PhysicsWorld::new(PhysicsConfig::default())?;
    let side = (n as f32).sqrt().ceil().max(1.0) * 10.0;
    let mut rng = XorShift::new(11);

    for _ in 0..n {
        let pos = Vec2::new(rng.next_f32(), rng.next_f32()) * side;
        spawn(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(pos),
            ColliderShape::Circle { radius: 0.5 },
        )?;
    }
    Ok((world, physics))
}

/// Columns of boxes and circles resting on a static floor.
pub fn setup_stack_scene(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    let mut physics = PhysicsWorld::new(PhysicsConfig::default())?;
    let columns = (n as f32).sqrt().ceil().max(1.0) as usize;

    spawn(
        &mut world,
        &mut physics,
        RigidBody2D::new_static().with_position(Vec2::new(columns as f32, -0.5)),
        ColliderShape::Box {
            half_extents: Vec2::new(columns as f32 * 2.0, 0.5),
        },
    )?;

    for i in 0..n {
        let column = i % columns;
        let row = i / columns;
        let pos = Vec2::new(column as f32 * 2.0, row as f32 * 1.0 + 0.5);
        let shape = if i % 2 == 0 {
            ColliderShape::Box {
                half_extents: Vec2::splat(0.5),
            }
        } else {
            ColliderShape::Circle { radius: 0.5 }
        };
        spawn(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(pos),
            shape,
        )?;
    }
    Ok((world, physics))
}
