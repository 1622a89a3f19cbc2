//! CPU-based 2D contact resolution with a sequential impulse solver.
//!
//! # Architecture
//!
//! The physics pipeline runs in a fixed timestep loop:
//!
//! 1. Apply forces (gravity) and integrate velocities
//! 2. Broadphase collision detection (sweep and prune over AABBs)
//! 3. Narrowphase tests; create, update and retire contact pairs
//! 4. Pre-solve every live pair (solve coefficients + warm start)
//! 5. Velocity iterations (sequential impulse, normal then friction)
//! 6. Integrate positions
//! 7. Position iterations (Baumgarte correction)
//! 8. Clear force accumulators
//!
//! Contact pairs persist across steps in a [`PairRegistry`] so the impulses
//! of one step seed the next.

pub mod broadphase;
pub mod collider;
pub mod contact;
pub mod error;
pub mod narrowphase;
pub mod registry;
pub mod rigid_body;
pub mod settings;
pub mod solver;

use glam::Vec2;
use tracing::{trace, warn};

use crate::ecs::components::physics::{
    Collider, ColliderIdGenerator, ColliderShape, RigidBody2D,
};

use self::broadphase::SweepAndPrune;
use self::collider::ColliderView;
use self::contact::{ContactEvent, PairId};
use self::narrowphase::{NarrowPhase, ShapeNarrowPhase};

pub use self::error::PhysicsError;
pub use self::registry::PairRegistry;
pub use self::settings::ContactSettings;

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -9.81).
    pub gravity: Vec2,
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per frame. Default: 4.
    pub max_substeps: u32,
    /// Velocity solver iterations per step. Default: 8.
    pub velocity_iterations: u32,
    /// Position correction iterations per step. Default: 3. Zero disables
    /// position correction.
    pub position_iterations: u32,
    /// Contact tunables shared by every pair.
    pub contact: ContactSettings,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
            velocity_iterations: 8,
            position_iterations: 3,
            contact: ContactSettings::default(),
        }
    }
}

impl PhysicsConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.fixed_timestep.is_finite() || self.fixed_timestep <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(self.fixed_timestep));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidSubsteps);
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidVelocityIterations);
        }
        self.contact.validate()
    }
}

/// The main physics world managing contact state.
///
/// Bodies and colliders live in a caller-owned `hecs::World`; this type owns
/// only the persistent contact pairs and the step driver.
pub struct PhysicsWorld<N = ShapeNarrowPhase> {
    config: PhysicsConfig,
    accumulator: f64,
    broadphase: SweepAndPrune,
    narrowphase: N,
    pairs: PairRegistry,
    collider_ids: ColliderIdGenerator,
    events: Vec<ContactEvent>,
    /// Incremented once per contact step; pairs not seen in the current
    /// step are retired.
    stamp: u64,
}

impl PhysicsWorld<ShapeNarrowPhase> {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        Self::with_narrowphase(config, ShapeNarrowPhase)
    }
}

impl<N: NarrowPhase> PhysicsWorld<N> {
    /// Create a physics world with a custom narrow phase.
    pub fn with_narrowphase(config: PhysicsConfig, narrowphase: N) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            accumulator: 0.0,
            broadphase: SweepAndPrune::new(),
            narrowphase,
            pairs: PairRegistry::new(),
            collider_ids: ColliderIdGenerator::new(),
            events: Vec::new(),
            stamp: 0,
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Live contact pairs.
    pub fn pairs(&self) -> &PairRegistry {
        &self.pairs
    }

    /// Build a collider with a fresh id. The caller spawns it.
    pub fn new_collider(
        &mut self,
        body: hecs::Entity,
        shape: ColliderShape,
    ) -> Result<Collider, PhysicsError> {
        let id = self
            .collider_ids
            .next_id()
            .ok_or(PhysicsError::ColliderIdsExhausted)?;
        Ok(Collider::new(id, body, shape))
    }

    /// Attach a new collider directly to a body entity.
    ///
    /// # Errors
    ///
    /// Fails if `body` does not exist or carries no [`RigidBody2D`].
    pub fn attach_collider(
        &mut self,
        world: &mut hecs::World,
        body: hecs::Entity,
        shape: ColliderShape,
    ) -> Result<Collider, PhysicsError> {
        world.get::<&RigidBody2D>(body)?;
        let collider = self.new_collider(body, shape)?;
        world
            .insert_one(body, collider)
            .map_err(|_| hecs::ComponentError::NoSuchEntity)?;
        Ok(collider)
    }

    /// Take the contact events produced since the last call.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, ContactEvent> {
        self.events.drain(..)
    }

    /// Step the physics simulation forward by `delta_time` seconds.
    ///
    /// Uses a fixed timestep accumulator to ensure deterministic simulation.
    ///
    /// A non-finite `delta_time` is ignored.
    pub fn step(&mut self, world: &mut hecs::World, delta_time: f64) {
        if !delta_time.is_finite() {
            warn!(delta_time, "ignoring non-finite physics delta");
            return;
        }
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.fixed_step(world, self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            warn!(
                dropped = self.accumulator,
                "physics falling behind, dropping accumulated time"
            );
            self.accumulator = 0.0;
        }
    }

    fn fixed_step(&mut self, world: &mut hecs::World, dt: f32) {
        // 1. Apply forces (gravity) and integrate velocities
        rigid_body::apply_gravity(world, self.config.gravity);
        rigid_body::integrate_velocities(world, dt);

        // 2. Broadphase collision detection
        let candidates = self.broadphase.find_pairs(world);

        // 3-7. Contacts, solve, integrate positions
        self.step_contacts(world, &candidates, dt);

        // 8. Clear force accumulators
        rigid_body::clear_forces(world);
    }

    /// Run one contact step for the given candidate collider pairs.
    ///
    /// Tests every candidate, keeps the registry in sync, solves velocities,
    /// integrates positions by `dt` and corrects remaining penetration.
    pub fn step_contacts(
        &mut self,
        world: &mut hecs::World,
        candidates: &[(hecs::Entity, hecs::Entity)],
        dt: f32,
    ) {
        self.update_pairs(world, candidates);
        trace!(
            candidates = candidates.len(),
            live = self.pairs.len(),
            "contact step"
        );

        let contact = self.config.contact;
        solver::pre_solve(&mut self.pairs, world, &contact);
        solver::solve_velocities(&mut self.pairs, world, self.config.velocity_iterations);
        rigid_body::integrate_positions(world, dt);
        solver::solve_positions(
            &mut self.pairs,
            world,
            &contact,
            self.config.position_iterations,
        );
    }

    /// Narrow phase over the candidates: create pairs that start touching,
    /// refresh pairs that keep touching, retire everything else.
    fn update_pairs(&mut self, world: &hecs::World, candidates: &[(hecs::Entity, hecs::Entity)]) {
        self.stamp += 1;
        let stamp = self.stamp;

        for &(entity_a, entity_b) in candidates {
            let (Some(a), Some(b)) = (
                ColliderView::resolve(world, entity_a),
                ColliderView::resolve(world, entity_b),
            ) else {
                continue;
            };
            if a.body == b.body || a.id == b.id {
                continue;
            }
            // Canonical order: the larger id is always collider A
            let (a, b) = if a.id > b.id { (a, b) } else { (b, a) };

            match self.narrowphase.test(&a.shape, a.center, &b.shape, b.center) {
                Some(info) => {
                    let (pair, created) = self.pairs.resolve(&a, &b);
                    pair.set_contact(Some(info), stamp);
                    if created {
                        self.events.push(ContactEvent::Started {
                            pair: pair.id(),
                            collider_a: a.entity,
                            collider_b: b.entity,
                        });
                    }
                }
                None => self.retire(PairId::new(a.id, b.id)),
            }
        }

        for id in self.pairs.stale(stamp) {
            self.retire(id);
        }
    }

    fn retire(&mut self, id: PairId) {
        if let Some(pair) = self.pairs.retire(id) {
            let (collider_a, collider_b) = pair.colliders();
            self.events.push(ContactEvent::Ended {
                pair: id,
                collider_a,
                collider_b,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::physics::contact::ContactInfo;

    fn spawn_body(
        world: &mut hecs::World,
        physics: &mut PhysicsWorld,
        body: RigidBody2D,
        shape: ColliderShape,
    ) -> hecs::Entity {
        let entity = world.spawn((body,));
        physics.attach_collider(world, entity, shape).unwrap();
        entity
    }

    fn no_gravity() -> PhysicsConfig {
        PhysicsConfig {
            gravity: Vec2::ZERO,
            ..PhysicsConfig::default()
        }
    }

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, Vec2::new(0.0, -9.81));
        assert!((config.fixed_timestep - 1.0 / 60.0).abs() < 1e-10);
        assert_eq!(config.max_substeps, 4);
        assert_eq!(config.velocity_iterations, 8);
        assert_eq!(config.position_iterations, 3);
        assert_eq!(config.contact, ContactSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PhysicsConfig {
            velocity_iterations: 0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            PhysicsWorld::new(config),
            Err(PhysicsError::InvalidVelocityIterations)
        ));

        let config = PhysicsConfig {
            fixed_timestep: 0.0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            PhysicsWorld::new(config),
            Err(PhysicsError::InvalidTimestep(_))
        ));
    }

    #[test]
    fn test_attach_collider_requires_body() -> anyhow::Result<()> {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default())?;
        let not_a_body = world.spawn(());

        let result = physics.attach_collider(
            &mut world,
            not_a_body,
            ColliderShape::Circle { radius: 1.0 },
        );
        assert!(matches!(result, Err(PhysicsError::Ecs(_))));

        let body = world.spawn((RigidBody2D::new_static(),));
        let first = physics.attach_collider(&mut world, body, ColliderShape::Circle { radius: 1.0 })?;
        let second = physics.new_collider(body, ColliderShape::Circle { radius: 1.0 })?;
        assert_ne!(first.id, second.id);
        assert_eq!(world.get::<&Collider>(body)?.id, first.id);
        Ok(())
    }

    #[test]
    fn test_physics_world_free_fall() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();

        let entity = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(Vec2::new(0.0, 10.0)),
            ColliderShape::Circle { radius: 0.5 },
        );

        // Simulate ~1 second
        for _ in 0..60 {
            physics.step(&mut world, 1.0 / 60.0);
        }

        let rb = world.get::<&RigidBody2D>(entity).unwrap();
        assert!(
            rb.position.y < 10.0,
            "Body should have fallen: y = {}",
            rb.position.y
        );
        assert!(physics.pairs().is_empty());
    }

    #[test]
    fn test_physics_world_collision() {
        let mut world = hecs::World::new();
        let config = PhysicsConfig {
            contact: ContactSettings::new(1.0, 0.2, 0.01).unwrap(),
            ..PhysicsConfig::default()
        };
        let mut physics = PhysicsWorld::new(config).unwrap();

        // Dynamic box falling
        let dynamic_entity = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(Vec2::new(0.0, 2.0)),
            ColliderShape::Box {
                half_extents: Vec2::splat(0.5),
            },
        );

        // Static ground (large box with its top at y=0)
        spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_static().with_position(Vec2::new(0.0, -0.5)),
            ColliderShape::Box {
                half_extents: Vec2::new(50.0, 0.5),
            },
        );

        // Simulate 3 seconds
        for _ in 0..180 {
            physics.step(&mut world, 1.0 / 60.0);
        }

        let rb = world.get::<&RigidBody2D>(dynamic_entity).unwrap();

        // Resting on the ground: center near y=0.5, within the allowed slop
        assert!(
            rb.position.y > 0.4 && rb.position.y < 0.6,
            "Box should rest on the ground: y = {}",
            rb.position.y
        );
        let speed = rb.linear_velocity.length();
        assert!(speed < 0.5, "Box should have settled: speed = {}", speed);
        assert_eq!(physics.pairs().len(), 1);
    }

    #[test]
    fn test_pair_lifecycle_and_events() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();

        let a = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_velocity(Vec2::new(-3.0, 0.0)),
            ColliderShape::Circle { radius: 0.5 },
        );
        spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0)
                .with_position(Vec2::new(0.9, 0.0))
                .with_velocity(Vec2::new(3.0, 0.0)),
            ColliderShape::Circle { radius: 0.5 },
        );

        // Overlapping at start: the pair is created.
        physics.step(&mut world, 1.0 / 60.0);
        assert_eq!(physics.pairs().len(), 1);
        let events: Vec<ContactEvent> = physics.drain_events().collect();
        assert!(matches!(events.as_slice(), [ContactEvent::Started { .. }]));
        let id = events[0].pair();
        assert!(physics.pairs().get(id).is_some_and(|pair| pair.in_collision()));

        // Separating: after a few steps the pair is retired.
        for _ in 0..10 {
            physics.step(&mut world, 1.0 / 60.0);
        }
        assert!(physics.pairs().is_empty());
        assert!(physics.pairs().get(id).is_none());
        let events: Vec<ContactEvent> = physics.drain_events().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ContactEvent::Ended { pair, .. } if pair == id));

        assert!(world.get::<&RigidBody2D>(a).unwrap().position.x < 0.0);
    }

    #[test]
    fn test_missing_candidate_retires_pair() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();
        let shape = ColliderShape::Circle { radius: 0.5 };

        let a = spawn_body(&mut world, &mut physics, RigidBody2D::new_dynamic(1.0), shape);
        let b = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(Vec2::new(0.8, 0.0)),
            shape,
        );

        physics.step_contacts(&mut world, &[(a, b)], 1.0 / 60.0);
        assert_eq!(physics.pairs().len(), 1);

        // The broad phase stopped proposing the pair.
        physics.step_contacts(&mut world, &[], 1.0 / 60.0);
        assert!(physics.pairs().is_empty());
    }

    #[test]
    fn test_candidate_order_does_not_matter() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();
        let shape = ColliderShape::Circle { radius: 0.5 };

        let a = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_velocity(Vec2::new(1.0, 0.0)),
            shape,
        );
        let b = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(Vec2::new(0.9, 0.0)),
            shape,
        );

        physics.step_contacts(&mut world, &[(a, b)], 0.0);
        let first = physics.pairs().iter().next().unwrap().clone();
        physics.step_contacts(&mut world, &[(b, a)], 0.0);
        let second = physics.pairs().iter().next().unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(first.normal(), second.normal());
        assert_eq!(first.colliders(), second.colliders());
        assert!(physics.drain_events().count() == 1, "only the start event");
    }

    #[test]
    fn test_sensor_reports_but_does_not_push() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();
        let shape = ColliderShape::Circle { radius: 0.5 };

        let mover = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_velocity(Vec2::new(1.0, 0.0)),
            shape,
        );
        let zone = world.spawn((RigidBody2D::new_static().with_position(Vec2::new(0.5, 0.0)),));
        let sensor = physics.new_collider(zone, shape).unwrap().sensor();
        world.insert_one(zone, sensor).unwrap();

        physics.step(&mut world, 1.0 / 60.0);

        assert_eq!(physics.pairs().len(), 1);
        assert!(physics.pairs().iter().all(|p| p.is_sensor()));
        assert_eq!(physics.drain_events().count(), 1);
        let rb = world.get::<&RigidBody2D>(mover).unwrap();
        assert_eq!(rb.linear_velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_warm_start_persists_while_touching() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();

        let ball = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(Vec2::new(0.0, 0.5)),
            ColliderShape::Circle { radius: 0.5 },
        );
        spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_static().with_position(Vec2::new(0.0, -0.5)),
            ColliderShape::Box {
                half_extents: Vec2::new(5.0, 0.5),
            },
        );

        for _ in 0..30 {
            physics.step(&mut world, 1.0 / 60.0);
        }

        let pair = physics.pairs().iter().next().expect("ball should rest on ground");
        // Supporting one unit of mass against gravity for one step
        let expected = 9.81 / 60.0;
        assert!(
            (pair.normal_impulse() - expected).abs() < 1e-3,
            "normal impulse = {}",
            pair.normal_impulse()
        );
        let rb = world.get::<&RigidBody2D>(ball).unwrap();
        assert!(rb.linear_velocity.length() < 1e-3);
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let entity = spawn_body(
            &mut world,
            &mut physics,
            RigidBody2D::new_dynamic(1.0).with_position(Vec2::new(0.0, 10.0)),
            ColliderShape::Circle { radius: 0.5 },
        );

        physics.step(&mut world, f64::NAN);
        physics.step(&mut world, f64::INFINITY);
        assert_eq!(physics.accumulator, 0.0);

        physics.step(&mut world, 1.0 / 60.0);
        let rb = world.get::<&RigidBody2D>(entity).unwrap();
        assert!(rb.position.y < 10.0, "y = {}", rb.position.y);
    }

    /// Narrow phase that records every call and reports a fixed answer.
    #[derive(Default)]
    struct RecordingNarrowPhase {
        calls: RefCell<Vec<(Vec2, Vec2)>>,
        touching: Cell<bool>,
    }

    impl NarrowPhase for &RecordingNarrowPhase {
        fn test(
            &self,
            _shape_a: &ColliderShape,
            center_a: Vec2,
            _shape_b: &ColliderShape,
            center_b: Vec2,
        ) -> Option<ContactInfo> {
            self.calls.borrow_mut().push((center_a, center_b));
            self.touching.get().then(|| ContactInfo {
                normal: (center_b - center_a).normalize_or(Vec2::Y),
                overlap: 0.0,
            })
        }
    }

    #[test]
    fn test_custom_narrowphase_drives_pairs() -> anyhow::Result<()> {
        let recorder = RecordingNarrowPhase::default();
        recorder.touching.set(true);
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::with_narrowphase(no_gravity(), &recorder)?;
        let shape = ColliderShape::Circle { radius: 0.5 };

        // Ids are handed out in spawn order, so `hi` carries the larger id.
        let lo = world.spawn((RigidBody2D::new_static(),));
        physics.attach_collider(&mut world, lo, shape)?;
        let hi = world.spawn((RigidBody2D::new_static().with_position(Vec2::new(5.0, 0.0)),));
        physics.attach_collider(&mut world, hi, shape)?;

        let hi_center = Vec2::new(5.0, 0.0);
        for candidates in [[(lo, hi)], [(hi, lo)]] {
            recorder.calls.borrow_mut().clear();
            physics.step_contacts(&mut world, &candidates, 0.0);
            assert_eq!(*recorder.calls.borrow(), vec![(hi_center, Vec2::ZERO)]);
        }

        assert_eq!(physics.pairs().len(), 1);
        let pair = physics.pairs().iter().next().unwrap();
        assert_eq!(pair.colliders(), (hi, lo));
        assert_eq!(pair.normal(), Vec2::NEG_X);
        assert!(matches!(
            physics.drain_events().collect::<Vec<_>>().as_slice(),
            [ContactEvent::Started { collider_a, .. }] if *collider_a == hi
        ));

        // Reporting no contact retires the pair.
        recorder.touching.set(false);
        physics.step_contacts(&mut world, &[(lo, hi)], 0.0);
        assert_eq!(recorder.calls.borrow().len(), 2);
        assert!(physics.pairs().is_empty());
        assert!(matches!(
            physics.drain_events().collect::<Vec<_>>().as_slice(),
            [ContactEvent::Ended { collider_a, collider_b, .. }] if *collider_a == hi && *collider_b == lo
        ));
        Ok(())
    }
}
