use glam::Vec2;
use rein_arcade::ecs::components::physics::{ColliderShape, RigidBody2D};
use rein_arcade::physics::contact::ContactEvent;
use rein_arcade::{PhysicsConfig, PhysicsWorld};

const FRAMES: u32 = 300;
const FRAME_TIME: f64 = 1.0 / 60.0;

struct Scene {
    world: hecs::World,
    physics: PhysicsWorld,
    ball: hecs::Entity,
    stack: Vec<hecs::Entity>,
}

impl Scene {
    fn new(config: PhysicsConfig) -> anyhow::Result<Self> {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(config)?;

        // Ground
        let ground = world.spawn((RigidBody2D::new_static().with_position(Vec2::new(0.0, -0.5)),));
        physics.attach_collider(
            &mut world,
            ground,
            ColliderShape::Box {
                half_extents: Vec2::new(20.0, 0.5),
            },
        )?;

        // A short stack of crates
        let mut stack = Vec::new();
        for i in 0..4 {
            let crate_body = world.spawn((RigidBody2D::new_dynamic(1.0)
                .with_position(Vec2::new(0.0, 0.5 + i as f32 * 1.05)),));
            physics.attach_collider(
                &mut world,
                crate_body,
                ColliderShape::Box {
                    half_extents: Vec2::splat(0.5),
                },
            )?;
            stack.push(crate_body);
        }

        // A bouncy ball thrown at the stack
        let ball = world.spawn((RigidBody2D::new_dynamic(0.5)
            .with_position(Vec2::new(-6.0, 3.0))
            .with_velocity(Vec2::new(6.0, 2.0))
            .with_bounce(0.6),));
        physics.attach_collider(&mut world, ball, ColliderShape::Circle { radius: 0.3 })?;

        // Trigger zone to the right of the stack
        let zone = world.spawn((RigidBody2D::new_static().with_position(Vec2::new(3.0, 1.0)),));
        let trigger = physics
            .new_collider(
                zone,
                ColliderShape::Box {
                    half_extents: Vec2::new(1.0, 1.0),
                },
            )?
            .sensor();
        world.spawn((trigger,));

        Ok(Self {
            world,
            physics,
            ball,
            stack,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        for frame in 0..FRAMES {
            self.physics.step(&mut self.world, FRAME_TIME);

            for event in self.physics.drain_events() {
                match event {
                    ContactEvent::Started { pair, .. } => {
                        log::info!("frame {frame}: contact {pair} started")
                    }
                    ContactEvent::Ended { pair, .. } => {
                        log::info!("frame {frame}: contact {pair} ended")
                    }
                }
            }

            if frame % 60 == 0 {
                let ball = self.world.get::<&RigidBody2D>(self.ball)?;
                log::info!(
                    "frame {frame}: ball at ({:.2}, {:.2}), {} live pairs",
                    ball.position.x,
                    ball.position.y,
                    self.physics.pairs().len()
                );
            }
        }

        for (i, entity) in self.stack.iter().enumerate() {
            let body = self.world.get::<&RigidBody2D>(*entity)?;
            log::info!(
                "crate {i}: position ({:.3}, {:.3}) velocity ({:.3}, {:.3})",
                body.position.x,
                body.position.y,
                body.linear_velocity.x,
                body.linear_velocity.y
            );
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = PhysicsConfig {
        contact: rein_arcade::ContactSettings::new(1.0, 0.2, 0.01)?,
        ..PhysicsConfig::default()
    };
    let mut scene = Scene::new(config)?;
    scene.run()
}
