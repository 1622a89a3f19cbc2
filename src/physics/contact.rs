//! Contact data structures and the per-pair sequential impulse solve.

use std::fmt;

use glam::Vec2;

use crate::ecs::components::physics::{ColliderId, RigidBody2D};

use super::collider::ColliderView;
use super::settings::ContactSettings;

/// Result of a positive narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Unit contact normal (from shape A to shape B).
    pub normal: Vec2,
    /// Penetration depth. Never negative.
    pub overlap: f32,
}

/// Order-independent identity of a collider pair.
///
/// The larger collider id is packed into the high half, so `(a, b)` and
/// `(b, a)` produce the same key and distinct pairs never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairId(u64);

impl PairId {
    #[inline]
    pub fn new(a: ColliderId, b: ColliderId) -> Self {
        let (hi, lo) = if a > b { (a, b) } else { (b, a) };
        Self((u64::from(hi.0) << 32) | u64::from(lo.0))
    }

    /// Collider with the larger id.
    #[inline]
    pub fn hi(self) -> ColliderId {
        ColliderId((self.0 >> 32) as u32)
    }

    /// Collider with the smaller id.
    #[inline]
    pub fn lo(self) -> ColliderId {
        ColliderId(self.0 as u32)
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}&{}", self.hi(), self.lo())
    }
}

/// Emitted when a pair starts or stops touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Started {
        pair: PairId,
        collider_a: hecs::Entity,
        collider_b: hecs::Entity,
    },
    Ended {
        pair: PairId,
        collider_a: hecs::Entity,
        collider_b: hecs::Entity,
    },
}

impl ContactEvent {
    pub fn pair(&self) -> PairId {
        match self {
            ContactEvent::Started { pair, .. } | ContactEvent::Ended { pair, .. } => *pair,
        }
    }
}

/// Persistent solver state for one collider pair.
///
/// Collider A is always the collider with the larger id, so the normal and
/// the sign of the cached impulses mean the same thing from frame to frame.
/// Normal and tangent impulses survive across steps for warm starting; the
/// position impulse is reset by every [`pre_solve`](Self::pre_solve).
#[derive(Debug, Clone)]
pub struct ContactPair {
    id: PairId,
    collider_a: hecs::Entity,
    collider_b: hecs::Entity,
    body_a: hecs::Entity,
    body_b: hecs::Entity,
    is_sensor: bool,
    in_collision: bool,
    /// Step stamp of the last positive narrow-phase test.
    last_seen: u64,

    normal_impulse: f32,
    tangent_impulse: f32,
    position_impulse: f32,

    normal: Vec2,
    overlap: f32,
    /// `pos_b - pos_a` captured at pre-solve, used to track drift.
    offset: Vec2,
    /// `1 / (inv_mass_a + inv_mass_b)`, zero when both bodies are immovable.
    mass: f32,
    friction: f32,
    bias: f32,
}

impl ContactPair {
    /// Create a pair with zeroed impulses. The collider with the larger id
    /// becomes collider A whatever the argument order.
    pub fn new(a: &ColliderView, b: &ColliderView) -> Self {
        let (a, b) = if a.id > b.id { (a, b) } else { (b, a) };
        Self {
            id: PairId::new(a.id, b.id),
            collider_a: a.entity,
            collider_b: b.entity,
            body_a: a.body,
            body_b: b.body,
            is_sensor: a.is_sensor || b.is_sensor,
            in_collision: false,
            last_seen: 0,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            position_impulse: 0.0,
            normal: Vec2::ZERO,
            overlap: 0.0,
            offset: Vec2::ZERO,
            mass: 0.0,
            friction: 0.0,
            bias: 0.0,
        }
    }

    /// Store this step's narrow-phase result.
    pub fn set_contact(&mut self, info: Option<ContactInfo>, stamp: u64) {
        match info {
            Some(info) => {
                self.in_collision = true;
                self.normal = info.normal;
                self.overlap = info.overlap.max(0.0);
                self.last_seen = stamp;
            }
            None => self.in_collision = false,
        }
    }

    /// Prepare this step's solve coefficients and apply last step's impulses.
    pub fn pre_solve(
        &mut self,
        a: &mut RigidBody2D,
        b: &mut RigidBody2D,
        settings: &ContactSettings,
    ) {
        let normal = self.normal;
        let tangent = normal.perp();

        self.offset = b.position - a.position;
        self.position_impulse = 0.0;

        let inv_mass_sum = a.inv_mass + b.inv_mass;
        if inv_mass_sum <= 0.0 {
            self.mass = 0.0;
            self.bias = 0.0;
            return;
        }

        // Warm start
        let impulse = normal * self.normal_impulse + tangent * self.tangent_impulse;
        a.linear_velocity -= impulse * a.inv_mass;
        b.linear_velocity += impulse * b.inv_mass;

        let rel_vel = (b.linear_velocity - a.linear_velocity).dot(normal);
        self.bias = if rel_vel < -settings.bounce_threshold() {
            -a.bounce.max(b.bounce) * rel_vel
        } else {
            0.0
        };
        self.mass = 1.0 / inv_mass_sum;
        self.friction = a.friction.min(b.friction);
    }

    /// One velocity iteration: normal impulse first, then friction.
    pub fn solve_velocity(&mut self, a: &mut RigidBody2D, b: &mut RigidBody2D) {
        if self.mass == 0.0 {
            return;
        }
        let normal = self.normal;
        let tangent = normal.perp();

        {
            let rel_vel = (b.linear_velocity - a.linear_velocity).dot(normal);
            let impulse = -(rel_vel - self.bias) * self.mass;
            let accumulated = (self.normal_impulse + impulse).max(0.0);
            let delta = accumulated - self.normal_impulse;
            self.normal_impulse = accumulated;

            a.linear_velocity -= normal * (delta * a.inv_mass);
            b.linear_velocity += normal * (delta * b.inv_mass);
        }

        {
            let rel_vel = (b.linear_velocity - a.linear_velocity).dot(tangent);
            let impulse = -rel_vel * self.mass;
            let max_friction = self.friction * self.normal_impulse;
            let accumulated = (self.tangent_impulse + impulse)
                .max(-max_friction)
                .min(max_friction);
            let delta = accumulated - self.tangent_impulse;
            self.tangent_impulse = accumulated;

            a.linear_velocity -= tangent * (delta * a.inv_mass);
            b.linear_velocity += tangent * (delta * b.inv_mass);
        }
    }

    /// One Baumgarte position iteration. Moves positions directly.
    pub fn solve_position(
        &mut self,
        a: &mut RigidBody2D,
        b: &mut RigidBody2D,
        settings: &ContactSettings,
    ) {
        if self.mass == 0.0 {
            return;
        }
        let normal = self.normal;

        let drift = self.offset - (b.position - a.position);
        let separation = self.overlap + drift.dot(normal);
        let correction = (separation - settings.slop()) * settings.baumgarte();
        if correction <= 0.0 {
            return;
        }

        let previous = self.position_impulse;
        self.position_impulse = (previous + correction * self.mass).max(0.0);
        let delta = self.position_impulse - previous;

        a.position -= normal * (delta * a.inv_mass);
        b.position += normal * (delta * b.inv_mass);
    }

    #[inline]
    pub fn id(&self) -> PairId {
        self.id
    }

    /// Whether the last narrow-phase test reported contact.
    #[inline]
    pub fn in_collision(&self) -> bool {
        self.in_collision
    }

    #[inline]
    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    /// In contact and not a sensor. Immovable pairs are filtered later by pre-solve.
    #[inline]
    pub fn is_solvable(&self) -> bool {
        self.in_collision && !self.is_sensor
    }

    #[inline]
    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    #[inline]
    pub fn colliders(&self) -> (hecs::Entity, hecs::Entity) {
        (self.collider_a, self.collider_b)
    }

    #[inline]
    pub fn bodies(&self) -> (hecs::Entity, hecs::Entity) {
        (self.body_a, self.body_b)
    }

    #[inline]
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    #[inline]
    pub fn overlap(&self) -> f32 {
        self.overlap
    }

    #[inline]
    pub fn normal_impulse(&self) -> f32 {
        self.normal_impulse
    }

    #[inline]
    pub fn tangent_impulse(&self) -> f32 {
        self.tangent_impulse
    }

    #[inline]
    pub fn position_impulse(&self) -> f32 {
        self.position_impulse
    }

    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    #[inline]
    pub fn effective_mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn friction(&self) -> f32 {
        self.friction
    }
}
