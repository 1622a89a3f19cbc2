//! ECS components.

pub mod physics;
