//! Error types for physics configuration and world management.

use thiserror::Error;

/// Errors reported by the physics world.
///
/// The solver itself never fails: degenerate contacts are skipped, not
/// reported. Everything here is raised at configuration or setup time.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// `units_per_meter` must be finite and positive.
    #[error("invalid units per meter: {0} (must be finite and > 0)")]
    InvalidUnitsPerMeter(f32),

    /// Baumgarte coefficient outside `(0, 1]`.
    #[error("invalid baumgarte coefficient: {0} (must be in (0, 1])")]
    InvalidBaumgarte(f32),

    /// Negative or non-finite allowed penetration.
    #[error("invalid slop: {0} (must be finite and >= 0)")]
    InvalidSlop(f32),

    /// Fixed timestep must be finite and positive.
    #[error("invalid fixed timestep: {0} (must be finite and > 0)")]
    InvalidTimestep(f64),

    #[error("max_substeps must be at least 1")]
    InvalidSubsteps,

    #[error("velocity_iterations must be at least 1")]
    InvalidVelocityIterations,

    /// Every collider id has been handed out.
    #[error("collider id space exhausted")]
    ColliderIdsExhausted,

    /// Entity lookup failed (missing entity or missing component).
    #[error("ecs lookup failed: {0}")]
    Ecs(#[from] hecs::ComponentError),
}
