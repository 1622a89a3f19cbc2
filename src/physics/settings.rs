//! Contact solving tunables shared by every contact pair.

use super::error::PhysicsError;

/// Position and restitution tunables for contact solving.
///
/// Built once through [`ContactSettings::new`] (or [`Default`]) and read-only
/// afterwards. Out-of-range values are rejected here instead of being
/// clamped during the solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSettings {
    units_per_meter: f32,
    baumgarte: f32,
    slop: f32,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            units_per_meter: 1.0,
            baumgarte: 0.2,
            slop: 0.5,
        }
    }
}

impl ContactSettings {
    /// Validate and build contact settings.
    ///
    /// # Errors
    ///
    /// - `units_per_meter` not finite or `<= 0`
    /// - `baumgarte` outside `(0, 1]`
    /// - `slop` not finite or negative
    pub fn new(units_per_meter: f32, baumgarte: f32, slop: f32) -> Result<Self, PhysicsError> {
        let settings = Self {
            units_per_meter,
            baumgarte,
            slop,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.units_per_meter.is_finite() || self.units_per_meter <= 0.0 {
            return Err(PhysicsError::InvalidUnitsPerMeter(self.units_per_meter));
        }
        // NaN fails both comparisons, so test the accepted range directly.
        if !(self.baumgarte > 0.0 && self.baumgarte <= 1.0) {
            return Err(PhysicsError::InvalidBaumgarte(self.baumgarte));
        }
        if !self.slop.is_finite() || self.slop < 0.0 {
            return Err(PhysicsError::InvalidSlop(self.slop));
        }
        Ok(())
    }

    /// Simulation length units per meter.
    #[inline]
    pub fn units_per_meter(&self) -> f32 {
        self.units_per_meter
    }

    /// Fraction of the remaining penetration corrected per position iteration.
    #[inline]
    pub fn baumgarte(&self) -> f32 {
        self.baumgarte
    }

    /// Penetration depth tolerated without position correction.
    #[inline]
    pub fn slop(&self) -> f32 {
        self.slop
    }

    /// Closing speed above which restitution kicks in. One meter per second,
    /// expressed in simulation units.
    #[inline]
    pub fn bounce_threshold(&self) -> f32 {
        self.units_per_meter
    }
}
