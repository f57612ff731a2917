//! # Mass Classifier
//!
//! Maps a mass to the first range, in declared order, whose inclusive
//! interval contains it. A mass on a shared boundary therefore resolves to
//! the lower range.
//!
//! The classifier does not clamp. Callers clamp to `[MIN_MASS, MAX_MASS]`
//! first (see [`clamp_mass`]); a miss on a validated catalog means the
//! catalog itself is wrong.

use crate::catalog::{Catalog, MassRange, MassRangeId};
use crate::primitives::{MAX_MASS, MIN_MASS};
use crate::types::StellarError;

/// Clamp a mass into the supported domain. NaN maps to `MIN_MASS`.
#[must_use]
pub fn clamp_mass(mass: f64) -> f64 {
    if mass.is_nan() {
        return MIN_MASS;
    }
    mass.clamp(MIN_MASS, MAX_MASS)
}

impl Catalog {
    /// Classify a mass into a range id.
    pub fn classify(&self, mass: f64) -> Result<MassRangeId, StellarError> {
        self.ranges()
            .iter()
            .position(|range| range.contains(mass))
            .map(MassRangeId)
            .ok_or(StellarError::NoMatchingRange { mass })
    }

    /// Classify a mass and return the range itself.
    pub fn classify_range(&self, mass: f64) -> Result<(MassRangeId, &MassRange), StellarError> {
        let id = self.classify(mass)?;
        self.range(id)
            .map(|range| (id, range))
            .ok_or(StellarError::NoMatchingRange { mass })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_catalog;

    fn name_of(mass: f64) -> String {
        let catalog = builtin_catalog().expect("builtin");
        let (_, range) = catalog.classify_range(mass).expect("classify");
        range.name().to_string()
    }

    #[test]
    fn sun_is_low_mass() {
        assert_eq!(name_of(1.0), "Low Mass");
    }

    #[test]
    fn domain_edges_classify() {
        assert_eq!(name_of(MIN_MASS), "Very Low Mass");
        assert_eq!(name_of(MAX_MASS), "High Mass");
    }

    #[test]
    fn shared_boundary_resolves_to_first_range() {
        assert_eq!(name_of(0.4), "Very Low Mass");
        assert_eq!(name_of(2.0), "Low Mass");
        assert_eq!(name_of(8.0), "Medium Mass");
    }

    #[test]
    fn outside_domain_is_a_configuration_error() {
        let catalog = builtin_catalog().expect("builtin");
        assert_eq!(
            catalog.classify(60.0),
            Err(StellarError::NoMatchingRange { mass: 60.0 })
        );
        assert!(catalog.classify(0.01).is_err());
    }

    #[test]
    fn clamp_mass_bounds() {
        assert_eq!(clamp_mass(0.0), MIN_MASS);
        assert_eq!(clamp_mass(100.0), MAX_MASS);
        assert_eq!(clamp_mass(3.0), 3.0);
        assert_eq!(clamp_mass(f64::NAN), MIN_MASS);
    }
}
