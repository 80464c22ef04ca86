//! Emission factor table
//!
//! Static mapping of activity subtype to emission coefficient, compiled in
//! and never mutated. Unknown subtypes resolve to 0.0 so that a record with
//! a missing or unrecognized sub-field never breaks aggregate computation.

use super::activity::{DietProfile, EnergySource, TransportMode};

/// kg CO2e emitted per kilometre, by transportation mode
pub fn transport_factor(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Car => 0.192,
        TransportMode::Bus => 0.089,
        TransportMode::Motorcycle => 0.103,
        TransportMode::Bicycle => 0.0,
        TransportMode::Walking => 0.0,
        TransportMode::Unknown => 0.0,
    }
}

/// kg CO2e emitted per kilowatt-hour, by energy source
pub fn energy_factor(source: EnergySource) -> f64 {
    match source {
        EnergySource::Coal => 0.94,
        EnergySource::NaturalGas => 0.45,
        EnergySource::Solar => 0.05,
        EnergySource::Wind => 0.01,
        EnergySource::Unknown => 0.0,
    }
}

/// Flat kg CO2e per day, by dietary profile
///
/// Diet is a daily categorical choice, not a quantity, so the factor is the
/// whole contribution.
pub fn dietary_factor(profile: DietProfile) -> f64 {
    match profile {
        DietProfile::MeatHeavy => 7.19,
        DietProfile::Balanced => 4.67,
        DietProfile::Vegetarian => 3.81,
        DietProfile::Vegan => 2.89,
        DietProfile::Unknown => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_factors_positive() {
        assert!(transport_factor(TransportMode::Car) > 0.0);
        assert!(energy_factor(EnergySource::Coal) > 0.0);
        assert!(dietary_factor(DietProfile::MeatHeavy) > 0.0);
    }

    #[test]
    fn test_zero_emission_modes() {
        assert_eq!(transport_factor(TransportMode::Bicycle), 0.0);
        assert_eq!(transport_factor(TransportMode::Walking), 0.0);
    }

    #[test]
    fn test_unknown_subtypes_resolve_to_zero() {
        assert_eq!(transport_factor(TransportMode::Unknown), 0.0);
        assert_eq!(energy_factor(EnergySource::Unknown), 0.0);
        assert_eq!(dietary_factor(DietProfile::Unknown), 0.0);
    }

    #[test]
    fn test_diet_factors_ordered_by_impact() {
        assert!(dietary_factor(DietProfile::MeatHeavy) > dietary_factor(DietProfile::Balanced));
        assert!(dietary_factor(DietProfile::Balanced) > dietary_factor(DietProfile::Vegetarian));
        assert!(dietary_factor(DietProfile::Vegetarian) > dietary_factor(DietProfile::Vegan));
    }
}
