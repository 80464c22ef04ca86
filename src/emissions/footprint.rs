//! Footprint calculator
//!
//! Pure per-record computation: one activity record in, per-category
//! emissions plus total out. Missing or unrecognized sub-fields contribute
//! exactly zero; this function never fails. No rounding happens here -
//! rounding belongs to the aggregation/presentation boundary.

use serde::Serialize;

use super::activity::{ActivityRecord, Category, DietProfile, EnergySource, TransportMode};
use super::factors::{dietary_factor, energy_factor, transport_factor};

/// Per-category emission values in kg CO2e
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub transportation: f64,
    pub energy: f64,
    pub dietary: f64,
}

impl CategoryBreakdown {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Transportation => self.transportation,
            Category::Energy => self.energy,
            Category::Dietary => self.dietary,
        }
    }

    pub fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Transportation => self.transportation = value,
            Category::Energy => self.energy = value,
            Category::Dietary => self.dietary = value,
        }
    }
}

/// Result of computing one record's footprint
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FootprintResult {
    /// Total kg CO2e across all categories
    pub total: f64,
    pub breakdown: CategoryBreakdown,
    /// True only when all three category blocks are present with known
    /// subtypes. Zero-valued categories from missing or unrecognized input
    /// are still reported as zero; this flag lets new consumers tell
    /// "no emissions" apart from "no data".
    pub complete: bool,
}

/// Compute the footprint of a single activity record
pub fn compute_footprint(record: &ActivityRecord) -> FootprintResult {
    let mut complete = true;

    let transportation = match &record.transportation {
        Some(t) => {
            if t.mode == TransportMode::Unknown {
                complete = false;
            }
            t.distance_km.max(0.0) * transport_factor(t.mode)
        }
        None => {
            complete = false;
            0.0
        }
    };

    let energy = match &record.energy {
        Some(e) => {
            if e.source == EnergySource::Unknown {
                complete = false;
            }
            e.amount_kwh.max(0.0) * energy_factor(e.source)
        }
        None => {
            complete = false;
            0.0
        }
    };

    let dietary = match &record.dietary {
        Some(d) => {
            if d.profile == DietProfile::Unknown {
                complete = false;
            }
            dietary_factor(d.profile)
        }
        None => {
            complete = false;
            0.0
        }
    };

    let breakdown = CategoryBreakdown {
        transportation,
        energy,
        dietary,
    };

    FootprintResult {
        total: transportation + energy + dietary,
        breakdown,
        complete,
    }
}
