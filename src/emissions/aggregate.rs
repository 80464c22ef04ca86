//! Aggregation engine
//!
//! Operates over a user's activity records ordered by date descending
//! (most recent first), typically windowed to the last 30 days. Produces
//! the dashboard view-model: category percentage breakdown, week-over-week
//! trend per category, annual projection with unit conversion, and progress
//! toward the national reduction target.
//!
//! Two trend comparison rules exist and are kept as distinct algorithms:
//!
//! - [`trend_strict`] - strict inequality on 7-record sums, used by the
//!   dashboard aggregate.
//! - [`trend_with_deadband`] - ±5% relative deadband on 7-record averages,
//!   used by the activity summary.

use serde::Serialize;

use super::activity::{ActivityRecord, Category};
use super::footprint::{compute_footprint, CategoryBreakdown, FootprintResult};

/// National average annual footprint in tons CO2e (Malaysia)
pub const MALAYSIA_AVERAGE_TONS: f64 = 8.6;

/// National 2030 reduction target in tons CO2e per person per year
pub const TARGET_2030_TONS: f64 = 4.73;

/// Projected annual emissions at or above this many kg are reported in tons
const TONS_THRESHOLD_KG: f64 = 1000.0;

/// Records per comparison week for trend computation
const WEEK: usize = 7;

/// Week-over-week direction of a category's emissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Unit label for projected annual emissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmissionUnit {
    #[serde(rename = "kg CO2e/year")]
    KgPerYear,
    #[serde(rename = "tons CO2e/year")]
    TonsPerYear,
}

/// Integer percentage share per category (0-100)
///
/// Each category rounds independently, so the three values are not
/// guaranteed to sum to exactly 100.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BreakdownPercentages {
    pub transportation: u8,
    pub energy: u8,
    pub dietary: u8,
}

impl BreakdownPercentages {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Transportation => self.transportation,
            Category::Energy => self.energy,
            Category::Dietary => self.dietary,
        }
    }
}

/// Trend direction per category
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryTrends {
    pub transportation: TrendDirection,
    pub energy: TrendDirection,
    pub dietary: TrendDirection,
}

impl Default for CategoryTrends {
    fn default() -> Self {
        Self {
            transportation: TrendDirection::Stable,
            energy: TrendDirection::Stable,
            dietary: TrendDirection::Stable,
        }
    }
}

impl CategoryTrends {
    pub fn get(&self, category: Category) -> TrendDirection {
        match category {
            Category::Transportation => self.transportation,
            Category::Energy => self.energy,
            Category::Dietary => self.dietary,
        }
    }
}

/// Annual projection with unit conversion applied
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnnualProjection {
    /// Projected annual emissions, in `unit`
    pub annual: f64,
    pub unit: EmissionUnit,
    /// Per-category annual emissions, converted with the aggregate's unit
    /// decision (not per-category thresholds), so all figures share the
    /// headline number's unit
    pub breakdown: CategoryBreakdown,
}

/// Progress toward the national reduction target
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TargetProgress {
    /// 0-100, clamped
    pub progress: u8,
    pub national_average_tons: f64,
    pub target_tons: f64,
}

/// Dashboard aggregate over a record window
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSummary {
    pub breakdown: BreakdownPercentages,
    pub trends: CategoryTrends,
    pub projected: AnnualProjection,
    pub target: TargetProgress,
    pub record_count: usize,
}

/// Lighter summary for the activity history view; uses the deadband trend
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub record_count: usize,
    /// Mean daily footprint in kg CO2e over the window
    pub daily_average: f64,
    /// Total kg CO2e over the most recent 7 records
    pub weekly_total: f64,
    pub trends: CategoryTrends,
}

/// Strict week-over-week comparison: no deadband, equality is stable
pub fn trend_strict(recent: f64, previous: f64) -> TrendDirection {
    if recent < previous {
        TrendDirection::Decreasing
    } else if recent > previous {
        TrendDirection::Increasing
    } else {
        TrendDirection::Stable
    }
}

/// Deadband week-over-week comparison: changes within ±5% are stable
pub fn trend_with_deadband(recent: f64, previous: f64) -> TrendDirection {
    if recent < previous * 0.95 {
        TrendDirection::Decreasing
    } else if recent > previous * 1.05 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Stable
    }
}

/// Compute the dashboard aggregate over the first `window_days` records
///
/// `records` must be ordered by date descending. Windows shorter than two
/// full weeks report every trend as stable; an empty or zero-total window
/// reports all percentages as zero.
pub fn aggregate(records: &[ActivityRecord], window_days: usize) -> AggregateSummary {
    let window = &records[..records.len().min(window_days)];
    let footprints: Vec<FootprintResult> = window.iter().map(compute_footprint).collect();

    let mut category_totals = CategoryBreakdown::default();
    let mut grand_total = 0.0;
    for fp in &footprints {
        for category in Category::ALL {
            let sum = category_totals.get(category) + fp.breakdown.get(category);
            category_totals.set(category, sum);
        }
        grand_total += fp.total;
    }

    let projected_kg = if footprints.is_empty() {
        0.0
    } else {
        grand_total / footprints.len() as f64 * 365.0
    };

    let breakdown = percentage_breakdown(&category_totals, grand_total);
    let trends = weekly_trends_strict(&footprints);
    let projected = project_annual(&category_totals, projected_kg, footprints.len());
    let target = target_progress(projected_kg);

    AggregateSummary {
        breakdown,
        trends,
        projected,
        target,
        record_count: footprints.len(),
    }
}

/// Compute the activity-history summary (deadband trend variant)
///
/// `records` must be ordered by date descending.
pub fn activity_summary(records: &[ActivityRecord]) -> ActivitySummary {
    let footprints: Vec<FootprintResult> = records.iter().map(compute_footprint).collect();

    let total: f64 = footprints.iter().map(|fp| fp.total).sum();
    let daily_average = if footprints.is_empty() {
        0.0
    } else {
        total / footprints.len() as f64
    };
    let weekly_total: f64 = footprints
        .iter()
        .take(WEEK)
        .map(|fp| fp.total)
        .sum();

    ActivitySummary {
        record_count: footprints.len(),
        daily_average,
        weekly_total,
        trends: weekly_trends_deadband(&footprints),
    }
}

/// Integer percentage per category, with the zero-total guard
fn percentage_breakdown(totals: &CategoryBreakdown, grand_total: f64) -> BreakdownPercentages {
    if grand_total == 0.0 {
        return BreakdownPercentages::default();
    }

    BreakdownPercentages {
        transportation: round_pct(totals.transportation / grand_total),
        energy: round_pct(totals.energy / grand_total),
        dietary: round_pct(totals.dietary / grand_total),
    }
}

/// Round a 0.0-1.0 share to an integer percentage, half away from zero
fn round_pct(share: f64) -> u8 {
    (share * 100.0).round() as u8
}

/// Strict trend per category from 7-record sums
///
/// Needs two full weeks of records; otherwise every direction is stable.
fn weekly_trends_strict(footprints: &[FootprintResult]) -> CategoryTrends {
    let Some((recent, previous)) = week_slices(footprints) else {
        return CategoryTrends::default();
    };

    let mut trends = CategoryTrends::default();
    let sums = |slice: &[FootprintResult], c: Category| -> f64 {
        slice.iter().map(|fp| fp.breakdown.get(c)).sum()
    };

    trends.transportation = trend_strict(
        sums(recent, Category::Transportation),
        sums(previous, Category::Transportation),
    );
    trends.energy = trend_strict(sums(recent, Category::Energy), sums(previous, Category::Energy));
    trends.dietary = trend_strict(
        sums(recent, Category::Dietary),
        sums(previous, Category::Dietary),
    );
    trends
}

/// Deadband trend per category from 7-record averages
fn weekly_trends_deadband(footprints: &[FootprintResult]) -> CategoryTrends {
    let Some((recent, previous)) = week_slices(footprints) else {
        return CategoryTrends::default();
    };

    let mut trends = CategoryTrends::default();
    let avg = |slice: &[FootprintResult], c: Category| -> f64 {
        slice.iter().map(|fp| fp.breakdown.get(c)).sum::<f64>() / slice.len() as f64
    };

    trends.transportation = trend_with_deadband(
        avg(recent, Category::Transportation),
        avg(previous, Category::Transportation),
    );
    trends.energy =
        trend_with_deadband(avg(recent, Category::Energy), avg(previous, Category::Energy));
    trends.dietary = trend_with_deadband(
        avg(recent, Category::Dietary),
        avg(previous, Category::Dietary),
    );
    trends
}

/// Split a date-descending footprint sequence into the most recent week
/// [0,7) and the previous week [7,14); None when either would be short
fn week_slices(footprints: &[FootprintResult]) -> Option<(&[FootprintResult], &[FootprintResult])> {
    if footprints.len() < WEEK * 2 {
        return None;
    }
    Some((&footprints[..WEEK], &footprints[WEEK..WEEK * 2]))
}

/// Decide the reporting unit for a projected annual figure
///
/// At or above 1000 kg the value converts to tons; below it stays in kg.
/// The threshold is a fixed design decision, not configurable.
pub fn projection_unit(projected_kg: f64) -> (f64, EmissionUnit) {
    if projected_kg >= TONS_THRESHOLD_KG {
        (projected_kg / 1000.0, EmissionUnit::TonsPerYear)
    } else {
        (projected_kg, EmissionUnit::KgPerYear)
    }
}

/// Project annual emissions and pick the reporting unit
///
/// The per-category breakdown converts with the aggregate's unit decision:
/// breakdown values divide by 1000 only when the total crossed the
/// threshold, keeping every figure in the headline number's unit.
fn project_annual(
    category_totals: &CategoryBreakdown,
    projected_kg: f64,
    count: usize,
) -> AnnualProjection {
    let (annual, unit) = projection_unit(projected_kg);

    let mut breakdown = CategoryBreakdown::default();
    for category in Category::ALL {
        let mut annual_category = if count == 0 {
            0.0
        } else {
            category_totals.get(category) / count as f64 * 365.0
        };
        if unit == EmissionUnit::TonsPerYear {
            annual_category /= 1000.0;
        }
        breakdown.set(category, annual_category);
    }

    AnnualProjection {
        annual,
        unit,
        breakdown,
    }
}

/// Progress toward the 2030 target, clamped to 0-100
///
/// The projected value is normalized to tons regardless of the unit chosen
/// for display.
fn target_progress(projected_kg: f64) -> TargetProgress {
    let projected_tons = projected_kg / 1000.0;

    let raw = (MALAYSIA_AVERAGE_TONS - projected_tons) / (MALAYSIA_AVERAGE_TONS - TARGET_2030_TONS)
        * 100.0;
    let progress = raw.clamp(0.0, 100.0).round() as u8;

    TargetProgress {
        progress,
        national_average_tons: MALAYSIA_AVERAGE_TONS,
        target_tons: TARGET_2030_TONS,
    }
}
