//! Emissions computation and aggregation engine
//!
//! The numeric core of Ecotrack: a static emission-factor table, a pure
//! per-record footprint calculator, an aggregation engine producing the
//! dashboard view-model, and the milestone/goal evaluator. Everything here
//! is synchronous, request-scoped, and side-effect-free; malformed input
//! degrades to zero contributions instead of erroring, and every division
//! is guarded against empty or zero-total windows.

pub mod activity;
pub mod aggregate;
pub mod factors;
pub mod footprint;
pub mod milestones;
pub mod recommendations;

pub use activity::{ActivityRecord, Category, DietProfile, EnergySource, TransportMode};
pub use aggregate::{
    activity_summary, aggregate, trend_strict, trend_with_deadband, ActivitySummary,
    AggregateSummary, EmissionUnit, TrendDirection, MALAYSIA_AVERAGE_TONS, TARGET_2030_TONS,
};
pub use footprint::{compute_footprint, CategoryBreakdown, FootprintResult};
pub use milestones::{evaluate_milestones, evaluate_weekly_goals, Milestone, WeeklyGoal};
pub use recommendations::{recommend, Recommendation};
