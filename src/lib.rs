//! Ecotrack - carbon footprint tracking backend
//!
//! Two subsystems behind one hyper server:
//!
//! - The **emissions engine** ([`emissions`]): pure per-record footprint
//!   computation, dashboard aggregation (percentage breakdown, trends,
//!   annual projection with unit conversion, national-target progress),
//!   and milestone/goal evaluation. Stateless and side-effect-free.
//! - The **chat gateway** ([`chat`]): friend-to-friend private messaging
//!   with live presence and typing indicators over a JSON WebSocket
//!   protocol, authenticated by JWT at connect time.
//!
//! Activity persistence sits behind the [`storage::ActivityStore`] trait;
//! the bundled implementation is in-memory.

pub mod auth;
pub mod chat;
pub mod config;
pub mod emissions;
pub mod routes;
pub mod server;
pub mod storage;
pub mod types;

pub use chat::ChatCoordinator;
pub use config::Args;
pub use emissions::{
    activity_summary, aggregate, compute_footprint, evaluate_milestones, evaluate_weekly_goals,
    recommend, ActivityRecord, AggregateSummary, FootprintResult,
};
pub use storage::{ActivityStore, MemoryActivityStore};
pub use types::EcotrackError;
