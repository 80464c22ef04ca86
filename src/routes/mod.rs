//! HTTP route handlers

pub mod api;

pub use api::{
    dashboard, error_response, health_check, json_response, milestones, mint_token, not_found,
    online_users, parse_query_params, recommendations, summary, upsert_activity, version_info,
};
