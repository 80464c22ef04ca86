//! Authentication for the chat gateway
//!
//! JWT token validation only; password handling and session mechanics are
//! the external auth collaborator's responsibility.

pub mod jwt;

pub use jwt::{
    extract_token_from_header, extract_token_from_query, Claims, JwtValidator,
    TokenValidationResult,
};
