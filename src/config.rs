//! Configuration for Ecotrack
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Ecotrack - carbon footprint tracking backend
///
/// Emissions computation engine plus real-time private-messaging gateway.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecotrack")]
#[command(about = "Carbon footprint tracking backend with realtime chat")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (insecure default JWT secret, token mint endpoint)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// JWT secret for token verification (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable the realtime chat service
    #[arg(long, env = "CHAT_ENABLED", default_value = "true")]
    pub chat_enabled: bool,

    /// Maximum concurrent chat connections
    #[arg(long, env = "CHAT_MAX_CLIENTS")]
    pub chat_max_clients: Option<usize>,

    /// Typing indicator auto-expiry in milliseconds
    #[arg(long, env = "TYPING_EXPIRY_MS", default_value = "3000")]
    pub typing_expiry_ms: u64,

    /// Default dashboard aggregation window in days
    #[arg(long, env = "WINDOW_DAYS", default_value = "30")]
    pub window_days: usize,
}

impl Args {
    /// Get effective JWT secret (uses default in dev mode)
    pub fn jwt_secret(&self) -> String {
        if self.dev_mode {
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret".to_string())
        } else {
            self.jwt_secret
                .clone()
                .expect("JWT_SECRET is required in production mode")
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.typing_expiry_ms == 0 {
            return Err("TYPING_EXPIRY_MS must be greater than zero".to_string());
        }

        if self.window_days == 0 {
            return Err("WINDOW_DAYS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["ecotrack", "--dev-mode"])
    }

    #[test]
    fn test_dev_mode_default_secret() {
        let args = base_args();
        assert_eq!(args.jwt_secret(), "dev-only-insecure-secret");
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        let args = Args::parse_from(["ecotrack"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_typing_expiry() {
        let mut args = base_args();
        args.typing_expiry_ms = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_dev_defaults() {
        let args = base_args();
        assert!(args.validate().is_ok());
        assert_eq!(args.window_days, 30);
        assert_eq!(args.typing_expiry_ms, 3000);
    }
}
