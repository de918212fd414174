/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Common utilities shared across examples.

#![allow(dead_code)]

use std::env;

/// Default server port.
pub const DEFAULT_PORT: u16 = 9876;

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Example configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ExampleConfig {
    pub host: String,
    pub port: u16,
    pub sender_comp_id: String,
    pub target_comp_id: String,
    /// Heartbeat interval in seconds.
    pub heartbeat_interval: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ExampleConfig {
    fn from_env(sender: &str, target: &str) -> Self {
        Self {
            host: env::var("FIX_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("FIX_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            sender_comp_id: env::var("FIX_SENDER").unwrap_or_else(|_| sender.to_string()),
            target_comp_id: env::var("FIX_TARGET").unwrap_or_else(|_| target.to_string()),
            heartbeat_interval: env::var("FIX_HEARTBEAT")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(30),
            username: env::var("FIX_USERNAME").ok(),
            password: env::var("FIX_PASSWORD").ok(),
        }
    }

    /// Creates a new configuration for a client.
    #[must_use]
    pub fn client() -> Self {
        Self::from_env("CLIENT", "SERVER")
    }

    /// Creates a new configuration for a server.
    #[must_use]
    pub fn server() -> Self {
        Self::from_env("SERVER", "CLIENT")
    }

    /// Returns the socket address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Initializes logging for examples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}
