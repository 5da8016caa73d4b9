//! Loopback listener that captures the provider's redirect for desktop and
//! CLI hosts.

mod config;
mod server;

pub use config::LocalServerConfig;
pub use server::LocalServer;
