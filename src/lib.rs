pub mod client;
pub mod config;
pub mod handlers;
pub mod product;
pub mod register;

pub use client::{ClientError, ProductSource, UpstreamClient};
pub use config::{ConfigError, RegistrationConfig, ServiceConfig, UpstreamConfig};
pub use handlers::router;
pub use product::Product;
pub use register::{Registration, RegisterError};

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
