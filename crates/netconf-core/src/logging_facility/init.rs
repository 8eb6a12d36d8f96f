//! Subscriber installation

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Default directive when `RUST_LOG` is unset
pub fn default_directive(profile: Profile) -> &'static str {
    match profile {
        Profile::Development => "netconf_core=debug",
        Profile::Production | Profile::Test => "netconf_core=info",
    }
}

/// Install the process-wide subscriber; later calls are no-ops
///
/// `RUST_LOG` overrides the profile's default level.
///
/// ```
/// use netconf_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new(default_directive(profile))),
                    )
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new(default_directive(profile))),
                    )
                    .init();
            }
            Profile::Test => {
                // capture layer comes from init_test_capture()
                tracing_subscriber::registry().init();
            }
        }
    });
}
