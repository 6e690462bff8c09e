//! Client configuration.

const LOG_BODIES_ENV: &str = "NETCALL_LOG_BODIES";

/// Settings applied to every call made by a `NetworkClient`.
///
/// # Defaults
/// - `log_bodies`: `false`. Request and response bodies are logged as their
///   byte length only; parameter values never reach the logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Log raw request and response bodies at `debug` level.
    pub log_bodies: bool,
}

impl ClientConfig {
    /// Read settings from the environment. `NETCALL_LOG_BODIES` set to `1`,
    /// `true` or `yes` enables body logging.
    pub fn from_env() -> Self {
        Self {
            log_bodies: std::env::var(LOG_BODIES_ENV)
                .map(|value| parse_flag(&value))
                .unwrap_or(false),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
