//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use gateway::{InMemoryBackend, SessionRegistry};
use reporting::PollPolicy;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `AUTO_TRANSACTION_HANDLING` — initial gateway mode (default: `false`)
/// - `CHANNEL_CAPACITY` — per-channel queue bound (default: `1024`)
/// - `FULFILLMENT_DELAY_MS` — simulated baking time (default: `50`)
/// - `POLL_MAX_ATTEMPTS` / `POLL_INTERVAL_MS` — status polling policy
///   (default: `20` × `500`)
/// - `FALLBACK_OUTBOX_CAPACITY` — unclaimed orders kept for external
///   workers (default: `1024`)
/// - `SESSION_RETENTION` — gateway sessions held before finished ones are
///   pruned (default: `256`)
///
/// Values that fail to parse fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub auto_transaction: bool,
    pub channel_capacity: usize,
    pub fulfillment_delay_ms: u64,
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
    pub outbox_capacity: usize,
    pub session_retention: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            auto_transaction: lookup("AUTO_TRANSACTION_HANDLING")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.auto_transaction),
            channel_capacity: parsed_or(&lookup, "CHANNEL_CAPACITY", defaults.channel_capacity),
            fulfillment_delay_ms: parsed(&lookup, "FULFILLMENT_DELAY_MS")
                .unwrap_or(defaults.fulfillment_delay_ms),
            poll_max_attempts: parsed_or(&lookup, "POLL_MAX_ATTEMPTS", defaults.poll_max_attempts),
            poll_interval_ms: parsed(&lookup, "POLL_INTERVAL_MS")
                .unwrap_or(defaults.poll_interval_ms),
            outbox_capacity: parsed_or(
                &lookup,
                "FALLBACK_OUTBOX_CAPACITY",
                defaults.outbox_capacity,
            ),
            session_retention: parsed_or(
                &lookup,
                "SESSION_RETENTION",
                defaults.session_retention,
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fulfillment_delay(&self) -> Duration {
        Duration::from_millis(self.fulfillment_delay_ms)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.poll_max_attempts,
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            auto_transaction: false,
            channel_capacity: channels::DEFAULT_CAPACITY,
            fulfillment_delay_ms: 50,
            poll_max_attempts: PollPolicy::DEFAULT_MAX_ATTEMPTS,
            poll_interval_ms: 500,
            outbox_capacity: reporting::DEFAULT_OUTBOX_CAPACITY,
            session_retention: SessionRegistry::<InMemoryBackend>::DEFAULT_RETENTION,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Parses a count that must be at least one.
fn parsed_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + PartialOrd + From<u8>,
{
    parsed(lookup, key)
        .filter(|v: &T| *v >= T::from(1))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(!config.auto_transaction);
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.poll_policy(), PollPolicy::default());
        assert_eq!(config.outbox_capacity, 1024);
        assert_eq!(config.session_retention, 256);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("AUTO_TRANSACTION_HANDLING", "TRUE"),
            ("CHANNEL_CAPACITY", "16"),
            ("FULFILLMENT_DELAY_MS", "0"),
            ("POLL_MAX_ATTEMPTS", "5"),
            ("POLL_INTERVAL_MS", "10"),
            ("FALLBACK_OUTBOX_CAPACITY", "32"),
            ("SESSION_RETENTION", "8"),
        ]));
        assert_eq!(config.port, 8081);
        assert!(config.auto_transaction);
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.fulfillment_delay(), Duration::ZERO);
        assert_eq!(
            config.poll_policy(),
            PollPolicy::new(5, Duration::from_millis(10))
        );
        assert_eq!(config.outbox_capacity, 32);
        assert_eq!(config.session_retention, 8);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("AUTO_TRANSACTION_HANDLING", "maybe"),
            ("CHANNEL_CAPACITY", "0"),
            ("POLL_MAX_ATTEMPTS", "-3"),
            ("SESSION_RETENTION", "0"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        // SAFETY: env-mutating tests are serialized.
        unsafe {
            std::env::set_var("PORT", "9090");
            std::env::set_var("AUTO_TRANSACTION_HANDLING", "1");
        }
        let config = Config::from_env();
        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("AUTO_TRANSACTION_HANDLING");
        }

        assert_eq!(config.port, 9090);
        assert!(config.auto_transaction);
    }

    #[test]
    #[serial]
    fn test_from_env_without_variables_uses_defaults() {
        // SAFETY: env-mutating tests are serialized.
        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("AUTO_TRANSACTION_HANDLING");
        }
        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert!(!config.auto_transaction);
    }
}
