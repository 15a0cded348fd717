//! Application configuration loaded from environment variables.

use checkout::{GatewayMode, GatewaySettings};
use domain::{Money, ShippingPolicy};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `GATEWAY_MODE` — `"sandbox"` or `"live"` (default: `"sandbox"`)
/// - `GATEWAY_TEST_KEY_PREFIX` — expected sandbox key prefix
///   (default: `"rzp_test_"`)
/// - `FREE_SHIPPING_THRESHOLD_PAISE` — free-shipping threshold
///   (default: ₹999)
/// - `SHIPPING_FLAT_FEE_PAISE` — flat shipping fee (default: ₹50)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub gateway_mode: GatewayMode,
    pub gateway_test_key_prefix: String,
    pub free_shipping_threshold_paise: i64,
    pub shipping_flat_fee_paise: i64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            gateway_mode: match std::env::var("GATEWAY_MODE").as_deref() {
                Ok("live") => GatewayMode::Live,
                _ => GatewayMode::Sandbox,
            },
            gateway_test_key_prefix: std::env::var("GATEWAY_TEST_KEY_PREFIX")
                .unwrap_or(defaults.gateway_test_key_prefix),
            free_shipping_threshold_paise: std::env::var("FREE_SHIPPING_THRESHOLD_PAISE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.free_shipping_threshold_paise),
            shipping_flat_fee_paise: std::env::var("SHIPPING_FLAT_FEE_PAISE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.shipping_flat_fee_paise),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the shipping policy this deployment charges under.
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy::new(
            Money::from_paise(self.free_shipping_threshold_paise),
            Money::from_paise(self.shipping_flat_fee_paise),
        )
    }

    /// Returns the gateway environment settings.
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            mode: self.gateway_mode,
            test_key_prefix: self.gateway_test_key_prefix.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            gateway_mode: GatewayMode::Sandbox,
            gateway_test_key_prefix: "rzp_test_".to_string(),
            free_shipping_threshold_paise: 99_900,
            shipping_flat_fee_paise: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.gateway_mode, GatewayMode::Sandbox);
        assert_eq!(config.gateway_test_key_prefix, "rzp_test_");
    }

    #[test]
    fn addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn shipping_policy_from_config() {
        let policy = Config::default().shipping_policy();
        assert_eq!(policy.free_shipping_threshold, Money::from_rupees(999));
        assert_eq!(policy.flat_fee, Money::from_rupees(50));
    }

    #[test]
    fn gateway_settings_from_config() {
        let settings = Config::default().gateway_settings();
        assert_eq!(settings.mode, GatewayMode::Sandbox);
        assert_eq!(settings.test_key_prefix, "rzp_test_");
    }
}
