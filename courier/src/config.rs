//! Top-level service configuration.

use serde::Deserialize;

use courier_delivery::{DeliveryConfig, providers::ProviderConfig};
use courier_http::HttpConfig;

/// The full courier configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourierConfig {
    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Ordered provider pool; deliveries fail over through this list.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            label: "mock-alpha".to_string(),
            failure_rate: 0.5,
        },
        ProviderConfig {
            label: "mock-beta".to_string(),
            failure_rate: 0.5,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: CourierConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(config.delivery.rate_limit.budget, 5);
        assert_eq!(config.delivery.rate_limit.window_ms, 60_000);
        assert_eq!(config.delivery.retry.max_retries, 5);
        assert_eq!(config.delivery.retry.base_delay_ms, 1000);
        assert_eq!(config.delivery.circuit_breaker.max_failures, 3);
        assert_eq!(config.providers.len(), 2);
    }

    #[test]
    fn providers_and_overrides_parse() {
        let config: CourierConfig = toml::from_str(
            r#"
            [delivery.rate_limit]
            budget = 10

            [delivery.circuit_breaker.recovery]
            policy = "timeout"
            secs = 300

            [http]
            listen_address = "127.0.0.1:8025"

            [[providers]]
            label = "primary"
            failure_rate = 0.1

            [[providers]]
            label = "secondary"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.delivery.rate_limit.budget, 10);
        assert_eq!(
            config.delivery.circuit_breaker.recovery,
            courier_delivery::RecoveryPolicy::Timeout { secs: 300 }
        );
        assert_eq!(config.http.listen_address, "127.0.0.1:8025");
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].label, "primary");
        assert!((config.providers[1].failure_rate - 0.5).abs() < f64::EPSILON);
    }
}
