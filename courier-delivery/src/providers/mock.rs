//! Simulated delivery providers.

use std::sync::Arc;

use async_trait::async_trait;
use courier_common::message::Message;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{error::ProviderError, provider::Provider};

const fn default_failure_rate() -> f64 {
    0.5
}

/// Configuration for one simulated provider in the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Label recorded on status records for deliveries through this provider.
    pub label: String,

    /// Probability in `[0, 1]` that a single attempt fails.
    ///
    /// Default: 0.5
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

impl ProviderConfig {
    /// Build the provider described by this configuration.
    #[must_use]
    pub fn build(&self) -> Arc<dyn Provider> {
        Arc::new(MockProvider::new(self.label.clone(), self.failure_rate))
    }
}

/// A provider that fails a configurable fraction of attempts at random.
#[derive(Debug)]
pub struct MockProvider {
    label: String,
    failure_rate: f64,
}

impl MockProvider {
    /// Create a mock provider; `failure_rate` is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(label: impl Into<String>, failure_rate: f64) -> Self {
        Self {
            label: label.into(),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn attempt_delivery(&self, message: &Message) -> Result<(), ProviderError> {
        let roll = rand::rng().random::<f64>();
        tracing::debug!(
            provider = %self.label,
            to = %message.to,
            roll = roll,
            "Simulating delivery attempt"
        );

        if roll < self.failure_rate {
            return Err(ProviderError::new(
                self.label.clone(),
                "simulated delivery failure",
            ));
        }

        Ok(())
    }
}

/// A provider with a fixed outcome, for deterministic tests and demos.
#[derive(Debug)]
pub struct StaticProvider {
    label: String,
    succeeds: bool,
}

impl StaticProvider {
    /// A provider whose every attempt succeeds.
    #[must_use]
    pub fn succeeding(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            succeeds: true,
        }
    }

    /// A provider whose every attempt fails.
    #[must_use]
    pub fn failing(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            succeeds: false,
        }
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn attempt_delivery(&self, _message: &Message) -> Result<(), ProviderError> {
        if self.succeeds {
            Ok(())
        } else {
            Err(ProviderError::new(
                self.label.clone(),
                "configured to fail",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message {
            to: "user@example.com".to_string(),
            subject: "Hello".to_string(),
            body: "World".to_string(),
        }
    }

    #[tokio::test]
    async fn mock_provider_extremes_are_deterministic() {
        let always_fails = MockProvider::new("flaky", 1.0);
        let never_fails = MockProvider::new("solid", 0.0);

        assert!(always_fails.attempt_delivery(&message()).await.is_err());
        assert!(never_fails.attempt_delivery(&message()).await.is_ok());
    }

    #[test]
    fn failure_rate_is_clamped() {
        let provider = MockProvider::new("out-of-range", 3.5);
        assert!((provider.failure_rate - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn static_provider_outcomes() {
        assert!(
            StaticProvider::succeeding("ok")
                .attempt_delivery(&message())
                .await
                .is_ok()
        );
        assert!(
            StaticProvider::failing("nope")
                .attempt_delivery(&message())
                .await
                .is_err()
        );
    }

    #[test]
    fn provider_config_defaults() {
        let config: ProviderConfig = toml::from_str("label = \"mock-alpha\"").unwrap();
        assert_eq!(config.label, "mock-alpha");
        assert!((config.failure_rate - 0.5).abs() < f64::EPSILON);
    }
}
