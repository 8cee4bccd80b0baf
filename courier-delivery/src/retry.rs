//! Bounded retries with exponential backoff against a single provider.

use std::time::Duration;

use courier_common::{
    audit::{self, AuditLog, RecordId},
    message::Message,
};
use serde::{Deserialize, Serialize};

use crate::{error::DeliveryError, provider::Provider};

/// Retry configuration for delivery attempts.
///
/// A message gets one initial try plus `max_retries` retries against the
/// acting provider. The delay before each retry doubles, starting from
/// `base_delay_ms`: with the defaults that is 1000, 2000, 4000, 8000 and
/// 16000 ms for at most 6 tries in total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    ///
    /// Default: 5
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds.
    ///
    /// Default: 1000
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

const fn default_max_retries() -> u32 {
    5
}

const fn default_base_delay_ms() -> u64 {
    1000
}

impl RetryPolicy {
    /// Total tries a message can consume: the initial attempt plus retries.
    #[must_use]
    pub const fn total_tries(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff delay before the given retry (1-indexed): `base * 2^(n-1)`.
    #[must_use]
    pub const fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let delay_ms = if exponent >= 63 {
            u64::MAX
        } else {
            self.base_delay_ms.saturating_mul(1u64 << exponent)
        };
        Duration::from_millis(delay_ms)
    }
}

/// Drive one message through bounded retries against a single provider.
///
/// Each try increments the record's attempt count, success or failure. When
/// `attempts_left` hits zero on a failure the executor gives up; provider
/// failover is the caller's decision, and the failed message itself is never
/// re-attempted on the next provider.
pub(crate) async fn deliver_with_retries(
    policy: &RetryPolicy,
    provider: &dyn Provider,
    message: &Message,
    record: RecordId,
    log: &AuditLog,
) -> Result<(), DeliveryError> {
    log.set_provider(record, provider.label());

    let mut attempts_left = policy.max_retries;
    let mut try_number = 0u32;

    loop {
        try_number = try_number.saturating_add(1);
        audit::log_delivery_attempt(message.idempotency_key().as_str(), provider.label(), try_number);

        match provider.attempt_delivery(message).await {
            Ok(()) => {
                log.record_attempt(record);
                return Ok(());
            }
            Err(error) => {
                log.record_attempt(record);

                if attempts_left == 0 {
                    return Err(DeliveryError::MaxRetriesExceeded {
                        provider: provider.label().to_string(),
                    });
                }

                let delay = policy.delay_before_retry(try_number);
                tracing::debug!(
                    provider = %provider.label(),
                    error = %error,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempts_left = attempts_left,
                    "Delivery attempt failed, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempts_left -= 1;
            }
        }
    }
}
