//! Request budget and call timeout for the results provider

use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use rust_decimal::Decimal;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::provider::{EventHandle, GameResultsProvider};
use crate::config::SettlementConfig;
use crate::domain::Sport;
use crate::error::{Result, WagerError};

/// Shared token bucket. Clones draw from the same budget.
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl Throttle {
    pub fn per_minute(requests: u32) -> Self {
        let rpm = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(rpm))),
        }
    }

    /// Wait until a request may be sent
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit only if one is available now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Wraps a provider so every call waits on the throttle and carries a timeout
pub struct ThrottledProvider<P> {
    inner: P,
    throttle: Throttle,
    timeout: Duration,
}

impl<P: GameResultsProvider> ThrottledProvider<P> {
    pub fn new(inner: P, throttle: Throttle, timeout: Duration) -> Self {
        Self {
            inner,
            throttle,
            timeout,
        }
    }

    pub fn from_config(inner: P, config: &SettlementConfig) -> Self {
        Self::new(
            inner,
            Throttle::per_minute(config.requests_per_minute),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    async fn call<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        self.throttle.acquire().await;
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed_ms = self.timeout.as_millis() as u64;
                warn!(operation, elapsed_ms, "provider call timed out");
                Err(WagerError::Timeout {
                    operation: operation.to_string(),
                    elapsed_ms,
                })
            }
        }
    }
}

#[async_trait]
impl<P: GameResultsProvider> GameResultsProvider for ThrottledProvider<P> {
    async fn find_event(
        &self,
        sport: Sport,
        participant: &str,
        date: NaiveDate,
    ) -> Result<Option<EventHandle>> {
        self.call("find_event", self.inner.find_event(sport, participant, date))
            .await
    }

    async fn is_complete(&self, event: &EventHandle) -> Result<bool> {
        self.call("is_complete", self.inner.is_complete(event)).await
    }

    async fn stat_value(
        &self,
        event: &EventHandle,
        participant: &str,
        stat: &str,
    ) -> Result<Option<Decimal>> {
        self.call("stat_value", self.inner.stat_value(event, participant, stat))
            .await
    }
}
