use std::time::Duration;

/// Timing configuration for the job orchestrator.
///
/// Use [`OrchestratorConfig::builder()`] for ergonomic construction, or
/// [`OrchestratorConfig::default()`] for the service's nominal timings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound for job completion; also the denominator of the
    /// progress estimate. The wait phase ends when this budget is
    /// exhausted even if the service never signals completion.
    pub expected_duration: Duration,

    /// Period of the progress-publishing tick.
    pub tick_interval: Duration,

    /// How often the order status is polled for genuine completion
    /// during the wait phase.
    pub poll_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            expected_duration: Duration::from_secs(120),
            tick_interval: Duration::from_millis(100),
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl OrchestratorConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}

/// Builder for [`OrchestratorConfig`].
#[derive(Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    /// Set the expected job duration (progress budget and wait bound).
    pub fn with_expected_duration(mut self, duration: Duration) -> Self {
        self.config.expected_duration = duration;
        self
    }

    /// Set the progress tick period.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Set the completion-poll period.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Build the final [`OrchestratorConfig`].
    pub fn build(self) -> OrchestratorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.expected_duration, Duration::from_secs(120));
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::builder()
            .with_expected_duration(Duration::from_secs(10))
            .with_tick_interval(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(500))
            .build();

        assert_eq!(config.expected_duration, Duration::from_secs(10));
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }
}
