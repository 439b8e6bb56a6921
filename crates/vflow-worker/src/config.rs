//! Worker configuration.

use std::time::Duration;

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Runtime configuration for the processing worker, read from environment
/// variables at startup.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum number of jobs processed concurrently
    pub max_concurrent_jobs: usize,
    /// Maximum messages pulled per queue read
    pub batch_size: usize,
    /// Wall-clock ceiling for one processing attempt
    pub job_timeout: Duration,
    /// Retry attempts after the first failure, before dead-lettering
    pub max_retries: u32,
    /// Base delay of the exponential backoff schedule
    pub retry_base_delay: Duration,
    /// Cap on any single backoff delay
    pub retry_max_delay: Duration,
    /// Simulated transcode duration
    pub transcode_delay: Duration,
    /// How often to sweep for messages abandoned by crashed workers
    pub claim_interval: Duration,
    /// Port for the health/metrics endpoint
    pub health_port: u16,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 5,
            batch_size: 5,
            job_timeout: Duration::from_secs(300),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(2),
            retry_max_delay: Duration::from_secs(60),
            transcode_delay: Duration::from_secs(2),
            claim_interval: Duration::from_secs(30),
            health_port: 8081,
        }
    }
}

impl WorkerConfig {
    /// Upper bound on how long one delivery can legitimately stay in
    /// flight: every attempt may run to the job timeout, with a backoff
    /// sleep between attempts. The claim sweep must not reclaim a message
    /// before this much idle time has passed, or a job still inside
    /// another worker's retry loop gets delivered twice.
    pub fn worst_case_residency(&self) -> Duration {
        let retry = crate::retry::RetryConfig::from_worker_config(self);
        let mut total = self.job_timeout.saturating_mul(self.max_retries + 1);
        for attempt in 0..self.max_retries {
            total = total.saturating_add(retry.delay_for_attempt(attempt));
        }
        total
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_jobs: env_u64(
                "WORKER_MAX_CONCURRENT_JOBS",
                defaults.max_concurrent_jobs as u64,
            ) as usize,
            batch_size: env_u64("WORKER_BATCH_SIZE", defaults.batch_size as u64) as usize,
            job_timeout: Duration::from_secs(env_u64("WORKER_JOB_TIMEOUT", 300)),
            max_retries: env_u64("WORKER_MAX_RETRIES", defaults.max_retries as u64) as u32,
            retry_base_delay: Duration::from_secs(env_u64("WORKER_RETRY_BASE_DELAY", 2)),
            retry_max_delay: Duration::from_secs(env_u64("WORKER_RETRY_MAX_DELAY", 60)),
            transcode_delay: Duration::from_secs(env_u64("WORKER_TRANSCODE_DELAY", 2)),
            claim_interval: Duration::from_secs(env_u64("WORKER_CLAIM_INTERVAL", 30)),
            health_port: env_u64("WORKER_HEALTH_PORT", defaults.health_port as u64) as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = WorkerConfig::default();
        assert_eq!(config.max_concurrent_jobs, 5);
        assert_eq!(config.max_retries, 3);
        assert!(config.retry_base_delay < config.retry_max_delay);
    }

    #[test]
    fn residency_covers_all_attempts_and_backoff() {
        // Four 300s attempts plus backoff sleeps of 2, 4 and 8 seconds.
        let config = WorkerConfig::default();
        assert_eq!(config.worst_case_residency(), Duration::from_secs(1214));
    }
}
