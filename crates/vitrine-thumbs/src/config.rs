use std::time::Duration;

use vitrine_engine::device::SurfaceInit;

/// Thumbnail pipeline configuration.
///
/// Defaults reproduce the gallery's behavior: 200×200 PNGs, one worker,
/// 50ms between tasks, 3 attempts with 100ms linear backoff.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,

    /// Queue pacing and task timeout.
    pub queue: QueueConfig,

    /// Renderer retry policy.
    pub retry: RetryPolicy,

    /// Number of queue workers, each with its own renderer. Values below 1
    /// are treated as 1.
    pub workers: usize,

    /// Time value passed to update hooks so thumbnails are not all frame zero.
    pub update_time: f32,

    /// Offscreen surface options.
    pub surface: SurfaceInit,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            queue: QueueConfig::default(),
            retry: RetryPolicy::default(),
            workers: 1,
            update_time: 1.0,
            surface: SurfaceInit::default(),
        }
    }
}

impl ThumbnailConfig {
    /// Square thumbnails of `size` pixels, other settings default.
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            ..Self::default()
        }
    }
}

/// Queue scheduling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Delay between dequeuing a task and running it.
    pub pacing: Duration,
    /// Upper bound on one task's run time. `None` disables the bound.
    pub task_timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(50),
            task_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Attempt budget and linear backoff for one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1 is always made.
    pub max_attempts: u32,
    /// Backoff after attempt `n` is `n * backoff_step`.
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-based).
    #[inline]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_linear() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_after(1), Duration::from_millis(100));
        assert_eq!(p.delay_after(2), Duration::from_millis(200));
    }

    #[test]
    fn defaults_match_gallery() {
        let c = ThumbnailConfig::default();
        assert_eq!((c.width, c.height), (200, 200));
        assert_eq!(c.queue.pacing, Duration::from_millis(50));
        assert_eq!(c.retry.max_attempts, 3);
        assert_eq!(c.workers, 1);
    }
}
