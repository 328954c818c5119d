//! Backoff waits, behind a trait so tests can observe them without waiting.

use std::time::Duration;

#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Suspends on the tokio timer; other in-flight calls keep running.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSleeper;
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_on_virtual_time() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(1_500)).await;
        assert!(start.elapsed() >= Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn recording_sleeper_keeps_order() {
        let sleeper = RecordingSleeper::default();
        sleeper.sleep(Duration::from_millis(1_000)).await;
        sleeper.sleep(Duration::from_millis(2_000)).await;
        assert_eq!(sleeper.delays_ms(), vec![1_000, 2_000]);
    }
}
