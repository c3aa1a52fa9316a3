use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Result, SyncError};

/// 本地冷却：两次发起之间至少间隔 `period`，避免触发后端限流。
#[derive(Debug)]
pub struct Cooldown {
    period: Duration,
    last: Mutex<Option<Instant>>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last: Mutex::new(None),
        }
    }

    /// 冷却结束则记录本次发起并返回 `Ok`，否则返回剩余时间。
    pub fn try_acquire(&self) -> Result<()> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if let Some(previous) = *last {
            let elapsed = now.duration_since(previous);
            if elapsed < self.period {
                return Err(SyncError::Cooldown {
                    remaining: self.period - elapsed,
                });
            }
        }

        *last = Some(now);
        Ok(())
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_attempt_within_period_is_rejected() {
        let cooldown = Cooldown::new(Duration::from_secs(3));
        assert_ok!(cooldown.try_acquire());

        tokio::time::advance(Duration::from_secs(1)).await;
        match cooldown.try_acquire() {
            Err(SyncError::Cooldown { remaining }) => {
                assert_eq!(remaining, Duration::from_secs(2));
            }
            other => panic!("expected cooldown, got {other:?}"),
        }

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_ok!(cooldown.try_acquire());
        assert_err!(cooldown.try_acquire());
    }

    #[test]
    fn zero_period_never_blocks() {
        let cooldown = Cooldown::new(Duration::ZERO);
        assert_ok!(cooldown.try_acquire());
        assert_ok!(cooldown.try_acquire());
        assert_eq!(cooldown.period(), Duration::ZERO);
    }
}
