//! Daily fine calculation on a background task

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;

use super::{borrows::LifecycleManager, clock::Clock};

/// Next occurrence of `at` strictly after `now`
pub fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Runs `LifecycleManager::calculate_fines` once a day at a fixed local time
pub struct FineScheduler {
    lifecycle: LifecycleManager,
    clock: Arc<dyn Clock>,
    run_at: NaiveTime,
}

impl FineScheduler {
    pub fn new(lifecycle: LifecycleManager, clock: Arc<dyn Clock>, run_at: NaiveTime) -> Self {
        Self {
            lifecycle,
            clock,
            run_at,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        tracing::info!(run_at = %self.run_at, "Fine scheduler started");
        loop {
            let now = self.clock.now();
            let next = next_run(now, self.run_at);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!(next_run = %next, "Waiting for next fine run");
            tokio::time::sleep(wait).await;

            match self.lifecycle.calculate_fines().await {
                Ok(charged) => tracing::info!(charged, "Fine calculation complete"),
                Err(e) => tracing::error!("Fine calculation failed: {}", e),
            }
        }
    }
}
