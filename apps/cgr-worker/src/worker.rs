use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::{self as tokio_time, MissedTickBehavior};

use cgr_service::{CacheEvictor, Result};

pub async fn sweep_once(evictor: &CacheEvictor) -> Result<u64> {
	evictor.sweep(OffsetDateTime::now_utc()).await
}

/// Sweeps on every tick, starting immediately. Failures are logged and retried on the next tick.
pub async fn run_worker(evictor: CacheEvictor, period: Duration) {
	let mut ticker = tokio_time::interval(period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		if let Err(err) = sweep_once(&evictor).await {
			tracing::error!(error = %err, "Result cache cleanup failed.");
		}
	}
}
