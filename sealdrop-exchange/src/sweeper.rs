//! Periodic expiry sweeper.

use crate::exchange::DocumentExchange;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Background task that runs the expiry sweep on a fixed interval.
///
/// Spawn with `tokio::spawn(sweeper.run())`; dropping the join handle's
/// task aborts the loop. Sweeps are idempotent, so overlapping or missed
/// ticks are harmless.
pub struct Sweeper {
    exchange: Arc<DocumentExchange>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(exchange: Arc<DocumentExchange>, interval: Duration) -> Self {
        Self { exchange, interval }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick fires immediately; that initial sweep clears
        // anything that expired while the process was down.
        loop {
            ticker.tick().await;
            match self.exchange.sweep_expired() {
                Ok(0) => debug!("expiry sweep found nothing to destroy"),
                Ok(removed) => debug!(removed, "expiry sweep completed"),
                Err(e) => error!(error = %e, "expiry sweep failed"),
            }
        }
    }
}
