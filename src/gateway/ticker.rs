use super::SessionGateway;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Periodically credit pixel regeneration.
///
/// Runs in the background, independent of any connection. `period` must not
/// exceed the regeneration interval.
pub async fn run_regen_ticker(gateway: Arc<SessionGateway>, period: Duration) {
    let mut ticker = interval(period);

    // Skip missed ticks; a late tick catches up on every elapsed interval anyway
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let changed = gateway.tick(Instant::now());
        if changed > 0 {
            debug!(changed = changed, "Regenerated pixel budgets");
        }
    }
}
