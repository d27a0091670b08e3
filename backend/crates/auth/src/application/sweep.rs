//! Refresh token sweep
//!
//! Periodically deletes expired or revoked refresh token rows. Runs on its own
//! task; failures are logged and the loop carries on.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::repository::RefreshTokenRepository;

/// Run one sweep, logging the outcome
pub async fn sweep_once<T>(tokens: &T)
where
    T: RefreshTokenRepository,
{
    match tokens.sweep().await {
        Ok(deleted) => {
            tracing::info!(tokens_deleted = deleted, "Swept expired/revoked refresh tokens");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Refresh token sweep failed");
        }
    }
}

/// Spawn the periodic sweep; the first run happens one `interval` from now
pub fn spawn_refresh_token_sweep<T>(tokens: Arc<T>, interval: Duration) -> JoinHandle<()>
where
    T: RefreshTokenRepository + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately; startup already swept once
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep_once(tokens.as_ref()).await;
        }
    })
}
