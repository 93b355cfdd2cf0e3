use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that keeps alert subscriptions alive.
///
/// Every interval tick, a Ping frame goes to each connected client so
/// proxies between the admin UI and the server do not drop quiet
/// connections (route alerts can be minutes or hours apart). Ticks with no
/// connected clients are skipped. The returned `JoinHandle` is aborted
/// during shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = ws_manager.connection_count().await;
            if count == 0 {
                continue;
            }
            tracing::debug!(count, "Pinging alert subscribers");
            ws_manager.ping_all().await;
        }
    })
}
