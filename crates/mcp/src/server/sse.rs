//! Liveness event stream served at `/sse`.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use futures_util::stream::{self, Stream, StreamExt};
use tokio::time::{Instant, interval_at};

use crate::server::state::AppState;

/// Payload of the first event on every stream.
pub const LIVENESS_MESSAGE: &str = "MCP connector is live";

const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1);

/// One liveness event, then a `heartbeat` event carrying an RFC 3339
/// timestamp every heartbeat interval until the client disconnects or the
/// server shuts down.
pub async fn heartbeat_stream(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let period = state.heartbeat_interval().max(MIN_HEARTBEAT_INTERVAL);
    let live = stream::once(async { Ok(Event::default().data(LIVENESS_MESSAGE)) });
    let heartbeats = stream::unfold(interval_at(Instant::now() + period, period), |mut ticker| async move {
        ticker.tick().await;
        let event = Event::default().event("heartbeat").data(Utc::now().to_rfc3339());
        Some((Ok(event), ticker))
    });
    let shutdown = state.shutdown().clone().cancelled_owned();
    Sse::new(live.chain(heartbeats).take_until(shutdown)).keep_alive(KeepAlive::default())
}
