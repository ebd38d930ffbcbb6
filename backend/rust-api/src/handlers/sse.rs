use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use chrono::Utc;
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    metrics::SSE_CONNECTIONS_ACTIVE,
    models::{
        timer::{TimeExpired, TimerEvent, TimerTick},
        SessionStatus,
    },
    services::AppState,
};

use super::session_error;

/// SSE endpoint driving a timed session's countdown
/// GET /api/v1/sessions/{id}/stream
pub async fn session_stream(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let timer = state
        .sessions
        .attach_stream(session_id)
        .map_err(session_error)?;

    let tick_interval = state.config.sse_tick_interval_ms;
    tracing::info!(
        "Starting SSE stream: session={}, remaining={}s, tick_interval={}ms",
        session_id,
        timer.remaining_seconds,
        tick_interval
    );

    let first = tick_event(session_id, timer.remaining_seconds, timer.total_seconds);
    let stream = create_timer_stream(state, session_id, timer.total_seconds, tick_interval, first);

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Releases the session's countdown and the connection gauge however the
/// stream ends.
struct ConnectionGuard {
    state: Arc<AppState>,
    session_id: Uuid,
}

impl ConnectionGuard {
    fn new(state: Arc<AppState>, session_id: Uuid) -> Self {
        SSE_CONNECTIONS_ACTIVE.inc();
        Self { state, session_id }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.sessions.detach_stream(self.session_id);
        SSE_CONNECTIONS_ACTIVE.dec();
    }
}

fn tick_event(session_id: Uuid, remaining: u32, total: u32) -> TimerEvent {
    TimerEvent::TimerTick(TimerTick {
        session_id: session_id.to_string(),
        remaining_seconds: remaining,
        elapsed_seconds: total.saturating_sub(remaining),
        total_seconds: total,
        timestamp: Utc::now(),
    })
}

fn to_event(timer_event: &TimerEvent) -> Event {
    Event::default()
        .event(timer_event.event_name())
        .data(timer_event.to_sse_data())
}

enum StreamState {
    Pending(TimerEvent),
    Running,
    Done,
}

/// Emits the current countdown, then ticks the session once per interval
/// until it expires, completes some other way, or disappears.
fn create_timer_stream(
    state: Arc<AppState>,
    session_id: Uuid,
    total_seconds: u32,
    tick_interval_ms: u64,
    first: TimerEvent,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(
        (
            StreamState::Pending(first),
            ConnectionGuard::new(state.clone(), session_id),
        ),
        move |(stream_state, guard)| {
            let state = state.clone();
            async move {
                match stream_state {
                    StreamState::Done => None,
                    StreamState::Pending(event) => {
                        Some((Ok(to_event(&event)), (StreamState::Running, guard)))
                    }
                    StreamState::Running => {
                        sleep(Duration::from_millis(tick_interval_ms)).await;

                        let response = match state.sessions.stream_tick(session_id) {
                            Ok(response) => response,
                            Err(e) => {
                                tracing::info!("Closing SSE stream: session={}, {}", session_id, e);
                                return None;
                            }
                        };

                        if response.status != SessionStatus::Complete {
                            let event =
                                tick_event(session_id, response.seconds_remaining, total_seconds);
                            return Some((Ok(to_event(&event)), (StreamState::Running, guard)));
                        }

                        if response.seconds_remaining > 0 {
                            // Finished by answers before the timer ran out.
                            return None;
                        }

                        let expired = TimerEvent::TimeExpired(TimeExpired {
                            session_id: session_id.to_string(),
                            timestamp: Utc::now(),
                            score: response.score,
                            passed: response.passed,
                            badges_awarded: response.badges_awarded,
                        });
                        tracing::info!("Timer expired: session={}", session_id);
                        Some((Ok(to_event(&expired)), (StreamState::Done, guard)))
                    }
                }
            }
        },
    )
}
