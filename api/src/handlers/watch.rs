//! Live club observation over server-sent events
//!
//! Every open stream attaches to the shared listener of its club; the listener
//! is torn down when the last stream disconnects.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{BoxStream, StreamExt};

use crate::auth::ActingPerson;
use crate::domain::entities::ClubId;
use crate::error::AppError;
use crate::AppState;

type EventStream = BoxStream<'static, Result<Event, axum::Error>>;

fn keep_alive() -> KeepAlive {
    KeepAlive::new().interval(Duration::from_secs(15))
}

/// GET /clubs/:club_id/watch
///
/// Emits a `club` event with the current snapshot, then one per change. An
/// `error` event is sent when the listener fails.
pub async fn watch_club(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Sse<EventStream>, AppError> {
    let club_id = ClubId::from(club_id);
    state.club_service.get_club(acting.id(), &club_id).await?;

    let events = state
        .selection_service
        .watch_club_for(acting.id(), &club_id)
        .map(|update| match update {
            Ok(snapshot) => Event::default().event("club").json_data(&snapshot),
            Err(e) => Ok(Event::default().event("error").data(e.to_string())),
        })
        .boxed();

    tracing::debug!(club_id = %club_id, person_id = %acting.id(), "Club watch opened");
    Ok(Sse::new(events).keep_alive(keep_alive()))
}

/// GET /clubs/:club_id/admin/watch
///
/// Emits `isAdmin` events carrying `true`/`false` whenever the acting person's
/// admin status changes.
pub async fn watch_is_admin(
    State(state): State<AppState>,
    acting: ActingPerson,
    Path(club_id): Path<String>,
) -> Result<Sse<EventStream>, AppError> {
    let club_id = ClubId::from(club_id);
    state.club_service.get_club(acting.id(), &club_id).await?;

    let events = state
        .selection_service
        .observe_is_admin(acting.id(), &club_id)
        .map(|is_admin| Ok(Event::default().event("isAdmin").data(is_admin.to_string())))
        .boxed();

    Ok(Sse::new(events).keep_alive(keep_alive()))
}
