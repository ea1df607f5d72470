use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use derive_more::From;
use time::OffsetDateTime;

use ticketing_backend::{
    api,
    auth::{AuthError, Identity},
    db::{self, user::Role},
};

use super::{internal, reply, JsonBody};
use crate::SharedAppState;

async fn my_organizer(
    state: &SharedAppState,
    identity: Identity,
) -> Result<db::Organizer, EventError> {
    let identity = identity.require(Role::Organizer)?;
    state
        .db_client
        .get_organizer_by_user(identity.user_id)
        .await?
        .ok_or(EventError::OrganizerNotFound)
}

async fn owned_event(
    state: &SharedAppState,
    identity: Identity,
    id: api::event::Id,
) -> Result<db::Event, EventError> {
    let organizer = my_organizer(state, identity).await?;
    let event = state
        .db_client
        .get_event_by_id(id)
        .await?
        .ok_or(EventError::EventNotFound)?;

    if event.organizer_id != organizer.id {
        return Err(EventError::NotEventOwner);
    }
    Ok(event)
}

/// Submits an event for management review.
pub async fn add_event(
    State(state): State<SharedAppState>,
    identity: Identity,
    WithRejection(Json(new), _): JsonBody<api::event::New>,
) -> Result<(StatusCode, Json<api::Event>), EventError> {
    let organizer = my_organizer(&state, identity).await?;

    let event = new.into_event(organizer.id, OffsetDateTime::now_utc())?;
    state.db_client.insert_event(&event).await?;
    tracing::info!(event_id = %event.id, organizer_id = %organizer.id, "event submitted");

    Ok((StatusCode::CREATED, Json(event.into())))
}

pub async fn edit_event(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<api::event::Id>,
    WithRejection(Json(patch), _): JsonBody<api::event::Patch>,
) -> Result<Json<api::Event>, EventError> {
    let current = owned_event(&state, identity, id).await?;

    let updated = patch.apply(current)?;
    let stored = state
        .db_client
        .update_event_details(&updated)
        .await?
        .ok_or(EventError::EventNotFound)?;

    Ok(Json(stored.into()))
}

/// Removes an event nobody has bought tickets for, with its ticket types.
pub async fn delete_event(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<api::event::Id>,
) -> Result<StatusCode, EventError> {
    let event = owned_event(&state, identity, id).await?;

    if state.db_client.count_orders_of_event(event.id).await? > 0 {
        return Err(EventError::HasOrders);
    }
    state.db_client.delete_event(event.id).await.map_err(|e| {
        if db::is_foreign_key_violation(&e) {
            EventError::HasOrders
        } else {
            EventError::DbError(e)
        }
    })?;
    tracing::info!(event_id = %event.id, "event deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, From)]
pub enum EventError {
    #[from]
    AuthError(AuthError),
    #[from]
    DbError(db::Error),
    EventNotFound,
    HasOrders,
    #[from]
    Invalid(api::Invalid),
    NotEventOwner,
    OrganizerNotFound,
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthError(e) => e.into_response(),
            Self::Invalid(e) => reply(StatusCode::BAD_REQUEST, e),
            Self::HasOrders => {
                reply(StatusCode::BAD_REQUEST, "event already has orders")
            }
            Self::NotEventOwner => {
                reply(StatusCode::FORBIDDEN, "event belongs to another organizer")
            }
            Self::EventNotFound => reply(StatusCode::NOT_FOUND, "event not found"),
            Self::OrganizerNotFound => {
                reply(StatusCode::NOT_FOUND, "organizer profile not found")
            }
            Self::DbError(e) => internal(&e),
        }
    }
}
