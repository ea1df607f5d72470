use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use derive_more::From;

use ticketing_backend::{
    api,
    auth::{AuthError, Identity},
    db::{self, user::Role},
};

use super::{internal, reply, JsonBody};
use crate::SharedAppState;

/// Loads the event, insisting it belongs to the calling organizer.
async fn owned_event(
    state: &SharedAppState,
    identity: Identity,
    event_id: db::event::Id,
) -> Result<db::Event, TicketTypeError> {
    use TicketTypeError as E;

    let identity = identity.require(Role::Organizer)?;
    let organizer = state
        .db_client
        .get_organizer_by_user(identity.user_id)
        .await?
        .ok_or(E::OrganizerNotFound)?;
    let event = state
        .db_client
        .get_event_by_id(event_id)
        .await?
        .ok_or(E::EventNotFound)?;

    if event.organizer_id != organizer.id {
        return Err(E::NotEventOwner);
    }
    Ok(event)
}

async fn owned_ticket_type(
    state: &SharedAppState,
    identity: Identity,
    id: api::ticket_type::Id,
) -> Result<db::TicketType, TicketTypeError> {
    let ticket_type = state
        .db_client
        .get_ticket_type_by_id(id)
        .await?
        .ok_or(TicketTypeError::TicketTypeNotFound)?;
    owned_event(state, identity, ticket_type.event_id).await?;
    Ok(ticket_type)
}

pub async fn add_ticket_type(
    State(state): State<SharedAppState>,
    identity: Identity,
    WithRejection(Json(new), _): JsonBody<api::ticket_type::New>,
) -> Result<(StatusCode, Json<api::TicketType>), TicketTypeError> {
    owned_event(&state, identity, new.event_id).await?;

    let ticket_type = state
        .db_client
        .insert_ticket_type(&new.into_ticket_type()?)
        .await?;
    tracing::info!(
        ticket_type_id = %ticket_type.id,
        event_id = %ticket_type.event_id,
        "ticket type created"
    );

    Ok((StatusCode::CREATED, Json(ticket_type.into())))
}

pub async fn edit_ticket_type(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<api::ticket_type::Id>,
    WithRejection(Json(patch), _): JsonBody<api::ticket_type::Patch>,
) -> Result<Json<api::TicketType>, TicketTypeError> {
    let current = owned_ticket_type(&state, identity, id).await?;

    let set_quantity = patch.quantity_available.is_some();
    let updated = patch.apply(current)?;
    let stored = state
        .db_client
        .update_ticket_type(&updated, set_quantity)
        .await?
        .ok_or(TicketTypeError::TicketTypeNotFound)?;

    Ok(Json(stored.into()))
}

pub async fn delete_ticket_type(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<api::ticket_type::Id>,
) -> Result<StatusCode, TicketTypeError> {
    let ticket_type = owned_ticket_type(&state, identity, id).await?;

    if state.db_client.count_tickets_of_type(ticket_type.id).await? > 0 {
        return Err(TicketTypeError::TicketsSold);
    }
    state.db_client.delete_ticket_type(ticket_type.id).await?;
    tracing::info!(ticket_type_id = %ticket_type.id, "ticket type deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, From)]
pub enum TicketTypeError {
    #[from]
    AuthError(AuthError),
    #[from]
    DbError(db::Error),
    EventNotFound,
    #[from]
    Invalid(api::Invalid),
    NotEventOwner,
    OrganizerNotFound,
    TicketTypeNotFound,
    TicketsSold,
}

impl IntoResponse for TicketTypeError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthError(e) => e.into_response(),
            Self::Invalid(e) => reply(StatusCode::BAD_REQUEST, e),
            Self::TicketsSold => reply(
                StatusCode::BAD_REQUEST,
                "ticket type has sold tickets",
            ),
            Self::NotEventOwner => {
                reply(StatusCode::FORBIDDEN, "event belongs to another organizer")
            }
            Self::EventNotFound => reply(StatusCode::NOT_FOUND, "event not found"),
            Self::OrganizerNotFound => {
                reply(StatusCode::NOT_FOUND, "organizer profile not found")
            }
            Self::TicketTypeNotFound => {
                reply(StatusCode::NOT_FOUND, "ticket type not found")
            }
            Self::DbError(e) => internal(&e),
        }
    }
}
