use axum::{
    extract::State,
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

async fn my_profile(
    state: &SharedAppState,
    identity: Identity,
) -> Result<db::Organizer, OrganizerError> {
    let identity = identity.require(Role::Organizer)?;
    state
        .db_client
        .get_organizer_by_user(identity.user_id)
        .await?
        .ok_or(OrganizerError::OrganizerNotFound)
}

pub async fn get_profile(
    State(state): State<SharedAppState>,
    identity: Identity,
) -> Result<Json<api::Organizer>, OrganizerError> {
    Ok(Json(my_profile(&state, identity).await?.into()))
}

pub async fn edit_profile(
    State(state): State<SharedAppState>,
    identity: Identity,
    WithRejection(Json(patch), _): JsonBody<api::organizer::Patch>,
) -> Result<Json<api::Organizer>, OrganizerError> {
    let organizer = patch.apply(my_profile(&state, identity).await?)?;
    state.db_client.update_organizer(&organizer).await?;
    Ok(Json(organizer.into()))
}

/// Ticket types across the caller's events, with sold counts.
pub async fn ticket_types(
    State(state): State<SharedAppState>,
    identity: Identity,
) -> Result<Json<api::ticket_type::List>, OrganizerError> {
    let organizer = my_profile(&state, identity).await?;

    let ticket_types = state
        .db_client
        .get_ticket_types_by_organizer(organizer.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(api::ticket_type::List { ticket_types }))
}

#[derive(Debug, From)]
pub enum OrganizerError {
    #[from]
    AuthError(AuthError),
    #[from]
    DbError(db::Error),
    #[from]
    Invalid(api::Invalid),
    OrganizerNotFound,
}

impl IntoResponse for OrganizerError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthError(e) => e.into_response(),
            Self::Invalid(e) => reply(StatusCode::BAD_REQUEST, e),
            Self::OrganizerNotFound => {
                reply(StatusCode::NOT_FOUND, "organizer profile not found")
            }
            Self::DbError(e) => internal(&e),
        }
    }
}
