use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use time::OffsetDateTime;

use ticketing_backend::{
    api,
    auth::{AuthError, Identity},
    db::{self, event, refund, user::Role},
};

use super::{internal, reply};
use crate::SharedAppState;

async fn review_event(
    state: SharedAppState,
    identity: Identity,
    id: event::Id,
    status: event::Status,
) -> Result<Json<api::Event>, ManagementError> {
    identity.require(Role::Management)?;

    let reviewed = state
        .db_client
        .set_event_status(id, status, status == event::Status::Approved)
        .await?
        .ok_or(ManagementError::EventNotFound)?;
    tracing::info!(event_id = %reviewed.id, status = ?status, "event reviewed");

    Ok(Json(reviewed.into()))
}

pub async fn approve_event(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<event::Id>,
) -> Result<Json<api::Event>, ManagementError> {
    review_event(state, identity, id, event::Status::Approved).await
}

pub async fn reject_event(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<event::Id>,
) -> Result<Json<api::Event>, ManagementError> {
    review_event(state, identity, id, event::Status::Rejected).await
}

/// Closes a pending refund request. Inventory is left untouched.
async fn process_refund(
    state: SharedAppState,
    identity: Identity,
    id: refund::Id,
    decision: Option<api::refund::Decision>,
    status: refund::Status,
) -> Result<Json<api::RefundRequest>, ManagementError> {
    use ManagementError as E;

    identity.require(Role::Management)?;

    let decided = state
        .db_client
        .decide_refund_request(
            id,
            status,
            OffsetDateTime::now_utc(),
            decision.as_ref().and_then(|d| d.admin_notes.as_deref()),
        )
        .await?;
    let Some(request) = decided else {
        return match state.db_client.get_refund_request_by_id(id).await? {
            Some(_) => Err(E::RefundNotPending),
            None => Err(E::RefundNotFound),
        };
    };
    tracing::info!(refund_id = %request.id, status = ?status, "refund processed");

    Ok(Json(request.into()))
}

pub async fn approve_refund(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<refund::Id>,
    decision: Option<Json<api::refund::Decision>>,
) -> Result<Json<api::RefundRequest>, ManagementError> {
    let decision = decision.map(|Json(d)| d);
    process_refund(state, identity, id, decision, refund::Status::Approved)
        .await
}

pub async fn reject_refund(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(id): Path<refund::Id>,
    decision: Option<Json<api::refund::Decision>>,
) -> Result<Json<api::RefundRequest>, ManagementError> {
    let decision = decision.map(|Json(d)| d);
    process_refund(state, identity, id, decision, refund::Status::Rejected)
        .await
}

#[derive(Debug, From)]
pub enum ManagementError {
    #[from]
    AuthError(AuthError),
    #[from]
    DbError(db::Error),
    EventNotFound,
    RefundNotFound,
    RefundNotPending,
}

impl IntoResponse for ManagementError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthError(e) => e.into_response(),
            Self::RefundNotPending => reply(
                StatusCode::BAD_REQUEST,
                "refund request was already processed",
            ),
            Self::EventNotFound => {
                reply(StatusCode::NOT_FOUND, "event not found")
            }
            Self::RefundNotFound => {
                reply(StatusCode::NOT_FOUND, "refund request not found")
            }
            Self::DbError(e) => internal(&e),
        }
    }
}
