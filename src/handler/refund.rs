use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use derive_more::From;
use time::OffsetDateTime;

use ticketing_backend::{api, auth::Identity, db};

use super::{internal, reply, JsonBody};
use crate::SharedAppState;

/// Files a refund request for a ticket the caller bought.
pub async fn request_refund(
    State(state): State<SharedAppState>,
    identity: Identity,
    Path(ticket_id): Path<api::ticket::Id>,
    WithRejection(Json(new), _): JsonBody<api::refund::New>,
) -> Result<(StatusCode, Json<api::RefundRequest>), RequestRefundError> {
    use RequestRefundError as E;

    let reason = new.reason.trim().to_owned();
    if reason.is_empty() {
        return Err(E::MissingReason);
    }

    let ticket = state
        .db_client
        .get_ticket_by_id(ticket_id)
        .await?
        .ok_or(E::TicketNotFound)?;
    // Tickets of other users are reported as missing.
    state
        .db_client
        .get_order_by_id(ticket.order_id)
        .await?
        .filter(|o| o.user_id == Some(identity.user_id))
        .ok_or(E::TicketNotFound)?;

    if state
        .db_client
        .get_refund_request_by_ticket(ticket.id)
        .await?
        .is_some()
    {
        return Err(E::AlreadyRequested);
    }

    let refund = db::RefundRequest {
        id: db::refund::Id::new(),
        ticket_id: ticket.id,
        reason,
        status: db::refund::Status::Pending,
        requested_at: OffsetDateTime::now_utc(),
        processed_at: None,
        admin_notes: None,
    };
    state
        .db_client
        .insert_refund_request(&refund)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                E::AlreadyRequested
            } else {
                E::DbError(e)
            }
        })?;
    tracing::info!(refund_id = %refund.id, ticket_id = %ticket.id, "refund requested");

    Ok((StatusCode::CREATED, Json(refund.into())))
}

#[derive(Debug, From)]
pub enum RequestRefundError {
    AlreadyRequested,
    #[from]
    DbError(db::Error),
    MissingReason,
    TicketNotFound,
}

impl IntoResponse for RequestRefundError {
    fn into_response(self) -> Response {
        match self {
            Self::AlreadyRequested => reply(
                StatusCode::BAD_REQUEST,
                "refund already requested for this ticket",
            ),
            Self::MissingReason => {
                reply(StatusCode::BAD_REQUEST, "reason is required")
            }
            Self::TicketNotFound => {
                reply(StatusCode::NOT_FOUND, "ticket not found")
            }
            Self::DbError(e) => internal(&e),
        }
    }
}
