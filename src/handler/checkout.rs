use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use derive_more::From;

use ticketing_backend::{api, checkout};

use super::{internal, reply, JsonBody};
use crate::SharedAppState;

pub async fn checkout(
    State(state): State<SharedAppState>,
    WithRejection(Json(req), _): JsonBody<api::checkout::Request>,
) -> Result<Json<api::Receipt>, CheckoutError> {
    let receipt =
        checkout::checkout(&state.db_client, &state.qr, req.into()).await?;
    Ok(Json(receipt.into()))
}

#[derive(Debug, From)]
pub struct CheckoutError(checkout::Error);

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        use checkout::Error as E;

        match self.0 {
            e @ (E::InvalidRequest(_) | E::Unavailable(_) | E::MultiEventOrder) => {
                reply(StatusCode::BAD_REQUEST, e)
            }
            e @ E::UserNotFound => reply(StatusCode::NOT_FOUND, e),
            E::Internal(e) => internal(&e),
        }
    }
}
