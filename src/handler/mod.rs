pub mod auth;
pub mod checkout;
pub mod event;
pub mod management;
pub mod organizer;
pub mod profile;
pub mod refund;
pub mod ticket_type;

use std::fmt::Display;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use derive_more::From;

use ticketing_backend::api;

fn reply(status: StatusCode, message: impl ToString) -> Response {
    (status, Json(api::Error::new(message))).into_response()
}

/// Logs the cause and hides it from the client.
fn internal(cause: &dyn Display) -> Response {
    tracing::error!(error = %cause, "request failed");
    reply(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

/// JSON request body that answers malformed input with a 400 error body.
pub type JsonBody<T> = WithRejection<Json<T>, BadBody>;

#[derive(Debug, From)]
pub struct BadBody(JsonRejection);

impl IntoResponse for BadBody {
    fn into_response(self) -> Response {
        reply(StatusCode::BAD_REQUEST, self.0.body_text())
    }
}
