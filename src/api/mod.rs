//! JSON shapes of the HTTP API, shared with the integration tests.

pub mod checkout;
pub mod event;
pub mod order;
pub mod organizer;
pub mod refund;
pub mod ticket;
pub mod ticket_type;
pub mod user;

use derive_more::Display;
use serde::{Deserialize, Serialize};

pub use self::{
    checkout::Receipt, event::Event, order::Order, organizer::Organizer,
    refund::RefundRequest, ticket::Ticket, ticket_type::TicketType,
    user::User,
};

/// Body of every non-2xx response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Error {
    pub error: String,
}

impl Error {
    pub fn new(message: impl ToString) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Rejected field of a create or update payload.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{_0}")]
pub struct Invalid(pub &'static str);

impl std::error::Error for Invalid {}

pub(crate) fn non_empty(
    value: &str,
    what: &'static str,
) -> Result<(), Invalid> {
    if value.trim().is_empty() {
        Err(Invalid(what))
    } else {
        Ok(())
    }
}
