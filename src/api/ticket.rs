use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db;

pub use crate::db::ticket::Id;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Id,
    pub ticket_type_id: db::ticket_type::Id,
    pub order_id: db::order::Id,
    pub attendee_name: String,
    pub attendee_email: String,
    pub unique_code: String,
    pub qr_code_path: Option<String>,
    pub is_redeemed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub redeemed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<db::Ticket> for Ticket {
    fn from(ticket: db::Ticket) -> Self {
        Self {
            id: ticket.id,
            ticket_type_id: ticket.ticket_type_id,
            order_id: ticket.order_id,
            attendee_name: ticket.attendee_name,
            attendee_email: ticket.attendee_email,
            unique_code: ticket.unique_code,
            qr_code_path: ticket.qr_code_path,
            is_redeemed: ticket.is_redeemed,
            redeemed_at: ticket.redeemed_at,
            created_at: ticket.created_at,
        }
    }
}
