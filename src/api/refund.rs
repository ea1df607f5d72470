use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db;

pub use crate::db::refund::{Id, Status};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub id: Id,
    pub ticket_id: db::ticket::Id,
    pub reason: String,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub requested_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub processed_at: Option<OffsetDateTime>,
    pub admin_notes: Option<String>,
}

impl From<db::RefundRequest> for RefundRequest {
    fn from(r: db::RefundRequest) -> Self {
        Self {
            id: r.id,
            ticket_id: r.ticket_id,
            reason: r.reason,
            status: r.status,
            requested_at: r.requested_at,
            processed_at: r.processed_at,
            admin_notes: r.admin_notes,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct New {
    pub reason: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub admin_notes: Option<String>,
}
