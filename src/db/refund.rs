use enum_utils::TryFromRepr;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_postgres::{Error, Row};

use super::{smallint_enum, ticket, uuid_id, Client};

#[derive(Clone, Debug)]
pub struct RefundRequest {
    pub id: Id,
    pub ticket_id: ticket::Id,
    pub reason: String,
    pub status: Status,
    pub requested_at: OffsetDateTime,
    pub processed_at: Option<OffsetDateTime>,
    pub admin_notes: Option<String>,
}

impl RefundRequest {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            ticket_id: row.get("ticket_id"),
            reason: row.get("reason"),
            status: row.get("status"),
            requested_at: row.get("requested_at"),
            processed_at: row.get("processed_at"),
            admin_notes: row.get("admin_notes"),
        }
    }
}

uuid_id!(Id);

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, TryFromRepr, PartialEq, Serialize,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending = 1,
    Approved = 2,
    Rejected = 3,
}

smallint_enum!(Status, "refund status");

const COLUMNS: &str = "id, ticket_id, reason, status, requested_at, \
                       processed_at, admin_notes";

impl Client {
    pub async fn get_refund_request_by_id(
        &self,
        id: Id,
    ) -> Result<Option<RefundRequest>, Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM refund_requests WHERE id = $1");
        Ok(self
            .conn
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(RefundRequest::from_row))
    }

    pub async fn get_refund_request_by_ticket(
        &self,
        ticket_id: ticket::Id,
    ) -> Result<Option<RefundRequest>, Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM refund_requests WHERE ticket_id = $1"
        );
        Ok(self
            .conn
            .query_opt(&sql, &[&ticket_id])
            .await?
            .as_ref()
            .map(RefundRequest::from_row))
    }

    pub async fn insert_refund_request(
        &self,
        refund: &RefundRequest,
    ) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO refund_requests (id, ticket_id, reason, status, \
                                         requested_at, processed_at, \
                                         admin_notes) \
            VALUES ($1, $2, $3, $4, $5, $6, $7)";

        self.conn
            .execute(
                SQL,
                &[
                    &refund.id,
                    &refund.ticket_id,
                    &refund.reason,
                    &refund.status,
                    &refund.requested_at,
                    &refund.processed_at,
                    &refund.admin_notes,
                ],
            )
            .await
            .map(drop)
    }

    /// Closes the request only while it is still pending. `None` means it
    /// is missing or was already decided.
    pub async fn decide_refund_request(
        &self,
        id: Id,
        status: Status,
        processed_at: OffsetDateTime,
        admin_notes: Option<&str>,
    ) -> Result<Option<RefundRequest>, Error> {
        let sql = format!(
            "UPDATE refund_requests \
             SET status = $2, processed_at = $3, admin_notes = $4 \
             WHERE id = $1 AND status = $5 \
             RETURNING {COLUMNS}"
        );

        Ok(self
            .conn
            .query_opt(
                &sql,
                &[&id, &status, &processed_at, &admin_notes, &Status::Pending],
            )
            .await?
            .as_ref()
            .map(RefundRequest::from_row))
    }
}
