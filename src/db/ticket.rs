use time::OffsetDateTime;
use tokio_postgres::{Error, Row, Statement, Transaction};

use super::{order, ticket_type, uuid_id, Client};

#[derive(Clone, Debug, PartialEq)]
pub struct Ticket {
    pub id: Id,
    pub ticket_type_id: ticket_type::Id,
    pub order_id: order::Id,
    pub attendee_name: String,
    pub attendee_email: String,
    pub unique_code: String,
    pub qr_code_path: Option<String>,
    pub is_redeemed: bool,
    pub redeemed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Ticket {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            ticket_type_id: row.get("ticket_type_id"),
            order_id: row.get("order_id"),
            attendee_name: row.get("attendee_name"),
            attendee_email: row.get("attendee_email"),
            unique_code: row.get("unique_code"),
            qr_code_path: row.get("qr_code_path"),
            is_redeemed: row.get("is_redeemed"),
            redeemed_at: row.get("redeemed_at"),
            created_at: row.get("created_at"),
        }
    }
}

uuid_id!(Id);

const COLUMNS: &str = "id, ticket_type_id, order_id, attendee_name, \
                       attendee_email, unique_code, qr_code_path, \
                       is_redeemed, redeemed_at, created_at";

pub(super) async fn prepare_insert(
    tx: &Transaction<'_>,
) -> Result<Statement, Error> {
    tx.prepare(
        "INSERT INTO tickets (id, ticket_type_id, order_id, attendee_name, \
                              attendee_email, unique_code, qr_code_path, \
                              is_redeemed, redeemed_at, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .await
}

pub(super) async fn insert(
    tx: &Transaction<'_>,
    stmt: &Statement,
    ticket: &Ticket,
) -> Result<(), Error> {
    tx.execute(
        stmt,
        &[
            &ticket.id,
            &ticket.ticket_type_id,
            &ticket.order_id,
            &ticket.attendee_name,
            &ticket.attendee_email,
            &ticket.unique_code,
            &ticket.qr_code_path,
            &ticket.is_redeemed,
            &ticket.redeemed_at,
            &ticket.created_at,
        ],
    )
    .await
    .map(drop)
}

impl Client {
    pub async fn get_ticket_by_id(
        &self,
        id: Id,
    ) -> Result<Option<Ticket>, Error> {
        let sql = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        Ok(self
            .conn
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(Ticket::from_row))
    }

    pub async fn get_tickets_by_orders(
        &self,
        order_ids: &[order::Id],
    ) -> Result<Vec<Ticket>, Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tickets \
             WHERE order_id IN (SELECT unnest($1::UUID[])) \
             ORDER BY created_at, id"
        );
        Ok(self
            .conn
            .query(&sql, &[&order_ids])
            .await?
            .iter()
            .map(Ticket::from_row)
            .collect())
    }
}
