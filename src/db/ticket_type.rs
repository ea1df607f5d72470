use rust_decimal::Decimal;
use time::OffsetDateTime;
use tokio_postgres::{Error, Row};

use super::{event, organizer, uuid_id, Client};

#[derive(Clone, Debug, PartialEq)]
pub struct TicketType {
    pub id: Id,
    pub event_id: event::Id,
    pub name: String,
    pub price: Decimal,
    pub quantity_available: u32,
    pub sales_start: OffsetDateTime,
    pub sales_end: OffsetDateTime,
    pub description: Option<String>,
    pub is_active: bool,
}

impl TicketType {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            event_id: row.get("event_id"),
            name: row.get("name"),
            price: row.get("price"),
            // Never negative: the column has a CHECK constraint.
            quantity_available: u32::try_from(
                row.get::<_, i32>("quantity_available"),
            )
            .unwrap_or_default(),
            sales_start: row.get("sales_start"),
            sales_end: row.get("sales_end"),
            description: row.get("description"),
            is_active: row.get("is_active"),
        }
    }
}

/// Ticket type with its event title and the number of tickets sold.
#[derive(Clone, Debug)]
pub struct Listed {
    pub ticket_type: TicketType,
    pub event_title: String,
    pub sold: usize,
}

uuid_id!(Id);

const COLUMNS: &str = "id, event_id, name, price, quantity_available, \
                       sales_start, sales_end, description, is_active";

/// Counts beyond `INTEGER` are rejected before they reach the database.
fn quantity_param(quantity: u32) -> i32 {
    i32::try_from(quantity).unwrap_or(i32::MAX)
}

impl Client {
    pub async fn get_ticket_type_by_id(
        &self,
        id: Id,
    ) -> Result<Option<TicketType>, Error> {
        let sql = format!("SELECT {COLUMNS} FROM ticket_types WHERE id = $1");
        Ok(self
            .conn
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(TicketType::from_row))
    }

    /// Returns the row as stored.
    pub async fn insert_ticket_type(
        &self,
        ticket_type: &TicketType,
    ) -> Result<TicketType, Error> {
        let sql = format!(
            "INSERT INTO ticket_types (id, event_id, name, price, \
                                       quantity_available, sales_start, \
                                       sales_end, description, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );

        let quantity = quantity_param(ticket_type.quantity_available);
        let row = self
            .conn
            .query_one(
                &sql,
                &[
                    &ticket_type.id,
                    &ticket_type.event_id,
                    &ticket_type.name,
                    &ticket_type.price,
                    &quantity,
                    &ticket_type.sales_start,
                    &ticket_type.sales_end,
                    &ticket_type.description,
                    &ticket_type.is_active,
                ],
            )
            .await?;
        Ok(TicketType::from_row(&row))
    }

    /// Overwrites the editable columns. The counter is only replaced when
    /// `set_quantity` is given, so concurrent checkout decrements survive
    /// unrelated edits. Returns the stored row, if it still exists.
    pub async fn update_ticket_type(
        &self,
        ticket_type: &TicketType,
        set_quantity: bool,
    ) -> Result<Option<TicketType>, Error> {
        let sql = format!(
            "UPDATE ticket_types \
             SET name = $2, \
                 price = $3, \
                 quantity_available = CASE WHEN $9 THEN $4 \
                                           ELSE quantity_available END, \
                 sales_start = $5, \
                 sales_end = $6, \
                 description = $7, \
                 is_active = $8 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );

        let quantity = quantity_param(ticket_type.quantity_available);
        Ok(self
            .conn
            .query_opt(
                &sql,
                &[
                    &ticket_type.id,
                    &ticket_type.name,
                    &ticket_type.price,
                    &quantity,
                    &ticket_type.sales_start,
                    &ticket_type.sales_end,
                    &ticket_type.description,
                    &ticket_type.is_active,
                    &set_quantity,
                ],
            )
            .await?
            .as_ref()
            .map(TicketType::from_row))
    }

    pub async fn delete_ticket_type(&self, id: Id) -> Result<(), Error> {
        const SQL: &str = "DELETE FROM ticket_types WHERE id = $1";
        self.conn.execute(SQL, &[&id]).await.map(drop)
    }

    pub async fn count_tickets_of_type(&self, id: Id) -> Result<usize, Error> {
        const SQL: &str =
            "SELECT COUNT(*) FROM tickets WHERE ticket_type_id = $1";
        Ok(self
            .conn
            .query_one(SQL, &[&id])
            .await?
            .get::<_, i64>(0)
            .try_into()
            .unwrap_or_default())
    }

    /// All ticket types of the organizer's events, by event start.
    pub async fn get_ticket_types_by_organizer(
        &self,
        organizer_id: organizer::Id,
    ) -> Result<Vec<Listed>, Error> {
        const SQL: &str = "\
            SELECT tt.id, tt.event_id, tt.name, tt.price, \
                   tt.quantity_available, tt.sales_start, tt.sales_end, \
                   tt.description, tt.is_active, \
                   e.title AS event_title, COUNT(t.id) AS sold \
            FROM ticket_types tt \
            JOIN events e ON e.id = tt.event_id \
            LEFT JOIN tickets t ON t.ticket_type_id = tt.id \
            WHERE e.organizer_id = $1 \
            GROUP BY tt.id, e.title, e.start_at \
            ORDER BY e.start_at, tt.name";

        Ok(self
            .conn
            .query(SQL, &[&organizer_id])
            .await?
            .iter()
            .map(|row| Listed {
                ticket_type: TicketType::from_row(row),
                event_title: row.get("event_title"),
                sold: row
                    .get::<_, i64>("sold")
                    .try_into()
                    .unwrap_or_default(),
            })
            .collect())
    }
}
