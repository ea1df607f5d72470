use enum_utils::TryFromRepr;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_postgres::{Error, Row};

use super::{organizer, smallint_enum, uuid_id, Client};

#[derive(Clone, Debug)]
pub struct Event {
    pub id: Id,
    pub organizer_id: organizer::Id,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub start_at: OffsetDateTime,
    pub end_at: OffsetDateTime,
    pub status: Status,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

impl Event {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            organizer_id: row.get("organizer_id"),
            title: row.get("title"),
            description: row.get("description"),
            category: row.get("category"),
            start_at: row.get("start_at"),
            end_at: row.get("end_at"),
            status: row.get("status"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
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
    /// Waiting for management review.
    Pending = 1,
    Approved = 2,
    Rejected = 3,
}

smallint_enum!(Status, "event status");

const COLUMNS: &str = "id, organizer_id, title, description, category, \
                       start_at, end_at, status, is_active, created_at";

impl Client {
    pub async fn get_event_by_id(
        &self,
        id: Id,
    ) -> Result<Option<Event>, Error> {
        let sql = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        Ok(self
            .conn
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(Event::from_row))
    }

    pub async fn insert_event(&self, event: &Event) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO events (id, organizer_id, title, description, \
                                category, start_at, end_at, status, \
                                is_active, created_at) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";

        self.conn
            .execute(
                SQL,
                &[
                    &event.id,
                    &event.organizer_id,
                    &event.title,
                    &event.description,
                    &event.category,
                    &event.start_at,
                    &event.end_at,
                    &event.status,
                    &event.is_active,
                    &event.created_at,
                ],
            )
            .await
            .map(drop)
    }

    /// Replaces the organizer-editable columns. Review state is left as
    /// stored.
    pub async fn update_event_details(
        &self,
        event: &Event,
    ) -> Result<Option<Event>, Error> {
        let sql = format!(
            "UPDATE events \
             SET title = $2, description = $3, category = $4, \
                 start_at = $5, end_at = $6 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );

        Ok(self
            .conn
            .query_opt(
                &sql,
                &[
                    &event.id,
                    &event.title,
                    &event.description,
                    &event.category,
                    &event.start_at,
                    &event.end_at,
                ],
            )
            .await?
            .as_ref()
            .map(Event::from_row))
    }

    pub async fn set_event_status(
        &self,
        id: Id,
        status: Status,
        is_active: bool,
    ) -> Result<Option<Event>, Error> {
        let sql = format!(
            "UPDATE events SET status = $2, is_active = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );

        Ok(self
            .conn
            .query_opt(&sql, &[&id, &status, &is_active])
            .await?
            .as_ref()
            .map(Event::from_row))
    }

    /// Orders keep their event, so an event with orders cannot go away.
    pub async fn count_orders_of_event(&self, id: Id) -> Result<usize, Error> {
        const SQL: &str = "SELECT COUNT(*) FROM orders WHERE event_id = $1";

        Ok(self
            .conn
            .query_one(SQL, &[&id])
            .await?
            .get::<_, i64>(0)
            .try_into()
            .unwrap_or_default())
    }

    /// Deletes the event with its ticket types.
    pub async fn delete_event(&self, id: Id) -> Result<(), Error> {
        const SQL: &str = "DELETE FROM events WHERE id = $1";

        self.conn.execute(SQL, &[&id]).await.map(drop)
    }
}
