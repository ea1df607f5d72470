use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    api::{non_empty, Invalid},
    db,
};

pub use crate::db::event::{Id, Status};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Id,
    pub organizer_id: db::organizer::Id,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_at: OffsetDateTime,
    pub status: Status,
    pub is_active: bool,
}

impl From<db::Event> for Event {
    fn from(event: db::Event) -> Self {
        Self {
            id: event.id,
            organizer_id: event.organizer_id,
            title: event.title,
            description: event.description,
            category: event.category,
            start_at: event.start_at,
            end_at: event.end_at,
            status: event.status,
            is_active: event.is_active,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct New {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_at: OffsetDateTime,
}

impl New {
    /// Builds a pending event awaiting management review.
    pub fn into_event(
        self,
        organizer_id: db::organizer::Id,
        now: OffsetDateTime,
    ) -> Result<db::Event, Invalid> {
        let event = db::Event {
            id: Id::new(),
            organizer_id,
            title: self.title,
            description: self.description,
            category: self.category,
            start_at: self.start_at,
            end_at: self.end_at,
            status: Status::Pending,
            is_active: true,
            created_at: now,
        };
        validate(&event)?;
        Ok(event)
    }
}

/// Partial update of the organizer-editable fields.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_at: Option<OffsetDateTime>,
}

impl Patch {
    pub fn apply(self, mut event: db::Event) -> Result<db::Event, Invalid> {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(category) = self.category {
            event.category = Some(category);
        }
        if let Some(start) = self.start_at {
            event.start_at = start;
        }
        if let Some(end) = self.end_at {
            event.end_at = end;
        }

        validate(&event)?;
        Ok(event)
    }
}

fn validate(event: &db::Event) -> Result<(), Invalid> {
    non_empty(&event.title, "title must not be empty")?;
    non_empty(&event.description, "description must not be empty")?;
    if event.start_at > event.end_at {
        return Err(Invalid("event cannot end before it starts"));
    }
    Ok(())
}
