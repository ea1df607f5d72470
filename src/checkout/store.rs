use std::error::Error as StdError;

use async_trait::async_trait;
use derive_more::Display;

use crate::db::{self, ticket_type, user, Order, Ticket, TicketType};

/// Persistence used by [`checkout`](super::checkout).
#[async_trait]
pub trait Store: Send + Sync {
    async fn user_exists(&self, id: user::Id) -> Result<bool, StoreError>;

    async fn ticket_type(
        &self,
        id: ticket_type::Id,
    ) -> Result<Option<TicketType>, StoreError>;

    /// Persists the order with its tickets and takes each quantity off its
    /// ticket type, all or nothing. A decrement that would drive a counter
    /// below zero fails with [`StoreError::Unavailable`] and nothing is
    /// persisted.
    async fn commit_order(
        &self,
        order: &Order,
        tickets: &[Ticket],
        decrements: &[(ticket_type::Id, u32)],
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Display)]
pub enum StoreError {
    #[display("ticket type {_0} has insufficient quantity")]
    Unavailable(ticket_type::Id),

    #[display("{_0}")]
    Backend(Box<dyn StdError + Send + Sync>),
}

impl StdError for StoreError {}

impl From<db::Error> for StoreError {
    fn from(e: db::Error) -> Self {
        Self::Backend(Box::new(e))
    }
}
