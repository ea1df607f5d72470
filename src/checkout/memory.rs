//! In-memory [`Store`] for exercising the checkout engine.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::db::{event, ticket_type, user, Order, Ticket, TicketType};

use super::{Store, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_commit: AtomicBool,
}

#[derive(Default)]
struct State {
    users: HashSet<user::Id>,
    ticket_types: HashMap<ticket_type::Id, TicketType>,
    orders: Vec<Order>,
    tickets: Vec<Ticket>,
}

impl MemoryStore {
    pub fn add_user(&self) -> user::Id {
        let id = user::Id::new();
        self.state.lock().unwrap().users.insert(id);
        id
    }

    pub fn add_ticket_type(
        &self,
        event_id: event::Id,
        price: Decimal,
        quantity_available: u32,
    ) -> ticket_type::Id {
        let now = OffsetDateTime::now_utc();
        let ticket_type = TicketType {
            id: ticket_type::Id::new(),
            event_id,
            name: "General".into(),
            price,
            quantity_available,
            sales_start: now - time::Duration::days(1),
            sales_end: now + time::Duration::days(30),
            description: None,
            is_active: true,
        };
        let id = ticket_type.id;
        self.state.lock().unwrap().ticket_types.insert(id, ticket_type);
        id
    }

    pub fn fail_next_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }

    pub fn quantity(&self, id: ticket_type::Id) -> u32 {
        self.state.lock().unwrap().ticket_types[&id].quantity_available
    }

    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        self.state.lock().unwrap().tickets.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn user_exists(&self, id: user::Id) -> Result<bool, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.state.lock().unwrap().users.contains(&id))
    }

    async fn ticket_type(
        &self,
        id: ticket_type::Id,
    ) -> Result<Option<TicketType>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.state.lock().unwrap().ticket_types.get(&id).cloned())
    }

    async fn commit_order(
        &self,
        order: &Order,
        tickets: &[Ticket],
        decrements: &[(ticket_type::Id, u32)],
    ) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        if self.fail_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".into()));
        }

        let mut state = self.state.lock().unwrap();
        for &(id, quantity) in decrements {
            match state.ticket_types.get(&id) {
                Some(t) if t.quantity_available >= quantity => {}
                _ => return Err(StoreError::Unavailable(id)),
            }
        }
        for &(id, quantity) in decrements {
            if let Some(t) = state.ticket_types.get_mut(&id) {
                t.quantity_available -= quantity;
            }
        }
        state.orders.push(order.clone());
        state.tickets.extend_from_slice(tickets);
        Ok(())
    }
}
