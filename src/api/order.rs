use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{api, db};

pub use crate::db::order::{Id, PaymentStatus, Status};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Id,
    pub event_id: db::event::Id,
    pub customer_email: String,
    pub total_amount: Decimal,
    pub status: Status,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub billing_address: Option<String>,
    pub transaction_reference: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub tickets: Vec<api::Ticket>,
}

impl Order {
    pub fn new(order: db::Order, tickets: Vec<api::Ticket>) -> Self {
        Self {
            id: order.id,
            event_id: order.event_id,
            customer_email: order.customer_email,
            total_amount: order.total_amount,
            status: order.status,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            billing_address: order.billing_address,
            transaction_reference: order.transaction_reference,
            created_at: order.created_at,
            tickets,
        }
    }
}

/// Purchase history, newest order first.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct List {
    pub orders: Vec<Order>,
}
