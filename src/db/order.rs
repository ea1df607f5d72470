use async_trait::async_trait;
use enum_utils::TryFromRepr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_postgres::{Error, Row};

use crate::checkout::{self, StoreError};

use super::{
    event, smallint_enum, ticket, ticket_type, user, uuid_id, Client, Ticket,
    TicketType,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub id: Id,
    pub user_id: Option<user::Id>,
    pub event_id: event::Id,
    pub customer_email: String,
    pub total_amount: Decimal,
    pub status: Status,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub billing_address: Option<String>,
    pub transaction_reference: String,
    pub created_at: OffsetDateTime,
}

impl Order {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            user_id: row.get("user_id"),
            event_id: row.get("event_id"),
            customer_email: row.get("customer_email"),
            total_amount: row.get("total_amount"),
            status: row.get("status"),
            payment_method: row.get("payment_method"),
            payment_status: row.get("payment_status"),
            billing_address: row.get("billing_address"),
            transaction_reference: row.get("transaction_reference"),
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
    Pending = 1,
    Completed = 2,
    Cancelled = 3,
}

smallint_enum!(Status, "order status");

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, TryFromRepr, PartialEq, Serialize,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending = 1,
    Paid = 2,
    Refunded = 3,
}

smallint_enum!(PaymentStatus, "payment status");

impl Client {
    /// Orders of the user, newest first.
    pub async fn get_orders_by_user(
        &self,
        user_id: user::Id,
    ) -> Result<Vec<Order>, Error> {
        const SQL: &str = "\
            SELECT id, user_id, event_id, customer_email, total_amount, \
                   status, payment_method, payment_status, billing_address, \
                   transaction_reference, created_at \
            FROM orders \
            WHERE user_id = $1 \
            ORDER BY created_at DESC, \
                     id DESC";
        Ok(self
            .conn
            .query(SQL, &[&user_id])
            .await?
            .iter()
            .map(Order::from_row)
            .collect())
    }

    pub async fn get_order_by_id(
        &self,
        id: Id,
    ) -> Result<Option<Order>, Error> {
        const SQL: &str = "\
            SELECT id, user_id, event_id, customer_email, total_amount, \
                   status, payment_method, payment_status, billing_address, \
                   transaction_reference, created_at \
            FROM orders \
            WHERE id = $1";
        Ok(self
            .conn
            .query_opt(SQL, &[&id])
            .await?
            .as_ref()
            .map(Order::from_row))
    }
}

#[async_trait]
impl checkout::Store for Client {
    async fn user_exists(&self, id: user::Id) -> Result<bool, StoreError> {
        const SQL: &str = "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)";
        Ok(self.conn.query_one(SQL, &[&id]).await?.get(0))
    }

    async fn ticket_type(
        &self,
        id: ticket_type::Id,
    ) -> Result<Option<TicketType>, StoreError> {
        Ok(self.get_ticket_type_by_id(id).await?)
    }

    async fn commit_order(
        &self,
        order: &Order,
        tickets: &[Ticket],
        decrements: &[(ticket_type::Id, u32)],
    ) -> Result<(), StoreError> {
        const INSERT_ORDER: &str = "\
            INSERT INTO orders (id, user_id, event_id, customer_email, \
                                total_amount, status, payment_method, \
                                payment_status, billing_address, \
                                transaction_reference, created_at) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";
        const DECREMENT: &str = "\
            UPDATE ticket_types \
            SET quantity_available = quantity_available - $2 \
            WHERE id = $1 \
              AND quantity_available >= $2";

        let mut conn = self.tx_conn.lock().await;
        // Dropping `tx` without committing rolls everything back.
        let tx = conn.transaction().await?;

        tx.execute(
            INSERT_ORDER,
            &[
                &order.id,
                &order.user_id,
                &order.event_id,
                &order.customer_email,
                &order.total_amount,
                &order.status,
                &order.payment_method,
                &order.payment_status,
                &order.billing_address,
                &order.transaction_reference,
                &order.created_at,
            ],
        )
        .await?;

        let insert_ticket = ticket::prepare_insert(&tx).await?;
        for t in tickets {
            ticket::insert(&tx, &insert_ticket, t).await?;
        }

        for &(id, quantity) in decrements {
            let quantity = i32::try_from(quantity)
                .map_err(|_| StoreError::Unavailable(id))?;
            if tx.execute(DECREMENT, &[&id, &quantity]).await? == 0 {
                return Err(StoreError::Unavailable(id));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
