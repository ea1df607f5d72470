//! Checkout: turns a cart of ticket type quantities into a paid order and
//! its tickets.
//!
//! Availability is checked twice. The read while pricing the cart rejects
//! hopeless requests early; the conditional decrement inside
//! [`Store::commit_order`] is what actually prevents overselling when
//! checkouts race for the same ticket type.

#[cfg(test)]
mod memory;
mod store;

use std::{error::Error as StdError, fmt};

use derive_more::Display;
use futures::future;
use itertools::Itertools as _;
use rand::{distributions::Alphanumeric, Rng as _};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    db::{event, order, ticket, ticket_type, user, Order, Ticket, TicketType},
    qr,
};

pub use self::store::{Store, StoreError};

const REFERENCE_PREFIX: &str = "TXN-";
const REFERENCE_LEN: usize = 10;

/// Requested quantities per ticket type, in the order the client sent them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineItems(Vec<(ticket_type::Id, u32)>);

impl LineItems {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ticket_type::Id, u32)> {
        self.0.iter()
    }
}

impl FromIterator<(ticket_type::Id, u32)> for LineItems {
    fn from_iter<I: IntoIterator<Item = (ticket_type::Id, u32)>>(
        iter: I,
    ) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for LineItems {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = LineItems;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of ticket type ids to quantities")
            }

            fn visit_map<A: de::MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<LineItems, A::Error> {
                let mut items = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    items.push(entry);
                }
                Ok(LineItems(items))
            }
        }

        d.deserialize_map(Visitor)
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    pub user_id: Option<user::Id>,
    pub line_items: LineItems,
    pub attendee_name: String,
    pub attendee_email: String,
    pub billing_address: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Receipt {
    pub order: Order,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Display)]
pub enum Error {
    #[display("{_0}")]
    InvalidRequest(&'static str),

    #[display("user not found")]
    UserNotFound,

    #[display("invalid or unavailable ticket type ID: {_0}")]
    Unavailable(ticket_type::Id),

    #[display("cannot purchase tickets for multiple events in one order")]
    MultiEventOrder,

    #[display("internal error")]
    Internal(Box<dyn StdError + Send + Sync>),
}

impl StdError for Error {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(id) => Self::Unavailable(id),
            StoreError::Backend(e) => Self::Internal(e),
        }
    }
}

/// `TXN-` followed by ten random uppercase alphanumerics.
pub fn transaction_reference() -> String {
    let suffix = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERENCE_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect::<String>();
    format!("{REFERENCE_PREFIX}{suffix}")
}

pub async fn checkout<S>(
    store: &S,
    qr: &qr::Store,
    request: Request,
) -> Result<Receipt, Error>
where
    S: Store + ?Sized,
{
    use Error as E;

    let Request {
        user_id,
        line_items,
        attendee_name,
        attendee_email,
        billing_address,
        payment_method,
    } = request;

    let user_id = match user_id {
        Some(id) if !line_items.is_empty() => id,
        _ => return Err(E::InvalidRequest("missing user or quantities")),
    };
    if line_items.iter().any(|&(_, quantity)| quantity == 0) {
        return Err(E::InvalidRequest("quantities must be positive"));
    }
    if !line_items.iter().map(|(id, _)| id).all_unique() {
        return Err(E::InvalidRequest("duplicate ticket type ID"));
    }
    if attendee_email.trim().is_empty() {
        return Err(E::InvalidRequest("missing attendee email"));
    }

    if !store.user_exists(user_id).await? {
        return Err(E::UserNotFound);
    }

    let (event_id, total, lines) = price(store, &line_items).await?;

    let now = OffsetDateTime::now_utc();
    let order = Order {
        id: order::Id::new(),
        user_id: Some(user_id),
        event_id,
        customer_email: attendee_email.clone(),
        total_amount: total,
        status: order::Status::Completed,
        payment_method,
        payment_status: order::PaymentStatus::Paid,
        billing_address,
        transaction_reference: transaction_reference(),
        created_at: now,
    };

    let mut tickets = lines
        .iter()
        .flat_map(|(ticket_type, quantity)| {
            (0..*quantity).map(|_| ticket_type.id)
        })
        .map(|ticket_type_id| Ticket {
            id: ticket::Id::new(),
            ticket_type_id,
            order_id: order.id,
            attendee_name: attendee_name.clone(),
            attendee_email: attendee_email.clone(),
            unique_code: Uuid::new_v4().to_string(),
            qr_code_path: None,
            is_redeemed: false,
            redeemed_at: None,
            created_at: now,
        })
        .collect::<Vec<_>>();

    if let Err(e) = save_qr_codes(qr, &mut tickets).await {
        discard_qr_codes(qr, &tickets).await;
        tracing::error!(error = %e, "failed to store QR images");
        return Err(E::Internal(Box::new(e)));
    }

    let decrements = lines
        .iter()
        .map(|(ticket_type, quantity)| (ticket_type.id, *quantity))
        .collect::<Vec<_>>();
    if let Err(e) = store.commit_order(&order, &tickets, &decrements).await {
        discard_qr_codes(qr, &tickets).await;
        match &e {
            StoreError::Unavailable(id) => {
                tracing::info!(ticket_type_id = %id, "lost race for ticket type")
            }
            StoreError::Backend(e) => {
                tracing::error!(error = %e, "failed to commit order")
            }
        }
        return Err(e.into());
    }

    tracing::info!(
        order_id = %order.id,
        reference = %order.transaction_reference,
        tickets = tickets.len(),
        "checkout completed"
    );

    Ok(Receipt { order, tickets })
}

/// Resolves every line item in caller order, checking availability and
/// that all of them belong to one event.
async fn price<S>(
    store: &S,
    line_items: &LineItems,
) -> Result<(event::Id, Decimal, Vec<(TicketType, u32)>), Error>
where
    S: Store + ?Sized,
{
    let mut event_id = None;
    let mut total = Decimal::ZERO;
    let mut lines = Vec::new();

    for &(id, quantity) in line_items.iter() {
        let ticket_type = store
            .ticket_type(id)
            .await?
            .filter(|t| t.quantity_available >= quantity)
            .ok_or(Error::Unavailable(id))?;

        match event_id {
            Some(event_id) if event_id != ticket_type.event_id => {
                return Err(Error::MultiEventOrder);
            }
            _ => event_id = Some(ticket_type.event_id),
        }

        total += ticket_type.price * Decimal::from(quantity);
        lines.push((ticket_type, quantity));
    }

    let Some(event_id) = event_id else {
        return Err(Error::InvalidRequest("missing user or quantities"));
    };
    Ok((event_id, total, lines))
}

async fn save_qr_codes(
    qr: &qr::Store,
    tickets: &mut [Ticket],
) -> Result<(), qr::Error> {
    for ticket in tickets {
        ticket.qr_code_path = Some(qr.save(&ticket.unique_code).await?);
    }
    Ok(())
}

async fn discard_qr_codes(qr: &qr::Store, tickets: &[Ticket]) {
    future::join_all(
        tickets
            .iter()
            .filter(|t| t.qr_code_path.is_some())
            .map(|t| qr.remove(&t.unique_code)),
    )
    .await;
}
