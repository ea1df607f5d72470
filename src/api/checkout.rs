use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{api, checkout, db};

/// `POST /checkout` body. Unlike the rest of the API its keys are
/// snake_case.
#[derive(Debug, Deserialize)]
pub struct Request {
    pub user_id: Option<db::user::Id>,
    #[serde(default)]
    pub quantities: Option<checkout::LineItems>,
    #[serde(default)]
    pub attendee_name: String,
    #[serde(default)]
    pub attendee_email: String,
    pub billing_address: Option<String>,
    pub payment_method: Option<String>,
}

impl From<Request> for checkout::Request {
    fn from(req: Request) -> Self {
        Self {
            user_id: req.user_id,
            line_items: req.quantities.unwrap_or_default(),
            attendee_name: req.attendee_name,
            attendee_email: req.attendee_email,
            billing_address: req.billing_address,
            payment_method: req.payment_method,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub order_id: db::order::Id,
    pub total_amount: Decimal,
    pub transaction_reference: String,
    pub tickets: Vec<api::Ticket>,
}

impl From<checkout::Receipt> for Receipt {
    fn from(receipt: checkout::Receipt) -> Self {
        Self {
            order_id: receipt.order.id,
            total_amount: receipt.order.total_amount,
            transaction_reference: receipt.order.transaction_reference,
            tickets: receipt.tickets.into_iter().map(Into::into).collect(),
        }
    }
}
