use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use itertools::Itertools as _;

use ticketing_backend::{api, auth::Identity, db};

use super::{internal, reply};
use crate::SharedAppState;

/// Orders of the logged-in user with their tickets, newest first.
pub async fn tickets(
    State(state): State<SharedAppState>,
    identity: Identity,
) -> Result<Json<api::order::List>, ProfileTicketsError> {
    use ProfileTicketsError as E;

    let my = state
        .db_client
        .get_user_by_id(identity.user_id)
        .await?
        .ok_or(E::UserNotFound)?;

    let orders = state.db_client.get_orders_by_user(my.id).await?;
    let order_ids = orders.iter().map(|o| o.id).collect::<Vec<_>>();
    let mut tickets = state
        .db_client
        .get_tickets_by_orders(&order_ids)
        .await?
        .into_iter()
        .into_group_map_by(|t| t.order_id);

    let orders = orders
        .into_iter()
        .map(|order| {
            let tickets = tickets
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(api::Ticket::from)
                .collect();
            api::Order::new(order, tickets)
        })
        .collect();

    Ok(Json(api::order::List { orders }))
}

#[derive(Debug, From)]
pub enum ProfileTicketsError {
    #[from]
    DbError(db::Error),
    UserNotFound,
}

impl IntoResponse for ProfileTicketsError {
    fn into_response(self) -> Response {
        match self {
            Self::UserNotFound => reply(StatusCode::NOT_FOUND, "user not found"),
            Self::DbError(e) => internal(&e),
        }
    }
}
