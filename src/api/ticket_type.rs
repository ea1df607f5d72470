use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    api::{non_empty, Invalid},
    db,
};

pub use crate::db::ticket_type::Id;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    pub id: Id,
    pub event_id: db::event::Id,
    pub name: String,
    pub price: Decimal,
    pub quantity_available: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub sales_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub sales_end: OffsetDateTime,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<db::TicketType> for TicketType {
    fn from(tt: db::TicketType) -> Self {
        Self {
            id: tt.id,
            event_id: tt.event_id,
            name: tt.name,
            price: tt.price,
            quantity_available: tt.quantity_available,
            sales_start: tt.sales_start,
            sales_end: tt.sales_end,
            description: tt.description,
            is_active: tt.is_active,
        }
    }
}

/// Entry of the organizer's ticket type listing.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listed {
    #[serde(flatten)]
    pub ticket_type: TicketType,
    pub event_title: String,
    pub sold: usize,
}

impl From<db::ticket_type::Listed> for Listed {
    fn from(listed: db::ticket_type::Listed) -> Self {
        Self {
            ticket_type: listed.ticket_type.into(),
            event_title: listed.event_title,
            sold: listed.sold,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub ticket_types: Vec<Listed>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct New {
    pub event_id: db::event::Id,
    pub name: String,
    pub price: Decimal,
    pub quantity_available: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub sales_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub sales_end: OffsetDateTime,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl New {
    pub fn into_ticket_type(self) -> Result<db::TicketType, Invalid> {
        let tt = db::TicketType {
            id: Id::new(),
            event_id: self.event_id,
            name: self.name,
            price: self.price,
            quantity_available: self.quantity_available,
            sales_start: self.sales_start,
            sales_end: self.sales_end,
            description: self.description,
            is_active: self.is_active.unwrap_or(true),
        };
        validate(&tt)?;
        Ok(tt)
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity_available: Option<u32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub sales_start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub sales_end: Option<OffsetDateTime>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl Patch {
    pub fn apply(
        self,
        mut tt: db::TicketType,
    ) -> Result<db::TicketType, Invalid> {
        if let Some(name) = self.name {
            tt.name = name;
        }
        if let Some(price) = self.price {
            tt.price = price;
        }
        if let Some(quantity) = self.quantity_available {
            tt.quantity_available = quantity;
        }
        if let Some(start) = self.sales_start {
            tt.sales_start = start;
        }
        if let Some(end) = self.sales_end {
            tt.sales_end = end;
        }
        if let Some(description) = self.description {
            tt.description = Some(description);
        }
        if let Some(is_active) = self.is_active {
            tt.is_active = is_active;
        }

        validate(&tt)?;
        Ok(tt)
    }
}

/// Prices are stored as `NUMERIC(12, 2)`.
const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn validate(tt: &db::TicketType) -> Result<(), Invalid> {
    non_empty(&tt.name, "name must not be empty")?;
    if tt.price < Decimal::ZERO {
        return Err(Invalid("price must not be negative"));
    }
    if tt.price.normalize().scale() > 2 {
        return Err(Invalid("price must have at most two decimal places"));
    }
    if tt.price > MAX_PRICE {
        return Err(Invalid("price is too large"));
    }
    if i32::try_from(tt.quantity_available).is_err() {
        return Err(Invalid("quantity available is too large"));
    }
    if tt.sales_start > tt.sales_end {
        return Err(Invalid("sales cannot end before they start"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn ticket_type() -> db::TicketType {
        db::TicketType {
            id: Id::from(1),
            event_id: db::event::Id::from(1),
            name: "General".into(),
            price: Decimal::new(100000, 2),
            quantity_available: 100,
            sales_start: datetime!(2026-10-01 00:00 UTC),
            sales_end: datetime!(2026-12-01 00:00 UTC),
            description: None,
            is_active: true,
        }
    }

    #[test]
    fn applies_only_present_fields() {
        let patch = Patch {
            price: Some(Decimal::new(120000, 2)),
            quantity_available: Some(40),
            ..Patch::default()
        };

        let updated = patch.apply(ticket_type()).unwrap();
        assert_eq!(updated.price, Decimal::new(120000, 2));
        assert_eq!(updated.quantity_available, 40);
        assert_eq!(updated.name, "General");
        assert_eq!(updated.sales_end, datetime!(2026-12-01 00:00 UTC));
    }

    #[test]
    fn allows_free_tickets() {
        let patch = Patch {
            price: Some(Decimal::ZERO),
            ..Patch::default()
        };
        assert_eq!(patch.apply(ticket_type()).unwrap().price, Decimal::ZERO);
    }

    #[test]
    fn rejects_negative_price() {
        let patch = Patch {
            price: Some(Decimal::new(-1, 0)),
            ..Patch::default()
        };
        assert_eq!(
            patch.apply(ticket_type()).unwrap_err(),
            Invalid("price must not be negative"),
        );
    }

    #[test]
    fn rejects_sub_cent_price() {
        let patch = Patch {
            price: Some(Decimal::new(10005, 3)),
            ..Patch::default()
        };
        assert_eq!(
            patch.apply(ticket_type()).unwrap_err(),
            Invalid("price must have at most two decimal places"),
        );

        let patch = Patch {
            price: Some(Decimal::new(10500, 3)),
            ..Patch::default()
        };
        assert_eq!(
            patch.apply(ticket_type()).unwrap().price,
            Decimal::new(1050, 2),
        );
    }

    #[test]
    fn price_fits_the_column() {
        assert_eq!(MAX_PRICE.to_string(), "9999999999.99");

        let patch = Patch {
            price: Some(MAX_PRICE),
            ..Patch::default()
        };
        assert!(patch.apply(ticket_type()).is_ok());

        let patch = Patch {
            price: Some(Decimal::from(10_000_000_000_i64)),
            ..Patch::default()
        };
        assert_eq!(
            patch.apply(ticket_type()).unwrap_err(),
            Invalid("price is too large"),
        );
    }

    #[test]
    fn rejects_quantity_beyond_column_range() {
        let patch = Patch {
            quantity_available: Some(i32::MAX as u32 + 1),
            ..Patch::default()
        };
        assert_eq!(
            patch.apply(ticket_type()).unwrap_err(),
            Invalid("quantity available is too large"),
        );

        let new = New {
            event_id: db::event::Id::from(1),
            name: "General".into(),
            price: Decimal::ZERO,
            quantity_available: u32::MAX,
            sales_start: datetime!(2026-10-01 00:00 UTC),
            sales_end: datetime!(2026-12-01 00:00 UTC),
            description: None,
            is_active: None,
        };
        assert!(new.into_ticket_type().is_err());
    }

    #[test]
    fn rejects_inverted_sales_window() {
        let patch = Patch {
            sales_start: Some(datetime!(2026-12-02 00:00 UTC)),
            ..Patch::default()
        };
        assert_eq!(
            patch.apply(ticket_type()).unwrap_err(),
            Invalid("sales cannot end before they start"),
        );
    }

    #[test]
    fn rejects_blank_name() {
        let patch = Patch {
            name: Some(String::new()),
            ..Patch::default()
        };
        assert!(patch.apply(ticket_type()).is_err());
    }

    #[test]
    fn reads_partial_payload() {
        let patch = serde_json::from_str::<Patch>(
            r#"{"quantityAvailable": 5, "salesEnd": "2026-11-15T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(patch.quantity_available, Some(5));
        assert_eq!(patch.sales_end, Some(datetime!(2026-11-15 00:00 UTC)));
        assert_eq!(patch.name, None);
        assert_eq!(patch.sales_start, None);
    }

    #[test]
    fn lists_flat_entries() {
        let listed = Listed::from(db::ticket_type::Listed {
            ticket_type: ticket_type(),
            event_title: "Nairobi Music Fest".into(),
            sold: 3,
        });

        let json = serde_json::to_value(&listed).unwrap();
        assert_eq!(json["name"], "General");
        assert_eq!(json["quantityAvailable"], 100);
        assert_eq!(json["eventTitle"], "Nairobi Music Fest");
        assert_eq!(json["sold"], 3);
    }
}
