pub mod event;
pub mod order;
pub mod organizer;
pub mod refund;
pub mod ticket;
pub mod ticket_type;
pub mod user;

use tokio::sync::Mutex;
use tokio_postgres::{error::SqlState, tls::NoTlsStream, NoTls, Socket};

use crate::config;

pub use tokio_postgres::Error;

pub use self::{
    event::Event, order::Order, organizer::Organizer, refund::RefundRequest,
    ticket::Ticket, ticket_type::TicketType, user::User,
};

pub type Connection = tokio_postgres::Connection<Socket, NoTlsStream>;

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Opens the two connections behind a [`Client`]. Both must be driven by
/// the caller.
pub async fn connect(
    config: config::Db,
) -> Result<(Client, [Connection; 2]), Error> {
    let (conn, connection) = tokio_postgres::connect(&config.url, NoTls).await?;
    let (tx_conn, tx_connection) =
        tokio_postgres::connect(&config.url, NoTls).await?;
    let client = Client {
        conn,
        tx_conn: Mutex::new(tx_conn),
    };
    Ok((client, [connection, tx_connection]))
}

/// Single statements are pipelined over `conn`. Transactions need exclusive
/// use of a connection, so they queue on `tx_conn` until they commit or
/// roll back.
pub struct Client {
    conn: tokio_postgres::Client,
    tx_conn: Mutex<tokio_postgres::Client>,
}

impl Client {
    pub async fn apply_schema(&self) -> Result<(), Error> {
        self.conn.batch_execute(SCHEMA).await
    }

    pub async fn execute_script(&self, sql: &str) -> Result<(), Error> {
        self.conn.batch_execute(sql).await
    }
}

pub fn is_unique_violation(e: &Error) -> bool {
    e.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

pub fn is_foreign_key_violation(e: &Error) -> bool {
    e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION)
}

/// UUID-backed identifier stored as a Postgres `UUID`.
macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            ::serde::Deserialize,
            ::derive_more::Display,
            Eq,
            Hash,
            PartialEq,
            ::serde::Serialize,
        )]
        pub struct $name(::uuid::Uuid);

        impl $name {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(::uuid::Uuid::new_v4())
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(::uuid::Uuid::from_u128(value))
            }
        }

        impl ::tokio_postgres::types::FromSql<'_> for $name {
            ::tokio_postgres::types::accepts!(UUID);

            fn from_sql(
                ty: &::tokio_postgres::types::Type,
                raw: &[u8],
            ) -> Result<
                Self,
                Box<dyn ::std::error::Error + Sync + Send>,
            > {
                <::uuid::Uuid as ::tokio_postgres::types::FromSql>::from_sql(
                    ty, raw,
                )
                .map(Self)
            }
        }

        impl ::tokio_postgres::types::ToSql for $name {
            ::tokio_postgres::types::accepts!(UUID);

            ::tokio_postgres::types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &::tokio_postgres::types::Type,
                out: &mut ::tokio_postgres::types::private::BytesMut,
            ) -> Result<
                ::tokio_postgres::types::IsNull,
                Box<dyn ::std::error::Error + Sync + Send>,
            > {
                ::tokio_postgres::types::ToSql::to_sql(&self.0, ty, out)
            }
        }
    };
}

/// `#[repr(u8)]` enum stored as a Postgres `SMALLINT`.
macro_rules! smallint_enum {
    ($name:ident, $what:literal) => {
        impl ::tokio_postgres::types::FromSql<'_> for $name {
            ::tokio_postgres::types::accepts!(INT2);

            fn from_sql(
                ty: &::tokio_postgres::types::Type,
                raw: &[u8],
            ) -> Result<
                Self,
                Box<dyn ::std::error::Error + Sync + Send>,
            > {
                let repr = <i16 as ::tokio_postgres::types::FromSql>::from_sql(
                    ty, raw,
                )?;
                let repr = u8::try_from(repr)?;
                let value = Self::try_from(repr)
                    .map_err(|_| concat!("invalid ", $what))?;
                Ok(value)
            }
        }

        impl ::tokio_postgres::types::ToSql for $name {
            ::tokio_postgres::types::accepts!(INT2);

            ::tokio_postgres::types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &::tokio_postgres::types::Type,
                out: &mut ::tokio_postgres::types::private::BytesMut,
            ) -> Result<
                ::tokio_postgres::types::IsNull,
                Box<dyn ::std::error::Error + Sync + Send>,
            > {
                let repr = i16::from((*self) as u8);
                ::tokio_postgres::types::ToSql::to_sql(&repr, ty, out)
            }
        }
    };
}

pub(crate) use smallint_enum;
pub(crate) use uuid_id;
