use std::error::Error as StdError;

use constant_time_eq::constant_time_eq;
use enum_utils::TryFromRepr;
use rand::{distributions::Alphanumeric, Rng as _};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::OffsetDateTime;
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Error, Row,
};

use super::{organizer, smallint_enum, uuid_id, Client, Organizer};

#[derive(Clone, Debug)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
}

impl User {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role: row.get("role"),
            created_at: row.get("created_at"),
            last_login: row.get("last_login"),
        }
    }
}

uuid_id!(Id);

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, TryFromRepr, PartialEq, Serialize,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Customer buying tickets.
    User = 1,

    /// Creates events and ticket types.
    Organizer = 2,

    /// Approves events and processes refunds.
    Management = 3,
}

smallint_enum!(Role, "role");

/// PBKDF2-HMAC-SHA256 of a password, stored the way werkzeug writes it:
/// `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`.
#[derive(Clone, Debug, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    const METHOD: &'static str = "pbkdf2:sha256:";
    const ITERATIONS: u32 = 600_000;
    const SALT_LEN: usize = 16;

    pub fn new(secret: &str) -> Self {
        let salt = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::SALT_LEN)
            .map(char::from)
            .collect::<String>();
        Self::derive(Self::ITERATIONS, &salt, secret)
    }

    fn derive(iterations: u32, salt: &str, secret: &str) -> Self {
        let mut digest = [0; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            secret.as_bytes(),
            salt.as_bytes(),
            iterations,
            &mut digest,
        );
        let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
        Self(format!("{}{iterations}${salt}${hex}", Self::METHOD))
    }

    pub fn verify(&self, secret: &str) -> bool {
        let Some((iterations, salt)) = self
            .0
            .strip_prefix(Self::METHOD)
            .and_then(|rest| rest.split_once('$'))
            .and_then(|(iterations, rest)| {
                Some((iterations.parse::<u32>().ok()?, rest.split_once('$')?.0))
            })
        else {
            return false;
        };
        if iterations == 0 {
            return false;
        }
        let candidate = Self::derive(iterations, salt, secret);
        constant_time_eq(candidate.0.as_bytes(), self.0.as_bytes())
    }
}

impl FromSql<'_> for PasswordHash {
    accepts!(TEXT);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        String::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for PasswordHash {
    accepts!(TEXT);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

const COLUMNS: &str =
    "id, username, email, password_hash, role, created_at, last_login";

impl Client {
    pub async fn get_user_by_id(&self, id: Id) -> Result<Option<User>, Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1 LIMIT 1");
        Ok(self
            .conn
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(User::from_row))
    }

    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1 LIMIT 1");
        Ok(self
            .conn
            .query_opt(&sql, &[&email])
            .await?
            .as_ref()
            .map(User::from_row))
    }

    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, Error> {
        let sql =
            format!("SELECT {COLUMNS} FROM users WHERE username = $1 LIMIT 1");
        Ok(self
            .conn
            .query_opt(&sql, &[&username])
            .await?
            .as_ref()
            .map(User::from_row))
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO users (id, username, email, password_hash, role, \
                               created_at, last_login) \
            VALUES ($1, $2, $3, $4, $5, $6, $7)";

        self.conn
            .execute(
                SQL,
                &[
                    &user.id,
                    &user.username,
                    &user.email,
                    &user.password_hash,
                    &user.role,
                    &user.created_at,
                    &user.last_login,
                ],
            )
            .await
            .map(drop)
    }

    pub async fn touch_last_login(
        &self,
        id: Id,
        at: OffsetDateTime,
    ) -> Result<(), Error> {
        const SQL: &str = "UPDATE users SET last_login = $2 WHERE id = $1";
        self.conn.execute(SQL, &[&id, &at]).await.map(drop)
    }

    /// Creates the organizer profile and switches the user's role in one
    /// transaction.
    pub async fn promote_to_organizer(
        &self,
        user_id: Id,
        organizer: &Organizer,
    ) -> Result<(), Error> {
        const SQL: &str = "UPDATE users SET role = $2 WHERE id = $1";

        let mut conn = self.tx_conn.lock().await;
        let tx = conn.transaction().await?;
        organizer::insert(&tx, organizer).await?;
        tx.execute(SQL, &[&user_id, &Role::Organizer]).await?;
        tx.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordHash;

    #[test]
    fn verifies_matching_password() {
        let hash = PasswordHash::new("password");
        assert!(hash.verify("password"));
        assert!(!hash.verify("Password"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn salts_every_hash() {
        assert_ne!(PasswordHash::new("password"), PasswordHash::new("password"));
    }

    #[test]
    fn rejects_unsalted_hash() {
        assert!(!PasswordHash("hashed1".into()).verify("hashed1"));
    }

    #[test]
    fn uses_werkzeug_layout() {
        let hash = PasswordHash::new("password");
        let mut parts = hash.0.split('$');
        assert_eq!(parts.next(), Some("pbkdf2:sha256:600000"));
        assert_eq!(parts.next().map(str::len), Some(16));
        assert_eq!(parts.next().map(str::len), Some(64));
        assert_eq!(parts.next(), None);
    }

    #[test]
    fn verifies_seeded_hash() {
        let seeded = PasswordHash(
            "pbkdf2:sha256:600000$abcdefgh12345678$\
             10e418090e514761329fdda7dee0a8a6214a950903e00c79b9e7d772af87c2a9"
                .into(),
        );
        assert!(seeded.verify("password"));
        assert!(!seeded.verify("passw0rd"));
    }

    #[test]
    fn honours_stored_iteration_count() {
        let hash = PasswordHash::derive(1_000, "saltsaltsaltsalt", "password");
        assert!(hash.verify("password"));
        assert!(!PasswordHash(hash.0.replacen(":1000$", ":1001$", 1))
            .verify("password"));
    }

    #[test]
    fn rejects_legacy_sha256_hash() {
        let legacy = PasswordHash(
            "abcdefgh12345678$\
             51d44e61b97fed2e167ac90fdc2fda780573a2a2af35c42a1d92848c1b1a5e88"
                .into(),
        );
        assert!(!legacy.verify("password"));
    }
}
