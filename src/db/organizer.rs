use time::OffsetDateTime;
use tokio_postgres::{Error, Row, Transaction};

use super::{user, uuid_id, Client};

#[derive(Clone, Debug)]
pub struct Organizer {
    pub id: Id,
    pub user_id: user::Id,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub speciality: Option<String>,
    pub contact_email: String,
    pub created_at: OffsetDateTime,
}

impl Organizer {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            email: row.get("email"),
            phone: row.get("phone"),
            logo: row.get("logo"),
            website: row.get("website"),
            description: row.get("description"),
            speciality: row.get("speciality"),
            contact_email: row.get("contact_email"),
            created_at: row.get("created_at"),
        }
    }
}

uuid_id!(Id);

const COLUMNS: &str = "id, user_id, name, email, phone, logo, website, \
                       description, speciality, contact_email, created_at";

pub(super) async fn insert(
    tx: &Transaction<'_>,
    organizer: &Organizer,
) -> Result<(), Error> {
    const SQL: &str = "\
        INSERT INTO organizers (id, user_id, name, email, phone, logo, \
                                website, description, speciality, \
                                contact_email, created_at) \
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";

    tx.execute(
        SQL,
        &[
            &organizer.id,
            &organizer.user_id,
            &organizer.name,
            &organizer.email,
            &organizer.phone,
            &organizer.logo,
            &organizer.website,
            &organizer.description,
            &organizer.speciality,
            &organizer.contact_email,
            &organizer.created_at,
        ],
    )
    .await
    .map(drop)
}

impl Client {
    pub async fn get_organizer_by_user(
        &self,
        user_id: user::Id,
    ) -> Result<Option<Organizer>, Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM organizers WHERE user_id = $1 LIMIT 1"
        );
        Ok(self
            .conn
            .query_opt(&sql, &[&user_id])
            .await?
            .as_ref()
            .map(Organizer::from_row))
    }

    pub async fn update_organizer(
        &self,
        organizer: &Organizer,
    ) -> Result<(), Error> {
        const SQL: &str = "\
            UPDATE organizers \
            SET name = $2, email = $3, phone = $4, logo = $5, \
                website = $6, description = $7, speciality = $8, \
                contact_email = $9 \
            WHERE id = $1";

        self.conn
            .execute(
                SQL,
                &[
                    &organizer.id,
                    &organizer.name,
                    &organizer.email,
                    &organizer.phone,
                    &organizer.logo,
                    &organizer.website,
                    &organizer.description,
                    &organizer.speciality,
                    &organizer.contact_email,
                ],
            )
            .await
            .map(drop)
    }
}
