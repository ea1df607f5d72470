use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    api::{non_empty, Invalid},
    db,
};

pub use crate::db::organizer::Id;

/// Phone placeholder for profiles created by switching roles.
pub const PHONE_NOT_PROVIDED: &str = "Not Provided";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub speciality: Option<String>,
    pub contact_email: String,
}

impl From<db::Organizer> for Organizer {
    fn from(o: db::Organizer) -> Self {
        Self {
            id: o.id,
            name: o.name,
            email: o.email,
            phone: o.phone,
            logo: o.logo,
            website: o.website,
            description: o.description,
            speciality: o.speciality,
            contact_email: o.contact_email,
        }
    }
}

/// Initial organizer profile of a user switching roles.
pub fn profile_for(user: &db::User, now: OffsetDateTime) -> db::Organizer {
    db::Organizer {
        id: Id::new(),
        user_id: user.id,
        name: user.username.clone(),
        email: user.email.clone(),
        phone: PHONE_NOT_PROVIDED.into(),
        logo: None,
        website: None,
        description: None,
        speciality: None,
        contact_email: user.email.clone(),
        created_at: now,
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Switched {
    pub organizer_id: Id,
}

/// Partial update of the organizer's own profile.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub speciality: Option<String>,
    pub contact_email: Option<String>,
}

impl Patch {
    pub fn apply(
        self,
        mut organizer: db::Organizer,
    ) -> Result<db::Organizer, Invalid> {
        if let Some(name) = self.name {
            non_empty(&name, "name must not be empty")?;
            organizer.name = name;
        }
        if let Some(phone) = self.phone {
            non_empty(&phone, "phone must not be empty")?;
            organizer.phone = phone;
        }
        if let Some(email) = self.contact_email {
            if !email.contains('@') {
                return Err(Invalid("contact email is not valid"));
            }
            organizer.contact_email = email;
        }
        organizer.logo = self.logo.or(organizer.logo);
        organizer.website = self.website.or(organizer.website);
        organizer.description = self.description.or(organizer.description);
        organizer.speciality = self.speciality.or(organizer.speciality);
        Ok(organizer)
    }
}
