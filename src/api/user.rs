use serde::{Deserialize, Serialize};

use crate::db;

pub use crate::db::user::{Id, PasswordHash, Role};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<db::User> for User {
    fn from(user: db::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// Returned by every endpoint that sets the session cookie.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    pub user: User,
}
