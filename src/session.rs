//! Signed session tokens carried in the `user_session` cookie.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use derive_more::Display;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::{organizer, user};

pub const COOKIE_NAME: &str = "user_session";

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claims {
    pub sub: user::Id,
    pub email: String,
    pub role: user::Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<organizer::Id>,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Error {
    #[display("session signature mismatch")]
    InvalidSignature,

    #[display("session expired")]
    Expired,

    #[display("session token is malformed")]
    Malformed,
}

impl std::error::Error for Error {}

pub struct Codec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_age: Duration,
    secure_cookie: bool,
}

impl Codec {
    pub fn new(secret: &[u8], max_age: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is derived from `iat` and the caller's max age instead.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            max_age,
            secure_cookie: false,
        }
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn issue(
        &self,
        user_id: user::Id,
        email: &str,
        role: user::Role,
        organizer_id: Option<organizer::Id>,
        now: OffsetDateTime,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: user_id,
                email: email.to_owned(),
                role,
                organizer_id,
                iat: now.unix_timestamp(),
            },
            &self.encoding_key,
        )
    }

    pub fn verify(
        &self,
        token: &str,
        max_age: Duration,
        now: OffsetDateTime,
    ) -> Result<Claims, Error> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => Error::InvalidSignature,
                _ => Error::Malformed,
            })?
            .claims;

        let age = now.unix_timestamp().saturating_sub(claims.iat);
        let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        if age > max_age {
            return Err(Error::Expired);
        }

        Ok(claims)
    }

    /// Host-only, script-inaccessible cookie living as long as the token.
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age))
            .build()
    }

    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(COOKIE_NAME).path("/").build()
    }
}
