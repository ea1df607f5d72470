//! Per-request authorization: one signed session, role-scoped.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use derive_more::Display;
use time::OffsetDateTime;

use crate::{
    api,
    db::{organizer, user},
    session,
};

/// Gives the [`Identity`] extractor access to the session codec.
pub trait SessionSource {
    fn session_codec(&self) -> &session::Codec;
}

impl<T: SessionSource> SessionSource for Arc<T> {
    fn session_codec(&self) -> &session::Codec {
        (**self).session_codec()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity {
    pub user_id: user::Id,
    pub email: String,
    pub role: user::Role,
    pub organizer_id: Option<organizer::Id>,
}

impl Identity {
    pub fn require(self, role: user::Role) -> Result<Self, AuthError> {
        if self.role == role {
            Ok(self)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

impl From<session::Claims> for Identity {
    fn from(claims: session::Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            organizer_id: claims.organizer_id,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum AuthError {
    #[display("not logged in")]
    Unauthenticated,

    #[display("forbidden")]
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        };
        (status, Json(api::Error::new(self))).into_response()
    }
}

/// Resolves the session cookie into an identity. Every kind of token
/// failure is reported as [`AuthError::Unauthenticated`].
pub fn authorize(
    cookies: &CookieJar,
    codec: &session::Codec,
    now: OffsetDateTime,
    required_role: Option<user::Role>,
) -> Result<Identity, AuthError> {
    let token = cookies
        .get(session::COOKIE_NAME)
        .ok_or(AuthError::Unauthenticated)?;

    let claims = codec
        .verify(token.value(), codec.max_age(), now)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected session cookie");
            AuthError::Unauthenticated
        })?;

    let identity = Identity::from(claims);
    match required_role {
        Some(role) => identity.require(role),
        None => Ok(identity),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: SessionSource + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let cookies = CookieJar::from_headers(&parts.headers);
        authorize(
            &cookies,
            state.session_codec(),
            OffsetDateTime::now_utc(),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Cookie;

    use super::*;

    fn codec() -> session::Codec {
        session::Codec::new(b"test-secret", session::DEFAULT_MAX_AGE)
    }

    fn jar_for(codec: &session::Codec, role: user::Role) -> CookieJar {
        let token = codec
            .issue(
                user::Id::from(1),
                "peter@event.com",
                role,
                None,
                OffsetDateTime::now_utc(),
            )
            .unwrap();
        CookieJar::new().add(Cookie::new(session::COOKIE_NAME, token))
    }

    #[test]
    fn fails_without_cookie() {
        let res = authorize(
            &CookieJar::new(),
            &codec(),
            OffsetDateTime::now_utc(),
            None,
        );
        assert_eq!(res, Err(AuthError::Unauthenticated));
    }

    #[test]
    fn resolves_identity() {
        let codec = codec();
        let identity = authorize(
            &jar_for(&codec, user::Role::User),
            &codec,
            OffsetDateTime::now_utc(),
            None,
        )
        .unwrap();
        assert_eq!(identity.user_id, user::Id::from(1));
        assert_eq!(identity.email, "peter@event.com");
        assert_eq!(identity.role, user::Role::User);
    }

    #[test]
    fn treats_expired_session_as_unauthenticated() {
        let codec = codec();
        let later = OffsetDateTime::now_utc() + time::Duration::hours(2);
        let res =
            authorize(&jar_for(&codec, user::Role::User), &codec, later, None);
        assert_eq!(res, Err(AuthError::Unauthenticated));
    }

    #[test]
    fn treats_forged_session_as_unauthenticated() {
        let forger = session::Codec::new(b"guess", session::DEFAULT_MAX_AGE);
        let res = authorize(
            &jar_for(&forger, user::Role::Management),
            &codec(),
            OffsetDateTime::now_utc(),
            Some(user::Role::Management),
        );
        assert_eq!(res, Err(AuthError::Unauthenticated));
    }

    #[test]
    fn forbids_other_roles() {
        let codec = codec();
        let res = authorize(
            &jar_for(&codec, user::Role::User),
            &codec,
            OffsetDateTime::now_utc(),
            Some(user::Role::Organizer),
        );
        assert_eq!(res, Err(AuthError::Forbidden));
    }

    #[test]
    fn allows_matching_role() {
        let codec = codec();
        let identity = authorize(
            &jar_for(&codec, user::Role::Management),
            &codec,
            OffsetDateTime::now_utc(),
            Some(user::Role::Management),
        )
        .unwrap();
        assert_eq!(identity.role, user::Role::Management);
    }
}
