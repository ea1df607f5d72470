use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::{CookieJar, WithRejection};
use derive_more::From;
use serde::Deserialize;
use time::OffsetDateTime;

use ticketing_backend::{
    api,
    auth::{self, AuthError, Identity},
    db::{
        self,
        user::{PasswordHash, Role},
    },
    session,
};

use super::{internal, reply, JsonBody};
use crate::SharedAppState;

type SessionError = jsonwebtoken::errors::Error;

/// Adds a freshly signed session cookie for `user` to the jar.
fn start_session(
    state: &SharedAppState,
    jar: CookieJar,
    user: &db::User,
    organizer_id: Option<db::organizer::Id>,
    now: OffsetDateTime,
) -> Result<CookieJar, SessionError> {
    let token = state.session_codec.issue(
        user.id,
        &user.email,
        user.role,
        organizer_id,
        now,
    )?;
    Ok(jar.add(state.session_codec.cookie(token)))
}

#[derive(Deserialize)]
pub struct RegisterInput {
    username: String,
    email: String,
    password: String,
}

pub async fn register(
    State(state): State<SharedAppState>,
    jar: CookieJar,
    WithRejection(
        Json(RegisterInput {
            username,
            email,
            password,
        }),
        _,
    ): JsonBody<RegisterInput>,
) -> Result<(CookieJar, Json<api::user::Session>), RegisterError> {
    use RegisterError as E;

    let username = username.trim().to_owned();
    let email = email.trim().to_owned();
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(E::MissingFields);
    }

    if state.db_client.get_user_by_username(&username).await?.is_some() {
        return Err(E::UsernameTaken);
    }
    if state.db_client.get_user_by_email(&email).await?.is_some() {
        return Err(E::EmailTaken);
    }

    let now = OffsetDateTime::now_utc();
    let user = db::User {
        id: db::user::Id::new(),
        username,
        email,
        password_hash: PasswordHash::new(&password),
        role: Role::User,
        created_at: now,
        last_login: Some(now),
    };

    state.db_client.insert_user(&user).await.map_err(|e| {
        if db::is_unique_violation(&e) {
            E::AlreadyRegistered
        } else {
            E::DbError(e)
        }
    })?;
    tracing::info!(user_id = %user.id, "user registered");

    let jar = start_session(&state, jar, &user, None, now)?;
    Ok((jar, Json(api::user::Session { user: user.into() })))
}

#[derive(Debug, From)]
pub enum RegisterError {
    AlreadyRegistered,
    #[from]
    DbError(db::Error),
    EmailTaken,
    MissingFields,
    #[from]
    SessionError(SessionError),
    UsernameTaken,
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        match self {
            Self::AlreadyRegistered => reply(
                StatusCode::BAD_REQUEST,
                "username or email already registered",
            ),
            Self::EmailTaken => {
                reply(StatusCode::BAD_REQUEST, "email already registered")
            }
            Self::MissingFields => reply(
                StatusCode::BAD_REQUEST,
                "username, email and password are required",
            ),
            Self::UsernameTaken => {
                reply(StatusCode::BAD_REQUEST, "username already taken")
            }
            Self::DbError(e) => internal(&e),
            Self::SessionError(e) => internal(&e),
        }
    }
}

#[derive(Deserialize)]
pub struct LoginInput {
    email: String,
    password: String,
}

pub async fn login(
    State(state): State<SharedAppState>,
    jar: CookieJar,
    WithRejection(Json(LoginInput { email, password }), _): JsonBody<LoginInput>,
) -> Result<(CookieJar, Json<api::user::Session>), LoginError> {
    use LoginError as E;

    let user = state
        .db_client
        .get_user_by_email(email.trim())
        .await?
        .filter(|u| u.password_hash.verify(&password))
        .ok_or(E::WrongEmailOrPassword)?;

    let now = OffsetDateTime::now_utc();
    state.db_client.touch_last_login(user.id, now).await?;

    let organizer_id = match user.role {
        Role::Organizer => state
            .db_client
            .get_organizer_by_user(user.id)
            .await?
            .map(|o| o.id),
        Role::User | Role::Management => None,
    };

    let jar = start_session(&state, jar, &user, organizer_id, now)?;
    Ok((jar, Json(api::user::Session { user: user.into() })))
}

#[derive(Debug, From)]
pub enum LoginError {
    #[from]
    DbError(db::Error),
    #[from]
    SessionError(SessionError),
    WrongEmailOrPassword,
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            Self::WrongEmailOrPassword => {
                reply(StatusCode::UNAUTHORIZED, "invalid email or password")
            }
            Self::DbError(e) => internal(&e),
            Self::SessionError(e) => internal(&e),
        }
    }
}

/// Current user, or `null` when there is no usable session.
pub async fn session(
    State(state): State<SharedAppState>,
    jar: CookieJar,
) -> Json<Option<api::user::Session>> {
    let Ok(identity) = auth::authorize(
        &jar,
        &state.session_codec,
        OffsetDateTime::now_utc(),
        None,
    ) else {
        return Json(None);
    };

    match state.db_client.get_user_by_id(identity.user_id).await {
        Ok(user) => Json(user.map(|u| api::user::Session { user: u.into() })),
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed");
            Json(None)
        }
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.remove(session::Codec::removal_cookie()), StatusCode::OK)
}

pub async fn switch_to_organizer(
    State(state): State<SharedAppState>,
    identity: Identity,
    jar: CookieJar,
) -> Result<(CookieJar, Json<api::organizer::Switched>), SwitchToOrganizerError>
{
    use SwitchToOrganizerError as E;

    match identity.role {
        Role::User => {}
        Role::Organizer => return Err(E::AlreadyOrganizer),
        Role::Management => return Err(AuthError::Forbidden.into()),
    }

    let mut user = state
        .db_client
        .get_user_by_id(identity.user_id)
        .await?
        .ok_or(E::UserNotFound)?;
    if state
        .db_client
        .get_organizer_by_user(user.id)
        .await?
        .is_some()
    {
        return Err(E::AlreadyOrganizer);
    }

    let now = OffsetDateTime::now_utc();
    let organizer = api::organizer::profile_for(&user, now);
    state
        .db_client
        .promote_to_organizer(user.id, &organizer)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                E::AlreadyOrganizer
            } else {
                E::DbError(e)
            }
        })?;
    user.role = Role::Organizer;
    tracing::info!(
        user_id = %user.id,
        organizer_id = %organizer.id,
        "user switched to organizer"
    );

    let jar = start_session(&state, jar, &user, Some(organizer.id), now)?;
    Ok((
        jar,
        Json(api::organizer::Switched {
            organizer_id: organizer.id,
        }),
    ))
}

#[derive(Debug, From)]
pub enum SwitchToOrganizerError {
    AlreadyOrganizer,
    #[from]
    AuthError(AuthError),
    #[from]
    DbError(db::Error),
    #[from]
    SessionError(SessionError),
    UserNotFound,
}

impl IntoResponse for SwitchToOrganizerError {
    fn into_response(self) -> Response {
        match self {
            Self::AlreadyOrganizer => {
                reply(StatusCode::BAD_REQUEST, "already an organizer")
            }
            Self::AuthError(e) => e.into_response(),
            Self::UserNotFound => reply(StatusCode::NOT_FOUND, "user not found"),
            Self::DbError(e) => internal(&e),
            Self::SessionError(e) => internal(&e),
        }
    }
}
