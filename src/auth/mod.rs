//! Accounts and sessions.
//!
//! An account is only an identity (email, username, password). Everything
//! about the person taking part in the event lives in
//! [`crate::participants::Participant`], keyed by the account id.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use chrono::{Days, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    schema::users,
    state::{DbPool, ThreadSafeConn},
};

pub mod login;
pub mod register;

pub const LOGIN_COOKIE: &str = "hackteams_session";

const SESSION_DAYS: u64 = 7;

#[derive(Debug, Queryable, Serialize, Deserialize, Clone)]
pub struct User<const TX: bool> {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

impl<const TX: bool> User<TX> {
    pub fn validate_username(username: &str) -> bool {
        (3..=32).contains(&username.chars().count())
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    }

    pub fn validate_password(password: &str) -> bool {
        password.len() >= 8
    }
}

#[derive(Debug)]
pub enum AuthError {
    CookieMissingOrMalformed,
    NoDatabase,
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::CookieMissingOrMalformed => {
                (StatusCode::UNAUTHORIZED, "Cookie missing or malformed")
            }
            AuthError::NoDatabase => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Please log in to continue.")
            }
        };
        (status, body).into_response()
    }
}

#[derive(Serialize, Deserialize)]
pub struct LoginSession {
    id: String,
    expiry: NaiveDateTime,
}

#[async_trait]
impl<const TX: bool, S> FromRequestParts<S> for User<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
    Key: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar<Key> =
            PrivateCookieJar::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::CookieMissingOrMalformed)?;

        let Some(login_cookie) = jar.get(LOGIN_COOKIE) else {
            return Err(AuthError::Unauthorized);
        };

        let login = match serde_json::from_str::<LoginSession>(
            login_cookie.value(),
        ) {
            Ok(t) if Utc::now().naive_utc() < t.expiry => t,
            _ => return Err(AuthError::Unauthorized),
        };

        let conn_wrapper =
            ThreadSafeConn::<TX>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::NoDatabase)?;

        let mut conn = conn_wrapper
            .inner
            .try_lock()
            .map_err(|_| AuthError::NoDatabase)?;

        let user = users::table
            .filter(users::id.eq(login.id))
            .first::<User<TX>>(&mut *conn)
            .optional()
            .map_err(|e| {
                tracing::error!("could not load session user: {e}");
                AuthError::NoDatabase
            })?;

        user.ok_or(AuthError::Unauthorized)
    }
}

pub fn set_login_cookie(id: String, jar: PrivateCookieJar) -> PrivateCookieJar {
    let now = Utc::now().naive_utc();
    let session = LoginSession {
        id,
        expiry: now.checked_add_days(Days::new(SESSION_DAYS)).unwrap_or(now),
    };

    match serde_json::to_string(&session) {
        Ok(value) => jar.add(
            Cookie::build((LOGIN_COOKIE, value))
                .path("/")
                .http_only(true),
        ),
        Err(e) => {
            tracing::error!("could not encode session: {e}");
            jar
        }
    }
}

pub fn clear_login_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(LOGIN_COOKIE).path("/"))
}
