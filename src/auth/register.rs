use std::sync::Arc;

use argon2::Argon2;
use argon2::PasswordHasher;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use axum::{
    extract::{Form, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use diesel::{
    insert_into,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::*;
use crate::{
    auth::{User, set_login_cookie},
    schema::users,
    settings::Settings,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

pub async fn register_page(
    user: Option<User<true>>,
    State(settings): State<Arc<Settings>>,
) -> StandardResponse {
    if user.is_some() {
        return see_other_ok(Redirect::to("/dashboard"));
    }

    success(
        Page::<_, true>::new()
            .title(&settings.event_name)
            .body(maud! {
                h1 { "Create an account" }
                p class="text-muted" {
                    "After creating an account you can fill in your "
                    "participant profile and form a team."
                }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="username" class="form-label" { "Username" }
                        input type="text" class="form-control" id="username" name="username" required;
                    }
                    div class="mb-3" {
                        label for="email" class="form-label" { "Email" }
                        input type="email" class="form-control" id="email" name="email" required;
                    }
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password" required;
                    }
                    div class="mb-3" {
                        label for="password2" class="form-label" { "Confirm Password" }
                        input type="password" class="form-control" id="password2" name="password2" required;
                    }
                    button type="submit" class="btn btn-primary" { "Register" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    /// The first problem with the form, if any.
    fn problem(&self) -> Option<String> {
        if let Err(e) = is_ascii_no_spaces(&self.username) {
            return Some(format!("Username {e}."));
        }
        if !User::<false>::validate_username(&self.username) {
            return Some(
                "Usernames are 3 to 32 letters, digits, dots or underscores."
                    .to_string(),
            );
        }
        if is_valid_email(self.email.trim()).is_err() {
            return Some("Please enter a valid email address.".to_string());
        }
        if !User::<false>::validate_password(&self.password) {
            return Some(
                "Passwords must be at least 8 characters long.".to_string(),
            );
        }
        if self.password != self.password2 {
            return Some("The two passwords do not match.".to_string());
        }
        None
    }
}

pub async fn do_register(
    user: Option<User<false>>,
    State(settings): State<Arc<Settings>>,
    jar: PrivateCookieJar,
    mut conn: Conn<false>,
    Form(form): Form<RegisterForm>,
) -> Result<(PrivateCookieJar, Redirect), FailureResponse> {
    let try_again = |msg: String| {
        FailureResponse::BadRequest(
            Page::<_, false>::new()
                .title(&settings.event_name)
                .body(maud! {
                    ErrorAlert msg = (msg.as_str());
                    a href="/register" { "Back to registration" }
                })
                .render(),
        )
    };
    let internal = |e: &dyn std::fmt::Display| {
        tracing::error!("registration failed: {e}");
        FailureResponse::ServerError(
            maud! { p { "Something went wrong. Please try again." } }.render(),
        )
    };

    if user.is_some() {
        return Ok((jar, Redirect::to("/dashboard")));
    }

    if let Some(problem) = form.problem() {
        return Err(try_again(problem));
    }

    let email = form.email.trim().to_ascii_lowercase();

    let existing = users::table
        .filter(users::username.eq(&form.username).or(users::email.eq(&email)))
        .first::<User<false>>(&mut *conn)
        .optional()
        .map_err(|e| internal(&e))?;

    if let Some(existing) = existing {
        return Err(try_again(if existing.email == email {
            "That email is already registered.".to_string()
        } else {
            "That username is already taken.".to_string()
        }));
    }

    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| internal(&e))?
    .map_err(|e| internal(&e))?;

    let id = Uuid::now_v7().to_string();
    let inserted = insert_into(users::table)
        .values((
            users::id.eq(&id),
            users::email.eq(&email),
            users::username.eq(&form.username),
            users::password_hash.eq(password_hash),
            users::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn);

    match inserted {
        Ok(_) => {}
        // Lost a race with an identical registration.
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(try_again(
                "That email or username was just taken.".to_string(),
            ));
        }
        Err(e) => return Err(internal(&e)),
    }

    tracing::info!(user_id = %id, "registered account");
    Ok((set_login_cookie(id, jar), Redirect::to("/dashboard")))
}
