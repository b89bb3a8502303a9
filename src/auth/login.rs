use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::{Form, Query, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{User, clear_login_cookie, set_login_cookie},
    schema::users,
    settings::Settings,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, bad_request, success},
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize, Default)]
pub struct NextQuery {
    #[serde(default)]
    next: Option<String>,
}

impl NextQuery {
    /// Where to send the user after logging in. Only paths on this site are
    /// honoured.
    fn target(&self) -> String {
        const BASE: &str = "http://portal.invalid/";

        let resolved = Url::parse(BASE).and_then(|base| {
            let url = base.join(self.next.as_deref().unwrap_or_default())?;
            Ok((base, url))
        });

        match resolved {
            Ok((base, url))
                if url.origin() == base.origin() && url.path() != "/" =>
            {
                match url.query() {
                    Some(q) => format!("{}?{q}", url.path()),
                    None => url.path().to_string(),
                }
            }
            _ => "/dashboard".to_string(),
        }
    }
}

pub async fn login_page(
    user: Option<User<true>>,
    State(settings): State<Arc<Settings>>,
    Query(next): Query<NextQuery>,
) -> StandardResponse {
    if user.is_some() {
        return bad_request(
            Page::new()
                .user_opt(user)
                .title(&settings.event_name)
                .body(maud! {
                    ErrorAlert msg = "You are already logged in.";
                })
                .render(),
        );
    }

    let action = match &next.next {
        Some(_) => format!(
            "/login?next={}",
            url::form_urlencoded::byte_serialize(next.target().as_bytes())
                .collect::<String>()
        ),
        None => "/login".to_string(),
    };

    success(
        Page::<_, true>::new()
            .title(&settings.event_name)
            .body(maud! {
                h1 { "Log in" }
                form method="post" action=(action) class="mt-4" {
                    div class="mb-3" {
                        label for="id" class="form-label" { "Email or username" }
                        input type="text" class="form-control" id="id" name="id" required;
                    }
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password" required;
                    }
                    button type="submit" class="btn btn-primary" { "Log in" }
                }
                p class="mt-3" {
                    "No account yet? "
                    a href="/register" { "Register" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    id: String,
    password: String,
}

pub async fn do_login(
    user: Option<User<true>>,
    State(settings): State<Arc<Settings>>,
    Query(next): Query<NextQuery>,
    jar: PrivateCookieJar,
    mut conn: Conn<true>,
    Form(form): Form<LoginForm>,
) -> Result<(PrivateCookieJar, Redirect), FailureResponse> {
    let failed = |msg: &'static str| {
        FailureResponse::BadRequest(
            Page::<_, true>::new()
                .title(&settings.event_name)
                .body(maud! {
                    ErrorAlert msg = (msg);
                    a href="/login" { "Try again" }
                })
                .render(),
        )
    };

    if user.is_some() {
        return Err(failed("You are already logged in."));
    }

    let id = form.id.trim();
    let account = users::table
        .filter(users::email.eq(id).or(users::username.eq(id)))
        .first::<User<true>>(&mut *conn)
        .optional()
        .map_err(|e| {
            tracing::error!("login lookup failed: {e}");
            FailureResponse::ServerError(
                maud! { p { "Something went wrong. Please try again." } }
                    .render(),
            )
        })?;

    let Some(account) = account else {
        return Err(failed("No account matches that email or username."));
    };

    let verified = PasswordHash::new(&account.password_hash)
        .map(|hash| {
            Argon2::default()
                .verify_password(form.password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false);

    if !verified {
        tracing::info!(user_id = %account.id, "failed login");
        return Err(failed("Incorrect password."));
    }

    tracing::info!(user_id = %account.id, "logged in");
    Ok((set_login_cookie(account.id, jar), Redirect::to(&next.target())))
}

pub async fn do_logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (clear_login_cookie(jar), Redirect::to("/"))
}
