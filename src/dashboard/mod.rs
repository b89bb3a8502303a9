//! The participant dashboard, and the form handlers behind it.
//!
//! Reads go through the request transaction (`Conn<true>`). Writes take a
//! plain connection (`Conn<false>`) and hand it to a blocking task, where the
//! registry opens its own `BEGIN IMMEDIATE` transaction.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::Form;
use chrono::Utc;
use hypertext::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Deserialize;

use crate::{
    auth::User,
    error::RegistrationError,
    participants::{NewProfile, ProfileForm, form::ProfileFields, save_profile},
    settings::Settings,
    state::Conn,
    teams::{
        NewTeam, RegistrationState,
        code::TeamCode,
        registry::{create_team, join_team, list_roster},
    },
    template::Page,
    util_resp::{
        FailureResponse, StandardResponse, see_other_ok, success,
    },
    widgets::alert::{ErrorAlert, InfoAlert},
};

use self::{profile_card::ProfileCard, team_card::TeamCard, team_forms::TeamForms};

pub mod profile_card;
pub mod team_card;
pub mod team_forms;

#[derive(Deserialize, Default)]
pub struct DashboardQuery {
    #[serde(default)]
    code: Option<String>,
}

/// Turns a registry failure into a page. Only user-correctable errors have
/// their message shown.
fn error_page<const TX: bool>(
    settings: &Settings,
    user: User<TX>,
    err: RegistrationError,
) -> FailureResponse {
    if err.is_user_correctable() {
        tracing::debug!(user_id = %user.id, "rejected request: {err}");
        FailureResponse::BadRequest(
            Page::new()
                .user(user)
                .title(&settings.event_name)
                .body(maud! {
                    ErrorAlert msg = (err.to_string());
                    a href="/dashboard" { "Back to the dashboard" }
                })
                .render(),
        )
    } else {
        tracing::error!(user_id = %user.id, "request failed: {err}");
        FailureResponse::ServerError(
            Page::new()
                .user(user)
                .title(&settings.event_name)
                .body(maud! {
                    ErrorAlert msg = "Something went wrong on our side. Please try again.";
                })
                .render(),
        )
    }
}

pub async fn dashboard_page(
    user: Option<User<true>>,
    Query(query): Query<DashboardQuery>,
    State(settings): State<Arc<Settings>>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let Some(user) = user else {
        let next = match &query.code {
            Some(code) => format!("/dashboard?code={code}"),
            None => "/dashboard".to_string(),
        };
        let next: String =
            url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
        return see_other_ok(Redirect::to(&format!("/login?next={next}")));
    };

    let state = match RegistrationState::load(&user.id, &mut *conn) {
        Ok(state) => state,
        Err(e) => return Err(error_page(&settings, user, e)),
    };

    let roster = match &state {
        RegistrationState::Teamed(_, team) => {
            match list_roster(&team.id, &mut *conn) {
                Ok(roster) => roster,
                Err(e) => return Err(error_page(&settings, user, e)),
            }
        }
        _ => Vec::new(),
    };

    let open = settings.registration_open(Utc::now().naive_utc());
    let join_code = query
        .code
        .as_deref()
        .map(|c| c.trim().to_ascii_uppercase())
        .unwrap_or_default();
    let invite_link = match &state {
        RegistrationState::Teamed(_, team) => settings.invite_link(&team.code),
        _ => String::new(),
    };
    let profile_form = state
        .participant()
        .map(ProfileForm::from)
        .unwrap_or_default();

    let (state, roster, viewer_id) = (&state, &roster, user.id.clone());
    let (join_code, invite_link, profile_form) =
        (&join_code, &invite_link, &profile_form);

    success(
        Page::new()
            .user(user)
            .title(&settings.event_name)
            .body(maud! {
                h1 class="mb-4" { "Dashboard" }
                @if !open {
                    InfoAlert msg = "Registration has closed. Profiles can no longer be changed.";
                }
                @match state {
                    RegistrationState::Unregistered => {
                        @if open {
                            div class="card mb-4" {
                                div class="card-body" {
                                    h2 class="h5 card-title" { "Complete your registration" }
                                    p class="text-muted" {
                                        "Fill in your details to take part. You can form or "
                                        "join a team afterwards."
                                    }
                                    form method="post" action="/profile" {
                                        (ProfileFields::new(profile_form))
                                        button type="submit" class="btn btn-primary" {
                                            "Save registration"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    RegistrationState::Unaffiliated(participant) => {
                        ProfileCard participant=(participant);
                        p class="lead" { "You are not on a team yet." }
                        TeamForms join_code=(join_code.as_str());
                    }
                    RegistrationState::Teamed(participant, team) => {
                        ProfileCard participant=(participant);
                        TeamCard
                            team=(team)
                            roster=(roster.as_slice())
                            viewer_id=(viewer_id.as_str())
                            invite_link=(invite_link.as_str());
                    }
                }
                @if open && state.participant().is_some() {
                    details class="mb-4" {
                        summary { "Edit your registration" }
                        form method="post" action="/profile" class="mt-3" {
                            (ProfileFields::new(profile_form))
                            button type="submit" class="btn btn-outline-primary" {
                                "Update registration"
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

pub async fn do_save_profile(
    user: User<false>,
    State(settings): State<Arc<Settings>>,
    mut conn: Conn<false>,
    Form(form): Form<ProfileForm>,
) -> StandardResponse {
    let profile = match NewProfile::from_form(&form) {
        Ok(profile) => profile,
        Err(e) => return Err(error_page(&settings, user, e)),
    };

    let identity_id = user.id.clone();
    let closes_at = settings.competition_start;
    let saved = tokio::task::spawn_blocking(move || {
        save_profile(
            &mut conn,
            &identity_id,
            &profile,
            closes_at,
            Utc::now().naive_utc(),
        )
    })
    .await
    .map_err(RegistrationError::from)
    .and_then(|saved| saved);

    match saved {
        Ok(_) => see_other_ok(Redirect::to("/dashboard")),
        Err(e) => Err(error_page(&settings, user, e)),
    }
}

#[derive(Deserialize)]
pub struct CreateTeamForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    institution: String,
}

pub async fn do_create_team(
    user: User<false>,
    State(settings): State<Arc<Settings>>,
    mut conn: Conn<false>,
    Form(form): Form<CreateTeamForm>,
) -> StandardResponse {
    let team = match NewTeam::new(&form.name, &form.institution) {
        Ok(team) => team,
        Err(e) => return Err(error_page(&settings, user, e)),
    };

    let leader_id = user.id.clone();
    let created = tokio::task::spawn_blocking(move || {
        let mut rng = ChaCha20Rng::from_os_rng();
        create_team(&mut conn, &mut rng, &leader_id, &team)
    })
    .await
    .map_err(RegistrationError::from)
    .and_then(|created| created);

    match created {
        Ok(_) => see_other_ok(Redirect::to("/dashboard")),
        Err(e) => Err(error_page(&settings, user, e)),
    }
}

#[derive(Deserialize)]
pub struct JoinTeamForm {
    #[serde(default)]
    code: String,
}

pub async fn do_join_team(
    user: User<false>,
    State(settings): State<Arc<Settings>>,
    mut conn: Conn<false>,
    Form(form): Form<JoinTeamForm>,
) -> StandardResponse {
    let code = match TeamCode::parse(&form.code) {
        Ok(code) => code,
        Err(e) => return Err(error_page(&settings, user, e)),
    };

    let participant_id = user.id.clone();
    let joined = tokio::task::spawn_blocking(move || {
        join_team(&mut conn, &participant_id, &code)
    })
    .await
    .map_err(RegistrationError::from)
    .and_then(|joined| joined);

    match joined {
        Ok(_) => see_other_ok(Redirect::to("/dashboard")),
        Err(e) => Err(error_page(&settings, user, e)),
    }
}
