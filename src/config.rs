use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, State},
    middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use diesel_migrations::MigrationHarness;
use hypertext::prelude::*;
use tower_http::trace::TraceLayer;

use crate::{
    MIGRATIONS,
    auth::{
        User,
        login::{do_login, do_logout, login_page},
        register::{do_register, register_page},
    },
    dashboard::{dashboard_page, do_create_team, do_join_team, do_save_profile},
    settings::{Settings, SettingsError},
    state::{DbPool, tx_commit},
    template::Page,
    util_resp::{FailureResponse, StandardResponse, success},
    widgets::actions::Actions,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub key: Key,
    pub settings: Arc<Settings>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}

pub async fn home(
    user: Option<User<true>>,
    State(settings): State<Arc<Settings>>,
) -> StandardResponse {
    let logged_in = user.is_some();

    success(
        Page::new()
            .user_opt(user)
            .title(&settings.event_name)
            .body(maud! {
                h1 { (settings.event_name) }
                p class="lead" {
                    "Register as a participant, then create a team or join "
                    "one with a six-character code. Teams have up to four "
                    "members."
                }
                @if logged_in {
                    Actions options=(&[("/dashboard", "Go to your dashboard")]);
                } @else {
                    Actions options=(&[
                        ("/register", "Register"),
                        ("/login", "Log in"),
                    ]);
                }
            })
            .render(),
    )
}

async fn not_found(State(settings): State<Arc<Settings>>) -> FailureResponse {
    FailureResponse::NotFound(
        Page::<_, true>::new()
            .title(&settings.event_name)
            .body(maud! {
                h1 { "Page not found" }
                a href="/" { "Back to the start page" }
            })
            .render(),
    )
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    tracing::info!(count = applied.len(), "applied pending migrations");
    Ok(())
}

pub fn create_app(
    pool: DbPool,
    settings: Settings,
) -> Result<Router, SettingsError> {
    let state = AppState {
        pool,
        key: settings.cookie_key()?,
        settings: Arc::new(settings),
    };

    Ok(Router::new()
        .route("/", get(home))
        .route("/register", get(register_page).post(do_register))
        .route("/login", get(login_page).post(do_login))
        .route("/logout", post(do_logout))
        .route("/dashboard", get(dashboard_page))
        .route("/profile", post(do_save_profile))
        .route("/teams/create", post(do_create_team))
        .route("/teams/join", post(do_join_team))
        .fallback(not_found)
        .layer(middleware::from_fn(tx_commit))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
