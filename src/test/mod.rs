//! Shared fixtures for the unit tests and the HTTP workloads.

use axum_test::TestServer;
use chrono::Utc;
use diesel::{connection::SimpleConnection, prelude::*};
use diesel_migrations::MigrationHarness;
use uuid::Uuid;

use crate::{
    MIGRATIONS,
    config::{create_app, run_migrations},
    participants::{NewProfile, ProfileForm, save_profile},
    schema::users,
    settings::Settings,
    state::{DbPool, build_pool},
};

mod concurrency;
mod portal_workload;

/// A fresh, migrated in-memory database.
pub fn memory_connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
    conn
}

/// Inserts an account and returns its id.
pub fn register_user(conn: &mut SqliteConnection, username: &str) -> String {
    let id = Uuid::now_v7().to_string();
    diesel::insert_into(users::table)
        .values((
            users::id.eq(&id),
            users::email.eq(format!("{username}@example.com")),
            users::username.eq(username),
            users::password_hash.eq("not-a-real-hash"),
            users::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
        .unwrap();
    id
}

/// Inserts an account with a saved profile for `first_name Tester`.
pub fn register_participant(
    conn: &mut SqliteConnection,
    first_name: &str,
) -> String {
    let id = register_user(conn, &first_name.to_ascii_lowercase());
    let profile =
        NewProfile::from_form(&sample_profile_form(first_name)).unwrap();
    save_profile(conn, &id, &profile, None, Utc::now().naive_utc()).unwrap();
    id
}

/// A complete, valid registration form.
pub fn sample_profile_form(first_name: &str) -> ProfileForm {
    let handle = first_name.to_ascii_lowercase();
    ProfileForm {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{handle}@sfu.ca"),
        student_number: "300913643".to_string(),
        major: "data-science".to_string(),
        year: "3".to_string(),
        how_heard: vec!["Discord".to_string()],
        kaggle_username: format!("{handle}_kaggle"),
        dietary_restrictions: "None".to_string(),
        tshirt_size: "m".to_string(),
        discord_username: format!("{handle}#0001"),
    }
}

/// The form above, encoded the way a browser submits it (one `how_heard`
/// pair per ticked box).
pub fn encode_profile_form(form: &ProfileForm) -> String {
    let mut out = url::form_urlencoded::Serializer::new(String::new());
    out.append_pair("first_name", &form.first_name)
        .append_pair("last_name", &form.last_name)
        .append_pair("email", &form.email)
        .append_pair("student_number", &form.student_number)
        .append_pair("major", &form.major)
        .append_pair("year", &form.year)
        .append_pair("kaggle_username", &form.kaggle_username)
        .append_pair("dietary_restrictions", &form.dietary_restrictions)
        .append_pair("tshirt_size", &form.tshirt_size)
        .append_pair("discord_username", &form.discord_username);
    for source in &form.how_heard {
        out.append_pair("how_heard", source);
    }
    out.finish()
}

pub fn test_settings() -> Settings {
    Settings {
        secret_key: Some("0".repeat(64)),
        ..Default::default()
    }
}

/// An app backed by a fresh in-memory database.
pub fn test_server(settings: Settings) -> (TestServer, DbPool) {
    let pool = build_pool(":memory:").unwrap();
    run_migrations(&pool).unwrap();
    assert_eq!(pool.state().idle_connections, 1);

    let app = create_app(pool.clone(), settings).unwrap();
    (TestServer::new(app).unwrap(), pool)
}
