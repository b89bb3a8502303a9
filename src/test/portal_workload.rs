//! End-to-end workloads: drive the portal over HTTP the way a browser would.

use axum::{body::Body, extract::Request, http::StatusCode};
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use diesel::prelude::*;
use tower::ServiceExt;

use crate::{
    auth::LOGIN_COOKIE,
    config::{create_app, run_migrations},
    schema::{team_members, teams},
    settings::Settings,
    state::{DbPool, build_pool},
    test::{encode_profile_form, sample_profile_form, test_server, test_settings},
};

const PASSWORD: &str = "correct horse battery";

macro_rules! assert_see_other {
    ($response:expr, $location:expr) => {
        assert_eq!(
            $response.status_code(),
            StatusCode::SEE_OTHER,
            "body = {}",
            $response.text()
        );
        assert_eq!($response.header("location"), $location);
    };
}

async fn register(server: &TestServer, username: &str) -> Cookie<'static> {
    let email = format!("{username}@example.com");
    let response = server
        .post("/register")
        .form(&[
            ("username", username),
            ("email", email.as_str()),
            ("password", PASSWORD),
            ("password2", PASSWORD),
        ])
        .await;
    assert_see_other!(response, "/dashboard");
    response.cookie(LOGIN_COOKIE)
}

async fn submit_profile(server: &TestServer, cookie: &Cookie<'static>, name: &str) {
    let response = server
        .post("/profile")
        .add_cookie(cookie.clone())
        .bytes(encode_profile_form(&sample_profile_form(name)).into())
        .content_type("application/x-www-form-urlencoded")
        .await;
    assert_see_other!(response, "/dashboard");
}

async fn participant(server: &TestServer, name: &str) -> Cookie<'static> {
    let cookie = register(server, &name.to_ascii_lowercase()).await;
    submit_profile(server, &cookie, name).await;
    cookie
}

async fn create_team(server: &TestServer, cookie: &Cookie<'static>, name: &str) {
    let response = server
        .post("/teams/create")
        .add_cookie(cookie.clone())
        .form(&[("name", name), ("institution", "Simon Fraser University")])
        .await;
    assert_see_other!(response, "/dashboard");
}

fn only_team_code(pool: &DbPool) -> String {
    let mut conn = pool.get().unwrap();
    teams::table
        .select(teams::code)
        .first::<String>(&mut conn)
        .unwrap()
}

#[tokio::test]
async fn leader_and_teammate_form_a_team() {
    let (server, pool) = test_server(test_settings());

    let ada = participant(&server, "Ada").await;
    create_team(&server, &ada, "Overfitters").await;

    let dashboard = server.get("/dashboard").add_cookie(ada.clone()).await;
    dashboard.assert_status_ok();
    let page = dashboard.text();
    assert!(page.contains("Overfitters"), "{page}");
    assert!(page.contains("Team Leader"), "{page}");
    assert!(page.contains("Members (1/4)"), "{page}");

    let code = only_team_code(&pool);
    assert!(page.contains(&format!("/dashboard?code={code}")), "{page}");

    let grace = participant(&server, "Grace").await;
    let response = server
        .post("/teams/join")
        .add_cookie(grace.clone())
        .form(&[("code", code.to_ascii_lowercase())])
        .await;
    assert_see_other!(response, "/dashboard");

    let page = server.get("/dashboard").add_cookie(grace).await.text();
    assert!(page.contains("Members (2/4)"), "{page}");
    assert!(page.contains("Ada Tester"), "{page}");
    assert!(page.contains("Grace Tester"), "{page}");
    assert!(page.contains("grace#0001"), "{page}");
    assert!(!page.contains("Team Leader"), "{page}");
}

#[tokio::test]
async fn fifth_member_is_turned_away() {
    let (server, pool) = test_server(test_settings());

    let ada = participant(&server, "Ada").await;
    create_team(&server, &ada, "Overfitters").await;
    let code = only_team_code(&pool);

    for name in ["Grace", "Alan", "Edsger", "Barbara"] {
        let cookie = participant(&server, name).await;
        let response = server
            .post("/teams/join")
            .add_cookie(cookie)
            .form(&[("code", code.as_str())])
            .await;

        if name == "Barbara" {
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            assert!(response.text().contains("This team is full"));
        } else {
            assert_see_other!(response, "/dashboard");
        }
    }

    let mut conn = pool.get().unwrap();
    let members = team_members::table
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();
    assert_eq!(members, 4);
}

#[tokio::test]
async fn unknown_code_is_reported() {
    let (server, _pool) = test_server(test_settings());
    let ada = participant(&server, "Ada").await;

    let response = server
        .post("/teams/join")
        .add_cookie(ada.clone())
        .form(&[("code", "ZZZZZZ")])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Team not found"));

    let response = server
        .post("/teams/join")
        .add_cookie(ada)
        .form(&[("code", "ZZ")])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let page = response.text();
    assert!(page.contains("Team not found"), "{page}");
    assert!(page.contains("6 letters or digits"), "{page}");
}

#[tokio::test]
async fn dashboard_requires_login() {
    let (server, _pool) = test_server(test_settings());

    let response = server.get("/dashboard").await;
    assert_see_other!(response, "/login?next=%2Fdashboard");

    let response = server.get("/dashboard?code=ABC123").await;
    assert_see_other!(response, "/login?next=%2Fdashboard%3Fcode%3DABC123");

    let response = server
        .post("/teams/join")
        .form(&[("code", "ABC123")])
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn incomplete_profile_is_rejected() {
    let (server, _pool) = test_server(test_settings());
    let ada = register(&server, "ada").await;

    let response = server
        .post("/profile")
        .add_cookie(ada.clone())
        .form(&[("first_name", "Ada"), ("last_name", "Tester")])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let page = response.text();
    assert!(page.contains("Please fill in all required fields"), "{page}");
    assert!(page.contains("Student number"), "{page}");

    let page = server.get("/dashboard").add_cookie(ada).await.text();
    assert!(page.contains("Complete your registration"), "{page}");
}

#[tokio::test]
async fn teams_need_a_profile_first() {
    let (server, _pool) = test_server(test_settings());
    let ada = register(&server, "ada").await;

    let response = server
        .post("/teams/create")
        .add_cookie(ada)
        .form(&[("name", "Overfitters"), ("institution", "SFU")])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("complete your registration"));
}

#[tokio::test]
async fn invite_link_prefills_join_form() {
    let (server, _pool) = test_server(test_settings());
    let grace = participant(&server, "Grace").await;

    let page = server
        .get("/dashboard?code=abc123")
        .add_cookie(grace)
        .await
        .text();
    assert!(page.contains("Join a team"), "{page}");
    assert!(page.contains(r#"value="ABC123""#), "{page}");
}

#[tokio::test]
async fn leaders_cannot_start_a_second_team() {
    let (server, _pool) = test_server(test_settings());
    let ada = participant(&server, "Ada").await;
    create_team(&server, &ada, "Overfitters").await;

    let response = server
        .post("/teams/create")
        .add_cookie(ada)
        .form(&[("name", "Underfitters"), ("institution", "SFU")])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("already a member of a team"));
}

#[tokio::test]
async fn profiles_are_locked_once_the_competition_starts() {
    let settings = Settings {
        competition_start: chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        ..test_settings()
    };
    let (server, _pool) = test_server(settings);
    let ada = register(&server, "ada").await;

    let response = server
        .post("/profile")
        .add_cookie(ada.clone())
        .bytes(encode_profile_form(&sample_profile_form("Ada")).into())
        .content_type("application/x-www-form-urlencoded")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Registration has closed"));

    let page = server.get("/dashboard").add_cookie(ada).await.text();
    assert!(page.contains("Registration has closed"), "{page}");
    assert!(!page.contains("Complete your registration"), "{page}");
}

#[tokio::test]
async fn accounts_can_log_out_and_back_in() {
    let (server, _pool) = test_server(test_settings());
    let ada = register(&server, "ada").await;

    let response = server.post("/logout").add_cookie(ada).await;
    assert_see_other!(response, "/");

    let response = server
        .post("/login")
        .form(&[("id", "ada"), ("password", "wrong password")])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/login?next=%2Fdashboard%3Fcode%3DABC123")
        .form(&[("id", "ada@example.com"), ("password", PASSWORD)])
        .await;
    assert_see_other!(response, "/dashboard?code=ABC123");

    let ada = response.cookie(LOGIN_COOKIE);
    server.get("/dashboard").add_cookie(ada).await.assert_status_ok();
}

#[tokio::test]
async fn duplicate_usernames_are_refused() {
    let (server, _pool) = test_server(test_settings());
    register(&server, "ada").await;

    let response = server
        .post("/register")
        .form(&[
            ("username", "ada"),
            ("email", "someone-else@example.com"),
            ("password", PASSWORD),
            ("password2", PASSWORD),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("username is already taken"));
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let pool = build_pool(":memory:").unwrap();
    run_migrations(&pool).unwrap();
    let app = create_app(pool, test_settings()).unwrap();

    let request = Request::builder()
        .uri("/teams")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mismatched_passwords_are_refused() {
    let (server, _pool) = test_server(test_settings());

    let response = server
        .post("/register")
        .form(&[
            ("username", "ada"),
            ("email", "ada@example.com"),
            ("password", PASSWORD),
            ("password2", "correct horse battery staple"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let page = response.text();
    assert!(page.contains("The two passwords do not match."), "{page}");
    assert!(response.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn team_writes_require_a_session() {
    let (server, pool) = test_server(test_settings());

    let response = server
        .post("/teams/create")
        .form(&[("name", "Overfitters"), ("institution", "SFU")])
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/teams/join")
        .form(&[("code", "ABC123")])
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let mut conn = pool.get().unwrap();
    let teams = teams::table.count().get_result::<i64>(&mut conn).unwrap();
    assert_eq!(teams, 0);
}
