//! Races against a file-backed database, where every pooled connection is a
//! separate SQLite connection contending for the write lock.

use std::sync::{Arc, Barrier};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    config::run_migrations,
    error::RegistrationError,
    state::{DbPool, build_pool},
    teams::{
        NewTeam, TEAM_CAPACITY,
        code::TeamCode,
        registry::{create_team, join_team, list_roster, member_count},
    },
    test::register_participant,
};

fn file_pool(dir: &tempfile::TempDir) -> DbPool {
    let path = dir.path().join("portal.db");
    let pool = build_pool(path.to_str().unwrap()).unwrap();
    run_migrations(&pool).unwrap();
    pool
}

/// Runs `f(i)` for each `i` in `0..n` on its own blocking thread, all
/// released at once, each with its own pooled connection.
async fn race<T, F>(pool: &DbPool, n: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize, &mut diesel::SqliteConnection) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(n));
    let f = Arc::new(f);

    let tasks = (0..n).map(|i| {
        let pool = pool.clone();
        let barrier = barrier.clone();
        let f = f.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().unwrap();
            barrier.wait();
            (*f)(i, &mut *conn)
        })
    });

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|res| res.unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_joins_never_overfill_a_team() {
    let dir = tempfile::tempdir().unwrap();
    let pool = file_pool(&dir);

    let (team, joiners) = {
        let mut conn = pool.get().unwrap();
        let leader = register_participant(&mut conn, "Ada");
        let team = create_team(
            &mut conn,
            &mut ChaCha8Rng::seed_from_u64(3),
            &leader,
            &NewTeam::new("Overfitters", "SFU").unwrap(),
        )
        .unwrap();
        let grace = register_participant(&mut conn, "Grace");
        let code = TeamCode::parse(&team.code).unwrap();
        join_team(&mut conn, &grace, &code).unwrap();

        let joiners = ["Alan", "Edsger", "Barbara", "Donald", "Frances", "John"]
            .map(|name| register_participant(&mut conn, name));
        (team, joiners)
    };

    let code = TeamCode::parse(&team.code).unwrap();
    let outcomes = race(&pool, joiners.len(), move |i, conn| {
        join_team(conn, &joiners[i], &code)
    })
    .await;

    let joined = outcomes.iter().filter(|r| r.is_ok()).count();
    let full = outcomes
        .iter()
        .filter(|r| matches!(r, Err(RegistrationError::TeamFull)))
        .count();
    assert_eq!(joined, 2, "{outcomes:?}");
    assert_eq!(full, 4, "{outcomes:?}");

    let mut conn = pool.get().unwrap();
    assert_eq!(member_count(&team.id, &mut conn).unwrap(), TEAM_CAPACITY);
    assert_eq!(list_roster(&team.id, &mut conn).unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_participant_racing_into_two_teams_lands_in_one() {
    let dir = tempfile::tempdir().unwrap();
    let pool = file_pool(&dir);

    let (codes, barbara) = {
        let mut conn = pool.get().unwrap();
        let codes = ["Ada", "Grace"].map(|leader| {
            let id = register_participant(&mut conn, leader);
            let team = create_team(
                &mut conn,
                &mut ChaCha8Rng::from_os_rng(),
                &id,
                &NewTeam::new(leader, "SFU").unwrap(),
            )
            .unwrap();
            TeamCode::parse(&team.code).unwrap()
        });
        (codes, register_participant(&mut conn, "Barbara"))
    };

    let outcomes = race(&pool, codes.len(), move |i, conn| {
        join_team(conn, &barbara, &codes[i])
    })
    .await;

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(RegistrationError::AlreadyOnTeam))),
        "{outcomes:?}"
    );
}
