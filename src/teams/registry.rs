//! Creating teams, joining them by code, and reading their rosters.
//!
//! Each write runs in its own `BEGIN IMMEDIATE` transaction, so the
//! capacity check and the membership insert cannot interleave with another
//! writer. The `UNIQUE(participant_id)` constraint and the
//! `team_members_capacity` trigger back these checks up at the storage
//! level.

use chrono::{NaiveDateTime, Utc};
use diesel::{
    connection::LoadConnection, dsl::exists, prelude::*, select,
    sqlite::Sqlite,
};
use rand::Rng;
use uuid::Uuid;

use crate::{
    error::RegistrationError,
    schema::{participants, team_members, teams},
    teams::{
        Membership, NewTeam, RosterEntry, TEAM_CAPACITY, Team, code::TeamCode,
    },
};

/// How many codes are tried before team creation gives up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Creates a team led by `leader_id` and makes the leader its first member.
///
/// A code collision regenerates the code and retries the whole transaction;
/// after [`MAX_CODE_ATTEMPTS`] collisions this fails with
/// [`RegistrationError::Internal`].
#[tracing::instrument(skip(conn, rng))]
pub fn create_team(
    conn: &mut SqliteConnection,
    rng: &mut impl Rng,
    leader_id: &str,
    team: &NewTeam,
) -> Result<Team, RegistrationError> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = TeamCode::generate(rng);

        match try_create_team(conn, leader_id, team, &code) {
            Err(RegistrationError::DuplicateCode) => {
                tracing::warn!(attempt, %code, "team code collision");
            }
            Ok(team) => {
                tracing::info!(team_id = %team.id, code = %team.code, "created team");
                return Ok(team);
            }
            Err(e) => return Err(e),
        }
    }

    tracing::error!("could not allocate a unique team code");
    Err(RegistrationError::Internal(format!(
        "no unique team code after {MAX_CODE_ATTEMPTS} attempts"
    )))
}

fn try_create_team(
    conn: &mut SqliteConnection,
    leader_id: &str,
    team: &NewTeam,
    code: &TeamCode,
) -> Result<Team, RegistrationError> {
    conn.immediate_transaction(|conn| {
        ensure_registered(leader_id, conn)?;
        ensure_unaffiliated(leader_id, conn)?;

        let now = Utc::now().naive_utc();
        let record = Team {
            id: Uuid::now_v7().to_string(),
            name: team.name().to_string(),
            institution: team.institution().to_string(),
            leader_id: leader_id.to_string(),
            code: code.as_str().to_string(),
            created_at: now,
        };

        let n = diesel::insert_into(teams::table)
            .values(&record)
            .execute(conn)?;
        debug_assert_eq!(n, 1);

        insert_member(&record.id, leader_id, now, conn)?;

        Ok(record)
    })
}

/// Adds `participant_id` to the team whose code is `code`.
#[tracing::instrument(skip(conn))]
pub fn join_team(
    conn: &mut SqliteConnection,
    participant_id: &str,
    code: &TeamCode,
) -> Result<Team, RegistrationError> {
    let team = conn.immediate_transaction(|conn| {
        ensure_registered(participant_id, conn)?;
        ensure_unaffiliated(participant_id, conn)?;

        let team = find_by_code(code, conn)?
            .ok_or(RegistrationError::TeamNotFound)?;

        let members = member_count(&team.id, conn)?;
        tracing::trace!(members, "current roster size");
        if members >= TEAM_CAPACITY {
            return Err(RegistrationError::TeamFull);
        }

        insert_member(&team.id, participant_id, Utc::now().naive_utc(), conn)?;

        Ok(team)
    })?;

    tracing::info!(team_id = %team.id, "joined team");
    Ok(team)
}

/// The team's members, earliest joiner first.
pub fn list_roster(
    team_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Vec<RosterEntry>, RegistrationError> {
    let roster = team_members::table
        .inner_join(participants::table)
        .filter(team_members::team_id.eq(team_id))
        .order_by((team_members::joined_at.asc(), team_members::id.asc()))
        .select((
            team_members::participant_id,
            participants::first_name,
            participants::last_name,
            participants::discord_username,
            team_members::joined_at,
        ))
        .load::<RosterEntry>(conn)?;

    Ok(roster)
}

/// The participant's membership and team, if they are on one.
pub fn membership_of(
    participant_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Option<(Membership, Team)>, RegistrationError> {
    let membership = team_members::table
        .inner_join(teams::table)
        .filter(team_members::participant_id.eq(participant_id))
        .select((Membership::as_select(), Team::as_select()))
        .first::<(Membership, Team)>(conn)
        .optional()?;

    Ok(membership)
}

pub fn find_by_code(
    code: &TeamCode,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Option<Team>, RegistrationError> {
    let team = teams::table
        .filter(teams::code.eq(code.as_str()))
        .select(Team::as_select())
        .first::<Team>(conn)
        .optional()?;

    Ok(team)
}

pub fn member_count(
    team_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<i64, RegistrationError> {
    let n = team_members::table
        .filter(team_members::team_id.eq(team_id))
        .count()
        .get_result::<i64>(conn)?;

    Ok(n)
}

fn insert_member(
    team_id: &str,
    participant_id: &str,
    joined_at: NaiveDateTime,
    conn: &mut SqliteConnection,
) -> Result<(), RegistrationError> {
    diesel::insert_into(team_members::table)
        .values((
            team_members::team_id.eq(team_id),
            team_members::participant_id.eq(participant_id),
            team_members::joined_at.eq(joined_at),
        ))
        .execute(conn)?;

    Ok(())
}

fn ensure_registered(
    participant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), RegistrationError> {
    let registered = select(exists(
        participants::table.filter(participants::id.eq(participant_id)),
    ))
    .get_result::<bool>(conn)?;

    if registered {
        Ok(())
    } else {
        Err(RegistrationError::NotRegistered)
    }
}

fn ensure_unaffiliated(
    participant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), RegistrationError> {
    let teamed = select(exists(
        team_members::table
            .filter(team_members::participant_id.eq(participant_id)),
    ))
    .get_result::<bool>(conn)?;

    if teamed {
        Err(RegistrationError::AlreadyOnTeam)
    } else {
        Ok(())
    }
}
