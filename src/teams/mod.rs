//! Teams, their membership ledger, and the registry operations that create
//! and fill them.

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    error::RegistrationError,
    participants::Participant,
    schema::{team_members, teams},
};

pub mod code;
pub mod registry;

/// The largest number of participants a team may have, leader included.
pub const TEAM_CAPACITY: i64 = 4;

const MAX_NAME_LEN: usize = 64;

#[derive(
    Queryable, Selectable, Insertable, Serialize, Deserialize, Clone, Debug,
    PartialEq, Eq,
)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(Sqlite))]
pub struct Team {
    pub id: String,
    pub name: String,
    pub institution: String,
    pub leader_id: String,
    /// Always stored in upper case.
    pub code: String,
    pub created_at: NaiveDateTime,
}

impl Team {
    pub fn is_led_by(&self, participant_id: &str) -> bool {
        self.leader_id == participant_id
    }
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(Sqlite))]
pub struct Membership {
    pub id: i32,
    pub team_id: String,
    pub participant_id: String,
    pub joined_at: NaiveDateTime,
}

/// One line of a team's roster: a membership joined with the member's
/// display fields.
#[derive(Queryable, Serialize, Clone, Debug)]
pub struct RosterEntry {
    pub participant_id: String,
    pub first_name: String,
    pub last_name: String,
    pub discord_username: Option<String>,
    pub joined_at: NaiveDateTime,
}

impl RosterEntry {
    pub fn display_name(&self) -> String {
        let name = [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .join(" ");

        if name.is_empty() {
            "Unnamed participant".to_string()
        } else {
            name
        }
    }
}

/// A validated request to create a team.
#[derive(Debug, Clone)]
pub struct NewTeam {
    name: String,
    institution: String,
}

impl NewTeam {
    pub fn new(name: &str, institution: &str) -> Result<Self, RegistrationError> {
        let name = name.trim();
        let institution = institution.trim();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("team name");
        }
        if institution.is_empty() {
            missing.push("university");
        }
        if !missing.is_empty() {
            return Err(RegistrationError::Validation(format!(
                "Please fill in the {}.",
                missing.join(" and ")
            )));
        }

        for (field, value) in [("Team name", name), ("University", institution)] {
            if value.chars().count() > MAX_NAME_LEN {
                return Err(RegistrationError::Validation(format!(
                    "{field} must be at most {MAX_NAME_LEN} characters."
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            institution: institution.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn institution(&self) -> &str {
        &self.institution
    }
}

/// Where a participant is in the registration process.
///
/// Saving a profile moves an account straight from `Unregistered` to
/// `Unaffiliated`; `Unaffiliated -> Teamed` happens exactly once, through
/// [`registry::create_team`] or [`registry::join_team`].
#[derive(Debug, Clone)]
pub enum RegistrationState {
    Unregistered,
    Unaffiliated(Participant),
    Teamed(Participant, Team),
}

impl RegistrationState {
    pub fn load(
        identity_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, RegistrationError> {
        let Some(participant) = Participant::fetch(identity_id, conn)? else {
            return Ok(RegistrationState::Unregistered);
        };

        Ok(match registry::membership_of(identity_id, conn)? {
            Some((_, team)) => RegistrationState::Teamed(participant, team),
            None => RegistrationState::Unaffiliated(participant),
        })
    }

    pub fn participant(&self) -> Option<&Participant> {
        match self {
            RegistrationState::Unregistered => None,
            RegistrationState::Unaffiliated(p)
            | RegistrationState::Teamed(p, _) => Some(p),
        }
    }
}
