//! Errors raised while registering participants and forming teams.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::teams::TEAM_CAPACITY;

/// Message raised by the `team_members_capacity` trigger.
pub const TEAM_FULL_MARKER: &str = "team_full";

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    #[error("You are already a member of a team.")]
    AlreadyOnTeam,

    #[error("Team not found. Please check the code and try again.")]
    TeamNotFound,

    #[error("This team is full (maximum {} members).", TEAM_CAPACITY)]
    TeamFull,

    #[error("Please complete your registration before forming a team.")]
    NotRegistered,

    #[error("Registration has closed; profiles can no longer be changed.")]
    RegistrationClosed,

    /// A freshly generated team code is already taken. Retried by the
    /// registry, and never shown to users.
    #[error("team code already in use")]
    DuplicateCode,

    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistrationError {
    /// Whether the person who made the request can fix this themselves.
    pub fn is_user_correctable(&self) -> bool {
        !matches!(
            self,
            RegistrationError::DuplicateCode | RegistrationError::Internal(_)
        )
    }
}

impl From<DieselError> for RegistrationError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(kind, info) => {
                let message = info.message();
                match kind {
                    DatabaseErrorKind::UniqueViolation
                        if message.contains("teams.code") =>
                    {
                        RegistrationError::DuplicateCode
                    }
                    DatabaseErrorKind::UniqueViolation
                        if message.contains("team_members.participant_id") =>
                    {
                        RegistrationError::AlreadyOnTeam
                    }
                    _ if message.contains(TEAM_FULL_MARKER) => {
                        RegistrationError::TeamFull
                    }
                    _ => RegistrationError::Internal(format!(
                        "database error ({kind:?}): {message}"
                    )),
                }
            }
            other => {
                RegistrationError::Internal(format!("database error: {other}"))
            }
        }
    }
}

impl From<tokio::task::JoinError> for RegistrationError {
    fn from(e: tokio::task::JoinError) -> Self {
        RegistrationError::Internal(format!("blocking task failed: {e}"))
    }
}
