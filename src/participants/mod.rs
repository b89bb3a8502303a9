//! Participant profiles: one row per account, saved from the registration
//! form and editable until the competition starts.

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    error::RegistrationError,
    schema::participants,
    validation::{is_student_number, is_valid_email},
};

pub mod form;

/// `(stored value, label)` pairs.
pub type Choices = &'static [(&'static str, &'static str)];

pub const MAJORS: Choices = &[
    ("data-science", "Data Science"),
    ("computer-science", "Computer Science"),
    ("statistics", "Statistics"),
    ("business", "Business"),
    ("other", "Other"),
];

pub const YEARS: Choices = &[("1", "1"), ("2", "2"), ("3", "3"), ("4+", "4+")];

pub const TSHIRT_SIZES: Choices = &[
    ("xs", "XS"),
    ("s", "S"),
    ("m", "M"),
    ("l", "L"),
    ("xl", "XL"),
    ("2xl", "2XL"),
];

pub const HOW_HEARD: &[&str] =
    &["Instagram", "Discord", "Email", "A friend", "Posters", "Other"];

pub fn label_of(choices: Choices, value: &str) -> Option<&'static str> {
    choices
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = participants)]
#[diesel(check_for_backend(Sqlite))]
pub struct Participant {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_number: String,
    pub major: String,
    pub year: String,
    /// JSON array; see [`Participant::how_heard`].
    pub how_heard: String,
    pub kaggle_username: String,
    pub dietary_restrictions: String,
    pub tshirt_size: String,
    pub discord_username: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Participant {
    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Option<Participant>, RegistrationError> {
        let participant = participants::table
            .filter(participants::id.eq(id))
            .select(Participant::as_select())
            .first::<Participant>(conn)
            .optional()?;

        Ok(participant)
    }

    pub fn how_heard(&self) -> Vec<String> {
        serde_json::from_str(&self.how_heard).unwrap_or_default()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn major_label(&self) -> &str {
        label_of(MAJORS, &self.major).unwrap_or(&self.major)
    }
}

/// The registration form as submitted. Nothing here has been checked yet;
/// see [`NewProfile::from_form`].
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_number: String,
    pub major: String,
    pub year: String,
    pub how_heard: Vec<String>,
    pub kaggle_username: String,
    pub dietary_restrictions: String,
    pub tshirt_size: String,
    pub discord_username: String,
}

impl From<&Participant> for ProfileForm {
    fn from(p: &Participant) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            email: p.email.clone(),
            student_number: p.student_number.clone(),
            major: p.major.clone(),
            year: p.year.clone(),
            how_heard: p.how_heard(),
            kaggle_username: p.kaggle_username.clone(),
            dietary_restrictions: p.dietary_restrictions.clone(),
            tshirt_size: p.tshirt_size.clone(),
            discord_username: p.discord_username.clone().unwrap_or_default(),
        }
    }
}

/// A validated profile, ready to be saved.
#[derive(Debug, Clone)]
pub struct NewProfile {
    first_name: String,
    last_name: String,
    email: String,
    student_number: String,
    major: String,
    year: String,
    how_heard: Vec<String>,
    kaggle_username: String,
    dietary_restrictions: String,
    tshirt_size: String,
    discord_username: Option<String>,
}

impl NewProfile {
    pub fn from_form(form: &ProfileForm) -> Result<Self, RegistrationError> {
        let how_heard: Vec<String> = form
            .how_heard
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unique()
            .map(str::to_string)
            .collect();

        let required = [
            ("First name", form.first_name.trim()),
            ("Last name", form.last_name.trim()),
            ("Email", form.email.trim()),
            ("Student number", form.student_number.trim()),
            ("Major", form.major.trim()),
            ("Year", form.year.trim()),
            ("Kaggle username", form.kaggle_username.trim()),
            ("Dietary restrictions", form.dietary_restrictions.trim()),
            ("T-shirt size", form.tshirt_size.trim()),
        ];

        let mut missing = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(label, _)| *label)
            .collect::<Vec<_>>();
        if how_heard.is_empty() {
            missing.push("How did you hear about this event?");
        }
        if !missing.is_empty() {
            return Err(RegistrationError::Validation(format!(
                "Please fill in all required fields: {}.",
                missing.join(", ")
            )));
        }

        let invalid = |msg: String| Err(RegistrationError::Validation(msg));

        if let Err(e) = is_valid_email(form.email.trim()) {
            return invalid(format!("Email: {e}."));
        }
        if let Err(e) = is_student_number(form.student_number.trim()) {
            return invalid(format!("Student number: {e}."));
        }
        for (label, choices, value) in [
            ("major", MAJORS, &form.major),
            ("year", YEARS, &form.year),
            ("t-shirt size", TSHIRT_SIZES, &form.tshirt_size),
        ] {
            if label_of(choices, value.trim()).is_none() {
                return invalid(format!("Please choose a valid {label}."));
            }
        }
        if let Some(unknown) = how_heard.iter().find(|h| !HOW_HEARD.contains(&h.as_str())) {
            return invalid(format!("Unknown option \"{unknown}\"."));
        }

        let discord_username = Some(form.discord_username.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_string(),
            student_number: form.student_number.trim().to_string(),
            major: form.major.trim().to_string(),
            year: form.year.trim().to_string(),
            how_heard,
            kaggle_username: form.kaggle_username.trim().to_string(),
            dietary_restrictions: form.dietary_restrictions.trim().to_string(),
            tshirt_size: form.tshirt_size.trim().to_string(),
            discord_username,
        })
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = participants)]
#[diesel(treat_none_as_null = true)]
struct ProfileRow<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    student_number: &'a str,
    major: &'a str,
    year: &'a str,
    how_heard: String,
    kaggle_username: &'a str,
    dietary_restrictions: &'a str,
    tshirt_size: &'a str,
    discord_username: Option<&'a str>,
    updated_at: NaiveDateTime,
}

/// Creates or replaces the profile of `identity_id`.
///
/// Fails with [`RegistrationError::RegistrationClosed`] once `now` reaches
/// `closes_at`.
#[tracing::instrument(skip(conn, profile))]
pub fn save_profile(
    conn: &mut SqliteConnection,
    identity_id: &str,
    profile: &NewProfile,
    closes_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Result<Participant, RegistrationError> {
    if closes_at.is_some_and(|start| now >= start) {
        return Err(RegistrationError::RegistrationClosed);
    }

    let how_heard = serde_json::to_string(&profile.how_heard)
        .map_err(|e| RegistrationError::Internal(e.to_string()))?;

    let row = ProfileRow {
        first_name: &profile.first_name,
        last_name: &profile.last_name,
        email: &profile.email,
        student_number: &profile.student_number,
        major: &profile.major,
        year: &profile.year,
        how_heard,
        kaggle_username: &profile.kaggle_username,
        dietary_restrictions: &profile.dietary_restrictions,
        tshirt_size: &profile.tshirt_size,
        discord_username: profile.discord_username.as_deref(),
        updated_at: now,
    };

    diesel::insert_into(participants::table)
        .values((
            participants::id.eq(identity_id),
            participants::created_at.eq(now),
            &row,
        ))
        .on_conflict(participants::id)
        .do_update()
        .set(&row)
        .execute(conn)?;

    tracing::info!("saved participant profile");

    Participant::fetch(identity_id, conn)?.ok_or_else(|| {
        RegistrationError::Internal("profile vanished after saving".to_string())
    })
}
