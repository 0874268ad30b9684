//! Write inputs as received from the transports
//!
//! Inputs carry loosely typed values so that every problem can be reported
//! in one aggregated [`ValidationErrors`] instead of failing on the first
//! malformed field during deserialization.

use serde::{Deserialize, Serialize};

use super::club::{ClubCategory, ClubFields, Keyword, NewClub, NewPlayer, PreferredFoot, Stadium};
use crate::validation::{
    parse_iso_date, Constraint, FieldRule, Format, Schema, Validate, ValidationErrors,
};

/// Maximum stadium capacity
pub const MAX_CAPACITY: i64 = 200_000;

/// Minimum player age
pub const MIN_PLAYER_AGE: i64 = 16;

const CLUB_SCHEMA: Schema = Schema::new(&[
    FieldRule::text("name", true, &[Constraint::NotBlank, Constraint::MaxLength(60)]),
    FieldRule::integer(
        "memberCount",
        false,
        &[Constraint::Min(0), Constraint::Max(u32::MAX as i64)],
    ),
    FieldRule::text("website", false, &[Constraint::Format(Format::Url)]),
    FieldRule::text("email", false, &[Constraint::Format(Format::Email)]),
    FieldRule::text("phone", false, &[Constraint::Format(Format::Phone)]),
    FieldRule::text("foundingDate", false, &[Constraint::Format(Format::IsoDate)]),
    FieldRule::text("league", false, &[Constraint::MaxLength(60)]),
    FieldRule::text("country", false, &[Constraint::MaxLength(60)]),
    FieldRule::text("category", false, &[Constraint::OneOf(ClubCategory::LITERALS)]),
]);

const KEYWORD_SCHEMA: Schema = Schema::new(&[FieldRule::text(
    "keyword",
    true,
    &[Constraint::OneOf(Keyword::LITERALS)],
)]);

const STADIUM_SCHEMA: Schema = Schema::new(&[
    FieldRule::text("city", true, &[Constraint::NotBlank, Constraint::MaxLength(60)]),
    FieldRule::integer(
        "capacity",
        true,
        &[Constraint::Min(0), Constraint::Max(MAX_CAPACITY)],
    ),
    FieldRule::text("street", false, &[Constraint::MaxLength(60)]),
    FieldRule::text("houseNumber", false, &[Constraint::MaxLength(10)]),
]);

const PLAYER_SCHEMA: Schema = Schema::new(&[
    FieldRule::text("firstName", true, &[Constraint::NotBlank, Constraint::MaxLength(60)]),
    FieldRule::text("lastName", true, &[Constraint::NotBlank, Constraint::MaxLength(60)]),
    FieldRule::integer(
        "age",
        true,
        &[Constraint::Min(MIN_PLAYER_AGE), Constraint::Max(60)],
    ),
    FieldRule::text(
        "preferredFoot",
        true,
        &[Constraint::OneOf(PreferredFoot::LITERALS)],
    ),
]);

/// Club payload for create and update
///
/// Update only writes the scalar attributes; `stadium` and `players` are
/// ignored there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubInput {
    pub name: Option<String>,
    pub member_count: Option<i64>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub founding_date: Option<String>,
    pub league: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub stadium: Option<StadiumInput>,
    #[serde(default)]
    pub players: Vec<PlayerInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StadiumInput {
    pub city: Option<String>,
    pub capacity: Option<i64>,
    pub street: Option<String>,
    pub house_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub preferred_foot: Option<String>,
}

impl ClubInput {
    /// Check only the scalar attributes
    pub fn validate_fields_into(&self, path: &str, errors: &mut ValidationErrors) {
        CLUB_SCHEMA.check(
            path,
            &[
                ("name", self.name.as_deref().into()),
                ("memberCount", self.member_count.into()),
                ("website", self.website.as_deref().into()),
                ("email", self.email.as_deref().into()),
                ("phone", self.phone.as_deref().into()),
                ("foundingDate", self.founding_date.as_deref().into()),
                ("league", self.league.as_deref().into()),
                ("country", self.country.as_deref().into()),
                ("category", self.category.as_deref().into()),
            ],
            errors,
        );

        for (index, keyword) in self.keywords.iter().enumerate() {
            KEYWORD_SCHEMA.check(
                &indexed(path, "keywords", index),
                &[("keyword", keyword.as_str().into())],
                errors,
            );
        }
    }

    /// Validate everything and convert into data for a new club
    pub fn into_new_club(mut self) -> Result<NewClub, ValidationErrors> {
        self.validate()?;
        let stadium = self.stadium.take().map(StadiumInput::into_stadium);
        let players = std::mem::take(&mut self.players)
            .into_iter()
            .map(PlayerInput::into_new_player)
            .collect();
        Ok(NewClub {
            fields: self.into_fields_unchecked(),
            stadium,
            players,
        })
    }

    /// Validate the scalar attributes and convert them for an update
    pub fn into_fields(self) -> Result<ClubFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_fields_into("", &mut errors);
        errors.into_result()?;
        Ok(self.into_fields_unchecked())
    }

    fn into_fields_unchecked(self) -> ClubFields {
        let mut keywords: Vec<Keyword> = self
            .keywords
            .iter()
            .filter_map(|k| k.parse().ok())
            .collect();
        keywords.sort();
        keywords.dedup();

        ClubFields {
            name: self.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            member_count: self.member_count.and_then(|n| u32::try_from(n).ok()),
            website: non_empty(self.website),
            email: non_empty(self.email),
            phone: non_empty(self.phone),
            founding_date: self.founding_date.as_deref().map(str::trim).and_then(parse_iso_date),
            league: non_empty(self.league),
            country: non_empty(self.country),
            category: self.category.as_deref().and_then(|c| c.parse().ok()),
            keywords,
        }
    }
}

impl Validate for ClubInput {
    fn validate_into(&self, path: &str, errors: &mut ValidationErrors) {
        self.validate_fields_into(path, errors);
        if let Some(stadium) = &self.stadium {
            stadium.validate_into(&crate::validation::field_path(path, "stadium"), errors);
        }
        for (index, player) in self.players.iter().enumerate() {
            player.validate_into(&indexed(path, "players", index), errors);
        }
    }
}

impl StadiumInput {
    fn into_stadium(self) -> Stadium {
        Stadium {
            city: self.city.map(|c| c.trim().to_string()).unwrap_or_default(),
            capacity: self
                .capacity
                .and_then(|c| u32::try_from(c).ok())
                .unwrap_or_default(),
            street: non_empty(self.street),
            house_number: non_empty(self.house_number),
        }
    }
}

impl Validate for StadiumInput {
    fn validate_into(&self, path: &str, errors: &mut ValidationErrors) {
        STADIUM_SCHEMA.check(
            path,
            &[
                ("city", self.city.as_deref().into()),
                ("capacity", self.capacity.into()),
                ("street", self.street.as_deref().into()),
                ("houseNumber", self.house_number.as_deref().into()),
            ],
            errors,
        );
    }
}

impl PlayerInput {
    fn into_new_player(self) -> NewPlayer {
        NewPlayer {
            first_name: self.first_name.map(|n| n.trim().to_string()).unwrap_or_default(),
            last_name: self.last_name.map(|n| n.trim().to_string()).unwrap_or_default(),
            age: self
                .age
                .and_then(|a| u32::try_from(a).ok())
                .unwrap_or_default(),
            preferred_foot: self
                .preferred_foot
                .as_deref()
                .and_then(|f| f.parse().ok())
                .unwrap_or(PreferredFoot::Right),
        }
    }
}

impl Validate for PlayerInput {
    fn validate_into(&self, path: &str, errors: &mut ValidationErrors) {
        PLAYER_SCHEMA.check(
            path,
            &[
                ("firstName", self.first_name.as_deref().into()),
                ("lastName", self.last_name.as_deref().into()),
                ("age", self.age.into()),
                ("preferredFoot", self.preferred_foot.as_deref().into()),
            ],
            errors,
        );
    }
}

fn indexed(path: &str, field: &str, index: usize) -> String {
    format!("{}[{index}]", crate::validation::field_path(path, field))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
