//! Club aggregate: club, stadium and players

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned club identifier
pub type ClubId = i64;

/// Club category, the enumerated search field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubCategory {
    Professional,
    Amateur,
    Youth,
}

impl ClubCategory {
    /// Wire literals in declaration order
    pub const LITERALS: &'static [&'static str] = &["PROFESSIONAL", "AMATEUR", "YOUTH"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "PROFESSIONAL",
            Self::Amateur => "AMATEUR",
            Self::Youth => "YOUTH",
        }
    }
}

impl fmt::Display for ClubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClubCategory {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROFESSIONAL" => Ok(Self::Professional),
            "AMATEUR" => Ok(Self::Amateur),
            "YOUTH" => Ok(Self::Youth),
            other => Err(UnknownLiteral(other.to_string())),
        }
    }
}

/// Fixed keyword set attached to clubs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Keyword {
    Tradition,
    YouthAcademy,
    Women,
    Esports,
}

impl Keyword {
    pub const ALL: [Keyword; 4] = [
        Self::Tradition,
        Self::YouthAcademy,
        Self::Women,
        Self::Esports,
    ];

    pub const LITERALS: &'static [&'static str] =
        &["TRADITION", "YOUTH_ACADEMY", "WOMEN", "ESPORTS"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tradition => "TRADITION",
            Self::YouthAcademy => "YOUTH_ACADEMY",
            Self::Women => "WOMEN",
            Self::Esports => "ESPORTS",
        }
    }

    /// Name of the search parameter that filters on this keyword
    pub const fn search_key(&self) -> &'static str {
        match self {
            Self::Tradition => "tradition",
            Self::YouthAcademy => "youthAcademy",
            Self::Women => "women",
            Self::Esports => "esports",
        }
    }

    pub fn from_search_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.search_key() == key)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownLiteral(s.to_string()))
    }
}

/// Preferred foot of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreferredFoot {
    Left,
    Right,
    Both,
}

impl PreferredFoot {
    pub const LITERALS: &'static [&'static str] = &["LEFT", "RIGHT", "BOTH"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Both => "BOTH",
        }
    }
}

impl FromStr for PreferredFoot {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            "BOTH" => Ok(Self::Both),
            other => Err(UnknownLiteral(other.to_string())),
        }
    }
}

/// A string that names no variant of the target enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown literal \"{0}\"")]
pub struct UnknownLiteral(pub String);

/// Home stadium (one-to-one)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stadium {
    pub city: String,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
}

/// Squad member (one-to-many)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub preferred_foot: PreferredFoot,
}

/// A persisted club
///
/// `version` is the optimistic concurrency token: 0 after creation, +1 on
/// every successful update. `stadium` and `players` are only populated when
/// the caller asked for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: ClubId,
    pub version: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founding_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ClubCategory>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stadium: Option<Stadium>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Player>>,
}

/// Validated data for a new club
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClub {
    pub fields: ClubFields,
    pub stadium: Option<Stadium>,
    pub players: Vec<NewPlayer>,
}

/// Scalar club attributes written by create and update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClubFields {
    pub name: String,
    pub member_count: Option<u32>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub founding_date: Option<NaiveDate>,
    pub league: Option<String>,
    pub country: Option<String>,
    pub category: Option<ClubCategory>,
    pub keywords: Vec<Keyword>,
}

/// Validated data for a new player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub preferred_foot: PreferredFoot,
}

impl Club {
    /// Build the persisted form of freshly created club data
    pub fn from_new(id: ClubId, new: NewClub, player_ids: impl IntoIterator<Item = i64>, now: DateTime<Utc>) -> Self {
        let players = new
            .players
            .into_iter()
            .zip(player_ids)
            .map(|(player, id)| Player {
                id,
                first_name: player.first_name,
                last_name: player.last_name,
                age: player.age,
                preferred_foot: player.preferred_foot,
            })
            .collect();

        let mut club = Self {
            id,
            version: 0,
            name: String::new(),
            member_count: None,
            website: None,
            email: None,
            phone: None,
            founding_date: None,
            league: None,
            country: None,
            category: None,
            keywords: Vec::new(),
            created_at: now,
            updated_at: now,
            stadium: new.stadium,
            players: Some(players),
        };
        club.apply(new.fields);
        club
    }

    /// Overwrite the scalar attributes
    pub fn apply(&mut self, fields: ClubFields) {
        self.name = fields.name;
        self.member_count = fields.member_count;
        self.website = fields.website;
        self.email = fields.email;
        self.phone = fields.phone;
        self.founding_date = fields.founding_date;
        self.league = fields.league;
        self.country = fields.country;
        self.category = fields.category;
        self.keywords = fields.keywords;
    }

    /// Quoted entity tag for this version, e.g. `"3"`
    pub fn etag(&self) -> String {
        crate::service::version::etag(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_literals() {
        for literal in ClubCategory::LITERALS {
            let category: ClubCategory = literal.parse().unwrap();
            assert_eq!(category.as_str(), *literal);
        }
        assert!("EPUB".parse::<ClubCategory>().is_err());
    }

    #[test]
    fn test_keyword_search_keys() {
        assert_eq!(Keyword::from_search_key("youthAcademy"), Some(Keyword::YouthAcademy));
        assert_eq!(Keyword::from_search_key("YOUTH_ACADEMY"), None);
        assert_eq!("WOMEN".parse::<Keyword>().unwrap(), Keyword::Women);
    }

    #[test]
    fn test_club_serializes_camel_case_and_skips_unloaded_relations() {
        let now = Utc::now();
        let club = Club::from_new(
            7,
            NewClub {
                fields: ClubFields {
                    name: "Testverein".to_string(),
                    member_count: Some(120),
                    category: Some(ClubCategory::Amateur),
                    ..ClubFields::default()
                },
                stadium: None,
                players: Vec::new(),
            },
            std::iter::empty(),
            now,
        );
        let mut json = serde_json::to_value(&club).unwrap();
        assert_eq!(json["memberCount"], 120);
        assert_eq!(json["category"], "AMATEUR");
        assert_eq!(json["version"], 0);
        assert!(json.get("stadium").is_none());
        assert_eq!(json["players"], serde_json::json!([]));

        json.as_object_mut().unwrap().remove("players");
        let back: Club = serde_json::from_value(json).unwrap();
        assert_eq!(back.players, None);
    }
}
