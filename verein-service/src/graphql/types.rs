//! GraphQL object and input types
//!
//! Output objects wrap the domain model and add boundary-only fields such as
//! `memberCountDisplay`. Inputs convert into the same [`SearchFilter`] and
//! [`ClubInput`] the REST handlers use, so both transports share validation.

use async_graphql::{InputObject, Object, SimpleObject, ID};
use chrono::NaiveDate;

use super::format::format_member_count;
use crate::model::{Club, ClubInput, Keyword, Player, PlayerInput, Stadium, StadiumInput};
use crate::search::SearchFilter;

/// A club as seen through GraphQL
pub struct ClubObject(Club);

impl From<Club> for ClubObject {
    fn from(club: Club) -> Self {
        Self(club)
    }
}

#[Object(name = "Club")]
impl ClubObject {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn version(&self) -> u32 {
        self.0.version
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn member_count(&self) -> Option<u32> {
        self.0.member_count
    }

    /// Member count formatted for display, `300k` or `300,000 members`
    async fn member_count_display(&self, #[graphql(default = true)] short: bool) -> Option<String> {
        self.0
            .member_count
            .map(|count| format_member_count(count, short))
    }

    async fn website(&self) -> Option<&str> {
        self.0.website.as_deref()
    }

    async fn email(&self) -> Option<&str> {
        self.0.email.as_deref()
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }

    async fn founding_date(&self) -> Option<NaiveDate> {
        self.0.founding_date
    }

    async fn league(&self) -> Option<&str> {
        self.0.league.as_deref()
    }

    async fn country(&self) -> Option<&str> {
        self.0.country.as_deref()
    }

    async fn category(&self) -> Option<&'static str> {
        self.0.category.map(|c| c.as_str())
    }

    async fn keywords(&self) -> Vec<&'static str> {
        self.0.keywords.iter().map(Keyword::as_str).collect()
    }

    async fn stadium(&self) -> Option<StadiumObject> {
        self.0.stadium.clone().map(StadiumObject::from)
    }

    /// Only populated when queried with `withPlayers: true`
    async fn players(&self) -> Option<Vec<PlayerObject>> {
        self.0
            .players
            .as_ref()
            .map(|players| players.iter().cloned().map(PlayerObject::from).collect())
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Stadium")]
pub struct StadiumObject {
    pub city: String,
    pub capacity: u32,
    pub street: Option<String>,
    pub house_number: Option<String>,
}

impl From<Stadium> for StadiumObject {
    fn from(stadium: Stadium) -> Self {
        Self {
            city: stadium.city,
            capacity: stadium.capacity,
            street: stadium.street,
            house_number: stadium.house_number,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Player")]
pub struct PlayerObject {
    pub id: ID,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub preferred_foot: String,
}

impl From<Player> for PlayerObject {
    fn from(player: Player) -> Self {
        Self {
            id: ID(player.id.to_string()),
            first_name: player.first_name,
            last_name: player.last_name,
            age: player.age,
            preferred_foot: player.preferred_foot.as_str().to_string(),
        }
    }
}

/// Search criteria; every field is optional and all given ones must match
#[derive(Debug, Clone, Default, InputObject)]
pub struct SearchInput {
    pub id: Option<ID>,
    pub name: Option<String>,
    pub founding_year: Option<i32>,
    pub member_count: Option<i32>,
    pub league: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub tradition: Option<bool>,
    pub youth_academy: Option<bool>,
    pub women: Option<bool>,
    pub esports: Option<bool>,
}

impl SearchInput {
    /// Flatten into the key/value filter shared with the REST query string
    pub fn into_filter(self) -> SearchFilter {
        let mut filter = SearchFilter::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                filter.insert(key.to_string(), value);
            }
        };

        put("id", self.id.map(|id| id.0));
        put("name", self.name);
        put("foundingYear", self.founding_year.map(|y| y.to_string()));
        put("memberCount", self.member_count.map(|m| m.to_string()));
        put("league", self.league);
        put("city", self.city);
        put("country", self.country);
        put("category", self.category);

        let flags = [
            (Keyword::Tradition, self.tradition),
            (Keyword::YouthAcademy, self.youth_academy),
            (Keyword::Women, self.women),
            (Keyword::Esports, self.esports),
        ];
        for (keyword, flag) in flags {
            put(keyword.search_key(), flag.map(|f| f.to_string()));
        }
        filter
    }
}

#[derive(Debug, Clone, Default, InputObject)]
#[graphql(name = "StadiumInput")]
pub struct StadiumData {
    pub city: Option<String>,
    pub capacity: Option<i64>,
    pub street: Option<String>,
    pub house_number: Option<String>,
}

#[derive(Debug, Clone, Default, InputObject)]
#[graphql(name = "PlayerInput")]
pub struct PlayerData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub preferred_foot: Option<String>,
}

/// Payload of the `create` mutation
#[derive(Debug, Clone, Default, InputObject)]
#[graphql(name = "ClubInput")]
pub struct CreateInput {
    pub name: Option<String>,
    pub member_count: Option<i64>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub founding_date: Option<String>,
    pub league: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    #[graphql(default)]
    pub keywords: Vec<String>,
    pub stadium: Option<StadiumData>,
    #[graphql(default)]
    pub players: Vec<PlayerData>,
}

impl From<CreateInput> for ClubInput {
    fn from(input: CreateInput) -> Self {
        Self {
            name: input.name,
            member_count: input.member_count,
            website: input.website,
            email: input.email,
            phone: input.phone,
            founding_date: input.founding_date,
            league: input.league,
            country: input.country,
            category: input.category,
            keywords: input.keywords,
            stadium: input.stadium.map(|s| StadiumInput {
                city: s.city,
                capacity: s.capacity,
                street: s.street,
                house_number: s.house_number,
            }),
            players: input
                .players
                .into_iter()
                .map(|p| PlayerInput {
                    first_name: p.first_name,
                    last_name: p.last_name,
                    age: p.age,
                    preferred_foot: p.preferred_foot,
                })
                .collect(),
        }
    }
}

/// Payload of the `update` mutation: the club fields plus id and the
/// version the caller last read
#[derive(Debug, Clone, InputObject)]
pub struct UpdateInput {
    pub id: ID,
    pub version: i32,
    #[graphql(flatten)]
    pub club: CreateInput,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CreatePayload {
    pub id: ID,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct UpdatePayload {
    pub version: u32,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct DeletePayload {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_input_uses_rest_keys() {
        let filter = SearchInput {
            name: Some("bayern".to_string()),
            member_count: Some(1000),
            youth_academy: Some(true),
            esports: Some(false),
            ..SearchInput::default()
        }
        .into_filter();

        assert_eq!(filter.len(), 4);
        assert_eq!(filter["name"], "bayern");
        assert_eq!(filter["memberCount"], "1000");
        assert_eq!(filter["youthAcademy"], "true");
        assert_eq!(filter["esports"], "false");
    }

    #[test]
    fn test_empty_search_input_is_no_filter() {
        assert!(SearchInput::default().into_filter().is_empty());
    }

    #[test]
    fn test_create_input_converts_nested_data() {
        let input = ClubInput::from(CreateInput {
            name: Some("Testverein".to_string()),
            stadium: Some(StadiumData {
                city: Some("Karlsruhe".to_string()),
                capacity: Some(30_000),
                ..StadiumData::default()
            }),
            players: vec![PlayerData {
                first_name: Some("Max".to_string()),
                age: Some(21),
                ..PlayerData::default()
            }],
            ..CreateInput::default()
        });

        assert_eq!(input.name.as_deref(), Some("Testverein"));
        assert_eq!(input.stadium.unwrap().capacity, Some(30_000));
        assert_eq!(input.players[0].age, Some(21));
    }
}
