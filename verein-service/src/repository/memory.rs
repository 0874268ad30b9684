//! In-memory store
//!
//! Used when no database is configured and throughout the tests. All state
//! sits behind one `tokio::sync::RwLock`; the version compare-and-set in
//! [`ClubStore::update`] happens under the write lock, which gives the same
//! single-winner guarantee as the conditional `UPDATE` of the SQL store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use tokio::sync::RwLock;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{ClubStore, RepositoryResult};
use crate::model::{
    Club, ClubCategory, ClubFields, ClubId, Keyword, NewClub, Player, PreferredFoot, Relations,
    Stadium,
};
use crate::search::Predicate;
use crate::service::version::next_version;

#[derive(Debug, Default)]
struct State {
    clubs: BTreeMap<ClubId, Club>,
    next_club_id: ClubId,
    next_player_id: i64,
}

/// Store keeping every club fully loaded in a map
#[derive(Debug)]
pub struct MemoryClubStore {
    state: RwLock<State>,
}

impl Default for MemoryClubStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClubStore {
    pub fn new() -> Self {
        Self::with_clubs(Vec::new())
    }

    /// Start with existing clubs, keeping their ids and versions
    pub fn with_clubs(clubs: Vec<Club>) -> Self {
        let next_club_id = clubs.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let next_player_id = clubs
            .iter()
            .flat_map(|c| c.players.iter().flatten())
            .map(|p| p.id)
            .max()
            .unwrap_or(0)
            + 1;
        let clubs = clubs
            .into_iter()
            .map(|mut club| {
                club.players.get_or_insert_with(Vec::new);
                (club.id, club)
            })
            .collect();

        Self {
            state: RwLock::new(State {
                clubs,
                next_club_id,
                next_player_id,
            }),
        }
    }

    /// Store seeded with [`demo_clubs`]
    pub fn with_demo_data() -> Self {
        Self::with_clubs(demo_clubs())
    }
}

/// Copy a stored club, keeping only the requested relations
fn project(club: &Club, relations: Relations) -> Club {
    let mut copy = club.clone();
    if !relations.stadium() {
        copy.stadium = None;
    }
    if !relations.players() {
        copy.players = None;
    }
    copy
}

fn name_taken(state: &State, name: &str, exclude: Option<ClubId>) -> bool {
    state
        .clubs
        .values()
        .any(|c| c.name == name && Some(c.id) != exclude)
}

#[async_trait]
impl ClubStore for MemoryClubStore {
    async fn find_by_id(&self, id: ClubId, relations: Relations) -> RepositoryResult<Option<Club>> {
        let state = self.state.read().await;
        Ok(state.clubs.get(&id).map(|c| project(c, relations)))
    }

    async fn find_many(
        &self,
        predicate: &Predicate,
        skip: u64,
        take: u64,
        relations: Relations,
    ) -> RepositoryResult<Vec<Club>> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(usize::MAX);
        let state = self.state.read().await;
        Ok(state
            .clubs
            .values()
            .filter(|c| predicate.matches(c))
            .skip(skip)
            .take(take)
            .map(|c| project(c, relations))
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> RepositoryResult<u64> {
        let state = self.state.read().await;
        Ok(state.clubs.values().filter(|c| predicate.matches(c)).count() as u64)
    }

    async fn name_exists(&self, name: &str, exclude: Option<ClubId>) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(name_taken(&state, name, exclude))
    }

    async fn create(&self, club: NewClub) -> RepositoryResult<Club> {
        let mut state = self.state.write().await;
        if name_taken(&state, &club.fields.name, None) {
            return Err(RepositoryError::already_exists(club.fields.name));
        }

        let id = state.next_club_id;
        state.next_club_id += 1;
        let first_player_id = state.next_player_id;
        state.next_player_id += club.players.len() as i64;

        let created = Club::from_new(id, club, first_player_id.., Utc::now());
        state.clubs.insert(id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: ClubId,
        expected_version: u32,
        fields: ClubFields,
    ) -> RepositoryResult<Option<Club>> {
        let mut state = self.state.write().await;
        if name_taken(&state, &fields.name, Some(id)) {
            return Err(RepositoryError::already_exists(fields.name)
                .with_operation(RepositoryOperation::Update));
        }

        let Some(club) = state.clubs.get_mut(&id) else {
            return Ok(None);
        };
        if club.version != expected_version {
            return Ok(None);
        }
        let Some(version) = next_version(club.version) else {
            return Err(RepositoryError::version_exhausted(id.to_string()));
        };

        club.apply(fields);
        club.version = version;
        club.updated_at = Utc::now();
        Ok(Some(project(club, Relations::Stadium)))
    }

    async fn delete(&self, id: ClubId) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.clubs.remove(&id).is_some())
    }
}

/// Sample catalog served by the in-memory backend
pub fn demo_clubs() -> Vec<Club> {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);

    let club = |id: ClubId,
                version: u32,
                name: &str,
                members: u32,
                founded: (i32, u32, u32),
                category: ClubCategory,
                keywords: Vec<Keyword>,
                stadium: Stadium,
                players: Vec<Player>| Club {
        id,
        version,
        name: name.to_string(),
        member_count: Some(members),
        website: None,
        email: None,
        phone: None,
        founding_date: NaiveDate::from_ymd_opt(founded.0, founded.1, founded.2),
        league: Some(
            match category {
                ClubCategory::Professional => "Bundesliga",
                ClubCategory::Amateur => "Oberliga",
                ClubCategory::Youth => "Jugendliga",
            }
            .to_string(),
        ),
        country: Some("Deutschland".to_string()),
        category: Some(category),
        keywords,
        created_at: created,
        updated_at: created,
        stadium: Some(stadium),
        players: Some(players),
    };
    let stadium = |city: &str, capacity: u32, street: &str, house_number: &str| Stadium {
        city: city.to_string(),
        capacity,
        street: Some(street.to_string()),
        house_number: Some(house_number.to_string()),
    };
    let player = |id: i64, first: &str, last: &str, age: u32, foot: PreferredFoot| Player {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        age,
        preferred_foot: foot,
    };

    let mut bayern = club(
        1,
        1,
        "FC Bayern München",
        300_000,
        (1900, 2, 27),
        ClubCategory::Professional,
        vec![Keyword::Tradition, Keyword::YouthAcademy, Keyword::Women],
        stadium("München", 75_024, "Werner-Heisenberg-Allee", "25"),
        vec![
            player(1, "Manuel", "Neuer", 38, PreferredFoot::Right),
            player(2, "Thomas", "Müller", 35, PreferredFoot::Right),
        ],
    );
    bayern.website = Some("https://fcbayern.com".to_string());
    bayern.email = Some("service@fcbayern.com".to_string());
    bayern.phone = Some("+49-89-699310".to_string());

    vec![
        bayern,
        club(
            20,
            0,
            "Borussia Dortmund",
            220_000,
            (1909, 12, 19),
            ClubCategory::Professional,
            vec![Keyword::Tradition, Keyword::YouthAcademy, Keyword::Esports],
            stadium("Dortmund", 81_365, "Strobelallee", "50"),
            vec![player(3, "Julian", "Brandt", 28, PreferredFoot::Right)],
        ),
        club(
            30,
            0,
            "VfB Stuttgart",
            100_000,
            (1893, 9, 9),
            ClubCategory::Professional,
            vec![Keyword::Tradition],
            stadium("Stuttgart", 60_449, "Mercedesstraße", "87"),
            Vec::new(),
        ),
        club(
            40,
            0,
            "Karlsruher SC",
            15_000,
            (1894, 6, 6),
            ClubCategory::Professional,
            vec![Keyword::Tradition, Keyword::YouthAcademy],
            stadium("Karlsruhe", 34_302, "Adenauerring", "17"),
            Vec::new(),
        ),
        club(
            50,
            0,
            "FC Bayern Alzenau",
            800,
            (1920, 5, 1),
            ClubCategory::Amateur,
            vec![Keyword::Women],
            stadium("Alzenau", 5_000, "Am Prischoß", "1"),
            Vec::new(),
        ),
        club(
            60,
            0,
            "SC Freiburg",
            55_000,
            (1904, 5, 30),
            ClubCategory::Professional,
            vec![Keyword::YouthAcademy, Keyword::Women],
            stadium("Freiburg", 34_700, "Achim-Stocker-Straße", "1"),
            Vec::new(),
        ),
    ]
}
