//! PostgreSQL store
//!
//! Queries are built at runtime; search predicates are pushed into a
//! [`QueryBuilder`] with every value bound as a parameter. Relations are
//! loaded in one extra query per relation for the whole result set.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{ClubStore, RepositoryResult};
use crate::model::{
    Club, ClubCategory, ClubFields, ClubId, Keyword, NewClub, Player, PreferredFoot, Relations,
    Stadium,
};
use crate::search::{Condition, Predicate, TextField};
use crate::service::version::next_version;

const CLUB_COLUMNS: &str = "club.id, club.version, club.name, club.member_count, club.website, \
    club.email, club.phone, club.founding_date, club.league, club.country, club.category, \
    club.keywords, club.created_at, club.updated_at";

const FROM_CLUB: &str = " FROM club LEFT JOIN stadium ON stadium.club_id = club.id";

#[derive(Debug, sqlx::FromRow)]
struct ClubRow {
    id: i64,
    version: i32,
    name: String,
    member_count: Option<i64>,
    website: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    founding_date: Option<NaiveDate>,
    league: Option<String>,
    country: Option<String>,
    category: Option<String>,
    keywords: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct StadiumRow {
    club_id: i64,
    city: String,
    capacity: i32,
    street: Option<String>,
    house_number: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct PlayerRow {
    id: i64,
    club_id: i64,
    first_name: String,
    last_name: String,
    age: i32,
    preferred_foot: String,
}

/// Expected version as bound in the conditional `UPDATE`
///
/// The column is an `INTEGER`, so the bumped version has to fit an `i32`.
fn version_for_update(expected: u32) -> Option<i32> {
    next_version(expected)
        .and_then(|next| i32::try_from(next).ok())
        .map(|next| next - 1)
}

fn decode_error(operation: RepositoryOperation, what: &str, value: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::serialization_error(operation, format!("invalid {what} in database: {value}"))
}

impl ClubRow {
    fn into_club(self, operation: RepositoryOperation) -> RepositoryResult<Club> {
        let version =
            u32::try_from(self.version).map_err(|_| decode_error(operation, "version", self.version))?;
        let member_count = self
            .member_count
            .map(|n| u32::try_from(n).map_err(|_| decode_error(operation, "member_count", n)))
            .transpose()?;
        let category = self
            .category
            .map(|c| c.parse::<ClubCategory>().map_err(|_| decode_error(operation, "category", &c)))
            .transpose()?;
        let keywords = self
            .keywords
            .iter()
            .map(|k| k.parse::<Keyword>().map_err(|_| decode_error(operation, "keyword", k)))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Club {
            id: self.id,
            version,
            name: self.name,
            member_count,
            website: self.website,
            email: self.email,
            phone: self.phone,
            founding_date: self.founding_date,
            league: self.league,
            country: self.country,
            category,
            keywords,
            created_at: self.created_at,
            updated_at: self.updated_at,
            stadium: None,
            players: None,
        })
    }
}

impl StadiumRow {
    fn into_stadium(self) -> RepositoryResult<Stadium> {
        let capacity = u32::try_from(self.capacity).map_err(|_| {
            decode_error(RepositoryOperation::BatchLoad, "capacity", self.capacity)
        })?;
        Ok(Stadium {
            city: self.city,
            capacity,
            street: self.street,
            house_number: self.house_number,
        })
    }
}

impl PlayerRow {
    fn into_player(self) -> RepositoryResult<Player> {
        let preferred_foot = self.preferred_foot.parse::<PreferredFoot>().map_err(|_| {
            decode_error(RepositoryOperation::BatchLoad, "preferred_foot", &self.preferred_foot)
        })?;
        let age = u32::try_from(self.age)
            .map_err(|_| decode_error(RepositoryOperation::BatchLoad, "age", self.age))?;
        Ok(Player {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            age,
            preferred_foot,
        })
    }
}

/// Escape `LIKE` metacharacters and wrap in `%`
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn text_column(field: TextField) -> &'static str {
    match field {
        TextField::Name => "club.name",
        TextField::League => "club.league",
        TextField::Country => "club.country",
        TextField::City => "stadium.city",
    }
}

/// Append `WHERE ... AND ...` for every condition
fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    for (index, condition) in predicate.conditions().iter().enumerate() {
        qb.push(if index == 0 { " WHERE " } else { " AND " });
        match condition {
            Condition::IdEquals(id) => {
                qb.push("club.id = ").push_bind(*id);
            }
            Condition::Contains { field, needle } => {
                qb.push(text_column(*field))
                    .push(" ILIKE ")
                    .push_bind(like_pattern(needle));
            }
            Condition::MemberCountAtLeast(min) => {
                qb.push("club.member_count >= ").push_bind(i64::from(*min));
            }
            Condition::FoundedBetween { from, to } => {
                qb.push("club.founding_date BETWEEN ")
                    .push_bind(*from)
                    .push(" AND ")
                    .push_bind(*to);
            }
            Condition::CategoryIs(category) => {
                qb.push("club.category = ").push_bind(category.as_str());
            }
            Condition::HasKeyword(keyword) => {
                qb.push_bind(keyword.as_str()).push(" = ANY(club.keywords)");
            }
            Condition::LacksKeyword(keyword) => {
                qb.push("NOT (")
                    .push_bind(keyword.as_str())
                    .push(" = ANY(club.keywords))");
            }
        }
    }
}

fn keyword_literals(fields: &ClubFields) -> Vec<String> {
    fields.keywords.iter().map(|k| k.as_str().to_string()).collect()
}

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PostgresClubStore {
    pool: PgPool,
}

impl PostgresClubStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attach the requested relations to a batch of club rows
    async fn load_relations(
        &self,
        rows: Vec<ClubRow>,
        relations: Relations,
        operation: RepositoryOperation,
    ) -> RepositoryResult<Vec<Club>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let batch_err = |e| RepositoryError::from_sqlx(RepositoryOperation::BatchLoad, e);

        let mut stadiums: HashMap<i64, Stadium> = HashMap::new();
        if relations.stadium() && !ids.is_empty() {
            let stadium_rows: Vec<StadiumRow> = sqlx::query_as(
                "SELECT club_id, city, capacity, street, house_number \
                 FROM stadium WHERE club_id = ANY($1)",
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(batch_err)?;
            stadiums = stadium_rows
                .into_iter()
                .map(|row| Ok((row.club_id, row.into_stadium()?)))
                .collect::<RepositoryResult<_>>()?;
        }

        let mut players: HashMap<i64, Vec<Player>> = HashMap::new();
        if relations.players() && !ids.is_empty() {
            let player_rows: Vec<PlayerRow> = sqlx::query_as(
                "SELECT id, club_id, first_name, last_name, age, preferred_foot \
                 FROM player WHERE club_id = ANY($1) ORDER BY id",
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(batch_err)?;
            for row in player_rows {
                let club_id = row.club_id;
                players.entry(club_id).or_default().push(row.into_player()?);
            }
        }

        rows.into_iter()
            .map(|row| {
                let mut club = row.into_club(operation)?;
                if relations.stadium() {
                    club.stadium = stadiums.remove(&club.id);
                }
                if relations.players() {
                    club.players = Some(players.remove(&club.id).unwrap_or_default());
                }
                Ok(club)
            })
            .collect()
    }
}

#[async_trait]
impl ClubStore for PostgresClubStore {
    async fn find_by_id(&self, id: ClubId, relations: Relations) -> RepositoryResult<Option<Club>> {
        let row: Option<ClubRow> =
            sqlx::query_as(&format!("SELECT {CLUB_COLUMNS} FROM club WHERE club.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::FindById, e))?;

        match row {
            Some(row) => Ok(self
                .load_relations(vec![row], relations, RepositoryOperation::FindById)
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn find_many(
        &self,
        predicate: &Predicate,
        skip: u64,
        take: u64,
        relations: Relations,
    ) -> RepositoryResult<Vec<Club>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {CLUB_COLUMNS}{FROM_CLUB}"));
        push_predicate(&mut qb, predicate);
        qb.push(" ORDER BY club.id LIMIT ")
            .push_bind(i64::try_from(take).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(skip).unwrap_or(i64::MAX));

        let rows: Vec<ClubRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::FindMany, e))?;

        self.load_relations(rows, relations, RepositoryOperation::FindMany)
            .await
    }

    async fn count(&self, predicate: &Predicate) -> RepositoryResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*){FROM_CLUB}"));
        push_predicate(&mut qb, predicate);

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Count, e))?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn name_exists(&self, name: &str, exclude: Option<ClubId>) -> RepositoryResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM club WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::NameExists, e))
    }

    async fn create(&self, club: NewClub) -> RepositoryResult<Club> {
        let op = RepositoryOperation::Create;
        let name = club.fields.name.clone();
        let map_err = |e: sqlx::Error| {
            let error = RepositoryError::from_sqlx(op, e);
            if error.kind == super::RepositoryErrorKind::AlreadyExists {
                RepositoryError::already_exists(name.clone())
            } else {
                error
            }
        };

        let mut tx = self.pool.begin().await.map_err(map_err)?;

        let fields = &club.fields;
        let row: ClubRow = sqlx::query_as(&format!(
            "INSERT INTO club (version, name, member_count, website, email, phone, founding_date, \
             league, country, category, keywords) \
             VALUES (0, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {CLUB_COLUMNS}"
        ))
        .bind(&fields.name)
        .bind(fields.member_count.map(i64::from))
        .bind(&fields.website)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.founding_date)
        .bind(&fields.league)
        .bind(&fields.country)
        .bind(fields.category.map(|c| c.as_str()))
        .bind(keyword_literals(fields))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_err)?;
        let mut created = row.into_club(op)?;

        if let Some(stadium) = &club.stadium {
            sqlx::query(
                "INSERT INTO stadium (club_id, city, capacity, street, house_number) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(created.id)
            .bind(&stadium.city)
            .bind(i32::try_from(stadium.capacity).unwrap_or(i32::MAX))
            .bind(&stadium.street)
            .bind(&stadium.house_number)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        }

        let mut players = Vec::with_capacity(club.players.len());
        if !club.players.is_empty() {
            let mut qb = QueryBuilder::<Postgres>::new(
                "INSERT INTO player (club_id, first_name, last_name, age, preferred_foot) ",
            );
            qb.push_values(&club.players, |mut b, player| {
                b.push_bind(created.id)
                    .push_bind(player.first_name.clone())
                    .push_bind(player.last_name.clone())
                    .push_bind(i32::try_from(player.age).unwrap_or(i32::MAX))
                    .push_bind(player.preferred_foot.as_str());
            });
            qb.push(" RETURNING id, club_id, first_name, last_name, age, preferred_foot");
            let rows: Vec<PlayerRow> = qb
                .build_query_as()
                .fetch_all(&mut *tx)
                .await
                .map_err(map_err)?;
            for row in rows {
                players.push(row.into_player()?);
            }
            players.sort_by_key(|p| p.id);
        }

        tx.commit().await.map_err(map_err)?;

        created.stadium = club.stadium;
        created.players = Some(players);
        Ok(created)
    }

    async fn update(
        &self,
        id: ClubId,
        expected_version: u32,
        fields: ClubFields,
    ) -> RepositoryResult<Option<Club>> {
        let op = RepositoryOperation::Update;
        let Some(expected) = version_for_update(expected_version) else {
            return Err(RepositoryError::version_exhausted(id.to_string()));
        };
        let row: Option<ClubRow> = sqlx::query_as(&format!(
            "UPDATE club SET name = $3, member_count = $4, website = $5, email = $6, phone = $7, \
             founding_date = $8, league = $9, country = $10, category = $11, keywords = $12, \
             version = version + 1, updated_at = now() \
             WHERE id = $1 AND version = $2 RETURNING {CLUB_COLUMNS}"
        ))
        .bind(id)
        .bind(expected)
        .bind(&fields.name)
        .bind(fields.member_count.map(i64::from))
        .bind(&fields.website)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.founding_date)
        .bind(&fields.league)
        .bind(&fields.country)
        .bind(fields.category.map(|c| c.as_str()))
        .bind(keyword_literals(&fields))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            let error = RepositoryError::from_sqlx(op, e);
            if error.kind == super::RepositoryErrorKind::AlreadyExists {
                RepositoryError::already_exists(fields.name.clone()).with_operation(op)
            } else {
                error
            }
        })?;

        match row {
            Some(row) => Ok(self
                .load_relations(vec![row], Relations::Stadium, op)
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: ClubId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM club WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Delete, e))?;
        Ok(result.rows_affected() > 0)
    }
}
