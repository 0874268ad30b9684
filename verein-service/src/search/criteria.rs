//! Search-parameter validation
//!
//! Raw filter maps come straight from the query string or the GraphQL
//! `SearchInput`. [`SearchCriteria::parse`] checks every key against the
//! allow-list and every value against its field type, collecting all
//! violations before anything reaches the store.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{ClubCategory, ClubId, Keyword};
use crate::validation::ValidationErrors;

/// Flat key → value filter as supplied by a caller
pub type SearchFilter = BTreeMap<String, String>;

/// Scalar search keys; the keyword keys come from [`Keyword::search_key`]
pub const SEARCH_KEYS: &[&str] = &[
    "id",
    "name",
    "foundingYear",
    "memberCount",
    "league",
    "city",
    "country",
    "category",
];

/// Whether `key` belongs to the allow-list
pub fn is_allowed_key(key: &str) -> bool {
    SEARCH_KEYS.contains(&key) || Keyword::from_search_key(key).is_some()
}

/// Validated, typed search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub id: Option<ClubId>,
    pub name: Option<String>,
    pub founding_year: Option<i32>,
    pub member_count: Option<u32>,
    pub league: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub category: Option<ClubCategory>,
    /// `true` requires the keyword, `false` excludes it
    pub keywords: BTreeMap<Keyword, bool>,
}

impl SearchCriteria {
    /// Validate a raw filter map
    ///
    /// An empty map yields empty criteria, which callers treat as the
    /// unfiltered listing.
    pub fn parse(filter: &SearchFilter) -> Result<Self, ValidationErrors> {
        let mut criteria = Self::default();
        let mut errors = ValidationErrors::new();

        for (key, raw) in filter {
            let value = raw.trim();
            match key.as_str() {
                "id" => criteria.id = parse_number(key, value, &mut errors),
                "foundingYear" => {
                    criteria.founding_year = parse_number(key, value, &mut errors).and_then(|year| {
                        if year_bounds(year).is_none() {
                            errors.push(key.as_str(), "is not a valid year");
                            return None;
                        }
                        Some(year)
                    });
                }
                "memberCount" => criteria.member_count = parse_number(key, value, &mut errors),
                "name" => criteria.name = Some(value.to_string()),
                "league" => criteria.league = Some(value.to_string()),
                "city" => criteria.city = Some(value.to_string()),
                "country" => criteria.country = Some(value.to_string()),
                "category" => match value.parse() {
                    Ok(category) => criteria.category = Some(category),
                    Err(_) => errors.push(
                        key.as_str(),
                        format!("must be one of {}", ClubCategory::LITERALS.join(", ")),
                    ),
                },
                other => match Keyword::from_search_key(other) {
                    Some(keyword) => match value {
                        "true" => {
                            criteria.keywords.insert(keyword, true);
                        }
                        "false" => {
                            criteria.keywords.insert(keyword, false);
                        }
                        _ => errors.push(key.as_str(), "must be true or false"),
                    },
                    None => errors.push(key.as_str(), "is not a valid search parameter"),
                },
            }
        }

        errors.into_result().map(|()| criteria)
    }

    /// No condition at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// First and last day of a calendar year, if the date type can hold both
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

fn parse_number<T>(key: &str, value: &str, errors: &mut ValidationErrors) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(number) if number >= T::default() => Some(number),
        _ => {
            errors.push(key, "must be a non-negative integer");
            None
        }
    }
}
