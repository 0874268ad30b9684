//! Store-level filter predicates built from validated criteria

use chrono::NaiveDate;

use super::criteria::{year_bounds, SearchCriteria};
use crate::model::{Club, ClubCategory, ClubId, Keyword};

/// Text columns that support substring search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    League,
    Country,
    /// City of the club's stadium
    City,
}

impl TextField {
    fn value<'a>(&self, club: &'a Club) -> Option<&'a str> {
        match self {
            Self::Name => Some(club.name.as_str()),
            Self::League => club.league.as_deref(),
            Self::Country => club.country.as_deref(),
            Self::City => club.stadium.as_ref().map(|s| s.city.as_str()),
        }
    }
}

/// One condition; a [`Predicate`] is the conjunction of its conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    IdEquals(ClubId),
    /// Case-insensitive substring match
    Contains { field: TextField, needle: String },
    MemberCountAtLeast(u32),
    /// Inclusive date range
    FoundedBetween { from: NaiveDate, to: NaiveDate },
    CategoryIs(ClubCategory),
    HasKeyword(Keyword),
    LacksKeyword(Keyword),
}

impl Condition {
    fn matches(&self, club: &Club) -> bool {
        match self {
            Self::IdEquals(id) => club.id == *id,
            Self::Contains { field, needle } => field
                .value(club)
                .is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase())),
            Self::MemberCountAtLeast(min) => club.member_count.is_some_and(|n| n >= *min),
            Self::FoundedBetween { from, to } => club
                .founding_date
                .is_some_and(|date| *from <= date && date <= *to),
            Self::CategoryIs(category) => club.category == Some(*category),
            Self::HasKeyword(keyword) => club.keywords.contains(keyword),
            Self::LacksKeyword(keyword) => !club.keywords.contains(keyword),
        }
    }
}

/// Conjunction of conditions; empty means "match everything"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Matches every club
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate in memory; the club must carry its stadium for city matches
    pub fn matches(&self, club: &Club) -> bool {
        self.conditions.iter().all(|c| c.matches(club))
    }
}

/// Translates [`SearchCriteria`] into a [`Predicate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateBuilder;

impl PredicateBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, criteria: &SearchCriteria) -> Predicate {
        let mut conditions = Vec::new();

        if let Some(id) = criteria.id {
            conditions.push(Condition::IdEquals(id));
        }

        let text_fields = [
            (TextField::Name, &criteria.name),
            (TextField::League, &criteria.league),
            (TextField::Country, &criteria.country),
            (TextField::City, &criteria.city),
        ];
        for (field, value) in text_fields {
            if let Some(needle) = value {
                conditions.push(Condition::Contains {
                    field,
                    needle: needle.clone(),
                });
            }
        }

        if let Some(min) = criteria.member_count {
            conditions.push(Condition::MemberCountAtLeast(min));
        }

        // parsing already refused years without calendar bounds
        if let Some((from, to)) = criteria.founding_year.and_then(year_bounds) {
            conditions.push(Condition::FoundedBetween { from, to });
        }

        if let Some(category) = criteria.category {
            conditions.push(Condition::CategoryIs(category));
        }

        for (keyword, wanted) in &criteria.keywords {
            conditions.push(if *wanted {
                Condition::HasKeyword(*keyword)
            } else {
                Condition::LacksKeyword(*keyword)
            });
        }

        Predicate { conditions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClubFields, NewClub, Stadium};
    use crate::search::SearchFilter;
    use chrono::Utc;

    fn club(name: &str, members: u32, founded: (i32, u32, u32), city: &str) -> Club {
        Club::from_new(
            1,
            NewClub {
                fields: ClubFields {
                    name: name.to_string(),
                    member_count: Some(members),
                    founding_date: NaiveDate::from_ymd_opt(founded.0, founded.1, founded.2),
                    category: Some(ClubCategory::Professional),
                    keywords: vec![Keyword::Tradition],
                    ..ClubFields::default()
                },
                stadium: Some(Stadium {
                    city: city.to_string(),
                    capacity: 75_000,
                    street: None,
                    house_number: None,
                }),
                players: Vec::new(),
            },
            std::iter::empty(),
            Utc::now(),
        )
    }

    fn predicate(pairs: &[(&str, &str)]) -> Predicate {
        let filter: SearchFilter = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PredicateBuilder::new().build(&SearchCriteria::parse(&filter).unwrap())
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let p = PredicateBuilder::new().build(&SearchCriteria::default());
        assert!(p.is_empty());
        assert!(p.matches(&club("FC Bayern München", 1, (1900, 2, 27), "München")));
    }

    #[test]
    fn test_name_is_case_insensitive_substring() {
        let p = predicate(&[("name", "bayern")]);
        assert!(p.matches(&club("FC Bayern München", 1, (1900, 2, 27), "München")));
        assert!(!p.matches(&club("VfB Stuttgart", 1, (1893, 9, 9), "Stuttgart")));
    }

    #[test]
    fn test_member_count_is_minimum() {
        let p = predicate(&[("memberCount", "300000")]);
        assert!(p.matches(&club("A", 300_000, (1900, 1, 1), "X")));
        assert!(!p.matches(&club("A", 299_999, (1900, 1, 1), "X")));
    }

    #[test]
    fn test_founding_year_range() {
        let p = predicate(&[("foundingYear", "1900")]);
        assert!(p.matches(&club("A", 1, (1900, 1, 1), "X")));
        assert!(p.matches(&club("A", 1, (1900, 12, 31), "X")));
        assert!(!p.matches(&club("A", 1, (1901, 1, 1), "X")));
    }

    #[test]
    fn test_conditions_are_anded() {
        let p = predicate(&[("city", "münchen"), ("tradition", "true"), ("esports", "false")]);
        assert_eq!(p.conditions().len(), 3);
        assert!(p.matches(&club("A", 1, (1900, 1, 1), "München")));
        assert!(!p.matches(&club("A", 1, (1900, 1, 1), "Berlin")));

        let p = predicate(&[("tradition", "false")]);
        assert!(!p.matches(&club("A", 1, (1900, 1, 1), "München")));
    }
}
