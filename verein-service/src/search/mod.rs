//! Search pipeline: raw filter → [`SearchCriteria`] → [`Predicate`]

mod criteria;
mod predicate;

pub use criteria::{is_allowed_key, SearchCriteria, SearchFilter, SEARCH_KEYS};
pub use predicate::{Condition, Predicate, PredicateBuilder, TextField};
