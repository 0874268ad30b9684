//! Entity access service
//!
//! [`ClubService`] is the core of the crate. It owns explicit references to
//! its collaborators (the store and the predicate builder) and implements
//! find-by-id, filtered listing, create, version-guarded update and delete.
//! Transports call it after resolving the caller's permission.

mod error;
mod read;
pub mod version;
mod write;

use std::sync::Arc;

pub use error::{ServiceError, ServiceResult};

use crate::config::PaginationConfig;
use crate::repository::ClubStore;
use crate::search::PredicateBuilder;

/// Orchestrates validation, predicates, paging and the version guard
#[derive(Clone)]
pub struct ClubService {
    store: Arc<dyn ClubStore>,
    predicates: PredicateBuilder,
    pagination: PaginationConfig,
}

impl ClubService {
    pub fn new(store: Arc<dyn ClubStore>, pagination: PaginationConfig) -> Self {
        Self {
            store,
            predicates: PredicateBuilder::new(),
            pagination,
        }
    }

    /// Paging defaults and limits used by the transports
    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }
}

impl std::fmt::Debug for ClubService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClubService")
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}
