//! Store trait
//!
//! [`ClubStore`] is the only way the service layer touches persistence. It is
//! object safe so that the backend can be chosen at startup and shared as an
//! `Arc<dyn ClubStore>`.

use async_trait::async_trait;

use super::error::RepositoryError;
use crate::model::{Club, ClubFields, ClubId, NewClub, Relations};
use crate::search::Predicate;

/// Result type for store operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Persistence for the club aggregate
///
/// Implementations must make [`update`](ClubStore::update) a compare-and-set
/// on the version: of two concurrent calls with the same expected version,
/// exactly one may succeed.
#[async_trait]
pub trait ClubStore: Send + Sync {
    /// Load one club with the requested relations
    ///
    /// Returns `Ok(None)` when no club has this id.
    async fn find_by_id(&self, id: ClubId, relations: Relations) -> RepositoryResult<Option<Club>>;

    /// Load the clubs matching `predicate`, ordered by id, bounded by
    /// `skip`/`take`
    async fn find_many(
        &self,
        predicate: &Predicate,
        skip: u64,
        take: u64,
        relations: Relations,
    ) -> RepositoryResult<Vec<Club>>;

    /// Count every club matching `predicate`, ignoring paging
    async fn count(&self, predicate: &Predicate) -> RepositoryResult<u64>;

    /// Whether a club other than `exclude` carries this name
    async fn name_exists(&self, name: &str, exclude: Option<ClubId>) -> RepositoryResult<bool>;

    /// Persist a new club with version 0 and return it with stadium and players
    ///
    /// A name collision is reported as
    /// [`RepositoryErrorKind::AlreadyExists`](super::RepositoryErrorKind::AlreadyExists).
    async fn create(&self, club: NewClub) -> RepositoryResult<Club>;

    /// Overwrite the scalar attributes if the stored version still equals
    /// `expected_version`, bumping the version by one
    ///
    /// Returns `Ok(None)` if the club is gone or its version moved on.
    async fn update(
        &self,
        id: ClubId,
        expected_version: u32,
        fields: ClubFields,
    ) -> RepositoryResult<Option<Club>>;

    /// Remove a club with its stadium and players
    ///
    /// Returns whether something was deleted.
    async fn delete(&self, id: ClubId) -> RepositoryResult<bool>;
}
