//! Persistence for clubs
//!
//! - [`ClubStore`]: the store contract used by the service layer
//! - [`MemoryClubStore`]: map-backed store for tests and database-less runs
//! - `PostgresClubStore`: `sqlx` store (feature `database`)
//! - [`Pageable`] / [`Slice`]: page requests and results

mod error;
mod memory;
mod pagination;
#[cfg(feature = "database")]
mod postgres;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::{demo_clubs, MemoryClubStore};
pub use pagination::{Pageable, Slice};
#[cfg(feature = "database")]
pub use postgres::PostgresClubStore;
pub use traits::{ClubStore, RepositoryResult};
