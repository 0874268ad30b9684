//! Read path

use super::{ClubService, ServiceError, ServiceResult};
use crate::model::{Club, ClubId, ClubInclude};
use crate::repository::{Pageable, Slice};
use crate::search::{SearchCriteria, SearchFilter};

impl ClubService {
    /// Load one club with the requested relations
    pub async fn find_by_id(&self, id: ClubId, include: ClubInclude) -> ServiceResult<Club> {
        tracing::debug!(id, ?include, "Finding club by id");
        match self.store.find_by_id(id, include.resolve()).await? {
            Some(club) => {
                tracing::debug!(id, version = club.version, "Club found");
                Ok(club)
            }
            None => {
                tracing::debug!(id, "No club with this id");
                Err(ServiceError::NotFound { id })
            }
        }
    }

    /// List the clubs matching `filter` on the requested page
    ///
    /// The filter is validated completely before any query runs. An empty
    /// filter lists everything. An empty page is reported as
    /// [`ServiceError::NoResults`] carrying the filter and page number.
    pub async fn find(&self, filter: &SearchFilter, pageable: Pageable) -> ServiceResult<Slice<Club>> {
        tracing::debug!(?filter, page = pageable.number, size = pageable.size, "Finding clubs");

        let criteria = SearchCriteria::parse(filter).map_err(|errors| {
            tracing::warn!(?filter, %errors, "Rejected invalid search parameters");
            ServiceError::ValidationFailed(errors)
        })?;
        let predicate = self.predicates.build(&criteria);
        let relations = ClubInclude::STADIUM.resolve();

        let (content, total_elements) = futures::try_join!(
            self.store
                .find_many(&predicate, pageable.skip(), pageable.take(), relations),
            self.store.count(&predicate),
        )?;

        if content.is_empty() {
            tracing::debug!(?filter, page = pageable.number, "No clubs found");
            return Err(ServiceError::NoResults {
                filter: filter.clone(),
                page: pageable.number,
            });
        }

        tracing::debug!(
            count = content.len(),
            total_elements,
            "Clubs found"
        );
        Ok(Slice::new(content, total_elements, pageable))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::PaginationConfig;
    use crate::model::{ClubFields, NewClub, Relations};
    use crate::repository::{ClubStore, MemoryClubStore, RepositoryResult};
    use crate::search::Predicate;

    /// Memory store that records how often the listing queries run
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryClubStore,
        find_many_calls: AtomicUsize,
        count_calls: AtomicUsize,
    }

    #[async_trait]
    impl ClubStore for CountingStore {
        async fn find_by_id(&self, id: ClubId, relations: Relations) -> RepositoryResult<Option<Club>> {
            self.inner.find_by_id(id, relations).await
        }

        async fn find_many(
            &self,
            predicate: &Predicate,
            skip: u64,
            take: u64,
            relations: Relations,
        ) -> RepositoryResult<Vec<Club>> {
            self.find_many_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_many(predicate, skip, take, relations).await
        }

        async fn count(&self, predicate: &Predicate) -> RepositoryResult<u64> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.count(predicate).await
        }

        async fn name_exists(&self, name: &str, exclude: Option<ClubId>) -> RepositoryResult<bool> {
            self.inner.name_exists(name, exclude).await
        }

        async fn create(&self, club: NewClub) -> RepositoryResult<Club> {
            self.inner.create(club).await
        }

        async fn update(
            &self,
            id: ClubId,
            expected_version: u32,
            fields: ClubFields,
        ) -> RepositoryResult<Option<Club>> {
            self.inner.update(id, expected_version, fields).await
        }

        async fn delete(&self, id: ClubId) -> RepositoryResult<bool> {
            self.inner.delete(id).await
        }
    }

    fn service() -> ClubService {
        ClubService::new(
            Arc::new(MemoryClubStore::with_demo_data()),
            PaginationConfig::default(),
        )
    }

    fn filter(pairs: &[(&str, &str)]) -> SearchFilter {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_find_by_id_with_players() {
        let club = service()
            .find_by_id(1, ClubInclude::ALL)
            .await
            .unwrap();
        assert_eq!(club.version, 1);
        assert_eq!(club.players.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        assert!(matches!(
            service().find_by_id(999, ClubInclude::STADIUM).await,
            Err(ServiceError::NotFound { id: 999 })
        ));
    }

    #[tokio::test]
    async fn test_find_by_name_is_case_insensitive() {
        let slice = service()
            .find(&filter(&[("name", "bayern")]), Pageable::new(0, 5))
            .await
            .unwrap();
        assert_eq!(slice.total_elements, 2);
        assert!(slice
            .content
            .iter()
            .all(|c| c.name.to_lowercase().contains("bayern")));
        assert!(slice.content.iter().all(|c| c.stadium.is_some()));
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected_before_query() {
        assert!(matches!(
            service().find(&filter(&[("foo", "bar")]), Pageable::new(0, 5)).await,
            Err(ServiceError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_filter_never_reaches_the_store() {
        let store = Arc::new(CountingStore::default());
        let svc = ClubService::new(store.clone(), PaginationConfig::default());

        for bad in [
            filter(&[("foo", "bar")]),
            filter(&[("name", "bayern"), ("category", "EPUB")]),
            filter(&[("foundingYear", "2147483647")]),
        ] {
            assert!(matches!(
                svc.find(&bad, Pageable::new(0, 5)).await,
                Err(ServiceError::ValidationFailed(_))
            ));
        }
        assert_eq!(store.find_many_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 0);

        svc.find(&SearchFilter::new(), Pageable::new(0, 5))
            .await
            .unwrap_err();
        assert_eq!(store.find_many_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_results_carries_filter_and_page() {
        match service()
            .find(&filter(&[("name", "xyz")]), Pageable::new(2, 5))
            .await
        {
            Err(ServiceError::NoResults { filter, page }) => {
                assert_eq!(filter.get("name").map(String::as_str), Some("xyz"));
                assert_eq!(page, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unfiltered_paging() {
        let svc = service();
        let first = svc.find(&SearchFilter::new(), Pageable::new(0, 4)).await.unwrap();
        assert_eq!(first.content.len(), 4);
        assert_eq!(first.total_elements, 6);
        assert_eq!(first.total_pages(), 2);

        let second = svc.find(&SearchFilter::new(), Pageable::new(1, 4)).await.unwrap();
        assert_eq!(second.content.len(), 2);

        assert!(matches!(
            svc.find(&SearchFilter::new(), Pageable::new(2, 4)).await,
            Err(ServiceError::NoResults { page: 2, .. })
        ));
    }
}
