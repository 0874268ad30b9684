//! Write path: create, version-guarded update, delete

use super::version::{self, check_precondition};
use super::{ClubService, ServiceError, ServiceResult};
use crate::model::{Club, ClubId, ClubInput, Relations};
use crate::repository::{RepositoryError, RepositoryErrorKind};

fn name_conflict(error: RepositoryError, name: &str) -> ServiceError {
    if error.kind == RepositoryErrorKind::AlreadyExists {
        ServiceError::NameExists {
            name: name.to_string(),
        }
    } else {
        tracing::error!(
            operation = %error.operation,
            kind = %error.kind,
            error = %error.message,
            "Store write failed"
        );
        ServiceError::Repository(error)
    }
}

impl ClubService {
    /// Validate and persist a new club at version 0
    pub async fn create(&self, input: ClubInput) -> ServiceResult<Club> {
        let new_club = input.into_new_club().map_err(|errors| {
            tracing::warn!(%errors, "Rejected invalid club");
            ServiceError::ValidationFailed(errors)
        })?;
        let name = new_club.fields.name.clone();
        tracing::debug!(name = %name, "Creating club");

        if self.store.name_exists(&name, None).await? {
            tracing::warn!(name = %name, "Club name already taken");
            return Err(ServiceError::NameExists { name });
        }

        // the store re-checks uniqueness for a concurrent create
        let club = self
            .store
            .create(new_club)
            .await
            .map_err(|e| name_conflict(e, &name))?;

        tracing::info!(id = club.id, name = %club.name, "Club created");
        Ok(club)
    }

    /// Overwrite the scalar attributes of a club, guarded by `token`
    ///
    /// `token` is the caller's version tag (`"<version>"`). Returns the
    /// updated club carrying the new version.
    pub async fn update(&self, id: ClubId, input: ClubInput, token: Option<&str>) -> ServiceResult<Club> {
        let fields = input.into_fields().map_err(|errors| {
            tracing::warn!(id, %errors, "Rejected invalid club update");
            ServiceError::ValidationFailed(errors)
        })?;
        let Some(token) = token else {
            tracing::warn!(id, "Update without version token");
            return Err(ServiceError::PreconditionRequired);
        };

        let persisted = self
            .store
            .find_by_id(id, Relations::None)
            .await?
            .map(|club| club.version);
        let expected = check_precondition(id, Some(token), persisted).inspect_err(|e| {
            tracing::warn!(id, token, ?persisted, error = %e, "Version check failed");
        })?;

        let name = fields.name.clone();
        if self.store.name_exists(&name, Some(id)).await? {
            tracing::warn!(id, name = %name, "Club name already taken");
            return Err(ServiceError::NameExists { name });
        }

        tracing::debug!(id, expected, "Updating club");
        match self
            .store
            .update(id, expected, fields)
            .await
            .map_err(|e| name_conflict(e, &name))?
        {
            Some(club) => {
                tracing::info!(id, version = club.version, "Club updated");
                Ok(club)
            }
            // lost the race after the check: gone or moved on
            None => match self.store.find_by_id(id, Relations::None).await? {
                None => Err(ServiceError::NotFound { id }),
                Some(current) => {
                    tracing::warn!(
                        id,
                        token,
                        current = %version::etag(current.version),
                        "Concurrent update won the race"
                    );
                    Err(ServiceError::VersionOutdated {
                        version: token.to_string(),
                    })
                }
            },
        }
    }

    /// Remove a club; removing an absent club succeeds as well
    pub async fn delete(&self, id: ClubId) -> ServiceResult<()> {
        let removed = self.store.delete(id).await?;
        tracing::info!(id, removed, "Club deleted");
        Ok(())
    }
}
