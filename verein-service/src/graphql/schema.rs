//! Query and mutation roots

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Object, Result, Schema, ID};

use super::types::{
    ClubObject, CreateInput, CreatePayload, DeletePayload, SearchInput, UpdateInput,
    UpdatePayload,
};
use crate::auth::{authorize, Action, Identity};
use crate::model::{ClubId, ClubInclude, ClubInput};
use crate::repository::{Pageable, RepositoryErrorKind};
use crate::service::version::etag;
use crate::service::{ClubService, ServiceError};
use crate::validation::ValidationErrors;

/// Executable schema served at `/graphql`
pub type ClubSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around a service instance
pub fn build_schema(service: ClubService) -> ClubSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            // don't expose internal details
            ServiceError::Repository(err)
                if !matches!(err.kind, RepositoryErrorKind::AlreadyExists) =>
            {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        async_graphql::Error::new(message).extend_with(|_, extensions| {
            extensions.set("code", self.code());
            if let ServiceError::ValidationFailed(errors) = self {
                let violations = serde_json::to_value(errors.violations())
                    .ok()
                    .and_then(|json| async_graphql::Value::from_json(json).ok());
                if let Some(violations) = violations {
                    extensions.set("violations", violations);
                }
            }
        })
    }
}

fn not_found(raw_id: &str) -> async_graphql::Error {
    async_graphql::Error::new(format!("No club found with id {raw_id}"))
        .extend_with(|_, extensions| extensions.set("code", "NOT_FOUND"))
}

fn parse_id(id: &ID) -> Option<ClubId> {
    id.parse::<ClubId>().ok().filter(|id| *id > 0)
}

/// Requests executed without an identity act anonymously
fn guard(ctx: &Context<'_>, action: Action) -> Result<()> {
    let identity = ctx.data_opt::<Identity>().cloned().unwrap_or_default();
    authorize(&identity, action).map_err(|e| e.extend())
}

#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// A single club; the stadium is always loaded, players on request
    async fn club(
        &self,
        ctx: &Context<'_>,
        id: ID,
        with_players: Option<bool>,
    ) -> Result<ClubObject> {
        tracing::debug!(id = %id.as_str(), ?with_players, "GraphQL club");
        let service = ctx.data::<ClubService>()?;
        let club_id = parse_id(&id).ok_or_else(|| not_found(&id))?;

        let include = ClubInclude {
            with_players: with_players.unwrap_or(false),
            ..ClubInclude::STADIUM
        };
        let club = service
            .find_by_id(club_id, include)
            .await
            .map_err(|e| e.extend())?;
        Ok(club.into())
    }

    /// One page of clubs matching `filter`
    async fn clubs(
        &self,
        ctx: &Context<'_>,
        filter: Option<SearchInput>,
        page: Option<i32>,
        size: Option<i32>,
    ) -> Result<Vec<ClubObject>> {
        tracing::debug!(?filter, ?page, ?size, "GraphQL clubs");
        let service = ctx.data::<ClubService>()?;
        let pageable = Pageable::from_numbers(
            page.map(i64::from),
            size.map(i64::from),
            service.pagination(),
        );
        let filter = filter.map(SearchInput::into_filter).unwrap_or_default();

        let slice = service
            .find(&filter, pageable)
            .await
            .map_err(|e| e.extend())?;
        Ok(slice.content.into_iter().map(ClubObject::from).collect())
    }
}

#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create(&self, ctx: &Context<'_>, input: CreateInput) -> Result<CreatePayload> {
        guard(ctx, Action::Create)?;
        let service = ctx.data::<ClubService>()?;

        let club = service
            .create(ClubInput::from(input))
            .await
            .map_err(|e| e.extend())?;
        tracing::debug!(id = club.id, "GraphQL create");
        Ok(CreatePayload {
            id: ID(club.id.to_string()),
        })
    }

    /// Version-guarded update; `version` is the version the caller last read
    async fn update(&self, ctx: &Context<'_>, input: UpdateInput) -> Result<UpdatePayload> {
        guard(ctx, Action::Update)?;
        let service = ctx.data::<ClubService>()?;

        let club_id = parse_id(&input.id).ok_or_else(|| not_found(&input.id))?;
        let version = u32::try_from(input.version).map_err(|_| {
            ServiceError::from(ValidationErrors::single("version", "must be at least 0")).extend()
        })?;

        let club = service
            .update(club_id, ClubInput::from(input.club), Some(&etag(version)))
            .await
            .map_err(|e| e.extend())?;
        tracing::debug!(id = club.id, version = club.version, "GraphQL update");
        Ok(UpdatePayload {
            version: club.version,
        })
    }

    /// Idempotent removal
    async fn delete(&self, ctx: &Context<'_>, id: ID) -> Result<DeletePayload> {
        guard(ctx, Action::Delete)?;
        let service = ctx.data::<ClubService>()?;

        if let Some(club_id) = parse_id(&id) {
            service.delete(club_id).await.map_err(|e| e.extend())?;
        }
        Ok(DeletePayload { success: true })
    }
}
