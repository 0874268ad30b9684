//! GraphQL transport
//!
//! Served at `POST /graphql`. Resolvers call the same [`ClubService`] as the
//! REST handlers; failures carry the service error code in
//! `extensions.code`.
//!
//! [`ClubService`]: crate::service::ClubService

mod format;
mod schema;
mod types;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;

pub use format::format_member_count;
pub use schema::{build_schema, ClubSchema, MutationRoot, QueryRoot};
pub use types::{
    ClubObject, CreateInput, CreatePayload, DeletePayload, PlayerData, PlayerObject, SearchInput,
    StadiumData, StadiumObject, UpdateInput, UpdatePayload,
};

use crate::auth::Identity;
use crate::state::AppState;

/// Path of the GraphQL endpoint
pub const GRAPHQL_PATH: &str = "/graphql";

/// Execute a GraphQL request on behalf of the caller
pub async fn graphql_handler(
    State(state): State<AppState>,
    identity: Identity,
    request: GraphQLRequest,
) -> GraphQLResponse {
    state
        .schema()
        .execute(request.into_inner().data(identity))
        .await
        .into()
}
