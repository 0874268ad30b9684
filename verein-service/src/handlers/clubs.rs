//! REST endpoints under `/rest`

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{
        header::{ACCEPT, ETAG, IF_MATCH, IF_NONE_MATCH, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::error::{ApiError, ApiOperation};
use super::response::PageResponse;
use crate::auth::{authorize, Action, Identity};
use crate::model::{ClubId, ClubInclude, ClubInput};
use crate::repository::Pageable;
use crate::service::version::{etag, if_none_match_matches};
use crate::state::AppState;

/// Base path of the REST interface
pub const REST_PATH: &str = "/rest";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindByIdParams {
    pub with_players: Option<String>,
}

/// Path ids that are not positive integers name no club
fn parse_id(raw: &str) -> Option<ClubId> {
    raw.parse::<ClubId>().ok().filter(|id| *id > 0)
}

/// Whether `Accept` admits JSON or HTML
fn accepts_json_or_html(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT).and_then(|v| v.to_str().ok()) else {
        return true;
    };
    accept.split(',').any(|range| {
        let mut parts = range.split(';');
        let media = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        let refused = parts.any(|p| {
            p.trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                == Some(0.0)
        });
        !refused
            && matches!(
                media.as_str(),
                "*/*" | "application/*" | "application/json" | "text/*" | "text/html"
            )
    })
}

fn unknown_id(op: ApiOperation, raw_id: &str) -> ApiError {
    ApiError::new(
        op,
        super::ApiErrorKind::NotFound,
        format!("No club found with id {raw_id}"),
    )
    .with_entity("Club", raw_id)
}

fn header_str(headers: &HeaderMap, name: http::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn etag_header(version: u32) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&etag(version)).map_err(|e| {
        ApiError::new(
            ApiOperation::Get,
            super::ApiErrorKind::InternalError,
            e.to_string(),
        )
    })
}

/// `GET /rest/{id}`: conditional read
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<FindByIdParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let op = ApiOperation::Get;
    tracing::debug!(id = %raw_id, if_none_match = ?header_str(&headers, IF_NONE_MATCH), "GET club");

    if !accepts_json_or_html(&headers) {
        return Err(ApiError::not_acceptable(op));
    }
    let id = parse_id(&raw_id).ok_or_else(|| unknown_id(op, &raw_id))?;

    let include = ClubInclude {
        with_players: params.with_players.as_deref() == Some("true"),
        ..ClubInclude::STADIUM
    };
    let club = state
        .service()
        .find_by_id(id, include)
        .await
        .map_err(|e| ApiError::from_service(op, e))?;

    let tag = etag_header(club.version)?;
    if header_str(&headers, IF_NONE_MATCH).is_some_and(|h| if_none_match_matches(h, club.version)) {
        tracing::debug!(id, version = club.version, "Club not modified");
        return Ok((StatusCode::NOT_MODIFIED, [(ETAG, tag)]).into_response());
    }

    Ok(([(ETAG, tag)], Json(club)).into_response())
}

/// `GET /rest?...`: filtered, paged listing
pub async fn find(
    State(state): State<AppState>,
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<Json<PageResponse<crate::model::Club>>, ApiError> {
    let op = ApiOperation::List;
    let number = params.remove("page");
    let size = params.remove("size");
    let pageable = Pageable::from_query(
        number.as_deref(),
        size.as_deref(),
        state.service().pagination(),
    );

    let slice = state
        .service()
        .find(&params, pageable)
        .await
        .map_err(|e| ApiError::from_service(op, e))?;
    Ok(Json(PageResponse::from(slice)))
}

fn body_or_error(
    op: ApiOperation,
    payload: Result<Json<ClubInput>, JsonRejection>,
) -> Result<ClubInput, ApiError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiError::invalid_body(op, rejection.body_text()))
}

/// `POST /rest`: create, answering with `Location`
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<ClubInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let op = ApiOperation::Create;
    authorize(&identity, Action::Create).map_err(|e| ApiError::from_service(op, e))?;
    let input = body_or_error(op, payload)?;

    let club = state
        .service()
        .create(input)
        .await
        .map_err(|e| ApiError::from_service(op, e))?;

    let location = HeaderValue::from_str(&format!("{REST_PATH}/{}", club.id))
        .map_err(|e| ApiError::new(op, super::ApiErrorKind::InternalError, e.to_string()))?;
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location), (ETAG, etag_header(club.version)?)],
    )
        .into_response())
}

/// `PUT /rest/{id}`: version-guarded update
pub async fn update(
    State(state): State<AppState>,
    identity: Identity,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<ClubInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let op = ApiOperation::Update;
    authorize(&identity, Action::Update).map_err(|e| ApiError::from_service(op, e))?;
    let input = body_or_error(op, payload)?;
    let id = parse_id(&raw_id).ok_or_else(|| unknown_id(op, &raw_id))?;

    let club = state
        .service()
        .update(id, input, header_str(&headers, IF_MATCH))
        .await
        .map_err(|e| ApiError::from_service(op, e))?;

    Ok((StatusCode::NO_CONTENT, [(ETAG, etag_header(club.version)?)]).into_response())
}

/// `DELETE /rest/{id}`: idempotent removal
pub async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let op = ApiOperation::Delete;
    authorize(&identity, Action::Delete).map_err(|e| ApiError::from_service(op, e))?;

    // an id that cannot exist is already deleted
    if let Some(id) = parse_id(&raw_id) {
        state
            .service()
            .delete(id)
            .await
            .map_err(|e| ApiError::from_service(op, e))?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn test_accept_negotiation() {
        assert!(accepts_json_or_html(&HeaderMap::new()));
        assert!(accepts_json_or_html(&accept("application/json")));
        assert!(accepts_json_or_html(&accept("text/html,application/xhtml+xml;q=0.9")));
        assert!(accepts_json_or_html(&accept("image/png, */*;q=0.1")));
        assert!(!accepts_json_or_html(&accept("image/png")));
        assert!(!accepts_json_or_html(&accept("application/json;q=0")));
    }
}
