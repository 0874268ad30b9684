//! REST transport
//!
//! | method | path           | success                 |
//! |--------|----------------|-------------------------|
//! | GET    | `/rest/{id}`   | 200 + `ETag`, or 304    |
//! | GET    | `/rest`        | 200 page envelope       |
//! | POST   | `/rest`        | 201 + `Location`        |
//! | PUT    | `/rest/{id}`   | 204 + `ETag`            |
//! | DELETE | `/rest/{id}`   | 204                     |

mod clubs;
mod error;
mod response;

use axum::{routing::get, Router};

pub use clubs::{FindByIdParams, REST_PATH};
pub use error::{ApiError, ApiErrorKind, ApiErrorResponse, ApiOperation, ViolationBody};
pub use response::{PageMeta, PageResponse};

use crate::state::AppState;

/// Routes of the REST interface
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(REST_PATH, get(clubs::find).post(clubs::create))
        .route(
            &format!("{REST_PATH}/{{id}}"),
            get(clubs::find_by_id)
                .put(clubs::update)
                .delete(clubs::delete),
        )
}
