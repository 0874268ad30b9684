//! Version tokens and the optimistic-locking guard
//!
//! Versions travel as quoted entity tags (`"3"`), optionally weak (`W/"3"`).
//! [`check_precondition`] is the whole decision table for a guarded write:
//!
//! | token      | target  | parse  | compare  | outcome                  |
//! |------------|---------|--------|----------|--------------------------|
//! | absent     | -       | -      | -        | `PreconditionRequired`   |
//! | present    | absent  | -      | -        | `NotFound`               |
//! | present    | present | fails  | -        | `VersionInvalid`         |
//! | present    | present | ok     | ≠        | `VersionOutdated`        |
//! | present    | present | ok     | =        | expected version         |

use super::error::{ServiceError, ServiceResult};
use crate::model::ClubId;

/// Quoted entity tag for a version
pub fn etag(version: u32) -> String {
    format!("\"{version}\"")
}

/// Parse `"<digits>"` or `W/"<digits>"`
pub fn parse_version_token(token: &str) -> Option<u32> {
    let token = token.trim();
    let token = token.strip_prefix("W/").unwrap_or(token);
    let digits = token.strip_prefix('"')?.strip_suffix('"')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether an `If-None-Match` value names the given version
///
/// Accepts a comma-separated list of tags and the wildcard `*`.
pub fn if_none_match_matches(header: &str, version: u32) -> bool {
    header.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || parse_version_token(candidate) == Some(version)
    })
}

/// Decide whether a guarded write may proceed
///
/// `persisted` is the version currently stored for `id`, fetched fresh for
/// this request, or `None` if the club does not exist. On success returns
/// the version the store must still hold when the write is applied.
pub fn check_precondition(
    id: ClubId,
    token: Option<&str>,
    persisted: Option<u32>,
) -> ServiceResult<u32> {
    let Some(token) = token else {
        return Err(ServiceError::PreconditionRequired);
    };
    let Some(persisted) = persisted else {
        return Err(ServiceError::NotFound { id });
    };
    let Some(expected) = parse_version_token(token) else {
        return Err(ServiceError::VersionInvalid {
            token: token.to_string(),
        });
    };
    // a token ahead of the store is as wrong as one behind it
    if expected != persisted {
        return Err(ServiceError::VersionOutdated {
            version: token.to_string(),
        });
    }
    Ok(expected)
}

/// Version after a successful write
///
/// `None` once the counter is exhausted; the write must then be refused,
/// since an unchanged version would keep validating the old `ETag`.
pub const fn next_version(version: u32) -> Option<u32> {
    version.checked_add(1)
}
