//! Request tracking layers
//!
//! Every request gets an `x-request-id` (generated unless the caller sent
//! one), the id is echoed on the response, and credential-bearing headers
//! are masked in trace output.

use http::HeaderName;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

/// Headers that must never show up in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Generate a UUID request id when the caller sent none
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Copy the request id onto the response
pub fn request_id_propagation_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Mask [`SENSITIVE_HEADERS`] plus the forwarded roles header
pub fn sensitive_headers_layer(roles_header: &str) -> SetSensitiveRequestHeadersLayer {
    SetSensitiveRequestHeadersLayer::new(sensitive_header_names(roles_header))
}

fn sensitive_header_names(roles_header: &str) -> Vec<HeaderName> {
    SENSITIVE_HEADERS
        .iter()
        .copied()
        .chain(std::iter::once(roles_header))
        .filter_map(|name| match name.parse::<HeaderName>() {
            Ok(header) => Some(header),
            Err(_) => {
                tracing::warn!(header = name, "Ignoring invalid sensitive header name");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_header_is_masked() {
        let names = sensitive_header_names("X-Roles");
        assert_eq!(names.len(), SENSITIVE_HEADERS.len() + 1);
        assert!(names.iter().any(|h| h.as_str() == "x-roles"));
    }

    #[test]
    fn test_invalid_header_name_is_skipped() {
        let names = sensitive_header_names("not a header");
        assert_eq!(names.len(), SENSITIVE_HEADERS.len());
    }
}
