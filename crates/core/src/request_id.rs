//! Request correlation ids shared by both services.
//!
//! An id set by an upstream proxy is reused so one request can be followed
//! across the ingress and both services. Anything that does not look like an
//! id is replaced, so clients cannot stuff arbitrary text into logs and
//! response headers.

use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id that is reused.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// The upstream id when it is acceptable, otherwise a fresh UUID v4.
///
/// Acceptable ids are 1 to [`MAX_REQUEST_ID_LEN`] visible ASCII characters.
#[must_use]
pub fn request_id(upstream: Option<&str>) -> String {
    upstream
        .filter(|id| is_acceptable(id))
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned)
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_reused() {
        assert_eq!(request_id(Some("cf-ray-8a1b2c")), "cf-ray-8a1b2c");
    }

    #[test]
    fn test_missing_or_unacceptable_id_replaced() {
        let too_long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        for upstream in [None, Some(""), Some("has space"), Some(too_long.as_str())] {
            let id = request_id(upstream);
            assert!(Uuid::parse_str(&id).is_ok(), "{upstream:?} gave {id}");
        }
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(request_id(None), request_id(None));
    }
}
