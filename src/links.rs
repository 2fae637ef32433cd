//! Identifier extraction from relational links.

use crate::payload::{ItemId, Link};

/// Trailing numeric id of an href such as `/api/v3/work_packages/42`.
///
/// Returns 0 when the last path segment is not a plain decimal number.
pub fn id_from_href(href: &str) -> ItemId {
    let trimmed = href.trim();
    let Some((_, last)) = trimmed.rsplit_once('/') else {
        return 0;
    };
    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    last.parse().unwrap_or(0)
}

/// Identifier a link points at, or 0 if the link is absent or malformed.
///
/// Root items carry no parent link (or one with a null href), so a zero
/// result is an ordinary outcome rather than an error.
pub fn extract_id(link: Option<&Link>) -> ItemId {
    link.and_then(|l| l.href.as_deref())
        .map(id_from_href)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_id() {
        assert_eq!(id_from_href("/api/v3/work_packages/42"), 42);
        assert_eq!(
            id_from_href("https://tracker.example.org/api/v3/work_packages/7"),
            7
        );
    }

    #[test]
    fn test_malformed_hrefs_yield_zero() {
        for href in [
            "",
            "42",
            "/api/v3/work_packages/",
            "/api/v3/work_packages/abc",
            "/api/v3/work_packages/42/activities",
            "/api/v3/work_packages/4x2",
            "/api/v3/work_packages/-3",
            "/api/v3/work_packages/99999999999999999999999",
        ] {
            assert_eq!(id_from_href(href), 0, "href {:?}", href);
        }
    }

    #[test]
    fn test_extract_id_absent_link() {
        assert_eq!(extract_id(None), 0);
        assert_eq!(extract_id(Some(&Link::default())), 0);
    }

    #[test]
    fn test_extract_id_is_stable() {
        let link = Link::to("/api/v3/work_packages/1001");
        let first = extract_id(Some(&link));
        assert_eq!(first, 1001);
        assert_eq!(extract_id(Some(&link)), first);
    }
}
