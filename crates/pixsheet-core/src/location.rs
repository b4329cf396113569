//! Page URL handling: reading the sheet id and building the post-store URL.

use url::Url;

/// Query parameter carrying the sheet id.
// The service still calls sheet ids "frameId"
pub const SHEET_ID_PARAM: &str = "frameId";

/// Query parameter overriding the service base URL.
pub const SERVICE_PARAM: &str = "service";

/// Sheet id from the page URL, if present and non-empty.
pub fn framesheet_id_from_url(href: &str) -> Option<String> {
    query_param(href, SHEET_ID_PARAM)
}

/// Service base URL override from the page URL.
pub fn service_url_from_url(href: &str) -> Option<String> {
    query_param(href, SERVICE_PARAM)
}

fn query_param(href: &str, name: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Page URL to navigate to after a sheet was stored as `id`: the current
/// URL with its query replaced by `?frameId=<id>`.
pub fn url_for_stored_sheet(href: &str, id: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    url.set_query(None);
    url.query_pairs_mut().append_pair(SHEET_ID_PARAM, id);
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_sheet_id() {
        assert_eq!(
            framesheet_id_from_url("http://localhost/editor/?frameId=42"),
            Some("42".to_string())
        );
        assert_eq!(
            framesheet_id_from_url("http://localhost/?debug=1&frameId=abc&x=2"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_missing_sheet_id() {
        assert_eq!(framesheet_id_from_url("http://localhost/editor/"), None);
        assert_eq!(framesheet_id_from_url("http://localhost/?frameId="), None);
        assert_eq!(framesheet_id_from_url("not a url"), None);
    }

    #[test]
    fn test_url_for_stored_sheet() {
        assert_eq!(
            url_for_stored_sheet("http://localhost/editor/index.html", "99").as_deref(),
            Some("http://localhost/editor/index.html?frameId=99")
        );
        assert_eq!(
            url_for_stored_sheet("http://localhost/editor/?frameId=42", "99").as_deref(),
            Some("http://localhost/editor/?frameId=99")
        );
    }

    #[test]
    fn test_service_override() {
        assert_eq!(
            service_url_from_url("http://localhost/?service=http%3A%2F%2Fapi.local%3A8080"),
            Some("http://api.local:8080".to_string())
        );
        assert_eq!(service_url_from_url("http://localhost/"), None);
    }
}
