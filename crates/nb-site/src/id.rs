//! Source page identifiers.
//!
//! Page ids come in two spellings: 32 hex digits (`"0eeee000cccc..."`) and
//! the dashed 8-4-4-4-12 form. Table rows and links use the former, cache
//! keys and fetches the latter.

/// Origin of the hosted source, used for external fallback links.
pub const SOURCE_ORIGIN: &str = "https://www.notion.so";

const DASH_ID_LEN: usize = 36;
const NO_DASH_ID_LEN: usize = 32;

/// Error returned when a table URL does not end in a page id.
#[derive(Debug, thiserror::Error)]
#[error("cannot get page id from {0}")]
pub struct InvalidPageUrl(pub String);

/// Last path segment of `uri` without its query string.
#[must_use]
pub fn page_id_from_uri(uri: &str) -> &str {
    let last = uri.rsplit('/').next().unwrap_or(uri);
    last.split('?').next().unwrap_or(last)
}

/// Whether `s` looks like a page id in either spelling.
#[must_use]
pub fn is_page_id(s: &str) -> bool {
    let digits = s.chars().filter(|&c| c != '-').count();
    digits == NO_DASH_ID_LEN
        && (s.len() == NO_DASH_ID_LEN || s.len() == DASH_ID_LEN)
        && s.chars().all(|c| c == '-' || c.is_ascii_hexdigit())
}

/// Page id without dashes.
#[must_use]
pub fn to_plain_id(s: &str) -> String {
    s.replace('-', "")
}

/// Dashed spelling of a page id.
///
/// Strings that are already dashed, or that are not 32 characters once
/// dashes are removed, are returned unchanged.
#[must_use]
pub fn to_dash_id(s: &str) -> String {
    if s.len() == DASH_ID_LEN && s.contains('-') {
        return s.to_owned();
    }
    let plain = to_plain_id(s);
    if plain.len() != NO_DASH_ID_LEN || !plain.is_ascii() {
        return s.to_owned();
    }
    format!(
        "{}-{}-{}-{}-{}",
        &plain[..8],
        &plain[8..12],
        &plain[12..16],
        &plain[16..20],
        &plain[20..]
    )
}

/// Extract the dashed page id of a table from its page URL.
///
/// Accepts URLs such as `https://www.notion.so/user/Blog-0123...cdef?v=...`.
pub fn page_id_from_collection_url(url: &str) -> Result<String, InvalidPageUrl> {
    let last = url.rsplit('/').next().unwrap_or_default();
    let last = last.rsplit('-').next().unwrap_or_default();
    let id = last.split('?').next().unwrap_or_default();
    if id.len() == NO_DASH_ID_LEN {
        Ok(to_dash_id(id))
    } else {
        Err(InvalidPageUrl(url.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "0eeee000ccccbbbbaaaa123450000000";
    const DASHED: &str = "0eeee000-cccc-bbbb-aaaa-123450000000";

    #[test]
    fn test_to_dash_id() {
        assert_eq!(to_dash_id(PLAIN), DASHED);
        assert_eq!(to_dash_id(DASHED), DASHED);
        assert_eq!(to_dash_id("short"), "short");
    }

    #[test]
    fn test_to_plain_id() {
        assert_eq!(to_plain_id(DASHED), PLAIN);
        assert_eq!(to_plain_id(PLAIN), PLAIN);
    }

    #[test]
    fn test_page_id_from_uri() {
        assert_eq!(page_id_from_uri(&format!("https://www.notion.so/{PLAIN}")), PLAIN);
        assert_eq!(page_id_from_uri(&format!("/{PLAIN}?v=1")), PLAIN);
        assert_eq!(page_id_from_uri("post.html"), "post.html");
        assert_eq!(page_id_from_uri(""), "");
    }

    #[test]
    fn test_is_page_id() {
        assert!(is_page_id(PLAIN));
        assert!(is_page_id(DASHED));
        assert!(!is_page_id("post.html"));
        assert!(!is_page_id(&format!("{PLAIN}.html")));
        assert!(!is_page_id("zzzzz000ccccbbbbaaaa123450000000"));
    }

    #[test]
    fn test_page_id_from_collection_url() {
        let url = format!("https://www.notion.so/someone/My-Blog-{PLAIN}?v=abc");
        assert_eq!(page_id_from_collection_url(&url).unwrap(), DASHED);

        let url = format!("https://www.notion.so/{PLAIN}");
        assert_eq!(page_id_from_collection_url(&url).unwrap(), DASHED);
    }

    #[test]
    fn test_page_id_from_collection_url_rejects_garbage() {
        let err = page_id_from_collection_url("https://www.notion.so/blog").unwrap_err();
        assert!(err.to_string().contains("https://www.notion.so/blog"));
    }
}
