//! Logical path and link utilities.
//!
//! Logical paths are slash-separated, start with `/`, and name a resource
//! relative to the webapp root (`/js/app.js`). Links are the literal values
//! found inside resources (`../img/bg.png?v=2`).

use percent_encoding::percent_decode_str;
use url::Url;

/// Origin used to resolve links with standard URL semantics.
const LOCAL_ORIGIN: &str = "http://merge.local/";

/// Get the lowercase extension (with leading dot) of the last path segment.
///
/// # Examples
/// ```
/// use merge::utils::path::extension;
/// assert_eq!(extension("/js/App.JS"), ".js");
/// assert_eq!(extension("/cdn.v1/abc"), "");
/// ```
pub fn extension(path: &str) -> String {
    let name = file_name(path);
    name.rfind('.')
        .map(|dot| name[dot..].to_ascii_lowercase())
        .unwrap_or_default()
}

/// Get the last segment of a slash-separated path.
#[inline]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.)
/// or a protocol-relative authority (`//host/...`).
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
#[inline]
pub fn is_external_link(link: &str) -> bool {
    if link.starts_with("//") {
        return true;
    }
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Split a link into its path and its query/fragment suffix.
///
/// The suffix starts at the first `?` or `#` and keeps that character, so
/// `path + suffix` always rebuilds the original link.
#[inline]
pub fn split_suffix(link: &str) -> (&str, &str) {
    match link.find(['?', '#']) {
        Some(pos) => link.split_at(pos),
        None => (link, ""),
    }
}

/// Resolve `link` against the logical path `context`.
///
/// Dot segments are removed and percent-escapes decoded. Returns `None` if
/// the link leaves the local origin or cannot be parsed.
pub fn resolve_link(context: &str, link: &str) -> Option<String> {
    let origin = Url::parse(LOCAL_ORIGIN).ok()?;
    let base = origin.join(context).ok()?;
    let resolved = base.join(link).ok()?;
    if resolved.origin() != origin.origin() {
        return None;
    }
    let path = percent_decode_str(resolved.path()).decode_utf8().ok()?;
    Some(path.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("/css/site.css"), ".css");
        assert_eq!(extension("/scripts/all.MERGE"), ".merge");
        assert_eq!(extension("/README"), "");
        assert_eq!(extension("/cdn/0123abcd"), "");
        assert_eq!(extension("/v1.2/file"), "");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/cdn/abc.css"), "abc.css");
        assert_eq!(file_name("abc.css"), "abc.css");
        assert_eq!(file_name("/cdn/"), "");
    }

    #[test]
    fn test_is_external_link() {
        assert!(is_external_link("https://example.com/a.png"));
        assert!(is_external_link("data:image/png;base64,AAAA"));
        assert!(is_external_link("//cdn.example.com/a.png"));
        assert!(!is_external_link("/img/a.png"));
        assert!(!is_external_link("../img/a.png"));
        assert!(!is_external_link("img/a.png?x=1:2"));
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("a.png?v=1#x"), ("a.png", "?v=1#x"));
        assert_eq!(split_suffix("font.svg#icon"), ("font.svg", "#icon"));
        assert_eq!(split_suffix("a.png"), ("a.png", ""));
        assert_eq!(split_suffix("?only"), ("", "?only"));
    }

    #[test]
    fn test_resolve_link_relative() {
        assert_eq!(
            resolve_link("/css/site.css", "../img/bg.png").as_deref(),
            Some("/img/bg.png")
        );
        assert_eq!(
            resolve_link("/css/site.css", "icons/a.png").as_deref(),
            Some("/css/icons/a.png")
        );
        assert_eq!(
            resolve_link("/css/site.css", "/img/bg.png").as_deref(),
            Some("/img/bg.png")
        );
    }

    #[test]
    fn test_resolve_link_decodes_and_clamps() {
        assert_eq!(
            resolve_link("/css/site.css", "my%20image.png").as_deref(),
            Some("/css/my image.png")
        );
        assert_eq!(
            resolve_link("/site.css", "../../up.png").as_deref(),
            Some("/up.png")
        );
    }

    #[test]
    fn test_resolve_link_rejects_other_origins() {
        assert_eq!(resolve_link("/css/site.css", "//other.example/a.png"), None);
        assert_eq!(resolve_link("/css/site.css", "https://example.com/a.png"), None);
    }
}
