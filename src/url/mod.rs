//! URL handling module for Gongmo
//!
//! This module resolves hrefs found on listing and detail pages against a
//! site's base origin, builds page URLs from the fixed path templates, and
//! validates record identifiers.

mod resolve;

pub use resolve::{is_secure_absolute, resolve_href, resolve_root_relative};

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a configured base origin, accepting only http and https
///
/// # Examples
///
/// ```
/// use gongmo::url::parse_base;
///
/// let base = parse_base("https://www.wevity.com/").unwrap();
/// assert_eq!(base.as_str(), "https://www.wevity.com/");
/// ```
pub fn parse_base(base: &str) -> UrlResult<Url> {
    let url = Url::parse(base.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Builds `{base}{path_and_query}` where the template starts with `/`
pub fn build_page_url(base: &Url, path_and_query: &str) -> UrlResult<Url> {
    let origin = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{}{}", origin, path_and_query)).map_err(|e| UrlError::Parse(e.to_string()))
}

/// Accepts only identifiers made entirely of ASCII digits
pub fn ensure_numeric_id(id: &str) -> UrlResult<&str> {
    let id = id.trim();
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(id)
    } else {
        Err(UrlError::InvalidId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_rejects_other_schemes() {
        assert!(parse_base("https://www.allforyoung.com").is_ok());
        assert!(matches!(
            parse_base("ftp://example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(parse_base("not a url"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_build_page_url() {
        let base = parse_base("https://www.allforyoung.com/").unwrap();
        let url = build_page_url(&base, "/posts/contest?page=3").unwrap();
        assert_eq!(url.as_str(), "https://www.allforyoung.com/posts/contest?page=3");

        let base = parse_base("https://www.wevity.com").unwrap();
        let url = build_page_url(&base, "/?c=find&s=1&gbn=view&ix=91234").unwrap();
        assert_eq!(url.as_str(), "https://www.wevity.com/?c=find&s=1&gbn=view&ix=91234");
    }

    #[test]
    fn test_ensure_numeric_id() {
        assert_eq!(ensure_numeric_id("78105").unwrap(), "78105");
        assert_eq!(ensure_numeric_id(" 42 ").unwrap(), "42");
        assert!(ensure_numeric_id("").is_err());
        assert!(ensure_numeric_id("12a").is_err());
        assert!(ensure_numeric_id("../admin").is_err());
        assert!(ensure_numeric_id("١٢").is_err());
    }
}
