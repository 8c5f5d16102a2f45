use url::Url;

/// Resolves an href to an absolute http(s) URL string
///
/// Absolute http(s) hrefs are returned unchanged. Relative hrefs, including
/// root-relative (`/posts/1`) and query-only (`?c=find&ix=1`) forms, are
/// joined onto `base`.
///
/// Returns None if the href should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_href(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Some(href.to_string());
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Resolves only `/`-rooted paths, leaving anything else untouched
///
/// Detail pages on the card-style site mix CDN URLs with `/`-rooted paths;
/// only the latter need the origin prepended.
pub fn resolve_root_relative(href: &str, base: &Url) -> String {
    let href = href.trim();
    if href.starts_with('/') {
        if let Ok(absolute) = base.join(href) {
            return absolute.to_string();
        }
    }
    href.to_string()
}

/// True for URLs that are absolute and served over TLS
pub fn is_secure_absolute(url: &str) -> bool {
    url.starts_with("https://")
}
