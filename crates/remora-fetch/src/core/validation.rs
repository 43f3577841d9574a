use url::Url;

/// Returns `true` if the HTTP status code is a redirect the fetcher follows.
///
/// # Recognized Redirect Codes
///
/// - 301: Moved Permanently
/// - 302: Found
/// - 307: Temporary Redirect
///
/// # Examples
///
/// ```
/// use remora_fetch::is_redirect;
///
/// assert!(is_redirect(301));
/// assert!(is_redirect(307));
/// assert!(!is_redirect(200));
/// assert!(!is_redirect(308));
/// ```
pub fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 307)
}

/// Resolve a `Location` header value against the URL that produced it.
///
/// Relative locations keep the scheme and host of `current`; absolute ones
/// replace it. Returns `None` when the header is not a usable URL or leaves
/// `http`/`https`.
///
/// ```
/// use remora_fetch::resolve_location;
/// use url::Url;
///
/// let current = Url::parse("https://cdn.test/pkg@1/index.js").unwrap();
/// let next = resolve_location(&current, "/pkg@1.2.3/index.js").unwrap();
/// assert_eq!(next.as_str(), "https://cdn.test/pkg@1.2.3/index.js");
/// ```
pub fn resolve_location(current: &Url, location: &str) -> Option<Url> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }
    current
        .join(location)
        .ok()
        .filter(|next| matches!(next.scheme(), "http" | "https"))
}

/// Plain `http://` URLs travel unencrypted.
pub fn is_insecure(url: &Url) -> bool {
    url.scheme() == "http"
}
