//! URL normalization for search-result links.
//!
//! Search engines wrap result links in redirect URLs and decorate them
//! with tracking parameters; both break host filtering and dedup. The
//! rules here are explicit so they can be tested in isolation.

use url::Url;

/// Query parameters that carry tracking state, never identity.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "ref",
    "ved",
    "usg",
];

/// Full normalization: unwrap a redirect wrapper, then strip tracking
/// parameters. Unparseable input is returned unchanged.
pub fn normalize(url: &str) -> String {
    strip_tracking(&unwrap_redirect(url))
}

/// Unwrap search-engine redirect URLs of the form
/// `https://engine/url?q=<target>&...`, returning the target. Anything
/// else passes through untouched.
pub fn unwrap_redirect(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.path().ends_with("/url") {
        return url.to_string();
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, target)| target.into_owned())
        .unwrap_or_else(|| url.to_string())
}

/// Remove tracking parameters, preserving the rest of the query.
pub fn strip_tracking(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if parsed.query().is_none() {
        return url.to_string();
    }

    let clean_pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if clean_pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(clean_pairs);
    }

    parsed.to_string()
}

/// True if the URL's host contains any of the given patterns. Falls back
/// to a whole-string match when the URL does not parse.
pub fn host_contains_any(url: &str, patterns: &[&str]) -> bool {
    let lowered = url.to_lowercase();
    let host = Url::parse(&lowered)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or(lowered);
    patterns.iter().any(|p| host.contains(p))
}
