//! Pure predicates over CRM page URLs.
//!
//! The toolkit delivers navigation events with full URLs or bare paths
//! depending on context; every helper here tolerates both.

use url::Url;

use crate::config::NavigationConfig;

/// Path component of a URL, whether absolute or a bare path
pub fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Bare path (no scheme): strip query and fragment by hand.
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Is this URL one of the configured "create new record" modals?
pub fn is_new_record_modal(url: &str, config: &NavigationConfig) -> bool {
    let path = url_path(url);
    config.new_record_paths.iter().any(|p| p == &path)
}

/// Decoded background-context path carried on a modal URL, if any
///
/// The modal URL records the page beneath it in a query parameter; landing
/// back on that page after the modal closes reads as a cancel.
pub fn background_context_path(url: &str, config: &NavigationConfig) -> Option<String> {
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse(&format!("https://crm.invalid{}", url)))
        .ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == config.background_param.as_str())
        .map(|(_, value)| value.into_owned())
}

/// Idempotence guard: the navigation stream fires duplicate notifications
/// with no observable page change.
pub fn is_same_url(a: &str, b: &str) -> bool {
    a == b
}
