// src/engine.rs
// =============================================================================
// Search engines that accept IndexNow submissions.
//
// A fixed table from identifier to endpoint host. Submissions go to
// `https://{host}/indexnow`.
// =============================================================================

/// (identifier, host) pairs, identifiers lowercase.
const SEARCH_ENGINES: &[(&str, &str)] = &[
    ("indexnow", "api.indexnow.org"),
    ("microsoft_bing", "www.bing.com"),
    ("naver", "searchadvisor.naver.com"),
    ("seznam", "search.seznam.cz"),
    ("yandex", "yandex.com"),
];

pub const DEFAULT_SEARCH_ENGINE: &str = "microsoft_bing";

/// Resolves an engine identifier (case-insensitive) to its host.
pub fn resolve(identifier: &str) -> Option<&'static str> {
    let wanted = identifier.trim().to_lowercase();
    SEARCH_ENGINES
        .iter()
        .find(|(id, _)| *id == wanted)
        .map(|(_, host)| *host)
}

/// All known identifiers, in table order.
pub fn identifiers() -> impl Iterator<Item = &'static str> {
    SEARCH_ENGINES.iter().map(|(id, _)| *id)
}
