//! Locale prefix routing for the localized pages.
//!
//! Every page lives under a locale prefix (`/en/...`, `/zh/...`). A request for
//! the bare root is redirected to the visitor's preferred locale, chosen from the
//! `NEXT_LOCALE` cookie, then `Accept-Language`, then the default (`en`).
//! Paths outside `/` and `/(en|zh)/*` are left alone.
use http::{
    HeaderMap, StatusCode, Uri,
    header::{ACCEPT_LANGUAGE, COOKIE},
};
use itertools::Itertools;
use tracing::debug;

use crate::i18n::Locale;

/// Cookie remembering an explicit locale choice.
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// Outcome of routing a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Render `path` (without the prefix, always starting with `/`) in `locale`.
    Localized { locale: Locale, path: String },
    Redirect { status: StatusCode, location: String },
    /// Not a localized page.
    Passthrough,
}

pub fn resolve(uri: &Uri, headers: &HeaderMap) -> Route {
    let path = uri.path();

    if path == "/" {
        let locale = preferred_locale(headers);
        let location = match uri.query() {
            Some(query) => format!("/{}?{}", locale, query),
            None => format!("/{}", locale),
        };
        debug!("Redirecting / to {}", location);
        return Route::Redirect {
            status: StatusCode::TEMPORARY_REDIRECT,
            location,
        };
    }

    let mut segments = path.trim_start_matches('/').splitn(2, '/');
    let prefix = segments.next().unwrap_or_default();
    match Locale::ALL.into_iter().find(|l| l.as_str() == prefix) {
        Some(locale) => Route::Localized {
            locale,
            path: format!("/{}", segments.next().unwrap_or_default()),
        },
        None => Route::Passthrough,
    }
}

/// Picks the locale for a visitor without a prefix in the URL.
pub fn preferred_locale(headers: &HeaderMap) -> Locale {
    cookie_locale(headers)
        .or_else(|| {
            headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(negotiate)
        })
        .unwrap_or_default()
}

fn cookie_locale(headers: &HeaderMap) -> Option<Locale> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == LOCALE_COOKIE)
        .and_then(|(_, value)| Locale::from_tag(value))
}

/// Returns the supported locale with the highest `q` in an `Accept-Language` value.
pub fn negotiate(accept_language: &str) -> Option<Locale> {
    accept_language
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let tag = parts.next()?.trim();
            // A malformed or out of range weight counts as q=0.
            let q = match parts.find_map(|p| p.trim().strip_prefix("q=")) {
                Some(q) => q
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|q| (0.0..=1.0).contains(q))
                    .unwrap_or(0.0),
                None => 1.0,
            };
            (q > 0.0).then_some((tag, q))
        })
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .find_map(|(tag, _)| Locale::from_tag(tag))
}
