//! URL helpers: resolution against the current location, origin checks,
//! and tab/path matching.

use url::Url;

#[cfg(test)]
#[path = "url_test.rs"]
mod url_test;

/// Resolve `href` relative to the absolute `base` URL.
#[must_use]
pub fn resolve(href: &str, base: &str) -> Option<Url> {
    let Ok(base) = Url::parse(base) else {
        return None;
    };
    match base.join(href) {
        Ok(url) => Some(url),
        Err(_) => None,
    }
}

/// Whether `href` resolves to the same origin as `base`. Unparsable input is
/// treated as cross-origin.
#[must_use]
pub fn is_same_origin(href: &str, base: &str) -> bool {
    let (Some(target), Ok(base)) = (resolve(href, base), Url::parse(base)) else {
        return false;
    };
    target.origin() == base.origin()
}

/// Origin-relative path of `href`, or `href` itself when it cannot be resolved.
#[must_use]
pub fn path_of(href: &str, base: &str) -> String {
    resolve(href, base).map_or_else(|| href.to_owned(), |url| url.path().to_owned())
}

/// Whether a tab whose link points at `tab_path` represents `url_path`.
///
/// The site root is shown by the tab for `root_alias`.
#[must_use]
pub fn tab_matches(tab_path: &str, url_path: &str, root_path: &str, root_alias: &str) -> bool {
    tab_path == url_path || (url_path == root_path && tab_path == root_alias)
}

/// Whether `href` only targets an anchor on the current page.
#[must_use]
pub fn is_fragment_only(href: &str) -> bool {
    href.starts_with('#')
}
