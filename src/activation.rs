use url::Url;

const SITE_DOMAIN: &str = "musicbrainz.org";

/// Entity pages that render tagger buttons.
const ENTITY_PREFIXES: &[&str] = &["/release-group/", "/release/", "/recording/", "/cdtoc/"];
/// Entities whose sub-pages (`/<entity>/<id>/...`) carry no tagger button.
const ENTITIES_WITHOUT_SUBPAGES: &[&str] = &["/release-group/", "/cdtoc/"];
const SEARCH_PREFIX: &str = "/search";

/// Whether a discovery run should be started for `url` at all.
///
/// Only the path decides sub-page exclusion, on every subdomain alike; the
/// query string is never looked at.
pub fn should_activate(url: &Url) -> bool {
    if url.scheme() != "https" || !is_site_host(url) {
        return false;
    }
    let path = url.path();

    if ENTITIES_WITHOUT_SUBPAGES
        .iter()
        .filter_map(|prefix| path.strip_prefix(prefix))
        .any(|rest| rest.contains('/'))
    {
        return false;
    }

    path.starts_with(SEARCH_PREFIX) || ENTITY_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn is_site_host(url: &Url) -> bool {
    match url.host_str() {
        Some(host) => {
            host == SITE_DOMAIN
                || host
                    .strip_suffix(SITE_DOMAIN)
                    .is_some_and(|sub| sub.ends_with('.'))
        }
        None => false,
    }
}
