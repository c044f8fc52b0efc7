//! Page state consulted and changed by a discovery run: the current
//! location, the tagger button, and the search page exclusion rule.

use tracing::debug;
use url::Url;

/// Query parameter carrying the tagger port across page loads.
pub const TRACKING_PARAM: &str = "tport";
/// Class marker of the tagger button rendered by the site.
pub const TAGGER_BUTTON_CLASS: &str = "tagger-icon";

const SEARCH_PATH: &str = "/search";
const SEARCH_TYPE_PARAM: &str = "type";
const SEARCH_TYPES_WITH_TAGGER: &[&str] = &["release", "recording"];

/// Read and write access to the page location.
pub trait PageLocation {
    fn href(&self) -> &Url;

    /// Navigate to `url`. This reloads the page.
    fn assign(&mut self, url: Url);
}

/// Read access to the rendered page.
pub trait TaggerDocument {
    /// Link target of the first element carrying [`TAGGER_BUTTON_CLASS`].
    fn tagger_button_href(&self) -> Option<String>;
}

/// Location held in memory; records every navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLocation {
    current: Url,
    navigations: Vec<Url>,
}

impl MemoryLocation {
    pub fn new(url: Url) -> Self {
        Self {
            current: url,
            navigations: Vec::new(),
        }
    }

    pub fn navigations(&self) -> &[Url] {
        &self.navigations
    }
}

impl PageLocation for MemoryLocation {
    fn href(&self) -> &Url {
        &self.current
    }

    fn assign(&mut self, url: Url) {
        self.navigations.push(url.clone());
        self.current = url;
    }
}

/// Document with at most one tagger button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDocument {
    pub tagger_button_href: Option<String>,
}

impl MemoryDocument {
    pub fn with_button(href: impl Into<String>) -> Self {
        Self {
            tagger_button_href: Some(href.into()),
        }
    }
}

impl TaggerDocument for MemoryDocument {
    fn tagger_button_href(&self) -> Option<String> {
        self.tagger_button_href.clone()
    }
}

/// Whether the tagger must not be looked for on this page.
///
/// Only search pages are excluded, and only when they list something other
/// than releases or recordings.
pub fn is_page_excluded(url: &Url) -> bool {
    if url.path() != SEARCH_PATH {
        return false;
    }
    let search_type = query_value(url, SEARCH_TYPE_PARAM);
    if search_type
        .as_deref()
        .is_some_and(|t| SEARCH_TYPES_WITH_TAGGER.contains(&t))
    {
        return false;
    }
    debug!(
        "No tagger buttons on {} search page.",
        search_type.as_deref().unwrap_or("untyped")
    );
    true
}

/// Port the page is currently set up for, if any.
///
/// The tracking parameter wins; otherwise the tagger button's link is used.
pub fn current_tagger_port<D>(url: &Url, document: &D) -> Option<u16>
where
    D: TaggerDocument + ?Sized,
{
    query_value(url, TRACKING_PARAM)
        .as_deref()
        .and_then(parse_port_lenient)
        .or_else(|| tagger_button_port(url, document))
}

/// Explicit port in the tagger button's link.
pub fn tagger_button_port<D>(page_url: &Url, document: &D) -> Option<u16>
where
    D: TaggerDocument + ?Sized,
{
    let href = document.tagger_button_href()?;
    if href.is_empty() {
        return None;
    }
    page_url.join(&href).ok()?.port().filter(|p| *p > 0)
}

/// `url` with the tracking parameter set to `port`, other parameters kept.
pub fn with_tagger_port(url: &Url, port: u16) -> Url {
    let port = port.to_string();
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (k, v) in url.query_pairs() {
        if k == TRACKING_PARAM {
            if !replaced {
                pairs.push((k.into_owned(), port.clone()));
                replaced = true;
            }
        } else {
            pairs.push((k.into_owned(), v.into_owned()));
        }
    }
    if !replaced {
        pairs.push((TRACKING_PARAM.to_string(), port));
    }

    let mut out = url.clone();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Leading-integer parse: skips leading whitespace, takes an optional sign
/// and the digits that follow, ignores the rest. Only ports in 1..=65535
/// are accepted; anything else, `99999` included, counts as no value so the
/// tagger button is consulted instead.
fn parse_port_lenient(s: &str) -> Option<u16> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if negative || digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    u16::try_from(value).ok().filter(|p| *p > 0)
}
