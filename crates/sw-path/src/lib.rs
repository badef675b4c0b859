//! Current-location path matching for navigation links.
//!
//! Decides whether anchors point at the page currently being viewed.
//! `index.html` and the bare directory path are considered the same
//! document, so `/guide/` and `/guide/index.html` compare equal.

use sw_core::PageError;
use sw_core::PageResult;
use sw_dom::Document;
use sw_dom::NodeId;
use sw_dom::Selector;
use url::Url;

/// The page's current location, injected by the embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn parse(input: &str) -> PageResult<Self> {
        let url = Url::parse(input).map_err(|error| {
            PageError::new(
                "path.location.invalid",
                format!("failed to parse location `{input}`: {error}"),
            )
        })?;

        if url.cannot_be_a_base() {
            return Err(PageError::new(
                "path.location.invalid_base",
                "location URL cannot serve as a base for link resolution",
            ));
        }

        Ok(Self { url })
    }

    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    /// URL fragment without the leading `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment()
    }

    /// Resolves an href against this location and returns its path.
    ///
    /// Only the path takes part in comparisons; host and query are
    /// deliberately ignored, like the host platform's `anchor.pathname`.
    pub fn resolve_pathname(&self, href: &str) -> Option<String> {
        self.url.join(href).ok().map(|joined| joined.path().to_owned())
    }

    /// Resolves an href against this location and returns its fragment
    /// without the leading `#`, if the resolved URL carries one.
    pub fn resolve_fragment(&self, href: &str) -> Option<String> {
        self.url
            .join(href)
            .ok()
            .and_then(|joined| joined.fragment().map(ToOwned::to_owned))
    }
}

/// Normalized form used for path equality: the first occurrence of the
/// literal `index.html` is stripped.
pub fn compare_value(path: &str) -> String {
    path.replacen("index.html", "", 1)
}

/// Whether two paths address the same document.
pub fn eq_pathname(left: &str, right: &str) -> bool {
    compare_value(left) == compare_value(right)
}

/// Search scope for anchor collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope<'a> {
    /// CSS selector prefix; the empty string scopes to the whole document.
    Selector(&'a str),
    /// Subtree under a specific element.
    Element(NodeId),
}

/// Finds anchors whose resolved path equals the current location's.
#[derive(Debug, Clone, Copy)]
pub struct PathMatcher<'a> {
    document: &'a Document,
    location: &'a Location,
}

impl<'a> PathMatcher<'a> {
    pub fn new(document: &'a Document, location: &'a Location) -> Self {
        Self { document, location }
    }

    /// All anchors under `scope` pointing at the current page.
    ///
    /// A scope that matches nothing (including a malformed selector)
    /// yields an empty list, never an error.
    pub fn find_all(&self, scope: SearchScope<'_>) -> Vec<NodeId> {
        self.collect_anchors(scope)
            .into_iter()
            .filter(|anchor| self.is_current_path(*anchor))
            .collect()
    }

    /// First current-page anchor under `scope`, if any.
    pub fn find_first(&self, scope: SearchScope<'_>) -> Option<NodeId> {
        self.find_all(scope).into_iter().next()
    }

    /// Whether any current-page anchor exists under `scope`.
    pub fn exists(&self, scope: SearchScope<'_>) -> bool {
        !self.find_all(scope).is_empty()
    }

    /// Whether the anchor's href resolves to the current page's path.
    pub fn is_current_path(&self, anchor: NodeId) -> bool {
        let Some(href) = self.document.attribute(anchor, "href") else {
            return false;
        };
        let Some(resolved) = self.location.resolve_pathname(href) else {
            return false;
        };

        eq_pathname(&resolved, self.location.pathname())
    }

    fn collect_anchors(&self, scope: SearchScope<'_>) -> Vec<NodeId> {
        match scope {
            SearchScope::Selector(prefix) => {
                let Ok(selector) = Selector::parse(&format!("{prefix} a")) else {
                    return Vec::new();
                };
                self.document.select(&selector)
            }
            SearchScope::Element(element) => {
                let Ok(selector) = Selector::parse("a") else {
                    return Vec::new();
                };
                self.document.select_under(element, &selector)
            }
        }
    }
}
