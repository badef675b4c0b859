//! Offset-corrected anchor scrolling and table-of-contents tracking.

use percent_encoding::percent_decode_str;
use sw_dom::Document;
use sw_dom::Metrics;
use sw_dom::NodeId;
use sw_dom::ScrollRequest;
use sw_dom::Selector;
use sw_dom::Viewport;
use sw_path::Location;

/// CSS class marking the table-of-contents entry in view.
pub const WATCHING_CLASS: &str = "watching";
/// CSS class for anchors that scroll back to the page top.
pub const SCROLL_TOP_CLASS: &str = "scroll-top";

/// Slack below the header's bottom edge before an entry counts as
/// reached. Absorbs sub-pixel jitter, so clicking a contents link always
/// lands its own entry on the watch line.
pub const WATCH_SLACK_PX: f32 = 10.0;

const CONTENTS_ANCHORS: &str = "#table_of_contents li > a";
const CONTENTS_WATCHING: &str = "#table_of_contents li.watching";

/// Scroll behaviors bound to the fixed header and the contents panel.
///
/// Everything the tracker does is best-effort: a missing header, target
/// or measurement turns the affected operation into a no-op.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTracker {
    header: Option<NodeId>,
}

impl ScrollTracker {
    pub fn new(header: Option<NodeId>) -> Self {
        Self { header }
    }

    /// Resolves the fixed header by its conventional id.
    pub fn from_document(document: &Document) -> Self {
        Self::new(document.element_by_id("header"))
    }

    fn header_height(&self, metrics: &dyn Metrics) -> Option<f32> {
        self.header.and_then(|header| metrics.offset_height(header))
    }

    /// Smooth-scrolls so `fragment`'s target sits below the fixed header.
    ///
    /// The fragment may carry a leading `#` and percent-encoding. Absent
    /// targets and unmeasured headers leave the viewport untouched.
    pub fn scroll_to_fragment(
        &self,
        document: &Document,
        metrics: &dyn Metrics,
        viewport: &mut dyn Viewport,
        fragment: &str,
    ) {
        let id = decode_fragment(fragment);
        if id.is_empty() {
            return;
        }

        let Some(target) = document.element_by_id(&id) else {
            log::debug!("no element with id `{id}`; skipping fragment scroll");
            return;
        };
        let Some(header_height) = self.header_height(metrics) else {
            log::debug!("header unmeasured; skipping fragment scroll");
            return;
        };
        let Some(target_top) = metrics.viewport_top(target) else {
            return;
        };

        let top = viewport.scroll_y() + target_top - header_height;
        viewport.scroll_to(ScrollRequest::smooth(top));
    }

    /// Smooth-scrolls the viewport back to the very top.
    pub fn scroll_to_top(&self, viewport: &mut dyn Viewport) {
        viewport.scroll_to(ScrollRequest::smooth(0.0));
    }

    /// Re-runs the fragment correction when the page arrived with a hash
    /// already set; rendered layout may have shifted during load.
    pub fn correct_initial_position(
        &self,
        document: &Document,
        location: &Location,
        metrics: &dyn Metrics,
        viewport: &mut dyn Viewport,
    ) {
        let Some(fragment) = location.fragment() else {
            return;
        };
        if fragment.is_empty() {
            return;
        }

        self.scroll_to_fragment(document, metrics, viewport, fragment);
    }

    /// Whether a click on `target` should be intercepted for in-page
    /// scrolling, and if so, which fragment to scroll to.
    ///
    /// Eligible anchors carry a non-empty fragment and resolve to the
    /// current page's path.
    pub fn intercept_fragment(
        &self,
        document: &Document,
        location: &Location,
        target: NodeId,
    ) -> Option<String> {
        if document.tag(target) != Some("a") {
            return None;
        }

        let href = document.attribute(target, "href")?;
        let fragment = location.resolve_fragment(href)?;
        if fragment.is_empty() {
            return None;
        }

        let resolved = location.resolve_pathname(href)?;
        if resolved != location.pathname() {
            return None;
        }

        Some(fragment)
    }

    /// Whether `target` is a scroll-to-top trigger anchor.
    pub fn is_scroll_top_trigger(&self, document: &Document, target: NodeId) -> bool {
        document.tag(target) == Some("a") && document.has_class(target, SCROLL_TOP_CLASS)
    }

    /// Recomputes which table-of-contents entry is in view and moves the
    /// `watching` mark accordingly. With every entry still below the
    /// watch line, no entry is marked.
    pub fn update_watching(&self, document: &mut Document, metrics: &dyn Metrics) {
        let Some(header_height) = self.header_height(metrics) else {
            log::debug!("header unmeasured; keeping previous watching mark");
            return;
        };

        if let Ok(selector) = Selector::parse(CONTENTS_WATCHING) {
            for item in document.select(&selector) {
                document.remove_class(item, WATCHING_CLASS);
            }
        }

        let positions = self.entry_positions(document, metrics, header_height);
        let Some(entry) = select_watching(&positions) else {
            return;
        };
        let Some(item) = document.parent(entry) else {
            return;
        };

        document.add_class(item, WATCHING_CLASS);
    }

    /// Signed distance each entry's target has scrolled past the watch
    /// line (header bottom plus slack). Entries whose target is missing
    /// or unmeasured are skipped.
    fn entry_positions(
        &self,
        document: &Document,
        metrics: &dyn Metrics,
        header_height: f32,
    ) -> Vec<(NodeId, f32)> {
        let Ok(selector) = Selector::parse(CONTENTS_ANCHORS) else {
            return Vec::new();
        };

        let mut positions = Vec::new();
        for anchor in document.select(&selector) {
            let Some(href) = document.attribute(anchor, "href") else {
                continue;
            };
            let Some(raw_fragment) = href.rsplit_once('#').map(|(_, fragment)| fragment) else {
                continue;
            };

            let id = decode_fragment(raw_fragment);
            if id.is_empty() {
                continue;
            }
            let Some(target) = document.element_by_id(&id) else {
                continue;
            };
            let Some(target_top) = metrics.viewport_top(target) else {
                continue;
            };

            let position_y = -(target_top - header_height - WATCH_SLACK_PX);
            positions.push((anchor, position_y));
        }

        positions
    }
}

/// Picks the entry closest above-or-at the watch line: the smallest
/// non-negative position. Ties keep the earlier entry.
pub fn select_watching(positions: &[(NodeId, f32)]) -> Option<NodeId> {
    let mut best: Option<(NodeId, f32)> = None;

    for (entry, position_y) in positions {
        if *position_y < 0.0 {
            continue;
        }

        match best {
            Some((_, best_position)) if *position_y >= best_position => {}
            _ => best = Some((*entry, *position_y)),
        }
    }

    best.map(|(entry, _)| entry)
}

fn decode_fragment(fragment: &str) -> String {
    let trimmed = fragment.trim_start_matches('#');
    percent_decode_str(trimmed).decode_utf8_lossy().into_owned()
}
