//! Page orchestration: one object owning the document and its behaviors,
//! fed by the host's lifecycle and interaction events.
//!
//! `open` drives `Ready` before `Loaded`; afterwards the host forwards
//! scrolls, resizes and clicks. Handlers run serially in registration
//! order, so no behavior observes another mid-mutation.

use sw_dom::Document;
use sw_dom::Metrics;
use sw_dom::NodeId;
use sw_dom::Viewport;
use sw_events::DispatchSummary;
use sw_events::EventBus;
use sw_events::EventKind;
use sw_events::PageEvent;
use sw_events::Reaction;
use sw_html::HtmlParser;
use sw_layout::resize_panels;
use sw_nav::ToggleControl;
use sw_nav::highlight_current_links;
use sw_nav::install_sidebar_toggles;
use sw_path::Location;
use sw_scroll::ScrollTracker;

/// CSS class handed to code blocks for the highlighter's line numbering.
pub const LINE_NUMBERS_CLASS: &str = "line-numbers";

/// Geometry and viewport lent by the host for one dispatch.
pub struct HostBindings<'a> {
    pub metrics: &'a dyn Metrics,
    pub viewport: &'a mut dyn Viewport,
}

/// Dispatch outcomes of the two load-time events, in the order they ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenSummary {
    pub ready: DispatchSummary,
    pub loaded: DispatchSummary,
}

struct PageState {
    document: Document,
    location: Location,
    tracker: ScrollTracker,
    toggles: Vec<ToggleControl>,
}

/// A loaded documentation page with its behaviors attached.
pub struct Page {
    state: PageState,
}

impl Page {
    pub fn new(document: Document, location: Location) -> Self {
        let tracker = ScrollTracker::from_document(&document);
        Self {
            state: PageState {
                document,
                location,
                tracker,
                toggles: Vec::new(),
            },
        }
    }

    /// Parses `html` and wraps it as an unopened page.
    pub fn from_html(html: &str, location: Location) -> Self {
        Self::new(HtmlParser.parse(html), location)
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn location(&self) -> &Location {
        &self.state.location
    }

    /// Toggle controls installed at `Ready`; empty before `open`.
    pub fn toggles(&self) -> &[ToggleControl] {
        &self.state.toggles
    }

    /// Runs the load sequence: `Ready` (attach behaviors, decorate,
    /// initial sizing) then `Loaded` (fragment position correction).
    pub fn open(&mut self, metrics: &dyn Metrics, viewport: &mut dyn Viewport) -> OpenSummary {
        let ready = self.dispatch(metrics, viewport, PageEvent::Ready);
        let loaded = self.dispatch(metrics, viewport, PageEvent::Loaded);
        OpenSummary { ready, loaded }
    }

    pub fn handle_scroll(
        &mut self,
        metrics: &dyn Metrics,
        viewport: &mut dyn Viewport,
    ) -> DispatchSummary {
        self.dispatch(metrics, viewport, PageEvent::Scrolled)
    }

    pub fn handle_resize(
        &mut self,
        metrics: &dyn Metrics,
        viewport: &mut dyn Viewport,
    ) -> DispatchSummary {
        self.dispatch(metrics, viewport, PageEvent::Resized)
    }

    /// Routes a click on `target`. A `default_prevented` summary tells the
    /// host to suppress the element's native behavior.
    pub fn handle_click(
        &mut self,
        metrics: &dyn Metrics,
        viewport: &mut dyn Viewport,
        target: NodeId,
    ) -> DispatchSummary {
        self.dispatch(metrics, viewport, PageEvent::Clicked { target })
    }

    fn dispatch(
        &mut self,
        metrics: &dyn Metrics,
        viewport: &mut dyn Viewport,
        event: PageEvent,
    ) -> DispatchSummary {
        log::trace!("dispatching {event:?}");
        let mut bus = subscriptions();
        let mut io = HostBindings { metrics, viewport };
        bus.dispatch(&mut self.state, &mut io, event)
    }
}

/// The page's subscription table. Handlers capture nothing; the table is
/// rebuilt per dispatch so they can borrow that dispatch's host bindings.
fn subscriptions<'a>() -> EventBus<PageState, HostBindings<'a>> {
    let mut bus: EventBus<PageState, HostBindings<'a>> = EventBus::new();

    bus.subscribe(EventKind::Ready, |state, _io, _event| {
        decorate_code_blocks(&mut state.document);
        Reaction::Observed
    });
    bus.subscribe(EventKind::Ready, |state, _io, _event| {
        state.toggles = install_sidebar_toggles(&mut state.document, &state.location);
        highlight_current_links(&mut state.document, &state.location);
        Reaction::Observed
    });
    bus.subscribe(EventKind::Ready, |state, io, _event| {
        resize_panels(&mut state.document, io.metrics, &*io.viewport);
        Reaction::Observed
    });

    bus.subscribe(EventKind::Loaded, |state, io, _event| {
        let tracker = state.tracker;
        tracker.correct_initial_position(&state.document, &state.location, io.metrics, io.viewport);
        Reaction::Observed
    });

    bus.subscribe(EventKind::Scrolled, |state, io, _event| {
        let tracker = state.tracker;
        tracker.update_watching(&mut state.document, io.metrics);
        Reaction::Observed
    });

    bus.subscribe(EventKind::Resized, |state, io, _event| {
        resize_panels(&mut state.document, io.metrics, &*io.viewport);
        Reaction::Observed
    });

    bus.subscribe(EventKind::Clicked, |state, _io, event| {
        let PageEvent::Clicked { target } = *event else {
            return Reaction::Observed;
        };
        let PageState {
            document, toggles, ..
        } = state;
        if let Some(control) = toggles.iter_mut().find(|control| control.button() == target) {
            control.handle_click(document);
        }
        Reaction::Observed
    });
    bus.subscribe(EventKind::Clicked, |state, io, event| {
        let PageEvent::Clicked { target } = *event else {
            return Reaction::Observed;
        };
        if !state.tracker.is_scroll_top_trigger(&state.document, target) {
            return Reaction::Observed;
        }
        state.tracker.scroll_to_top(io.viewport);
        Reaction::PreventDefault
    });
    bus.subscribe(EventKind::Clicked, |state, io, event| {
        let PageEvent::Clicked { target } = *event else {
            return Reaction::Observed;
        };
        let tracker = state.tracker;
        let Some(fragment) = tracker.intercept_fragment(&state.document, &state.location, target)
        else {
            return Reaction::Observed;
        };
        tracker.scroll_to_fragment(&state.document, io.metrics, io.viewport, &fragment);
        Reaction::PreventDefault
    });

    bus
}

fn decorate_code_blocks(document: &mut Document) {
    for node in document.descendant_elements(document.root()) {
        if document.tag(node) == Some("pre") {
            document.add_class(node, LINE_NUMBERS_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Page;
    use sw_dom::MapMetrics;
    use sw_dom::NodeId;
    use sw_dom::RecordingViewport;
    use sw_nav::ToggleState;
    use sw_path::Location;

    const FIXTURE: &str = r##"
<header id="header">Docs</header>
<nav id="sidebar">
  <ul>
    <li><a href="/guide/">Guide</a>
      <ul><li><a href="/guide/setup.html">Setup</a></li></ul>
    </li>
    <li><a href="/reference/">Reference</a>
      <ul><li><a href="/reference/api.html">API</a></li></ul>
    </li>
  </ul>
</nav>
<nav id="table_of_contents">
  <ul>
    <li><a href="#intro">Intro</a></li>
    <li><a href="#usage">Usage</a></li>
  </ul>
</nav>
<main>
  <h2 id="intro">Intro</h2>
  <pre>fn main() {}</pre>
  <h2 id="usage">Usage</h2>
  <p><a class="scroll-top" href="#">Top</a></p>
  <a id="elsewhere" href="/reference/#usage">other page</a>
</main>
<footer id="footer">Footer</footer>
"##;

    fn location(input: &str) -> Location {
        match Location::parse(input) {
            Ok(location) => location,
            Err(error) => panic!("{error}"),
        }
    }

    fn by_id(page: &Page, id: &str) -> NodeId {
        match page.document().element_by_id(id) {
            Some(node) => node,
            None => panic!("fixture is missing #{id}"),
        }
    }

    fn chrome_metrics(page: &Page) -> MapMetrics {
        MapMetrics::new()
            .with_offset_height(by_id(page, "header"), 50.0)
            .with_offset_height(by_id(page, "footer"), 30.0)
    }

    #[test]
    fn open_attaches_all_load_time_behaviors() {
        let mut page = Page::from_html(FIXTURE, location("https://docs.example.com/guide/"));
        let metrics = chrome_metrics(&page);
        let mut viewport = RecordingViewport::new(0.0, 800.0);

        let summary = page.open(&metrics, &mut viewport);
        assert_eq!(summary.ready.delivered, 3);
        assert!(!summary.ready.default_prevented);

        // Code blocks decorated.
        let doc = page.document();
        let pre = doc
            .descendant_elements(doc.root())
            .into_iter()
            .find(|node| doc.tag(*node) == Some("pre"));
        match pre {
            Some(pre) => assert!(doc.has_class(pre, "line-numbers")),
            None => panic!("fixture is missing a pre element"),
        }

        // The section containing the current page opens; the other stays
        // collapsed.
        assert_eq!(page.toggles().len(), 2);
        let states = page
            .toggles()
            .iter()
            .map(|control| control.state())
            .collect::<Vec<_>>();
        assert_eq!(states, vec![ToggleState::Open, ToggleState::Closed]);

        // Panels sized from the measured chrome.
        for panel in ["sidebar", "table_of_contents"] {
            let panel = by_id(&page, panel);
            assert_eq!(page.document().style_property(panel, "top"), "50px");
            assert_eq!(page.document().style_property(panel, "max-height"), "750px");
            assert_eq!(page.document().style_property(panel, "min-height"), "718px");
        }

        // No fragment in the location, so loading scrolls nowhere.
        assert!(viewport.requests().is_empty());
    }

    #[test]
    fn open_with_fragment_corrects_the_scroll_position() {
        let mut page = Page::from_html(FIXTURE, location("https://docs.example.com/guide/#usage"));
        let metrics = chrome_metrics(&page).with_viewport_top(by_id(&page, "usage"), 420.0);
        let mut viewport = RecordingViewport::new(0.0, 800.0);

        page.open(&metrics, &mut viewport);

        assert_eq!(viewport.requests().len(), 1);
        assert_eq!(viewport.requests()[0].top, 420.0 - 50.0);
    }

    #[test]
    fn clicks_route_to_the_matching_behavior() {
        let mut page = Page::from_html(FIXTURE, location("https://docs.example.com/guide/"));
        let metrics = chrome_metrics(&page);
        let mut viewport = RecordingViewport::new(300.0, 800.0);
        page.open(&metrics, &mut viewport);

        // Toggle button: section collapses, native behavior untouched.
        let button = page.toggles()[0].button();
        let target = page.toggles()[0].target();
        let summary = page.handle_click(&metrics, &mut viewport, button);
        assert!(!summary.default_prevented);
        assert_eq!(page.document().style_property(target, "display"), "none");
        assert_eq!(page.toggles()[0].state(), ToggleState::Closed);

        // Scroll-top trigger: back to 0, navigation suppressed.
        let top_anchor = {
            let doc = page.document();
            doc.descendant_elements(doc.root())
                .into_iter()
                .find(|node| doc.has_class(*node, "scroll-top"))
        };
        let top_anchor = match top_anchor {
            Some(anchor) => anchor,
            None => panic!("fixture is missing the scroll-top anchor"),
        };
        let summary = page.handle_click(&metrics, &mut viewport, top_anchor);
        assert!(summary.default_prevented);
        assert_eq!(viewport.requests().last().map(|request| request.top), Some(0.0));

        // Anchor to another page: left to native navigation.
        let recorded = viewport.requests().len();
        let summary = page.handle_click(&metrics, &mut viewport, by_id(&page, "elsewhere"));
        assert!(!summary.default_prevented);
        assert_eq!(viewport.requests().len(), recorded);
    }

    #[test]
    fn clicking_a_contents_link_scrolls_below_the_header() {
        let mut page = Page::from_html(FIXTURE, location("https://docs.example.com/guide/"));
        let metrics = chrome_metrics(&page).with_viewport_top(by_id(&page, "intro"), 180.0);
        let mut viewport = RecordingViewport::new(40.0, 800.0);
        page.open(&metrics, &mut viewport);

        let anchor = {
            let doc = page.document();
            doc.descendant_elements(doc.root())
                .into_iter()
                .find(|node| doc.attribute(*node, "href") == Some("#intro"))
        };
        let anchor = match anchor {
            Some(anchor) => anchor,
            None => panic!("fixture is missing the #intro contents link"),
        };

        let summary = page.handle_click(&metrics, &mut viewport, anchor);
        assert!(summary.default_prevented);
        assert_eq!(viewport.requests().len(), 1);
        assert_eq!(viewport.requests()[0].top, 40.0 + 180.0 - 50.0);
    }

    #[test]
    fn scrolling_tracks_the_visible_contents_entry() {
        let mut page = Page::from_html(FIXTURE, location("https://docs.example.com/guide/"));
        let mut viewport = RecordingViewport::new(0.0, 800.0);
        page.open(&chrome_metrics(&page), &mut viewport);

        let contents = by_id(&page, "table_of_contents");
        let items = {
            let doc = page.document();
            doc.descendant_elements(contents)
                .into_iter()
                .filter(|node| doc.tag(*node) == Some("li"))
                .collect::<Vec<_>>()
        };
        assert_eq!(items.len(), 2);

        // Intro passed the watch line, usage still below it.
        let metrics = chrome_metrics(&page)
            .with_viewport_top(by_id(&page, "intro"), -100.0)
            .with_viewport_top(by_id(&page, "usage"), 70.0);
        page.handle_scroll(&metrics, &mut viewport);
        assert!(page.document().has_class(items[0], "watching"));
        assert!(!page.document().has_class(items[1], "watching"));

        // Scrolled back above everything: the mark clears.
        let metrics = chrome_metrics(&page)
            .with_viewport_top(by_id(&page, "intro"), 200.0)
            .with_viewport_top(by_id(&page, "usage"), 600.0);
        page.handle_scroll(&metrics, &mut viewport);
        assert!(!page.document().has_class(items[0], "watching"));
        assert!(!page.document().has_class(items[1], "watching"));
    }

    #[test]
    fn resizing_recomputes_panel_sizing() {
        let mut page = Page::from_html(FIXTURE, location("https://docs.example.com/guide/"));
        let metrics = chrome_metrics(&page);
        let mut viewport = RecordingViewport::new(0.0, 800.0);
        page.open(&metrics, &mut viewport);

        let mut shorter = RecordingViewport::new(0.0, 600.0);
        page.handle_resize(&metrics, &mut shorter);

        let sidebar = by_id(&page, "sidebar");
        assert_eq!(page.document().style_property(sidebar, "max-height"), "550px");
        assert_eq!(page.document().style_property(sidebar, "min-height"), "518px");
    }
}
