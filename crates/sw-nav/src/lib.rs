//! Sidebar navigation behaviors: collapsible sections and current-page
//! highlighting.

use sw_dom::Document;
use sw_dom::NodeId;
use sw_path::Location;
use sw_path::PathMatcher;
use sw_path::SearchScope;

/// CSS class marking the expanded state on a toggle button.
pub const ACTIVE_CLASS: &str = "active";
/// CSS class identifying generated toggle buttons.
pub const TOGGLE_BUTTON_CLASS: &str = "toggle-btn";
/// CSS class marking the current-page navigation entry.
pub const WATCHING_CLASS: &str = "watching";

const SIDEBAR_NESTED_LISTS: &str = "#sidebar > ul ul";
const SIDEBAR_ITEM_ANCHORS: &str = "#sidebar li >";

/// Open/closed state of one collapsible section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Open,
    Closed,
}

impl ToggleState {
    /// Pure transition: a click flips the state.
    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A generated expand/collapse control bound to a menu subtree.
///
/// The button's `active` class and the subtree's inline display are only
/// ever written together through [`ToggleControl::apply`], so external
/// readers never observe them out of sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleControl {
    button: NodeId,
    target: NodeId,
    // Inline display of the target captured once, before any toggling.
    default_display: String,
    state: ToggleState,
}

impl ToggleControl {
    /// Creates the button under `parent_item` and projects the initial
    /// state onto the DOM.
    pub fn install(
        document: &mut Document,
        parent_item: NodeId,
        target: NodeId,
        initial: ToggleState,
    ) -> Self {
        let default_display = document.style_property(target, "display");
        let button = document.create_element("button");
        document.add_class(button, TOGGLE_BUTTON_CLASS);
        document.append_child(parent_item, button);

        let control = Self {
            button,
            target,
            default_display,
            state: initial,
        };
        control.apply(document);
        control
    }

    /// User interaction: flip the state and re-project.
    pub fn handle_click(&mut self, document: &mut Document) {
        self.state = self.state.toggled();
        self.apply(document);
    }

    /// Projects the current state onto the button class and the target's
    /// inline display.
    fn apply(&self, document: &mut Document) {
        document.set_class(self.button, ACTIVE_CLASS, self.state.is_open());
        if self.state.is_open() {
            document.set_style_property(self.target, "display", &self.default_display);
        } else {
            document.set_style_property(self.target, "display", "none");
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn button(&self) -> NodeId {
        self.button
    }

    pub fn target(&self) -> NodeId {
        self.target
    }
}

/// Adds a toggle control to every nested sidebar list.
///
/// A section defaults open when its parent item links to the current
/// page, so the reader's place in the menu is visible on arrival.
pub fn install_sidebar_toggles(document: &mut Document, location: &Location) -> Vec<ToggleControl> {
    let Ok(selector) = sw_dom::Selector::parse(SIDEBAR_NESTED_LISTS) else {
        return Vec::new();
    };

    let nested_lists = document.select(&selector);
    let mut controls = Vec::with_capacity(nested_lists.len());

    for list in nested_lists {
        let Some(parent_item) = document.parent(list) else {
            log::debug!("nested sidebar list {list} has no parent item; skipping toggle");
            continue;
        };

        let contains_current =
            PathMatcher::new(document, location).exists(SearchScope::Element(parent_item));
        let initial = if contains_current {
            ToggleState::Open
        } else {
            ToggleState::Closed
        };

        controls.push(ToggleControl::install(document, parent_item, list, initial));
    }

    controls
}

/// Marks the parent items of current-page sidebar anchors as `watching`.
pub fn highlight_current_links(document: &mut Document, location: &Location) {
    let anchors =
        PathMatcher::new(document, location).find_all(SearchScope::Selector(SIDEBAR_ITEM_ANCHORS));

    for anchor in anchors {
        let Some(item) = document.parent(anchor) else {
            continue;
        };
        document.add_class(item, WATCHING_CLASS);
    }
}
