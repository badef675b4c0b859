//! Viewport-dependent sizing for the fixed side panels.
//!
//! The sidebar and the contents panel sit between a fixed header and the
//! page footer. On load and on every resize their inline `top`,
//! `max-height` and `min-height` are recomputed from the measured chrome
//! so they fill exactly the space between.

use sw_dom::Document;
use sw_dom::Metrics;
use sw_dom::NodeId;
use sw_dom::Viewport;

/// Breathing room kept above the footer so the panel's bottom border
/// never touches it.
const FOOTER_GAP_PX: f32 = 2.0;

const PANEL_IDS: [&str; 2] = ["sidebar", "table_of_contents"];

/// Computed inline sizing for one side panel, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSizing {
    pub top: f32,
    pub max_height: f32,
    pub min_height: f32,
}

impl PanelSizing {
    /// Pure sizing rule: the panel starts at the header's bottom edge,
    /// may grow to the viewport bottom, and shrinks no further than the
    /// space left once the footer scrolls into view.
    pub fn compute(header_height: f32, footer_height: f32, viewport_height: f32) -> Self {
        let max_height = viewport_height - header_height;
        Self {
            top: header_height,
            max_height,
            min_height: max_height - footer_height - FOOTER_GAP_PX,
        }
    }

    /// Writes the sizing onto the panel's inline style.
    pub fn apply(&self, document: &mut Document, panel: NodeId) {
        document.set_style_property(panel, "top", &px(self.top));
        document.set_style_property(panel, "max-height", &px(self.max_height));
        document.set_style_property(panel, "min-height", &px(self.min_height));
    }
}

/// Resizes both side panels from the current header, footer and viewport
/// measurements. Panels that are absent are skipped; missing chrome
/// measurements leave every panel's previous sizing in place.
pub fn resize_panels(document: &mut Document, metrics: &dyn Metrics, viewport: &dyn Viewport) {
    let Some(header_height) = measure_by_id(document, metrics, "header") else {
        log::debug!("header unmeasured; keeping panel sizing");
        return;
    };
    let Some(footer_height) = measure_by_id(document, metrics, "footer") else {
        log::debug!("footer unmeasured; keeping panel sizing");
        return;
    };

    let sizing = PanelSizing::compute(header_height, footer_height, viewport.inner_height());
    for id in PANEL_IDS {
        if let Some(panel) = document.element_by_id(id) {
            sizing.apply(document, panel);
        }
    }
}

fn measure_by_id(document: &Document, metrics: &dyn Metrics, id: &str) -> Option<f32> {
    let element = document.element_by_id(id)?;
    metrics.offset_height(element)
}

/// Formats a pixel length the way inline styles carry it: whole values
/// without a fractional part.
fn px(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}px")
    } else {
        format!("{value}px")
    }
}

#[cfg(test)]
mod tests {
    use super::PanelSizing;
    use super::px;
    use super::resize_panels;
    use sw_dom::Document;
    use sw_dom::MapMetrics;
    use sw_dom::NodeId;
    use sw_dom::RecordingViewport;

    fn chrome_fixture() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let header = doc.create_element("header");
        doc.set_attribute(header, "id", "header");
        let footer = doc.create_element("footer");
        doc.set_attribute(footer, "id", "footer");
        let sidebar = doc.create_element("nav");
        doc.set_attribute(sidebar, "id", "sidebar");
        let contents = doc.create_element("nav");
        doc.set_attribute(contents, "id", "table_of_contents");
        for node in [header, footer, sidebar, contents] {
            doc.append_child(doc.root(), node);
        }
        (doc, header, footer, sidebar, contents)
    }

    #[test]
    fn sizing_fills_the_space_between_header_and_footer() {
        let sizing = PanelSizing::compute(50.0, 30.0, 800.0);
        assert_eq!(sizing.top, 50.0);
        assert_eq!(sizing.max_height, 750.0);
        assert_eq!(sizing.min_height, 718.0);
    }

    #[test]
    fn resize_writes_inline_styles_on_both_panels() {
        let (mut doc, header, footer, sidebar, contents) = chrome_fixture();
        let metrics = MapMetrics::new()
            .with_offset_height(header, 50.0)
            .with_offset_height(footer, 30.0);
        let viewport = RecordingViewport::new(0.0, 800.0);

        resize_panels(&mut doc, &metrics, &viewport);

        for panel in [sidebar, contents] {
            assert_eq!(doc.style_property(panel, "top"), "50px");
            assert_eq!(doc.style_property(panel, "max-height"), "750px");
            assert_eq!(doc.style_property(panel, "min-height"), "718px");
        }
    }

    #[test]
    fn missing_chrome_measurement_keeps_previous_sizing() {
        let (mut doc, header, _, sidebar, _) = chrome_fixture();
        doc.set_style_property(sidebar, "top", "64px");
        let metrics = MapMetrics::new().with_offset_height(header, 50.0);
        let viewport = RecordingViewport::new(0.0, 800.0);

        resize_panels(&mut doc, &metrics, &viewport);

        assert_eq!(doc.style_property(sidebar, "top"), "64px");
        assert_eq!(doc.style_property(sidebar, "max-height"), "");
    }

    #[test]
    fn absent_panels_are_skipped() {
        let mut doc = Document::new();
        let header = doc.create_element("header");
        doc.set_attribute(header, "id", "header");
        let footer = doc.create_element("footer");
        doc.set_attribute(footer, "id", "footer");
        doc.append_child(doc.root(), header);
        doc.append_child(doc.root(), footer);

        let metrics = MapMetrics::new()
            .with_offset_height(header, 40.0)
            .with_offset_height(footer, 20.0);
        let viewport = RecordingViewport::new(0.0, 600.0);

        resize_panels(&mut doc, &metrics, &viewport);
    }

    #[test]
    fn pixel_lengths_drop_whole_fractions() {
        assert_eq!(px(750.0), "750px");
        assert_eq!(px(0.0), "0px");
        assert_eq!(px(717.5), "717.5px");
    }
}
