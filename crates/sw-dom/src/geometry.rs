//! Injected geometry: rendered measurements and the scrollable viewport.
//!
//! The engine never measures anything itself. The embedder supplies a
//! [`Metrics`] implementation answering per-node questions from its own
//! renderer, and a [`Viewport`] carrying scroll state. Operations degrade
//! to no-ops when a measurement is unavailable.

use crate::NodeId;
use std::collections::HashMap;

/// How a scroll request should be animated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// A request to move the viewport to an absolute vertical position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f32,
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    pub fn smooth(top: f32) -> Self {
        Self {
            top,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

/// Scrollable viewport abstraction.
pub trait Viewport {
    /// Current vertical scroll offset.
    fn scroll_y(&self) -> f32;

    /// Height of the visible area.
    fn inner_height(&self) -> f32;

    /// Moves the viewport; the host decides how to animate.
    fn scroll_to(&mut self, request: ScrollRequest);
}

/// Rendered element measurements.
pub trait Metrics {
    /// Rendered height of the element, `None` when it has no box.
    fn offset_height(&self, node: NodeId) -> Option<f32>;

    /// Top edge of the element relative to the viewport top, `None` when
    /// the element has no box.
    fn viewport_top(&self, node: NodeId) -> Option<f32>;
}

/// Map-backed [`Metrics`] for headless embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MapMetrics {
    offset_heights: HashMap<NodeId, f32>,
    viewport_tops: HashMap<NodeId, f32>,
}

impl MapMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset_height(mut self, node: NodeId, height: f32) -> Self {
        self.offset_heights.insert(node, height);
        self
    }

    pub fn with_viewport_top(mut self, node: NodeId, top: f32) -> Self {
        self.viewport_tops.insert(node, top);
        self
    }

    pub fn set_viewport_top(&mut self, node: NodeId, top: f32) {
        self.viewport_tops.insert(node, top);
    }
}

impl Metrics for MapMetrics {
    fn offset_height(&self, node: NodeId) -> Option<f32> {
        self.offset_heights.get(&node).copied()
    }

    fn viewport_top(&self, node: NodeId) -> Option<f32> {
        self.viewport_tops.get(&node).copied()
    }
}

/// [`Viewport`] that records every scroll request it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingViewport {
    scroll_y: f32,
    inner_height: f32,
    requests: Vec<ScrollRequest>,
}

impl RecordingViewport {
    pub fn new(scroll_y: f32, inner_height: f32) -> Self {
        Self {
            scroll_y,
            inner_height,
            requests: Vec::new(),
        }
    }

    pub fn requests(&self) -> &[ScrollRequest] {
        &self.requests
    }
}

impl Viewport for RecordingViewport {
    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn inner_height(&self) -> f32 {
        self.inner_height
    }

    fn scroll_to(&mut self, request: ScrollRequest) {
        self.scroll_y = request.top;
        self.requests.push(request);
    }
}
