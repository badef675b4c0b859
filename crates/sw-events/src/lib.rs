//! Page lifecycle events and serial subscriber dispatch.
//!
//! The host runtime delivers events one at a time; subscribers run to
//! completion in registration order, so handlers never observe each other
//! mid-flight. `Ready` is driven before `Loaded` by the page layer; the
//! bus itself only guarantees registration order within one event.

use sw_dom::NodeId;

/// Page lifecycle and interaction events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Document parsed; behaviors may attach.
    Ready,
    /// All resources loaded; late position corrections run here.
    Loaded,
    /// Viewport scroll position changed.
    Scrolled,
    /// Viewport dimensions changed.
    Resized,
    /// An element was activated.
    Clicked { target: NodeId },
}

/// Event discriminant used for subscription filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ready,
    Loaded,
    Scrolled,
    Resized,
    Clicked,
}

impl PageEvent {
    pub fn kind(self) -> EventKind {
        match self {
            Self::Ready => EventKind::Ready,
            Self::Loaded => EventKind::Loaded,
            Self::Scrolled => EventKind::Scrolled,
            Self::Resized => EventKind::Resized,
            Self::Clicked { .. } => EventKind::Clicked,
        }
    }
}

/// Subscriber verdict for a delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Event observed; default host behavior proceeds.
    Observed,
    /// Default host behavior (e.g. anchor navigation) must not run.
    PreventDefault,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    /// Subscribers that received the event.
    pub delivered: usize,
    /// Whether any subscriber suppressed the default behavior.
    pub default_prevented: bool,
}

type Handler<S, E> = Box<dyn FnMut(&mut S, &mut E, &PageEvent) -> Reaction>;

struct Subscription<S, E> {
    kind: EventKind,
    handler: Handler<S, E>,
}

/// Ordered, serial event dispatcher.
///
/// `S` is the behavior state mutated by handlers; `E` is the per-dispatch
/// environment (viewport, metrics) lent by the caller.
pub struct EventBus<S, E> {
    subscriptions: Vec<Subscription<S, E>>,
}

impl<S, E> Default for EventBus<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> EventBus<S, E> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Registers a handler for one event kind. Registration order is
    /// delivery order.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut S, &mut E, &PageEvent) -> Reaction + 'static,
    ) {
        self.subscriptions.push(Subscription {
            kind,
            handler: Box::new(handler),
        });
    }

    /// Delivers `event` to every matching subscriber, in order.
    pub fn dispatch(&mut self, state: &mut S, env: &mut E, event: PageEvent) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for subscription in &mut self.subscriptions {
            if subscription.kind != event.kind() {
                continue;
            }

            summary.delivered += 1;
            if (subscription.handler)(state, env, &event) == Reaction::PreventDefault {
                summary.default_prevented = true;
            }
        }

        summary
    }
}
