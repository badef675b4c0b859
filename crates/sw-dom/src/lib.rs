//! DOM tree data structures and queries.

mod geometry;
mod selector;
mod style;

pub use geometry::MapMetrics;
pub use geometry::Metrics;
pub use geometry::RecordingViewport;
pub use geometry::ScrollBehavior;
pub use geometry::ScrollRequest;
pub use geometry::Viewport;
pub use selector::Selector;

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

/// Document tree backed by a flat node arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only the synthetic root element.
    pub fn new() -> Self {
        let root_node = Node {
            data: NodeData::Element {
                tag: "#document".to_owned(),
                attrs: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };

        Self {
            nodes: vec![root_node],
            root: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(text.to_owned()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent >= self.nodes.len() || child >= self.nodes.len() || parent == child {
            return;
        }

        if let Some(old_parent) = self.nodes[child].parent {
            self.nodes[old_parent]
                .children
                .retain(|existing| *existing != child);
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id).map(|node| &node.data),
            Some(NodeData::Element { .. })
        )
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id).map(|node| &node.data) {
            Some(NodeData::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id).map(|node| &node.data) {
            Some(NodeData::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(id).map(|node| &node.data) {
            Some(NodeData::Element { attrs, .. }) => attrs
                .iter()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let NodeData::Element { attrs, .. } = &mut node.data else {
            return;
        };

        let lower = name.to_ascii_lowercase();
        if let Some(existing) = attrs
            .iter_mut()
            .find(|(attr_name, _)| *attr_name == lower)
        {
            existing.1 = value.to_owned();
            return;
        }

        attrs.push((lower, value.to_owned()));
    }

    fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let NodeData::Element { attrs, .. } = &mut node.data else {
            return;
        };

        attrs.retain(|(attr_name, _)| !attr_name.eq_ignore_ascii_case(name));
    }

    /// Concatenated text of the subtree rooted at `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(id).map(|node| &node.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element { .. }) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Elements in the subtree under `scope`, preorder, excluding `scope` itself.
    pub fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_elements(scope, &mut out);
        out
    }

    fn walk_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(id) {
            if self.is_element(*child) {
                out.push(*child);
            }
            self.walk_elements(*child, out);
        }
    }

    /// First element whose `id` attribute equals `value`.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendant_elements(self.root)
            .into_iter()
            .find(|candidate| self.attribute(*candidate, "id") == Some(value))
    }

    // Class-list operations. Classes live in the `class` attribute,
    // whitespace separated.

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|list| list.split_whitespace().any(|entry| entry == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if class.is_empty() || self.has_class(id, class) {
            return;
        }

        let mut list = self
            .attribute(id, "class")
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        if !list.is_empty() {
            list.push(' ');
        }
        list.push_str(class);
        self.set_attribute(id, "class", &list);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(list) = self.attribute(id, "class") else {
            return;
        };

        let remaining = list
            .split_whitespace()
            .filter(|entry| *entry != class)
            .collect::<Vec<_>>()
            .join(" ");

        if remaining.is_empty() {
            self.remove_attribute(id, "class");
        } else {
            self.set_attribute(id, "class", &remaining);
        }
    }

    /// Sets class presence and reports whether the class is now present.
    pub fn set_class(&mut self, id: NodeId, class: &str, present: bool) -> bool {
        if present {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
        present
    }

    // Inline-style operations over the `style` attribute.

    /// Value of an inline style property, empty string when not declared.
    ///
    /// Mirrors the host platform's `element.style.<prop>` read, which yields
    /// `""` for properties absent from the attribute.
    pub fn style_property(&self, id: NodeId, property: &str) -> String {
        let Some(source) = self.attribute(id, "style") else {
            return String::new();
        };

        style::property_value(source, property).unwrap_or_default()
    }

    /// Writes an inline style property, keeping unrelated declarations.
    ///
    /// An empty `value` removes the declaration.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        let source = self
            .attribute(id, "style")
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        let rewritten = style::with_property(&source, property, value);

        if rewritten.is_empty() {
            self.remove_attribute(id, "style");
        } else {
            self.set_attribute(id, "style", &rewritten);
        }
    }

    // Selector queries.

    /// All elements matching `selector`, preorder.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.select_under(self.root, selector)
    }

    /// Elements matching `selector` within the subtree under `scope`.
    pub fn select_under(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .filter(|candidate| selector.matches(self, *candidate))
            .collect()
    }
}
