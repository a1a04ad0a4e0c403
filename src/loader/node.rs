//! Scene data source nodes.

use std::collections::BTreeMap;

/// Scene data source node interface. For example, XML-backed nodes all
/// report the type tag `"XML"`.
pub trait Node {
    /// Node type tag.
    fn node_type(&self) -> &str;

    /// Path of the node within its document.
    fn path(&self) -> &str;

    /// Node name.
    fn name(&self) -> &str;

    fn has_attribute(&self, attribute: &str) -> bool {
        self.attribute(attribute).is_some()
    }

    /// Accesses an attribute by name.
    fn attribute(&self, attribute: &str) -> Option<&str>;

    /// The full attribute map.
    fn attributes(&self) -> &BTreeMap<String, String>;

    /// Ordered list of children.
    fn children(&self) -> Vec<&dyn Node>;

    /// Children filtered by name, in order.
    fn children_named(&self, name: &str) -> Vec<&dyn Node> {
        self.children()
            .into_iter()
            .filter(|c| c.name() == name)
            .collect()
    }
}

/// A plain in-memory node, useful for programmatic scene assembly and
/// tests.
pub struct BasicNode {
    node_type: String,
    path: String,
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<BasicNode>,
}

impl BasicNode {
    pub fn new(node_type: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            path: path.into(),
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: BasicNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }
}

impl Node for BasicNode {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }

    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.children.iter().map(|c| c as &dyn Node).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_access() {
        let n = BasicNode::new("XML", "/scene/bsdf", "bsdf")
            .with_attribute("type", "diffuse")
            .with_child(BasicNode::new("XML", "/scene/bsdf/texture", "reflectance"));
        assert_eq!(n.node_type(), "XML");
        assert_eq!(n.attribute("type"), Some("diffuse"));
        assert!(n.has_attribute("type"));
        assert!(!n.has_attribute("missing"));
        assert_eq!(n.children().len(), 1);
        assert_eq!(n.children_named("reflectance").len(), 1);
        assert_eq!(n.children_named("nope").len(), 0);
    }
}
