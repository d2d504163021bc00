/// A named node of the config tree.
///
/// Values are kept as ordered `(key, value)` pairs so duplicate keys survive a
/// read/write cycle, and child nodes keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigNode {
    pub name: String,
    values: Vec<(String, String)>,
    nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Creates an empty node with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Returns the first value stored under `key`
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value stored under `key`, in order
    pub fn get_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.iter().any(|(k, _)| k == key)
    }

    /// Appends a value, keeping any existing values with the same key
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    /// Replaces the first value under `key`, or appends it if absent
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        match self.values.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.into(),
            None => self.values.push((key.to_string(), value.into())),
        }
    }

    /// All values in declaration order
    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// Returns the first child node named `name`
    pub fn get_node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn get_node_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Returns every child node named `name`, in order
    pub fn get_nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    /// Returns the child node named `name` that follows `n` others of that name
    pub fn nth_node(&self, name: &str, n: usize) -> Option<&ConfigNode> {
        self.nodes.iter().filter(|c| c.name == name).nth(n)
    }

    pub fn nth_node_mut(&mut self, name: &str, n: usize) -> Option<&mut ConfigNode> {
        self.nodes.iter_mut().filter(|c| c.name == name).nth(n)
    }

    pub fn add_node(&mut self, node: ConfigNode) {
        self.nodes.push(node);
    }

    /// Removes every child node named `name` and returns how many were dropped
    pub fn remove_nodes(&mut self, name: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.name != name);
        before - self.nodes.len()
    }

    /// All child nodes in declaration order
    pub fn nodes(&self) -> &[ConfigNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keys_are_kept_in_order() {
        let mut node = ConfigNode::new("STATIC");
        node.add_value("tag", "a");
        node.add_value("mesh", "hangar.mu");
        node.add_value("tag", "b");

        assert_eq!(node.get_value("tag"), Some("a"));
        assert_eq!(node.get_values("tag").collect::<Vec<_>>(), vec!["a", "b"]);

        node.set_value("tag", "c");
        assert_eq!(node.get_values("tag").collect::<Vec<_>>(), vec!["c", "b"]);
        assert_eq!(node.values()[1], ("mesh".to_string(), "hangar.mu".to_string()));
    }

    #[test]
    fn test_remove_nodes_leaves_siblings() {
        let mut node = ConfigNode::new("STATIC");
        node.add_node(ConfigNode::new("Instances"));
        node.add_node(ConfigNode::new("MODULE"));
        node.add_node(ConfigNode::new("Instances"));

        assert_eq!(node.remove_nodes("Instances"), 2);
        assert!(!node.has_node("Instances"));
        assert!(node.has_node("MODULE"));
        assert_eq!(node.remove_nodes("Instances"), 0);
    }
}
