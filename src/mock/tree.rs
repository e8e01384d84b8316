//! The [`MockTree`] sum type and its deep merge.
//!
//! A tree is built from access paths. Merging is set-like: keys are unique
//! per level, a [`MockTree::Leaf`] meeting a [`MockTree::Node`] at the same key
//! becomes the node, and equality ignores the order keys were discovered in.
//! Discovery order is still kept so rendered output is stable.
//!
//! Member chains in the input can nest arbitrarily deep, so every operation
//! here (insert, merge, clone, equality, drop) walks the tree with an explicit
//! stack.

/// Which properties of a module were called, and in what shape.
#[derive(Debug, PartialEq, Eq)]
pub enum MockTree {
    /// A callable stub.
    Leaf,
    /// An object whose properties are themselves mocks.
    Node(MockNode),
}

/// Ordered, key-unique children of a [`MockTree::Node`]. Never empty.
#[derive(Debug)]
pub struct MockNode {
    entries: Vec<(String, MockTree)>,
}

impl MockNode {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up a child by key.
    pub fn get(&self, key: &str) -> Option<&MockTree> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Children in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MockTree)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every path from this node down to a leaf, in discovery order.
    pub fn leaf_paths(&self) -> Vec<Vec<&str>> {
        let mut paths = Vec::new();
        let mut prefix: Vec<&str> = Vec::new();
        let mut stack = vec![self.entries.iter()];

        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some((key, MockTree::Leaf)) => {
                    let mut path = prefix.clone();
                    path.push(key.as_str());
                    paths.push(path);
                }
                Some((key, MockTree::Node(child))) => {
                    prefix.push(key.as_str());
                    stack.push(child.entries.iter());
                }
                None => {
                    stack.pop();
                    prefix.pop();
                }
            }
        }

        paths
    }

    /// The child under `key`, inserting a leaf if absent.
    fn entry(&mut self, key: &str) -> &mut MockTree {
        let index = match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), MockTree::Leaf));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

impl Clone for MockNode {
    fn clone(&self) -> Self {
        let mut copy = MockNode::new();
        for path in self.leaf_paths() {
            let Some((last, parents)) = path.split_last() else {
                continue;
            };
            let mut node = &mut copy;
            for segment in parents {
                node = node.entry(segment).make_node();
            }
            node.entry(last);
        }
        copy
    }
}

impl Clone for MockTree {
    fn clone(&self) -> Self {
        match self {
            MockTree::Leaf => MockTree::Leaf,
            MockTree::Node(node) => MockTree::Node(node.clone()),
        }
    }
}

impl PartialEq for MockNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];

        while let Some((left, right)) = pending.pop() {
            if left.len() != right.len() {
                return false;
            }
            for (key, value) in left.iter() {
                match (value, right.get(key)) {
                    (MockTree::Leaf, Some(MockTree::Leaf)) => {}
                    (MockTree::Node(l), Some(MockTree::Node(r))) => pending.push((l, r)),
                    _ => return false,
                }
            }
        }

        true
    }
}

impl Eq for MockNode {}

impl Drop for MockNode {
    fn drop(&mut self) {
        fn take_children(node: &mut MockNode, pending: &mut Vec<MockNode>) {
            for (_, child) in node.entries.drain(..) {
                if let MockTree::Node(inner) = child {
                    pending.push(inner);
                }
            }
        }

        let mut pending = Vec::new();
        take_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            take_children(&mut node, &mut pending);
        }
    }
}

impl MockTree {
    /// The tree for a single access path: each segment nests the next, the
    /// deepest one maps to a leaf. An empty path is a bare leaf.
    ///
    /// ```
    /// use mockscope::mock::MockTree;
    ///
    /// let tree = MockTree::from_path(&["users", "create"]);
    /// let users = tree.get("users").unwrap();
    /// assert_eq!(users.get("create"), Some(&MockTree::Leaf));
    /// ```
    pub fn from_path<S: AsRef<str>>(path: &[S]) -> Self {
        let mut tree = MockTree::Leaf;
        tree.insert_path(path);
        tree
    }

    /// Returns true for a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, MockTree::Leaf)
    }

    /// Look up a direct child. Leaves have no children.
    pub fn get(&self, key: &str) -> Option<&MockTree> {
        match self {
            MockTree::Leaf => None,
            MockTree::Node(node) => node.get(key),
        }
    }

    /// Merge one access path into this tree.
    ///
    /// Leaves along the path are refined into nodes; an existing subtree at
    /// the end of the path is kept as is.
    pub fn insert_path<S: AsRef<str>>(&mut self, path: &[S]) {
        let mut current = self;
        for segment in path {
            current = current.make_node().entry(segment.as_ref());
        }
    }

    /// Deep-merge `other` into this tree.
    pub fn merge(&mut self, other: &MockTree) {
        for path in other.leaf_paths() {
            self.insert_path(path.as_slice());
        }
    }

    /// Every root-to-leaf path, in discovery order. A leaf has the single
    /// empty path.
    pub fn leaf_paths(&self) -> Vec<Vec<&str>> {
        match self {
            MockTree::Leaf => vec![Vec::new()],
            MockTree::Node(node) => node.leaf_paths(),
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree {
                MockTree::Leaf => count += 1,
                MockTree::Node(node) => stack.extend(node.entries.iter().map(|(_, v)| v)),
            }
        }
        count
    }

    fn make_node(&mut self) -> &mut MockNode {
        if self.is_leaf() {
            *self = MockTree::Node(MockNode::new());
        }
        match self {
            MockTree::Node(node) => node,
            MockTree::Leaf => unreachable!("leaf was replaced by a node"),
        }
    }
}
