//! Comment-preserving document tree.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A mapping stores
//! its entries as ordered `(key, value)` pairs, so pairs can never come apart
//! and insertion order survives any sequence of edits.
//!
//! [`Document::find_entry`], [`Document::set_string_value`] and
//! [`Document::remove_entry`] are the only ways settings are changed; every
//! scope funnels through them.

use crate::error::ConfigError;

use super::emit::is_plain_safe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Scalar { value: String, style: ScalarStyle },
    Mapping(Vec<(NodeId, NodeId)>),
    Sequence(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,

    /// Comment lines above the node, `""` for a blank line.
    pub head_comment: Vec<String>,

    /// Trailing `# ...` on the node's own line.
    pub line_comment: Option<String>,

    /// Comment lines after the last entry (mappings only).
    pub foot_comment: Vec<String>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            head_comment: Vec::new(),
            line_comment: None,
            foot_comment: Vec::new(),
        }
    }
}

/// Position of a key/value pair inside a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub key: NodeId,
    pub value: NodeId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty root mapping.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.new_mapping();
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Node behind `id`, `None` for an id minted by another document.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    // ---------- construction ----------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// New scalar whose style is plain when the text allows it.
    pub fn new_scalar(&mut self, value: &str) -> NodeId {
        let style = style_for(value, ScalarStyle::Plain);
        self.new_scalar_with_style(value, style)
    }

    pub(crate) fn new_scalar_with_style(&mut self, value: &str, style: ScalarStyle) -> NodeId {
        self.push(NodeKind::Scalar {
            value: value.to_string(),
            style,
        })
    }

    pub fn new_mapping(&mut self) -> NodeId {
        self.push(NodeKind::Mapping(Vec::new()))
    }

    pub fn new_sequence(&mut self) -> NodeId {
        self.push(NodeKind::Sequence(Vec::new()))
    }

    pub(crate) fn push_pair(&mut self, map: NodeId, key: NodeId, value: NodeId) {
        if let Some(Node {
            kind: NodeKind::Mapping(entries),
            ..
        }) = self.nodes.get_mut(map.0)
        {
            entries.push((key, value));
        }
    }

    pub(crate) fn push_item(&mut self, seq: NodeId, item: NodeId) {
        if let Some(Node {
            kind: NodeKind::Sequence(items),
            ..
        }) = self.nodes.get_mut(seq.0)
        {
            items.push(item);
        }
    }

    pub fn set_head_comment<I, S>(&mut self, id: NodeId, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.head_comment = lines.into_iter().map(Into::into).collect();
        }
    }

    // ---------- inspection ----------

    pub fn scalar(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_mapping(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(Node { kind: NodeKind::Mapping(_), .. }))
    }

    /// Entries of a mapping node; empty for any other kind.
    pub fn entries(&self, map: NodeId) -> &[(NodeId, NodeId)] {
        match self.get(map).map(|node| &node.kind) {
            Some(NodeKind::Mapping(entries)) => entries,
            _ => &[],
        }
    }

    /// Key texts of a mapping, in file order.
    pub fn keys(&self, map: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.entries(map)
            .iter()
            .filter_map(move |(k, _)| self.scalar(*k))
    }

    // ---------- entry locator ----------

    /// First entry whose key text equals `key`. Later duplicates are
    /// unreachable through this lookup.
    pub fn find_entry(&self, map: NodeId, key: &str) -> Option<Entry> {
        self.entries(map)
            .iter()
            .enumerate()
            .find(|(_, (k, _))| self.scalar(*k) == Some(key))
            .map(|(index, &(key, value))| Entry { key, value, index })
    }

    /// Scalar value stored under `key`, if the entry exists and is a scalar.
    pub fn get_str(&self, map: NodeId, key: &str) -> Option<&str> {
        self.find_entry(map, key)
            .and_then(|entry| self.scalar(entry.value))
    }

    /// Overwrites the value text in place, or appends a new pair at the end.
    pub fn set_string_value(
        &mut self,
        map: NodeId,
        key: &str,
        value: &str,
    ) -> Result<Entry, ConfigError> {
        if !self.is_mapping(map) {
            return Err(ConfigError::InvalidNode {
                key: key.to_string(),
                expected: "mapping",
            });
        }

        if let Some(entry) = self.find_entry(map, key) {
            return match &mut self.nodes[entry.value.0].kind {
                NodeKind::Scalar {
                    value: text,
                    style,
                } => {
                    *style = style_for(value, *style);
                    *text = value.to_string();
                    Ok(entry)
                }
                _ => Err(ConfigError::InvalidNode {
                    key: key.to_string(),
                    expected: "scalar",
                }),
            };
        }

        let key_node = self.new_scalar(key);
        let value_node = self.new_scalar(value);
        self.push_pair(map, key_node, value_node);
        let index = self.entries(map).len() - 1;
        Ok(Entry {
            key: key_node,
            value: value_node,
            index,
        })
    }

    /// Removes the first pair keyed `key`, keeping the order of the rest.
    pub fn remove_entry(&mut self, map: NodeId, key: &str) -> Option<Entry> {
        let entry = self.find_entry(map, key)?;
        if let NodeKind::Mapping(entries) = &mut self.nodes[map.0].kind {
            entries.remove(entry.index);
        }
        Some(entry)
    }

    /// Mapping stored under `key`, created at the end of `map` when absent.
    ///
    /// An empty plain value (`hosts:`) is turned into an empty mapping in place.
    pub fn ensure_mapping(&mut self, map: NodeId, key: &str) -> Result<NodeId, ConfigError> {
        if !self.is_mapping(map) {
            return Err(ConfigError::InvalidNode {
                key: key.to_string(),
                expected: "mapping",
            });
        }

        if let Some(entry) = self.find_entry(map, key) {
            let node = &mut self.nodes[entry.value.0];
            let empty_scalar = match &node.kind {
                NodeKind::Mapping(_) => return Ok(entry.value),
                NodeKind::Scalar { value, style } => {
                    value.is_empty() && *style == ScalarStyle::Plain
                }
                NodeKind::Sequence(_) => false,
            };
            if !empty_scalar {
                return Err(ConfigError::InvalidNode {
                    key: key.to_string(),
                    expected: "mapping",
                });
            }
            node.kind = NodeKind::Mapping(Vec::new());
            return Ok(entry.value);
        }

        let key_node = self.new_scalar(key);
        let value_node = self.new_mapping();
        self.push_pair(map, key_node, value_node);
        Ok(value_node)
    }

    /// Puts `value` under `key`: replaces the existing value in place (the key
    /// node and its comments stay) or appends a new pair.
    pub fn splice_value(&mut self, map: NodeId, key: &str, value: NodeId) {
        if !self.is_mapping(map) || self.get(value).is_none() {
            return;
        }
        if let Some(entry) = self.find_entry(map, key) {
            if let NodeKind::Mapping(entries) = &mut self.nodes[map.0].kind {
                entries[entry.index].1 = value;
            }
            return;
        }
        let key_node = self.new_scalar(key);
        self.push_pair(map, key_node, value);
    }

    /// Deep-copies `node` of `other` into this arena.
    pub(crate) fn graft(&mut self, other: &Document, node: NodeId) -> NodeId {
        let src = other.node(node);
        let kind = match &src.kind {
            NodeKind::Scalar { value, style } => NodeKind::Scalar {
                value: value.clone(),
                style: *style,
            },
            NodeKind::Mapping(entries) => NodeKind::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (self.graft(other, *k), self.graft(other, *v)))
                    .collect(),
            ),
            NodeKind::Sequence(items) => {
                NodeKind::Sequence(items.iter().map(|i| self.graft(other, *i)).collect())
            }
        };
        let id = self.push(kind);
        let dst = &mut self.nodes[id.0];
        dst.head_comment = src.head_comment.clone();
        dst.line_comment = src.line_comment.clone();
        dst.foot_comment = src.foot_comment.clone();
        id
    }

    fn subtree_eq(&self, a: NodeId, other: &Document, b: NodeId) -> bool {
        let (x, y) = (self.node(a), other.node(b));
        if x.head_comment != y.head_comment
            || x.line_comment != y.line_comment
            || x.foot_comment != y.foot_comment
        {
            return false;
        }
        match (&x.kind, &y.kind) {
            (
                NodeKind::Scalar { value: v1, style: s1 },
                NodeKind::Scalar { value: v2, style: s2 },
            ) => v1 == v2 && s1 == s2,
            (NodeKind::Mapping(e1), NodeKind::Mapping(e2)) => {
                e1.len() == e2.len()
                    && e1.iter().zip(e2).all(|((k1, v1), (k2, v2))| {
                        self.subtree_eq(*k1, other, *k2) && self.subtree_eq(*v1, other, *v2)
                    })
            }
            (NodeKind::Sequence(i1), NodeKind::Sequence(i2)) => {
                i1.len() == i2.len()
                    && i1
                        .iter()
                        .zip(i2)
                        .all(|(a, b)| self.subtree_eq(*a, other, *b))
            }
            _ => false,
        }
    }
}

/// Structural equality of the reachable trees; orphaned arena slots are ignored.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

/// Keeps `current` unless it cannot represent `value`.
fn style_for(value: &str, current: ScalarStyle) -> ScalarStyle {
    match current {
        ScalarStyle::Plain if value.is_empty() || is_plain_safe(value) => ScalarStyle::Plain,
        ScalarStyle::SingleQuoted if !value.chars().any(char::is_control) => {
            ScalarStyle::SingleQuoted
        }
        _ => ScalarStyle::DoubleQuoted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(doc: &Document, map: NodeId) -> Vec<String> {
        doc.keys(map).map(str::to_string).collect()
    }

    #[test]
    fn test_set_appends_new_pairs_in_order() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.set_string_value(root, "b", "1").unwrap();
        doc.set_string_value(root, "a", "2").unwrap();
        doc.set_string_value(root, "c", "3").unwrap();

        assert_eq!(keys(&doc, root), vec!["b", "a", "c"]);
        assert_eq!(doc.get_str(root, "a"), Some("2"));
    }

    #[test]
    fn test_set_overwrites_in_place_and_keeps_comment() {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.set_string_value(root, "editor", "vim").unwrap();
        doc.set_head_comment(first.key, ["# the editor"]);
        doc.set_string_value(root, "browser", "firefox").unwrap();

        let again = doc.set_string_value(root, "editor", "nano").unwrap();

        assert_eq!(again.index, 0);
        assert_eq!(again.key, first.key);
        assert_eq!(doc.get_str(root, "editor"), Some("nano"));
        assert_eq!(doc.node(again.key).head_comment, vec!["# the editor"]);
    }

    #[test]
    fn test_find_entry_returns_first_duplicate() {
        let mut doc = Document::new();
        let root = doc.root();
        let k1 = doc.new_scalar("token");
        let v1 = doc.new_scalar("first");
        let k2 = doc.new_scalar("token");
        let v2 = doc.new_scalar("second");
        doc.push_pair(root, k1, v1);
        doc.push_pair(root, k2, v2);

        let entry = doc.find_entry(root, "token").unwrap();
        assert_eq!(entry.index, 0);
        assert_eq!(doc.get_str(root, "token"), Some("first"));

        doc.set_string_value(root, "token", "updated").unwrap();
        assert_eq!(doc.scalar(v2), Some("second"));
    }

    #[test]
    fn test_remove_entry_keeps_relative_order() {
        let mut doc = Document::new();
        let root = doc.root();
        for k in ["a", "b", "c", "d"] {
            doc.set_string_value(root, k, k).unwrap();
        }

        let removed = doc.remove_entry(root, "b").unwrap();
        assert_eq!(removed.index, 1);
        assert_eq!(keys(&doc, root), vec!["a", "c", "d"]);
        assert!(doc.remove_entry(root, "missing").is_none());
    }

    #[test]
    fn test_set_refuses_to_replace_mapping() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.ensure_mapping(root, "hosts").unwrap();

        let err = doc.set_string_value(root, "hosts", "oops").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNode { .. }));
        assert!(doc.is_mapping(doc.find_entry(root, "hosts").unwrap().value));
    }

    #[test]
    fn test_ensure_mapping_upgrades_empty_scalar() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.set_string_value(root, "hosts", "").unwrap();

        let hosts = doc.ensure_mapping(root, "hosts").unwrap();
        assert!(doc.is_mapping(hosts));
        assert_eq!(doc.entries(root).len(), 1);
    }

    #[test]
    fn test_style_follows_value() {
        let mut doc = Document::new();
        let root = doc.root();
        let entry = doc.set_string_value(root, "igrep", "!glab issue list").unwrap();

        match &doc.node(entry.value).kind {
            NodeKind::Scalar { style, .. } => assert_eq!(*style, ScalarStyle::DoubleQuoted),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_graft_and_structural_eq() {
        let mut src = Document::new();
        let root = src.root();
        let entry = src.set_string_value(root, "co", "mr checkout").unwrap();
        src.set_head_comment(entry.key, ["# checkout"]);

        let mut dst = Document::new();
        let copied = dst.graft(&src, root);
        dst.set_root(copied);

        assert_eq!(dst, src);
        dst.set_string_value(copied, "co", "mr view").unwrap();
        assert_ne!(dst, src);
    }

    #[test]
    fn test_splice_replaces_value_in_place() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.set_string_value(root, "aliases", "").unwrap();
        doc.set_string_value(root, "editor", "vim").unwrap();

        let fresh = doc.new_mapping();
        doc.splice_value(root, "aliases", fresh);
        assert_eq!(doc.find_entry(root, "aliases").unwrap().index, 0);
        assert!(doc.is_mapping(doc.find_entry(root, "aliases").unwrap().value));

        let other = doc.new_mapping();
        doc.splice_value(root, "local", other);
        assert_eq!(keys(&doc, root), vec!["aliases", "editor", "local"]);
    }

    #[test]
    fn test_foreign_ids_are_rejected() {
        let mut big = Document::new();
        let root = big.root();
        for key in ["a", "b", "c", "d"] {
            big.set_string_value(root, key, "x").unwrap();
        }
        let foreign = big.find_entry(root, "d").unwrap().value;

        let mut small = Document::new();
        assert!(small.get(foreign).is_none());
        assert!(small.scalar(foreign).is_none());
        assert!(small.entries(foreign).is_empty());
        assert!(!small.is_mapping(foreign));
        assert!(small.find_entry(foreign, "d").is_none());
        assert!(matches!(
            small.set_string_value(foreign, "k", "v"),
            Err(ConfigError::InvalidNode { .. })
        ));
        assert!(small.ensure_mapping(foreign, "hosts").is_err());
        assert!(small.remove_entry(foreign, "d").is_none());
        assert_eq!(small.encode(foreign, &[]), "");

        let small_root = small.root();
        small.splice_value(small_root, "k", foreign);
        small.set_head_comment(foreign, ["# ignored"]);
        assert_eq!(small.encode(small_root, &[]), "{}\n");
    }
}
