//! Mutable XML tree used wherever a fragment has to be edited and written back:
//! the section body in the editor, the style catalog and `content.hpf` on write,
//! and freshly synthesized section XML.
//!
//! Parsing goes through roxmltree; nodes live in an arena and are addressed by
//! [`NodeId`]. Detached nodes stay in the arena until the tree is dropped.

use crate::error::Result;

pub const HA_NS: &str = "http://www.hancom.co.kr/hwpml/2011/app";
pub const HP_NS: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
pub const HP10_NS: &str = "http://www.hancom.co.kr/hwpml/2016/paragraph";
pub const HS_NS: &str = "http://www.hancom.co.kr/hwpml/2011/section";
pub const HC_NS: &str = "http://www.hancom.co.kr/hwpml/2011/core";
pub const HH_NS: &str = "http://www.hancom.co.kr/hwpml/2011/head";
pub const HHS_NS: &str = "http://www.hancom.co.kr/hwpml/2011/history";
pub const HM_NS: &str = "http://www.hancom.co.kr/hwpml/2011/master-page";
pub const HPF_NS: &str = "http://www.hancom.co.kr/schema/2011/hpf";
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const OPF_NS: &str = "http://www.idpf.org/2007/opf/";
pub const OOXMLCHART_NS: &str = "http://www.hancom.co.kr/hwpml/2016/ooxmlchart";
pub const HWPUNITCHAR_NS: &str = "http://www.hancom.co.kr/hwpml/2016/HwpUnitChar";
pub const EPUB_NS: &str = "http://www.idpf.org/2007/ops";
pub const CONFIG_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:config:1.0";

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefixes declared on every synthesized `hs:sec` root.
pub const NAMESPACES: &[(&str, &str)] = &[
    ("ha", HA_NS),
    ("hp", HP_NS),
    ("hp10", HP10_NS),
    ("hs", HS_NS),
    ("hc", HC_NS),
    ("hh", HH_NS),
    ("hhs", HHS_NS),
    ("hm", HM_NS),
    ("hpf", HPF_NS),
    ("dc", DC_NS),
    ("opf", OPF_NS),
    ("ooxmlchart", OOXMLCHART_NS),
    ("hwpunitchar", HWPUNITCHAR_NS),
    ("epub", EPUB_NS),
    ("config", CONFIG_NS),
];

/// `xmlns:*` attributes for every prefix in [`NAMESPACES`].
pub(crate) fn namespace_declarations() -> Vec<(String, String)> {
    NAMESPACES
        .iter()
        .map(|(prefix, uri)| (format!("xmlns:{prefix}"), uri.to_string()))
        .collect()
}

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#;

fn prefix_uri(prefix: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps a fragment in an element declaring every known prefix so that a
/// bare `<hp:p>` cut out of a larger document parses on its own.
pub(crate) fn wrap_fragment(raw: &str) -> String {
    let mut out = String::from("<fragment");
    for (prefix, uri) in NAMESPACES {
        out.push_str(&format!(" xmlns:{prefix}=\"{uri}\""));
    }
    out.push('>');
    out.push_str(raw);
    out.push_str("</fragment>");
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
enum NodeData {
    Element {
        name: String,
        ns: Option<String>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    /// Serialized verbatim: preserved fragments, comments, processing instructions.
    Raw(String),
}

#[derive(Clone, Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl XmlTree {
    /// New tree with a single root element. Prefixed names resolve against
    /// [`NAMESPACES`].
    pub fn new(root_name: &str, attrs: &[(&str, &str)]) -> Self {
        let mut tree = XmlTree {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.create_element(root_name, attrs);
        tree
    }

    pub fn parse(text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)?;
        let mut tree = XmlTree {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.copy_from(doc.root_element(), true);
        Ok(tree)
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| crate::error::Error::format(format!("XML is not UTF-8: {e}")))?;
        Self::parse(text.trim_start_matches('\u{feff}'))
    }

    /// Parses a fragment that relies on prefixes declared by an enclosing
    /// document and adds it to this tree as a detached element.
    pub fn import_fragment(&mut self, raw: &str) -> Result<NodeId> {
        let wrapped = wrap_fragment(raw);
        let doc = roxmltree::Document::parse(&wrapped)?;
        let element = doc
            .root_element()
            .children()
            .find(|n| n.is_element())
            .ok_or_else(|| crate::error::Error::format("fragment has no element"))?;
        Ok(self.copy_from(element, false))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn copy_from(&mut self, node: roxmltree::Node, declare_namespaces: bool) -> NodeId {
        let tag = node.tag_name();
        let qualify = |uri: Option<&str>, local: &str| -> String {
            match uri {
                Some(XML_NS) => format!("xml:{local}"),
                Some(uri) => match node.lookup_prefix(uri) {
                    Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
                    _ => local.to_string(),
                },
                None => local.to_string(),
            }
        };

        let mut attrs = Vec::new();
        if declare_namespaces {
            let parent_scope: Vec<(Option<&str>, &str)> = node
                .parent_element()
                .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
                .unwrap_or_default();
            for ns in node.namespaces() {
                if ns.name() == Some("xml") || parent_scope.contains(&(ns.name(), ns.uri())) {
                    continue;
                }
                let key = match ns.name() {
                    Some(prefix) => format!("xmlns:{prefix}"),
                    None => "xmlns".to_string(),
                };
                attrs.push((key, ns.uri().to_string()));
            }
        }
        for attr in node.attributes() {
            attrs.push((qualify(attr.namespace(), attr.name()), attr.value().to_string()));
        }

        let id = self.push(NodeData::Element {
            name: qualify(tag.namespace(), tag.name()),
            ns: tag.namespace().map(str::to_string),
            attrs,
        });

        for child in node.children() {
            let child_id = if child.is_element() {
                self.copy_from(child, declare_namespaces)
            } else if child.is_text() {
                self.push(NodeData::Text(child.text().unwrap_or_default().to_string()))
            } else if child.is_comment() {
                self.push(NodeData::Raw(format!(
                    "<!--{}-->",
                    child.text().unwrap_or_default()
                )))
            } else if let Some(pi) = child.pi() {
                let raw = match pi.value {
                    Some(value) => format!("<?{} {}?>", pi.target, value),
                    None => format!("<?{}?>", pi.target),
                };
                self.push(NodeData::Raw(raw))
            } else {
                continue;
            };
            self.append(id, child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let ns = name
            .split_once(':')
            .and_then(|(prefix, _)| prefix_uri(prefix))
            .map(str::to_string);
        self.push(NodeData::Element {
            name: name.to_string(),
            ns,
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    /// Creates an element and appends it to `parent`.
    pub fn add_element(&mut self, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(name, attrs);
        self.append(parent, id);
        id
    }

    pub fn add_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(NodeData::Text(text.to_string()));
        self.append(parent, id);
        id
    }

    pub fn create_raw(&mut self, raw: &str) -> NodeId {
        self.push(NodeData::Raw(raw.to_string()))
    }

    pub fn add_raw(&mut self, parent: NodeId, raw: &str) -> NodeId {
        let id = self.create_raw(raw);
        self.append(parent, id);
        id
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `child` at `index` among `parent`'s children, clamped to the end.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    pub fn remove_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Element { .. })
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        self.name(node)
            .map(|n| n.split_once(':').map_or(n, |(_, local)| local))
    }

    /// True if `node` is an element with the given namespace URI and local name.
    pub fn is(&self, node: NodeId, ns: &str, local: &str) -> bool {
        match &self.nodes[node.0].data {
            NodeData::Element { ns: Some(uri), .. } => {
                uri == ns && self.local_name(node) == Some(local)
            }
            _ => false,
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[node.0].data {
            let value = value.into();
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value,
                None => attrs.push((name.to_string(), value)),
            }
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[node.0].data {
            attrs.retain(|(k, _)| k != name);
        }
    }

    /// Concatenated direct text children.
    pub fn text(&self, node: NodeId) -> String {
        self.children(node)
            .iter()
            .filter_map(|&c| match &self.nodes[c.0].data {
                NodeData::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replaces direct text children with a single text node, keeping element
    /// children in place.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        let text_children: Vec<NodeId> = self
            .children(node)
            .iter()
            .copied()
            .filter(|&c| matches!(self.nodes[c.0].data, NodeData::Text(_)))
            .collect();
        for child in text_children {
            self.detach(child);
        }
        if !text.is_empty() {
            let id = self.push(NodeData::Text(text.to_string()));
            self.insert(node, 0, id);
        }
    }

    /// Content of a text node; `None` for elements and raw nodes.
    pub fn text_value(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn set_text_value(&mut self, node: NodeId, text: impl Into<String>) {
        if let NodeData::Text(t) = &mut self.nodes[node.0].data {
            *t = text.into();
        }
    }

    pub fn find_child(&self, node: NodeId, ns: &str, local: &str) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|&c| self.is(c, ns, local))
    }

    pub fn child_elements(&self, node: NodeId, ns: &str, local: &str) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|&c| self.is(c, ns, local))
            .collect()
    }

    /// Pre-order walk, `node` first.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Matching elements below `node` in document order, excluding `node` itself.
    pub fn find_descendants(&self, node: NodeId, ns: &str, local: &str) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .skip(1)
            .filter(|&id| self.is(id, ns, local))
            .collect()
    }

    pub fn find_descendant(&self, node: NodeId, ns: &str, local: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .skip(1)
            .find(|&id| self.is(id, ns, local))
    }

    /// Concatenated text of every text node under `node`.
    pub fn deep_text(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| match &self.nodes[id.0].data {
                NodeData::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Copies the subtree rooted at `node`; the copy is detached.
    pub fn deep_copy(&mut self, node: NodeId) -> NodeId {
        let data = self.nodes[node.0].data.clone();
        let copy = self.push(data);
        let children = self.nodes[node.0].children.clone();
        for child in children {
            let child_copy = self.deep_copy(child);
            self.append(copy, child_copy);
        }
        copy
    }

    pub fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => out.push_str(&escape_text(t)),
            NodeData::Raw(raw) => out.push_str(raw),
            NodeData::Element { name, attrs, .. } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                let children = &self.nodes[node.0].children;
                if children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in children {
                        self.write_node(child, out);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
    }

    pub fn node_to_string(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Whole document with the standalone declaration HWPX parts carry.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        self.write_node(self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("say \"hi\"\n"), "say &quot;hi&quot;&#10;");
    }

    #[test]
    fn parse_and_serialize_preserves_prefixes() {
        let src = format!(
            r#"<hs:sec xmlns:hs="{HS_NS}" xmlns:hp="{HP_NS}"><hp:p id="1"><hp:run charPrIDRef="0"><hp:t>a &amp; b</hp:t></hp:run></hp:p></hs:sec>"#
        );
        let tree = XmlTree::parse(&src).unwrap();
        let out = tree.node_to_string(tree.root());
        assert!(out.starts_with("<hs:sec "));
        assert!(out.contains(&format!(r#"xmlns:hp="{HP_NS}""#)));
        assert!(out.contains(r#"<hp:p id="1"><hp:run charPrIDRef="0"><hp:t>a &amp; b</hp:t></hp:run></hp:p>"#));
    }

    #[test]
    fn import_fragment_resolves_known_prefixes() {
        let mut tree = XmlTree::new("hs:sec", &[]);
        let p = tree
            .import_fragment(r#"<hp:p id="7"><hp:run><hp:t>x</hp:t></hp:run></hp:p>"#)
            .unwrap();
        assert!(tree.is(p, HP_NS, "p"));
        assert_eq!(tree.attr(p, "id"), Some("7"));
        assert_eq!(tree.deep_text(p), "x");
        let root = tree.root();
        tree.append(root, p);
        assert_eq!(tree.find_descendants(root, HP_NS, "t").len(), 1);
    }

    #[test]
    fn insert_detach_and_copy() {
        let mut tree = XmlTree::new("hs:sec", &[]);
        let root = tree.root();
        let a = tree.add_element(root, "hp:p", &[("id", "a")]);
        let b = tree.add_element(root, "hp:p", &[("id", "b")]);
        let copy = tree.deep_copy(a);
        tree.insert(root, 0, b);
        tree.append(root, copy);
        let ids: Vec<_> = tree
            .children(root)
            .iter()
            .map(|&c| tree.attr(c, "id").unwrap().to_string())
            .collect();
        assert_eq!(ids, ["b", "a", "a"]);
        tree.detach(a);
        assert_eq!(tree.children(root).len(), 2);
        assert_eq!(tree.index_in_parent(copy), Some(1));
    }

    #[test]
    fn set_text_keeps_element_children() {
        let mut tree = XmlTree::new("hp:t", &[]);
        let root = tree.root();
        tree.add_text(root, "old");
        tree.add_element(root, "hp:tab", &[]);
        tree.set_text(root, "new");
        assert_eq!(tree.node_to_string(root), "<hp:t>new<hp:tab/></hp:t>");
    }
}
