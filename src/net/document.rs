//! The parsed-document capability the net builder consumes.
//!
//! Anything that can present itself as a tree of tagged nodes with named
//! attributes, optional text and child nodes can feed [`NetBuilder`]. The
//! crate ships [`Element`], a plain in-memory tree that (de)serializes with
//! serde, so documents can be produced by any front end and handed over as
//! JSON or RON.
//!
//! [`NetBuilder`]: crate::net::builder::NetBuilder
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node of a parsed document.
pub trait DocumentNode {
    /// Tag as produced by the parser, possibly namespace-qualified
    /// (`{uri}place`).
    fn tag(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Payload text directly held by this node.
    fn text(&self) -> Option<&str>;

    fn children(&self) -> impl Iterator<Item = &Self>;

    /// Tag with any `{namespace}` prefix removed.
    fn local_name(&self) -> &str {
        local_name(self.tag())
    }

    /// First child whose local name is `name`.
    fn find_child(&self, name: &str) -> Option<&Self> {
        self.children().find(|child| child.local_name() == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self>
    where
        Self: 'a,
    {
        self.children().filter(move |child| child.local_name() == name)
    }
}

pub fn local_name(tag: &str) -> &str {
    match tag.split_once('}') {
        Some((_, local)) if tag.starts_with('{') => local,
        _ => tag,
    }
}

/// Follow `path` from `node` and return the text found there: the node's own
/// trimmed text if non-empty, otherwise the text of its `text` child.
pub fn text_at<'a, N>(node: &'a N, path: &[&str]) -> Option<&'a str>
where
    N: DocumentNode,
{
    let mut current = node;
    for part in path {
        current = current.find_child(part)?;
    }
    own_text(current).or_else(|| current.find_child("text").and_then(own_text))
}

/// First path in `paths` that yields text.
pub fn first_text<'a, N>(node: &'a N, paths: &[&[&str]]) -> Option<&'a str>
where
    N: DocumentNode,
{
    paths.iter().find_map(|path| text_at(node, path))
}

fn own_text<N: DocumentNode>(node: &N) -> Option<&str> {
    node.text().map(str::trim).filter(|text| !text.is_empty())
}

/// In-memory document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}

impl DocumentNode for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter()
    }
}
