//! Arena storage for the ontology tree and the borrowed [`Node`] view.

use roget_types::{NodeId, NodeKind, WordType};

use crate::Thesaurus;

/// Cross-reference to a headword, rewritten exactly once by the resolver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    Unresolved(String),
    Resolved(NodeId),
}

impl Link {
    pub(crate) fn target(&self) -> Option<NodeId> {
        match self {
            Link::Resolved(id) => Some(*id),
            Link::Unresolved(_) => None,
        }
    }
}

/// Attributes shared by senses and headwords.
#[derive(Clone, Debug, Default)]
pub(crate) struct SenseData {
    pub(crate) comment: Option<String>,
    pub(crate) link: Option<Link>,
    pub(crate) link_comment: Option<String>,
    pub(crate) word_type: WordType,
    /// Only set on headwords.
    pub(crate) index: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) description: Option<String>,
    pub(crate) key: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) sense: Option<SenseData>,
}

/// Owns every node; a node's position is its [`NodeId`].
///
/// Allocation order is document order, so ids are strictly increasing and
/// never reused.
#[derive(Clone, Debug, Default)]
pub(crate) struct Arena {
    nodes: Vec<NodeData>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            description: None,
            key: String::new(),
            parent,
            children: Vec::new(),
            sense: kind.is_sense().then(SenseData::default),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn try_get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, data)| (NodeId(idx as u32), data))
    }

    pub(crate) fn from_nodes(nodes: Vec<NodeData>) -> Self {
        Self { nodes }
    }
}

/// Read-only view of one node, borrowed from its [`Thesaurus`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    thesaurus: &'a Thesaurus,
    id: NodeId,
}

impl<'a> Node<'a> {
    pub(crate) fn new(thesaurus: &'a Thesaurus, id: NodeId) -> Self {
        Self { thesaurus, id }
    }

    fn data(&self) -> &'a NodeData {
        self.thesaurus.arena.get(self.id)
    }

    fn sense(&self) -> Option<&'a SenseData> {
        self.data().sense.as_ref()
    }

    /// Creation-order id; equal ids mean the same node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Effective key. Senses written only as a cross-reference carry the key
    /// of the headword they link to.
    pub fn key(&self) -> &'a str {
        &self.data().key
    }

    /// Raw header line of a class, division or section.
    pub fn description(&self) -> Option<&'a str> {
        self.data().description.as_deref()
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data()
            .parent
            .map(|id| Node::new(self.thesaurus, id))
    }

    /// Children in document order.
    pub fn children(self) -> impl ExactSizeIterator<Item = Node<'a>> + 'a {
        let thesaurus = self.thesaurus;
        self.data()
            .children
            .iter()
            .map(move |id| Node::new(thesaurus, *id))
    }

    /// Source numbering of a headword (`"186"`, `"12a"`).
    pub fn index(&self) -> Option<&'a str> {
        self.sense().and_then(|s| s.index.as_deref())
    }

    /// Bracketed comment attached to the word.
    pub fn comment(&self) -> Option<&'a str> {
        self.sense().and_then(|s| s.comment.as_deref())
    }

    /// Headword this word cross-references.
    pub fn link(&self) -> Option<Node<'a>> {
        self.sense()
            .and_then(|s| s.link.as_ref())
            .and_then(Link::target)
            .map(|id| Node::new(self.thesaurus, id))
    }

    pub fn link_comment(&self) -> Option<&'a str> {
        self.sense().and_then(|s| s.link_comment.as_deref())
    }

    pub fn word_type(&self) -> WordType {
        self.sense().map(|s| s.word_type).unwrap_or_default()
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("key", &self.key())
            .finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.thesaurus, other.thesaurus) && self.id == other.id
    }
}

impl Eq for Node<'_> {}
