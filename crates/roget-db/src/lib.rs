//! Build Roget's Thesaurus into a queryable ontology.
//!
//! The Gutenberg e-text is parsed paragraph by paragraph into a tree of
//! categories (class, division, section, subsection, label), numbered
//! headwords, sense groups and senses. Cross-references such as `&c 186` are
//! resolved into direct links once the whole text is read, and every sense is
//! filed under its key. The finished [`Thesaurus`] is immutable and answers
//! [`Thesaurus::similarity`] by looking for the closest shared ancestor.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]; ids follow
//! document order and are never reused. Public access goes through the
//! borrowed [`Node`] view.
//!
//! # Example
//! ```
//! use roget_db::Thesaurus;
//!
//! # fn main() -> Result<(), roget_db::BuildError> {
//! let text = "CLASS I\nAbstract relations\n\nExistence\n\n\
//!             1. Existence -- N. being, entity, reality.\n\n\
//!             2. Inexistence -- N. nonexistence, nonentity; &c 1.\n";
//! let thesaurus = Thesaurus::parse(text)?;
//!
//! let sim = thesaurus.similarity("being", "entity");
//! assert_eq!(sim.score, 100);
//! assert_eq!(thesaurus.head_word("2").map(|h| h.key()), Some("Inexistence"));
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p roget-db --example stats -- <roget.txt>`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

mod builder;
mod error;
mod resolve;
mod similarity;
mod snapshot;
mod source;
mod split;
mod token;
mod tree;

pub use builder::{DEFAULT_END_MARKER, ParseOptions};
pub use error::BuildError;
pub use roget_types::{NodeId, NodeKind, WordType};
pub use similarity::Similarity;
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotError, SnapshotNode};
pub use source::{LoadMode, parse_load_mode};
pub use tree::Node;

use builder::TreeBuilder;
use tree::Arena;

/// Parsed and resolved thesaurus. Read-only once constructed.
pub struct Thesaurus {
    arena: Arena,
    root: NodeId,
    head_word_index: HashMap<String, NodeId>,
    sense_index: HashMap<String, Vec<NodeId>>,
}

impl Thesaurus {
    /// Parse thesaurus text with the default end marker.
    pub fn parse(source: &str) -> Result<Self, BuildError> {
        Self::parse_with(source, &ParseOptions::default())
    }

    /// Parse thesaurus text. Any error aborts the whole build.
    pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Self, BuildError> {
        let start = Instant::now();
        let mut built = TreeBuilder::new(options).build(source)?;
        let sense_index = resolve::resolve(&mut built.arena, built.root, &built.head_words)?;
        let thesaurus = Self {
            arena: built.arena,
            root: built.root,
            head_word_index: built.head_words,
            sense_index,
        };
        info!(
            nodes = thesaurus.node_count(),
            head_words = thesaurus.head_word_count(),
            keys = thesaurus.key_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "thesaurus built"
        );
        Ok(thesaurus)
    }

    /// Load and parse a source file, memory-mapping it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load and parse a source file choosing between mmap and an owned buffer.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        Self::load_with_options(path, mode, &ParseOptions::default())
    }

    pub fn load_with_options(
        path: impl AsRef<Path>,
        mode: LoadMode,
        options: &ParseOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let buffer = source::load_file(path, mode)?;
        let text = buffer.as_text(path)?;
        info!("parsing {} ({} bytes, {:?})", path.display(), text.len(), mode);
        Self::parse_with(text, options).with_context(|| format!("parse {}", path.display()))
    }

    /// Synthetic root category owning the whole tree.
    pub fn root(&self) -> Node<'_> {
        Node::new(self, self.root)
    }

    /// Fetch a node by id if it exists.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        self.arena.try_get(id).map(|_| Node::new(self, id))
    }

    /// Headword by its source index (`"1"`, `"12a"`).
    pub fn head_word(&self, index: &str) -> Option<Node<'_>> {
        self.head_word_index
            .get(index)
            .map(|id| Node::new(self, *id))
    }

    /// Ids of senses and headwords filed under `key`, in ascending id order,
    /// or an empty slice.
    pub fn sense_ids(&self, key: &str) -> &[NodeId] {
        self.sense_index
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Senses and headwords filed under `key`.
    pub fn senses(&self, key: &str) -> Vec<Node<'_>> {
        self.sense_ids(key)
            .iter()
            .map(|id| Node::new(self, *id))
            .collect()
    }

    /// Every node in id (document) order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.arena.iter().map(|(id, _)| Node::new(self, id))
    }

    /// All headword indices, unordered.
    pub fn head_word_indices(&self) -> impl Iterator<Item = &str> + '_ {
        self.head_word_index.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn head_word_count(&self) -> usize {
        self.head_word_index.len()
    }

    /// Number of distinct keys in the sense index.
    pub fn key_count(&self) -> usize {
        self.sense_index.len()
    }
}
