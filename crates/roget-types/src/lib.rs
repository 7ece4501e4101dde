//! Shared plain types for the Roget thesaurus ontology.
//!
//! The tree itself lives in `roget-db`; this crate only names the pieces that
//! every consumer needs to agree on: node handles ([`NodeId`]), node variants
//! ([`NodeKind`]), grammatical classes ([`WordType`]) and the similarity
//! tiers assigned to common ancestors.
//!
//! ```rust
//! use roget_types::{NodeKind, WordType};
//!
//! assert_eq!(WordType::from_marker("Adj."), Some(WordType::Adjective));
//! assert_eq!(WordType::from_attribute("adv"), Some(WordType::Adverb));
//! assert_eq!(NodeKind::SenseGroup.tier(), Some(100));
//! ```

use std::fmt;

/// Score of a shared [`NodeKind::SenseGroup`] ancestor.
pub const TIER_SENSE_GROUP: u8 = 100;
/// Score of a shared [`NodeKind::HeadWord`] ancestor.
pub const TIER_HEAD_WORD: u8 = 90;
/// Score of a shared [`NodeKind::Category`] ancestor.
pub const TIER_CATEGORY: u8 = 80;

/// Creation-order handle of a node.
///
/// Ids are handed out by the build arena in document order, are never reused,
/// and compare in that order. The similarity merge depends on this.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four node variants of the ontology tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Category,
    HeadWord,
    SenseGroup,
    Sense,
}

impl NodeKind {
    /// Similarity score this node contributes when it is a shared ancestor.
    ///
    /// Senses are leaves and never count as a common ancestor.
    pub fn tier(self) -> Option<u8> {
        match self {
            NodeKind::SenseGroup => Some(TIER_SENSE_GROUP),
            NodeKind::HeadWord => Some(TIER_HEAD_WORD),
            NodeKind::Category => Some(TIER_CATEGORY),
            NodeKind::Sense => None,
        }
    }

    /// Whether the node carries sense attributes (comment, link, word type).
    pub fn is_sense(self) -> bool {
        matches!(self, NodeKind::HeadWord | NodeKind::Sense)
    }

    /// Name used by the text and XML reports.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Category => "Category",
            NodeKind::HeadWord => "Headword",
            NodeKind::SenseGroup => "SenseGroup",
            NodeKind::Sense => "Sense",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grammatical class annotation (`N.`, `V.`, `Adj.`, `Adv.`, `Phr.`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WordType {
    #[default]
    None,
    Verb,
    Noun,
    Adjective,
    Adverb,
    Phrase,
}

impl WordType {
    /// Parse a bare class marker exactly as printed in the source.
    ///
    /// Case-sensitive and the trailing period is required.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "N." => Some(WordType::Noun),
            "V." => Some(WordType::Verb),
            "Adj." => Some(WordType::Adjective),
            "Adv." => Some(WordType::Adverb),
            "Phr." => Some(WordType::Phrase),
            _ => None,
        }
    }

    /// Parse the attribute slot of a cross-reference marker.
    ///
    /// Case-insensitive; the trailing period is optional.
    pub fn from_attribute(attribute: &str) -> Option<Self> {
        let trimmed = attribute.trim();
        let bare = trimmed.strip_suffix('.').unwrap_or(trimmed);
        match bare.to_ascii_lowercase().as_str() {
            "n" => Some(WordType::Noun),
            "v" => Some(WordType::Verb),
            "adj" => Some(WordType::Adjective),
            "adv" => Some(WordType::Adverb),
            "phr" => Some(WordType::Phrase),
            _ => None,
        }
    }

    /// Short label used in reports; `None` for [`WordType::None`].
    pub fn abbreviation(self) -> Option<&'static str> {
        match self {
            WordType::None => None,
            WordType::Verb => Some("V"),
            WordType::Noun => Some("N"),
            WordType::Adjective => Some("Adj"),
            WordType::Adverb => Some("Adv"),
            WordType::Phrase => Some("Phr"),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == WordType::None
    }
}

impl fmt::Display for WordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation().unwrap_or(""))
    }
}
