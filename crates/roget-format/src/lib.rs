//! Reports over a parsed [`Thesaurus`].
//!
//! [`TextFormatter`] prints one node per line, indented with one tab per
//! level below the root, optionally restricted to some node kinds.
//! [`XmlFormatter`] writes the whole tree as nested elements named after the
//! node kinds.
//!
//! ```
//! use roget_db::Thesaurus;
//! use roget_format::{KindMask, TextFormatter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let thesaurus = Thesaurus::parse("CLASS I\nAbstract\n\n1. Existence -- N. being.\n")?;
//! let mut out = Vec::new();
//! TextFormatter::with_mask(KindMask::HEAD_WORD).write(&thesaurus, &mut out)?;
//! assert_eq!(String::from_utf8(out)?, "\t\t#1 Headword (Existence)\n");
//! # Ok(()) }
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::ops::BitOr;

use roget_db::{Node, NodeKind, Thesaurus};

/// Set of node kinds to include in a text report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KindMask(u8);

impl KindMask {
    pub const CATEGORY: Self = Self(1);
    pub const HEAD_WORD: Self = Self(2);
    pub const SENSE_GROUP: Self = Self(4);
    pub const SENSE: Self = Self(8);
    pub const ALL: Self = Self(0xF);

    /// Mask from raw bits; bits above the four kinds are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn of(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Category => Self::CATEGORY,
            NodeKind::HeadWord => Self::HEAD_WORD,
            NodeKind::SenseGroup => Self::SENSE_GROUP,
            NodeKind::Sense => Self::SENSE,
        }
    }

    pub fn contains(self, kind: NodeKind) -> bool {
        self.0 & Self::of(kind).0 != 0
    }
}

impl Default for KindMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for KindMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Tab-indented text report.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextFormatter {
    mask: KindMask,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mask(mask: KindMask) -> Self {
        Self { mask }
    }

    /// Write every node whose kind is in the mask. Nodes that are filtered
    /// out still count towards the indentation of their descendants.
    pub fn write<W: Write>(&self, thesaurus: &Thesaurus, out: &mut W) -> io::Result<()> {
        let mut stack = vec![(thesaurus.root(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.mask.contains(node.kind()) {
                let indent = "\t".repeat(depth);
                writeln!(out, "{indent}{}", describe(node))?;
            }
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
        Ok(())
    }
}

/// One-line rendering of a node as used by [`TextFormatter`].
pub fn describe(node: Node<'_>) -> String {
    let mut line = String::new();
    match node.kind() {
        NodeKind::Category => {
            line.push_str("Category");
            if let Some(description) = node.description() {
                let _ = write!(line, " - {description}");
            }
            let _ = write!(line, " ({})", node.key());
        }
        NodeKind::SenseGroup => {
            let _ = write!(line, "SenseGroup ({})", node.key());
        }
        NodeKind::HeadWord | NodeKind::Sense => {
            if let Some(index) = node.index() {
                let _ = write!(line, "#{index} ");
            }
            let _ = write!(line, "{} ({})", node.kind(), node.key());
            if let Some(abbreviation) = node.word_type().abbreviation() {
                let _ = write!(line, " /{abbreviation}/ ");
            }
            if let Some(comment) = node.comment() {
                let _ = write!(line, " comment: {comment}");
            }
            if let Some(target) = node.link() {
                let _ = write!(
                    line,
                    " [link: #{} ({}) ]",
                    target.index().unwrap_or_default(),
                    target.key()
                );
            }
        }
    }
    line
}

/// XML export of the whole tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlFormatter;

impl XmlFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn write<W: Write>(&self, thesaurus: &Thesaurus, out: &mut W) -> io::Result<()> {
        writeln!(out, "<?xml version='1.0'?>")?;
        writeln!(out, "<rogetThesaurus>")?;
        writeln!(out, "<ontology>")?;
        write_element(thesaurus.root(), out)?;
        writeln!(out, "</ontology>")?;
        writeln!(out, "</rogetThesaurus>")
    }
}

fn write_element<W: Write>(node: Node<'_>, out: &mut W) -> io::Result<()> {
    let name = node.kind().as_str();
    write!(out, "<{name}")?;
    match node.kind() {
        NodeKind::Category => write!(out, " name=\"{}\"", escape(node.key()))?,
        NodeKind::SenseGroup => {}
        NodeKind::HeadWord | NodeKind::Sense => {
            if let Some(index) = node.index() {
                write!(out, " id=\"{}\"", escape(index))?;
            }
            write!(out, " sense=\"{}\"", escape(node.key()))?;
            if let Some(abbreviation) = node.word_type().abbreviation() {
                write!(out, " wordType=\"{abbreviation}\"")?;
            }
            if let Some(comment) = node.comment() {
                write!(out, " comment=\"{}\"", escape(comment))?;
            }
            if let Some(target) = node.link() {
                if let Some(index) = target.index() {
                    write!(out, " link=\"{}\"", escape(index))?;
                }
                write!(out, " linkComment=\"{}\"", escape(target.key()))?;
            }
        }
    }

    let mut children = node.children().peekable();
    if children.peek().is_none() {
        return writeln!(out, "/>");
    }
    writeln!(out, ">")?;
    for child in children {
        write_element(child, out)?;
    }
    writeln!(out, "</{name}>")
}

/// Escape `&`, `<`, `>` and `"` for use in an attribute value.
pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
