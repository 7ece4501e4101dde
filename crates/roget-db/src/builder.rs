//! Paragraph classification and tree construction.
//!
//! The source is read as blank-line separated paragraphs. Each paragraph is
//! either a hierarchy header (class, division, section, numbered subsection,
//! bare label) or a headword block `index. key -- groups...`. Headers move the
//! category context; headword blocks hang under the most recent category.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use roget_types::{NodeId, NodeKind};
use tracing::debug;

use crate::error::BuildError;
use crate::split::word_groups;
use crate::token::{WordAttrs, collapse_whitespace, parse_word};
use crate::tree::{Arena, Link};

/// Marker that ends the Gutenberg e-text body.
pub const DEFAULT_END_MARKER: &str = "End of of E-Thesaurus";

static SUBSECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.? [A-Z][A-Z,\s]+").expect("subsection pattern"));

static HEAD_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*#?([0-9]+[a-z]*)\.?\s*(?:\[([^\]]*)\])?(.*\S.*)$")
        .expect("headword pattern")
});

/// Knobs for [`crate::Thesaurus::parse_with`].
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Parsing stops at the first paragraph containing this text.
    pub end_marker: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            end_marker: DEFAULT_END_MARKER.to_string(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Paragraph {
    pub(crate) text: String,
    /// 1-based line of the first line.
    pub(crate) line: usize,
    pub(crate) line_count: usize,
}

pub(crate) struct Paragraphs<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Paragraphs<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
        }
    }
}

impl Iterator for Paragraphs<'_> {
    type Item = Paragraph;

    fn next(&mut self) -> Option<Paragraph> {
        let mut text = String::new();
        let mut line = 0;
        let mut line_count = 0;
        for (lineno, raw) in self.lines.by_ref() {
            if raw.trim().is_empty() {
                if line_count > 0 {
                    break;
                }
                continue;
            }
            if line_count == 0 {
                line = lineno + 1;
            }
            text.push_str(raw);
            text.push('\n');
            line_count += 1;
        }
        (line_count > 0).then_some(Paragraph {
            text,
            line,
            line_count,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Shape {
    Class,
    Division,
    Section,
    SubSection,
    Label,
    HeadWord,
    /// Multi-line text with no `--`; carries nothing for the tree.
    Prose,
}

pub(crate) fn classify(paragraph: &Paragraph) -> Shape {
    let text = paragraph.text.as_str();
    if text.starts_with("CLASS") {
        Shape::Class
    } else if text.starts_with("DIVISION") {
        Shape::Division
    } else if text.starts_with("SECTION") {
        Shape::Section
    } else if SUBSECTION_RE.is_match(text) {
        Shape::SubSection
    } else if !text.contains("--") {
        if paragraph.line_count == 1 {
            Shape::Label
        } else {
            Shape::Prose
        }
    } else {
        Shape::HeadWord
    }
}

/// Tree produced by the build pass; links are still unresolved strings.
pub(crate) struct BuiltTree {
    pub(crate) arena: Arena,
    pub(crate) root: NodeId,
    pub(crate) head_words: HashMap<String, NodeId>,
}

pub(crate) struct TreeBuilder<'o> {
    options: &'o ParseOptions,
    arena: Arena,
    root: NodeId,
    head_words: HashMap<String, NodeId>,
    class: Option<NodeId>,
    division: Option<NodeId>,
    section: Option<NodeId>,
    sub_section: Option<NodeId>,
    /// Most recently created category; headwords attach here.
    current: Option<NodeId>,
    last_index: Option<u32>,
}

impl<'o> TreeBuilder<'o> {
    pub(crate) fn new(options: &'o ParseOptions) -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::Category, None);
        arena.get_mut(root).description = Some("root".to_string());
        Self {
            options,
            arena,
            root,
            head_words: HashMap::new(),
            class: None,
            division: None,
            section: None,
            sub_section: None,
            current: None,
            last_index: None,
        }
    }

    pub(crate) fn build(mut self, source: &str) -> Result<BuiltTree, BuildError> {
        for paragraph in Paragraphs::new(source) {
            if paragraph.text.contains(&self.options.end_marker) {
                debug!(line = paragraph.line, "end marker reached");
                break;
            }
            self.paragraph(&paragraph)?;
        }
        Ok(BuiltTree {
            arena: self.arena,
            root: self.root,
            head_words: self.head_words,
        })
    }

    fn paragraph(&mut self, paragraph: &Paragraph) -> Result<(), BuildError> {
        let shape = classify(paragraph);
        if self.class.is_none() && shape != Shape::Class {
            debug!(line = paragraph.line, "skipping front matter");
            return Ok(());
        }

        match shape {
            Shape::Class => {
                let id = self.header(self.root, paragraph);
                self.class = Some(id);
                self.division = None;
                self.section = None;
                self.sub_section = None;
            }
            Shape::Division => {
                let parent = self.class.unwrap_or(self.root);
                let id = self.header(parent, paragraph);
                self.division = Some(id);
                self.section = None;
                self.sub_section = None;
            }
            Shape::Section => {
                let parent = self.division.or(self.class).unwrap_or(self.root);
                let id = self.header(parent, paragraph);
                self.section = Some(id);
                self.sub_section = None;
            }
            Shape::SubSection => {
                let parent = self
                    .section
                    .or(self.division)
                    .or(self.class)
                    .unwrap_or(self.root);
                let heading = paragraph.text.lines().next().unwrap_or_default().trim();
                let id = self.category(parent, None, heading.to_string());
                self.sub_section = Some(id);
            }
            Shape::Label => {
                let parent = self
                    .sub_section
                    .or(self.section)
                    .or(self.division)
                    .or(self.class)
                    .unwrap_or(self.root);
                let label = paragraph.text.trim().to_string();
                self.category(parent, None, label);
            }
            Shape::HeadWord => self.head_word(paragraph)?,
            Shape::Prose => {
                debug!(line = paragraph.line, "skipping paragraph without headword delimiter");
            }
        }
        Ok(())
    }

    /// Class, division and section paragraphs: header line, then key line.
    fn header(&mut self, parent: NodeId, paragraph: &Paragraph) -> NodeId {
        let mut lines = paragraph.text.lines();
        let description = lines.next().unwrap_or_default().trim().to_string();
        let key = lines.next().unwrap_or_default().trim().to_string();
        self.category(parent, Some(description), key)
    }

    fn category(&mut self, parent: NodeId, description: Option<String>, key: String) -> NodeId {
        let id = self.arena.alloc(NodeKind::Category, Some(parent));
        let node = self.arena.get_mut(id);
        node.description = description;
        node.key = key;
        self.current = Some(id);
        id
    }

    fn head_word(&mut self, paragraph: &Paragraph) -> Result<(), BuildError> {
        let line = paragraph.line;
        let Some(split) = paragraph.text.find("--") else {
            return Ok(());
        };
        let definition = &paragraph.text[..split];
        let body = &paragraph.text[split + 2..];

        let malformed = || BuildError::MalformedHeadwordDefinition {
            line,
            definition: collapse_whitespace(definition),
        };
        let caps = HEAD_WORD_RE.captures(definition).ok_or_else(malformed)?;
        let index = caps[1].to_string();
        let number: u32 = index
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .map_err(|_| malformed())?;
        let link_comment = caps
            .get(2)
            .map(|m| collapse_whitespace(m.as_str()))
            .filter(|c| !c.is_empty());
        let base = caps[3].trim_end_matches(|c: char| c == '-' || c == '.' || c.is_whitespace());

        self.check_sequence(number, line, definition)?;
        if self.head_words.contains_key(&index) {
            return Err(BuildError::DuplicateHeadWord { line, index });
        }

        let attrs = parse_word(base, line)?;
        let parent = self.current.unwrap_or(self.root);
        let head = self.arena.alloc(NodeKind::HeadWord, Some(parent));
        self.apply(head, attrs);
        if let Some(sense) = self.arena.get_mut(head).sense.as_mut() {
            sense.index = Some(index.clone());
            sense.link_comment = link_comment;
        }
        self.head_words.insert(index, head);

        for tokens in word_groups(body) {
            let parent = if tokens.len() > 1 {
                self.arena.alloc(NodeKind::SenseGroup, Some(head))
            } else {
                head
            };
            for token in tokens {
                let sense = self.arena.alloc(NodeKind::Sense, Some(parent));
                let attrs = parse_word(token, line)?;
                self.apply(sense, attrs);
            }
        }
        Ok(())
    }

    fn check_sequence(&mut self, number: u32, line: usize, definition: &str) -> Result<(), BuildError> {
        if let Some(previous) = self.last_index
            && number > previous.saturating_add(1)
        {
            return Err(BuildError::SequenceGap {
                line,
                previous,
                current: number,
                definition: collapse_whitespace(definition),
            });
        }
        self.last_index = Some(number);
        Ok(())
    }

    fn apply(&mut self, id: NodeId, attrs: WordAttrs) {
        let node = self.arena.get_mut(id);
        node.key = attrs.key;
        if let Some(sense) = node.sense.as_mut() {
            sense.comment = attrs.comment;
            sense.link = attrs.link.map(Link::Unresolved);
            sense.word_type = attrs.word_type;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roget_types::WordType;

    fn build(source: &str) -> Result<BuiltTree, BuildError> {
        TreeBuilder::new(&ParseOptions::default()).build(source)
    }

    fn paragraph(text: &str) -> Paragraph {
        let mut paragraphs = Paragraphs::new(text);
        paragraphs.next().expect("one paragraph")
    }

    #[test]
    fn paragraphs_track_start_lines() {
        let parsed: Vec<_> = Paragraphs::new("\n\nA\nB\n\n\nC\r\n").collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text, "A\nB\n");
        assert_eq!(parsed[0].line, 3);
        assert_eq!(parsed[0].line_count, 2);
        assert_eq!(parsed[1].text, "C\n");
        assert_eq!(parsed[1].line, 7);
    }

    #[test]
    fn classifies_paragraph_shapes() {
        assert_eq!(classify(&paragraph("CLASS I\nABSTRACT RELATIONS")), Shape::Class);
        assert_eq!(classify(&paragraph("DIVISION I\nINTELLECT")), Shape::Division);
        assert_eq!(classify(&paragraph("SECTION I.\nEXISTENCE")), Shape::Section);
        assert_eq!(
            classify(&paragraph("1. BEING, IN THE ABSTRACT")),
            Shape::SubSection
        );
        assert_eq!(classify(&paragraph("Existence-section")), Shape::Label);
        assert_eq!(
            classify(&paragraph("1. Existence -- N. being.")),
            Shape::HeadWord
        );
        assert_eq!(classify(&paragraph("some\nprose")), Shape::Prose);
    }

    #[test]
    fn hierarchy_contexts_reset_below_new_levels() {
        let tree = build(
            "Preface text.\n\nCLASS I\nAbstract\n\nDIVISION I\nFirst\n\nSECTION I\nExistence\n\n\
             1. BEING\n\nleaf\n\nSECTION II\nRelation\n\nother leaf\n",
        )
        .expect("builds");
        let arena = &tree.arena;
        let root = arena.get(tree.root);
        assert_eq!(root.children.len(), 1);

        let class = arena.get(root.children[0]);
        assert_eq!(class.description.as_deref(), Some("CLASS I"));
        assert_eq!(class.key, "Abstract");

        let division = arena.get(class.children[0]);
        assert_eq!(division.children.len(), 2);
        let first_section = arena.get(division.children[0]);
        let sub_section = arena.get(first_section.children[0]);
        assert_eq!(sub_section.key, "1. BEING");
        assert_eq!(sub_section.description, None);
        assert_eq!(arena.get(sub_section.children[0]).key, "leaf");

        let second_section = arena.get(division.children[1]);
        assert_eq!(second_section.key, "Relation");
        assert_eq!(arena.get(second_section.children[0]).key, "other leaf");
    }

    #[test]
    fn headword_block_builds_groups_and_senses() {
        let tree = build(
            "CLASS I\nAbstract\n\nExistence-section\n\n\
             1. [obs] Existence -- N. being, entity, reality; esse[Lat].\n",
        )
        .expect("builds");
        let arena = &tree.arena;
        let head = tree.head_words["1"];
        let data = arena.get(head);
        assert_eq!(data.kind, NodeKind::HeadWord);
        assert_eq!(data.key, "Existence");
        let sense = data.sense.as_ref().expect("headword attributes");
        assert_eq!(sense.index.as_deref(), Some("1"));
        assert_eq!(sense.link_comment.as_deref(), Some("obs"));
        assert_eq!(arena.get(data.parent.expect("parent")).key, "Existence-section");

        assert_eq!(data.children.len(), 2);
        let group = arena.get(data.children[0]);
        assert_eq!(group.kind, NodeKind::SenseGroup);
        let keys: Vec<_> = group.children.iter().map(|id| arena.get(*id).key.as_str()).collect();
        assert_eq!(keys, vec!["being", "entity", "reality"]);
        let first = arena.get(group.children[0]).sense.as_ref().expect("sense");
        assert_eq!(first.word_type, WordType::Noun);

        let single = arena.get(data.children[1]);
        assert_eq!(single.kind, NodeKind::Sense);
        assert_eq!(single.key, "esse");
        assert_eq!(
            single.sense.as_ref().and_then(|s| s.comment.as_deref()),
            Some("Lat")
        );
    }

    #[test]
    fn headword_accepts_hash_prefix_and_letter_suffix() {
        let tree = build(
            "CLASS I\nAbstract\n\n#1. Existence.-- N. being.\n\n1a. Self-existence -- N. aseity.\n",
        )
        .expect("builds");
        assert_eq!(tree.arena.get(tree.head_words["1"]).key, "Existence");
        assert_eq!(tree.arena.get(tree.head_words["1a"]).key, "Self-existence");
    }

    #[test]
    fn stops_at_end_marker() {
        let tree = build(
            "CLASS I\nAbstract\n\n1. Existence -- N. being.\n\nEnd of of E-Thesaurus\n\n2. Ignored -- N. x.\n",
        )
        .expect("builds");
        assert!(tree.head_words.contains_key("1"));
        assert!(!tree.head_words.contains_key("2"));
    }

    #[test]
    fn custom_end_marker() {
        let options = ParseOptions {
            end_marker: "THE END".to_string(),
        };
        let tree = TreeBuilder::new(&options)
            .build("CLASS I\nAbstract\n\n1. Existence -- N. being.\n\nTHE END\n\n2. Ignored -- N. x.\n")
            .expect("builds");
        assert_eq!(tree.head_words.len(), 1);
    }

    #[test]
    fn index_gap_is_fatal() {
        let err = build("CLASS I\nAbstract\n\n1. Existence -- N. being.\n\n3. Substance -- N. matter.\n")
            .err()
            .expect("gap detected");
        assert!(matches!(
            err,
            BuildError::SequenceGap {
                previous: 1,
                current: 3,
                line: 6,
                ..
            }
        ));
    }

    #[test]
    fn repeated_index_is_fatal() {
        let err = build("CLASS I\nAbstract\n\n1. Existence -- N. being.\n\n1. Again -- N. more.\n")
            .err()
            .expect("duplicate detected");
        assert!(matches!(err, BuildError::DuplicateHeadWord { .. }));
    }

    #[test]
    fn malformed_definition_is_fatal() {
        let err = build("CLASS I\nAbstract\n\nSee also -- the appendix.\n")
            .err()
            .expect("malformed definition");
        match err {
            BuildError::MalformedHeadwordDefinition { line, definition } => {
                assert_eq!(line, 4);
                assert_eq!(definition, "See also");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn front_matter_before_first_class_is_ignored() {
        let tree = build("Notes -- not a headword\n\nCLASS I\nAbstract\n").expect("builds");
        assert!(tree.head_words.is_empty());
        assert_eq!(tree.arena.len(), 2);
    }
}
