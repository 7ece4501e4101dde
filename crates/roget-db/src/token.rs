//! Attribute extraction for a single word token.
//!
//! A token such as `ens[Lat]`, `N. being` or `&c (absence) 187` carries up to
//! four things: a bracketed comment, a cross-reference to a headword, a word
//! class and the key text. They are peeled off in that order, each step
//! removing what it matched before the next one looks.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use roget_types::WordType;

use crate::error::BuildError;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").expect("comment pattern"));

/// Sigil (`&c`, `&amp;c`), optional `(attribute)`, target token, optional period.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:amp;)?c\.?\s+(?:\(([^)]+)\))?\s*([^\s,;.^]+)\.?").expect("link pattern")
});

/// Same shape anchored at the cursor, without the trailing period. Used by the
/// splitter to step over a marker as one unit.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:amp;)?c\.?\s+(?:\([^)]+\))?\s*[^\s,;.^]+").expect("marker pattern")
});

/// A class abbreviation starting with a capital letter. Lowercase `n.` or
/// `adv.` is ordinary text. Whether a hit such as `ADJ.` is a known class is
/// decided by [`WordType::from_marker`].
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:A[dD][jJvV]|P[hH][rR]|N|V)\.").expect("class pattern")
});

/// Attributes parsed out of one token.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct WordAttrs {
    pub(crate) key: String,
    pub(crate) comment: Option<String>,
    /// Unresolved headword index.
    pub(crate) link: Option<String>,
    pub(crate) word_type: WordType,
}

/// Byte length of a cross-reference marker starting at the head of `rest`.
pub(crate) fn marker_len(rest: &str) -> Option<usize> {
    MARKER_RE.find(rest).map(|m| m.end())
}

/// Parse one raw token. `line` only feeds error context.
pub(crate) fn parse_word(token: &str, line: usize) -> Result<WordAttrs, BuildError> {
    let mut attrs = WordAttrs::default();
    let mut text = token.to_string();

    let comment = COMMENT_RE
        .captures(&text)
        .map(|caps| strip_control(&caps[1]));
    if let Some(comment) = comment {
        let comment = comment.trim();
        if !comment.is_empty() {
            attrs.comment = Some(comment.to_string());
        }
        text = COMMENT_RE.replace_all(&text, "").into_owned();
    }

    if let Some((word_type, link)) = LINK_RE.captures(&text).map(|caps| classify_link(&caps)) {
        if let Some(word_type) = word_type {
            attrs.word_type = word_type;
        }
        attrs.link = link;
        text = LINK_RE.replace_all(&text, " ").into_owned();
    }

    let mut class = None;
    for found in CLASS_RE.find_iter(&text) {
        match WordType::from_marker(found.as_str()) {
            Some(word_type) => {
                class.get_or_insert(word_type);
            }
            None => {
                return Err(BuildError::MalformedWordToken {
                    line,
                    token: token.trim().to_string(),
                    marker: found.as_str().to_string(),
                });
            }
        }
    }
    if let Some(word_type) = class {
        attrs.word_type = word_type;
        text = CLASS_RE.replace_all(&text, " ").into_owned();
    }

    attrs.key = collapse_whitespace(&text);
    if attrs.key.is_empty() && attrs.link.is_none() {
        return Err(BuildError::EmptyKey {
            line,
            token: token.trim().to_string(),
        });
    }
    Ok(attrs)
}

/// Interpret a matched marker as `(word class, link target)`.
///
/// Without a parenthesized attribute the target itself sits in the attribute
/// slot: `&c adj.` is a class, `&c 12` a link. A numeric attribute replaces
/// any separate target.
fn classify_link(caps: &Captures<'_>) -> (Option<WordType>, Option<String>) {
    let (slot, mut target) = match caps.get(1) {
        Some(attribute) => (Some(attribute.as_str()), caps.get(2).map(|m| m.as_str())),
        None => (caps.get(2).map(|m| m.as_str()), None),
    };

    let mut word_type = None;
    if let Some(slot) = slot {
        word_type = WordType::from_attribute(slot);
        if word_type.is_none() && slot.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
            target = Some(slot);
        }
    }

    let link = target
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    (word_type, link)
}

fn is_noise(c: char) -> bool {
    c.is_control() || c == '^'
}

fn strip_control(text: &str) -> String {
    text.chars().filter(|c| !is_noise(*c)).collect()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || is_noise(c))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
