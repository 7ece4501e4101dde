//! Splits a headword body into sense groups and word tokens.
//!
//! Groups end at `;` or at a period that closes a line; tokens end at `,`.
//! Bracketed spans and cross-reference markers are stepped over whole, so a
//! comma or semicolon inside `[...]` or `&c (absence) 187` never splits.

use crate::token::marker_len;

/// Split `body` into groups of trimmed, non-empty tokens.
pub(crate) fn word_groups(body: &str) -> Vec<Vec<&str>> {
    split_groups(body)
        .into_iter()
        .map(split_tokens)
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

pub(crate) fn split_groups(body: &str) -> Vec<&str> {
    split_outside_atoms(body, |rest| match rest.as_bytes().first() {
        Some(b';') => true,
        Some(b'.') => ends_line(&rest[1..]),
        _ => false,
    })
}

pub(crate) fn split_tokens(group: &str) -> Vec<&str> {
    split_outside_atoms(group, |rest| rest.starts_with(','))
}

/// A period is a group boundary only when nothing but spaces follows it on
/// its line. Abbreviations such as `N.` or `Adj.` stay inside the group.
fn ends_line(after: &str) -> bool {
    after
        .chars()
        .find(|c| *c != ' ' && *c != '\t')
        .is_none_or(|c| c == '\n' || c == '\r')
}

fn atom_len(rest: &str) -> Option<usize> {
    match rest.as_bytes().first() {
        Some(b'[') => rest.find(']').map(|end| end + 1),
        Some(b'&') => marker_len(rest),
        _ => None,
    }
}

fn split_outside_atoms<'a>(text: &'a str, is_separator: impl Fn(&str) -> bool) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if let Some(len) = atom_len(rest) {
            pos += len;
            continue;
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        if is_separator(rest) {
            pieces.push(&text[start..pos]);
            start = pos + ch.len_utf8();
        }
        pos += ch.len_utf8();
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}
