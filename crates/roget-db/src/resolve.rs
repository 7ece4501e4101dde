//! Second pass: turn textual cross-references into node handles and build the
//! sense index.

use std::collections::HashMap;

use roget_types::NodeId;

use crate::error::BuildError;
use crate::tree::{Arena, Link};

pub(crate) type SenseIndex = HashMap<String, Vec<NodeId>>;

/// Pre-order walk from `root`. For trees built in document order this is
/// ascending id order.
pub(crate) fn preorder(arena: &Arena, root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(arena.len());
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        order.push(id);
        stack.extend(arena.get(id).children.iter().rev().copied());
    }
    order
}

/// Resolve every link, let link-only words inherit their target's key, and
/// index each sense and headword under its effective key.
pub(crate) fn resolve(
    arena: &mut Arena,
    root: NodeId,
    head_words: &HashMap<String, NodeId>,
) -> Result<SenseIndex, BuildError> {
    let mut senses = SenseIndex::new();
    for id in preorder(arena, root) {
        let node = arena.get(id);
        let Some(sense) = node.sense.as_ref() else {
            continue;
        };

        let target = match &sense.link {
            Some(Link::Unresolved(index)) => Some(*head_words.get(index).ok_or_else(|| {
                BuildError::UnresolvedLink {
                    node: id,
                    key: node.key.clone(),
                    target: index.clone(),
                }
            })?),
            Some(Link::Resolved(target)) => Some(*target),
            None => None,
        };
        let inherited = match target {
            Some(target) if node.key.is_empty() => Some(arena.get(target).key.clone()),
            _ => None,
        };

        let node = arena.get_mut(id);
        if let (Some(target), Some(sense)) = (target, node.sense.as_mut()) {
            sense.link = Some(Link::Resolved(target));
        }
        if let Some(key) = inherited {
            node.key = key;
        }
        push_sense(&mut senses, &node.key, id);
    }
    Ok(senses)
}

/// Rebuild the sense index of an already resolved tree.
pub(crate) fn index_senses(arena: &Arena, root: NodeId) -> SenseIndex {
    let mut senses = SenseIndex::new();
    for id in preorder(arena, root) {
        let node = arena.get(id);
        if node.sense.is_some() {
            push_sense(&mut senses, &node.key, id);
        }
    }
    senses
}

fn push_sense(senses: &mut SenseIndex, key: &str, id: NodeId) {
    let list = senses.entry(key.to_string()).or_default();
    debug_assert!(list.last().is_none_or(|last| *last < id));
    list.push(id);
}
