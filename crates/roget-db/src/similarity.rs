//! Nearest-common-ancestor relatedness between two lookup keys.

use std::cmp::Ordering;

use roget_types::{NodeId, NodeKind, TIER_SENSE_GROUP};

use crate::Thesaurus;
use crate::tree::Node;

/// Outcome of [`Thesaurus::similarity`].
///
/// `score` is 100 for a shared sense group, 90 for a shared headword, 80 for
/// a shared category and 0 when the keys have nothing in common (or one of
/// them is unknown). `node` is the ancestor the score is based on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Similarity<'a> {
    pub score: u8,
    pub node: Option<Node<'a>>,
}

impl Similarity<'_> {
    pub fn none() -> Self {
        Self {
            score: 0,
            node: None,
        }
    }
}

impl Thesaurus {
    /// Strength of the closest ancestor shared by `first` and `second`.
    ///
    /// Keys are matched exactly. Symmetric in its arguments.
    pub fn similarity(&self, first: &str, second: &str) -> Similarity<'_> {
        let (Some(left), Some(right)) = (self.ancestor_ids(first), self.ancestor_ids(second))
        else {
            return Similarity::none();
        };

        let mut best: Option<(u8, NodeId)> = None;
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            match left[i].cmp(&right[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    let id = left[i];
                    if let Some(tier) = self.arena.get(id).kind.tier()
                        && best.is_none_or(|(score, _)| score < tier)
                    {
                        best = Some((tier, id));
                        if tier == TIER_SENSE_GROUP {
                            break;
                        }
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        match best {
            Some((score, id)) => Similarity {
                score,
                node: Some(Node::new(self, id)),
            },
            None => Similarity::none(),
        }
    }

    /// Sorted, deduplicated ancestor ids of every sense filed under `key`.
    ///
    /// Each sense contributes itself and its parents up to and including the
    /// first category, plus the same walk from its link target. `None` when
    /// the key is not in the sense index.
    pub fn ancestor_ids(&self, key: &str) -> Option<Vec<NodeId>> {
        let senses = self.sense_index.get(key)?;
        let mut ancestors = Vec::new();
        for &id in senses {
            self.push_ancestors(id, &mut ancestors);
            if let Some(target) = Node::new(self, id).link() {
                self.push_ancestors(target.id(), &mut ancestors);
            }
        }
        ancestors.sort_unstable();
        ancestors.dedup();
        Some(ancestors)
    }

    fn push_ancestors(&self, start: NodeId, out: &mut Vec<NodeId>) {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            out.push(id);
            let node = self.arena.get(id);
            if node.kind == NodeKind::Category {
                break;
            }
            cursor = node.parent;
        }
    }
}
