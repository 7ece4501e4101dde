//! Versioned JSON snapshot of a resolved thesaurus.
//!
//! A snapshot is the arena flattened to one row per node, in id order, with
//! links stored as resolved ids. Children lists and both indices are rebuilt
//! on load, so they never go stale on disk.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use roget_types::{NodeId, NodeKind, WordType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::Thesaurus;
use crate::builder::ParseOptions;
use crate::resolve::{index_senses, preorder};
use crate::source::LoadMode;
use crate::tree::{Arena, Link, NodeData, SenseData};

/// Bumped whenever the row layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub nodes: Vec<SnapshotNode>,
}

/// One node. Sense attributes are only meaningful on headwords and senses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: u32,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_comment: Option<String>,
    #[serde(default, skip_serializing_if = "WordType::is_none")]
    pub word_type: WordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot version {found} is not supported (expected {SNAPSHOT_VERSION})")]
    Version { found: u32 },
    #[error("snapshot has no nodes")]
    Empty,
    #[error("row {position} carries id {id}; ids must be contiguous from 0")]
    NonContiguous { position: usize, id: u32 },
    #[error("node 0 must be a parentless category")]
    BadRoot,
    #[error("node {id} has parent {parent}; parents must precede their children")]
    ParentOrder { id: u32, parent: NodeId },
    #[error("node {id} is out of document order; a pre-order walk must visit ids in ascending order")]
    DocumentOrder { id: u32 },
    #[error("node {id} links to {target}, which is not a headword")]
    LinkTarget { id: u32, target: NodeId },
    #[error("headword {id} has no index")]
    MissingIndex { id: u32 },
    #[error("headword index {index:?} appears more than once")]
    DuplicateIndex { index: String },
}

impl Snapshot {
    /// Write the snapshot as JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)
            .with_context(|| format!("encode snapshot {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// Read a snapshot written by [`Snapshot::save`]. The content is not
    /// validated until [`Thesaurus::from_snapshot`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("decode snapshot {}", path.display()))
    }
}

impl Thesaurus {
    /// Flatten the tree into a snapshot.
    pub fn to_snapshot(&self) -> Snapshot {
        let nodes = self
            .arena
            .iter()
            .map(|(id, data)| {
                let sense = data.sense.as_ref();
                SnapshotNode {
                    id: id.0,
                    kind: data.kind,
                    parent: data.parent,
                    description: data.description.clone(),
                    key: data.key.clone(),
                    comment: sense.and_then(|s| s.comment.clone()),
                    link: sense.and_then(|s| s.link.as_ref()).and_then(Link::target),
                    link_comment: sense.and_then(|s| s.link_comment.clone()),
                    word_type: sense.map(|s| s.word_type).unwrap_or_default(),
                    index: sense.and_then(|s| s.index.clone()),
                }
            })
            .collect();
        Snapshot {
            version: SNAPSHOT_VERSION,
            nodes,
        }
    }

    /// Rebuild a thesaurus from a snapshot, checking its structure first.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
            });
        }
        if snapshot.nodes.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let mut kinds = Vec::with_capacity(snapshot.nodes.len());
        for (position, row) in snapshot.nodes.iter().enumerate() {
            if row.id as usize != position {
                return Err(SnapshotError::NonContiguous {
                    position,
                    id: row.id,
                });
            }
            let kind = row.kind;
            match row.parent {
                None if position == 0 && kind == NodeKind::Category => {}
                None => return Err(SnapshotError::BadRoot),
                Some(_) if position == 0 => return Err(SnapshotError::BadRoot),
                Some(parent) if parent.0 >= row.id => {
                    return Err(SnapshotError::ParentOrder { id: row.id, parent });
                }
                Some(_) => {}
            }
            kinds.push(kind);
        }

        let mut head_word_index = HashMap::new();
        for row in &snapshot.nodes {
            if let Some(target) = row.link
                && kinds.get(target.index()) != Some(&NodeKind::HeadWord)
            {
                return Err(SnapshotError::LinkTarget { id: row.id, target });
            }
            if kinds[row.id as usize] == NodeKind::HeadWord {
                let index = row
                    .index
                    .clone()
                    .ok_or(SnapshotError::MissingIndex { id: row.id })?;
                if head_word_index.insert(index.clone(), NodeId(row.id)).is_some() {
                    return Err(SnapshotError::DuplicateIndex { index });
                }
            }
        }

        let mut nodes: Vec<NodeData> = Vec::with_capacity(snapshot.nodes.len());
        for (row, kind) in snapshot.nodes.into_iter().zip(kinds) {
            let sense = kind.is_sense().then(|| SenseData {
                comment: row.comment,
                link: row.link.map(Link::Resolved),
                link_comment: row.link_comment,
                word_type: row.word_type,
                index: row.index.filter(|_| kind == NodeKind::HeadWord),
            });
            if let Some(parent) = row.parent {
                nodes[parent.index()].children.push(NodeId(row.id));
            }
            nodes.push(NodeData {
                kind,
                description: row.description,
                key: row.key,
                parent: row.parent,
                children: Vec::new(),
                sense,
            });
        }

        let arena = Arena::from_nodes(nodes);
        let root = NodeId(0);
        if let Some(pair) = preorder(&arena, root)
            .windows(2)
            .find(|pair| pair[0] >= pair[1])
        {
            return Err(SnapshotError::DocumentOrder { id: pair[1].0 });
        }
        let sense_index = index_senses(&arena, root);
        Ok(Self {
            arena,
            root,
            head_word_index,
            sense_index,
        })
    }

    /// Load from a snapshot at `cache` when it is present, valid and not
    /// older than `source`; otherwise parse `source` and refresh the cache.
    ///
    /// Cache trouble is logged and never fails the load. Parse errors do.
    pub fn load_cached(
        source: impl AsRef<Path>,
        cache: impl AsRef<Path>,
        mode: LoadMode,
    ) -> Result<Self> {
        Self::load_cached_with_options(source, cache, mode, &ParseOptions::default())
    }

    pub fn load_cached_with_options(
        source: impl AsRef<Path>,
        cache: impl AsRef<Path>,
        mode: LoadMode,
        options: &ParseOptions,
    ) -> Result<Self> {
        let (source, cache) = (source.as_ref(), cache.as_ref());

        if !cache.exists() {
            debug!("no snapshot at {}", cache.display());
        } else if is_stale(source, cache) {
            info!("snapshot {} is older than {}", cache.display(), source.display());
        } else {
            let start = Instant::now();
            match Snapshot::load(cache)
                .and_then(|snapshot| Self::from_snapshot(snapshot).map_err(anyhow::Error::from))
            {
                Ok(thesaurus) => {
                    info!(
                        nodes = thesaurus.node_count(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "loaded snapshot {}",
                        cache.display()
                    );
                    return Ok(thesaurus);
                }
                Err(err) => warn!("ignoring snapshot {}: {err:#}", cache.display()),
            }
        }

        let thesaurus = Self::load_with_options(source, mode, options)?;
        if let Err(err) = thesaurus.to_snapshot().save(cache) {
            warn!("could not write snapshot {}: {err:#}", cache.display());
            let _ = fs::remove_file(cache);
        }
        Ok(thesaurus)
    }
}

/// True when `source` was modified after `cache`. Unknown times count as fresh.
fn is_stale(source: &Path, cache: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();
    match (modified(source), modified(cache)) {
        (Some(source), Some(cache)) => source > cache,
        _ => false,
    }
}
