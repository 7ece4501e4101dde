use roget_types::NodeId;
use thiserror::Error;

/// Fatal build or resolution failure.
///
/// Any of these aborts the whole parse; no partially built thesaurus is ever
/// handed back. `line` is the first line of the offending paragraph.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("line {line}: unrecognized word class {marker:?} in token {token:?}")]
    MalformedWordToken {
        line: usize,
        token: String,
        marker: String,
    },
    #[error("line {line}: token {token:?} yields neither a key nor a link")]
    EmptyKey { line: usize, token: String },
    #[error("line {line}: headword {current} follows {previous}, gap larger than 1 in {definition:?}")]
    SequenceGap {
        line: usize,
        previous: u32,
        current: u32,
        definition: String,
    },
    #[error("line {line}: headword index {index:?} already defined")]
    DuplicateHeadWord { line: usize, index: String },
    #[error("line {line}: malformed headword definition {definition:?}")]
    MalformedHeadwordDefinition { line: usize, definition: String },
    #[error("word {key:?} (node {node}) links to unknown headword {target:?}")]
    UnresolvedLink {
        node: NodeId,
        key: String,
        target: String,
    },
}
