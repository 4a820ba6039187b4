use std::io;

use thiserror::Error;

use super::{MAX_CHARS, MAX_EDGES, MAX_WORD_LENGTH};

/// Errors raised while loading or saving a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The stream did not begin with the expected file identifier.
    #[error("file identifier mismatch: expected {expected:#010x} but got {found:#010x}")]
    BadMagic {
        /// The magic number every graph file starts with.
        expected: u32,
        /// The word actually read.
        found: u32,
    },

    /// The stream ended before the fixed header was complete.
    #[error("truncated header: expected {expected} bytes but got {got}")]
    ShortHeader {
        /// Header size in bytes.
        expected: usize,
        /// Bytes actually read.
        got: usize,
    },

    /// The stream ended before all edge words were read.
    #[error("truncated edge data: expected {expected} bytes but got {got}")]
    ShortBody {
        /// `num_edges * 4` per the header.
        expected: usize,
        /// Bytes actually read.
        got: usize,
    },

    /// The header claims an edge count no builder can produce.
    #[error("edge count {num_edges} is outside the valid range ({}..={})", 1 + MAX_CHARS, MAX_EDGES)]
    BadEdgeCount {
        /// Edge count read from the header.
        num_edges: usize,
    },

    /// The underlying reader failed.
    #[error("couldn't read graph data")]
    IoRead(#[source] io::Error),

    /// The underlying writer failed.
    #[error("couldn't write graph data")]
    IoWrite(#[source] io::Error),
}

/// Errors raised while building a graph.
///
/// Every build error is terminal: the builder's working state is no longer
/// meaningful and the caller should discard it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The word does not fit the fixed-depth working stack.
    #[error("word is too long ({:?} is {} bytes, words must be shorter than {})",
        String::from_utf8_lossy(.word), .word.len(), MAX_WORD_LENGTH)]
    WordTooLong {
        /// The offending word.
        word: Vec<u8>,
    },

    /// Zero-length words cannot be stored.
    #[error("empty words cannot be stored")]
    EmptyWord,

    /// The word compares below the previously added word.
    #[error("word out of order: {:?} diverges at index {position} (byte {found:#04x} < {prior:#04x})",
        String::from_utf8_lossy(.word))]
    OutOfOrder {
        /// The offending word.
        word: Vec<u8>,
        /// Index of the first byte that differs from the stacked path.
        position: usize,
        /// The word's byte at that index (0 if the word ended first).
        found: u8,
        /// The letter already on the stack at that depth.
        prior: u8,
    },

    /// Committing the node would exceed the edge capacity.
    #[error("graph is full: {committed} edges plus {incoming} more would exceed the limit of {}", MAX_EDGES)]
    Full {
        /// Edges already committed to the arena.
        committed: usize,
        /// Edges in the node being committed.
        incoming: usize,
    },

    /// Every probe slot for the node's hash is taken.
    #[error("hash table is full")]
    HashFull,

    /// The builder's working buffers were never allocated.
    #[error("builder has not been started")]
    NotStarted,

    /// `start` was called twice without an intervening `clear`.
    #[error("builder is already started; clear it before starting again")]
    AlreadyStarted,
}
