/// Graph construction from sorted word streams.
pub mod builder;
/// The packed 32-bit edge word.
pub mod edge;
/// Error types for building, loading, and saving graphs.
pub mod error;
/// The immutable graph and its cursors.
pub mod graph;

#[cfg(test)]
mod proptests;

pub use builder::{build_graph, Builder};
pub use edge::{Edge, Index};
pub use error::{BuildError, GraphError};
pub use graph::{Cursor, Edges, Graph};

/// Room for one edge per possible letter in a node; also the size of the
/// reserved root block.
pub const MAX_CHARS: usize = 256;
/// Words must be strictly shorter than this; it bounds the builder's
/// working stack depth.
pub const MAX_WORD_LENGTH: usize = 32;
/// Slots in the canonicalization hash table. Prime.
pub const HASH_TABLE_SIZE: usize = 1_000_003;
/// Most edges a graph can hold.
pub const MAX_EDGES: usize = HASH_TABLE_SIZE - 1;
