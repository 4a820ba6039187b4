use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use smallvec::SmallVec;
use tracing::debug;

use super::edge::{Edge, Index};
use super::error::GraphError;
use super::{MAX_CHARS, MAX_EDGES, MAX_WORD_LENGTH};

/// Smallest edge count any builder output can have: the null edge plus
/// the reserved root block.
const MIN_EDGES: usize = 1 + MAX_CHARS;

/// Identifies graph files on disk.
pub(crate) const MAGIC_NUMBER: u32 = 0xC6AC_C231;

const HEADER_LEN: usize = 8;

/// An immutable directed acyclic word graph.
///
/// The graph is a flat array of packed [`Edge`] words. Index 0 is the null
/// edge every traversal terminates on, indices `1..1 + MAX_CHARS` hold the
/// root node (one slot per possible first letter, unused slots zeroed),
/// and everything above that is minimized shared nodes. One sentinel edge
/// sits past the end with `child = 1` so the root cursor descends like any
/// other.
///
/// Graphs are produced by [`Builder`](super::Builder) or loaded from a
/// previously saved stream; once constructed they never change, so shared
/// references can be handed to any number of concurrent readers.
///
/// Loading performs no structural validation beyond the header: walking a
/// hand-corrupted edge array can panic on an out-of-range child index.
pub struct Graph {
    /// All edges, including the trailing root sentinel.
    edges: Box<[Edge]>,
}

impl Graph {
    /// Reads a graph from a stream written by [`save_stream`](Graph::save_stream).
    pub fn load_stream<R: Read>(input: &mut R) -> Result<Graph, GraphError> {
        let mut word = [0u8; 4];

        let got = read_fully(input, &mut word)?;
        if got != word.len() {
            return Err(GraphError::ShortHeader {
                expected: HEADER_LEN,
                got,
            });
        }
        let magic = LittleEndian::read_u32(&word);
        if magic != MAGIC_NUMBER {
            return Err(GraphError::BadMagic {
                expected: MAGIC_NUMBER,
                found: magic,
            });
        }

        let got = read_fully(input, &mut word)?;
        if got != word.len() {
            return Err(GraphError::ShortHeader {
                expected: HEADER_LEN,
                got: 4 + got,
            });
        }
        let num_edges = LittleEndian::read_u32(&word) as usize;
        if !(MIN_EDGES..=MAX_EDGES).contains(&num_edges) {
            return Err(GraphError::BadEdgeCount { num_edges });
        }

        let expected = num_edges * 4;
        let mut body = vec![0u8; expected];
        let got = read_fully(input, &mut body)?;
        if got != expected {
            return Err(GraphError::ShortBody { expected, got });
        }

        let mut edges = vec![Edge::default(); num_edges + 1];
        for (edge, chunk) in edges.iter_mut().zip(body.chunks_exact(4)) {
            *edge = Edge::from_bits(LittleEndian::read_u32(chunk));
        }
        edges[num_edges].set_child(1);

        debug!(num_edges, "graph loaded");
        Ok(Graph {
            edges: edges.into_boxed_slice(),
        })
    }

    /// Builds a graph from an in-memory edge array.
    ///
    /// The slice is copied and the root sentinel appended, exactly as
    /// [`load_stream`](Graph::load_stream) would after reading the same
    /// words from a stream.
    pub fn load_buffer(edges: &[Edge]) -> Graph {
        let mut all = Vec::with_capacity(edges.len() + 1);
        all.extend_from_slice(edges);
        let mut sentinel = Edge::default();
        sentinel.set_child(1);
        all.push(sentinel);
        Graph {
            edges: all.into_boxed_slice(),
        }
    }

    /// Writes the graph to a stream.
    ///
    /// The sentinel is not written; loaders reconstruct it. Edge words go
    /// out as raw little-endian `u32`s, so the file is a direct image of
    /// the in-memory array.
    pub fn save_stream<W: Write>(&self, out: &mut W) -> Result<(), GraphError> {
        out.write_u32::<LittleEndian>(MAGIC_NUMBER)
            .map_err(GraphError::IoWrite)?;
        out.write_u32::<LittleEndian>(self.num_edges() as u32)
            .map_err(GraphError::IoWrite)?;
        for edge in &self.edges[..self.num_edges()] {
            out.write_u32::<LittleEndian>(edge.bits())
                .map_err(GraphError::IoWrite)?;
        }
        debug!(num_edges = self.num_edges(), "graph saved");
        Ok(())
    }

    /// Number of edges, not counting the trailing sentinel.
    pub fn num_edges(&self) -> usize {
        self.edges.len() - 1
    }

    /// The full edge array, sentinel included.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The edge at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the sentinel.
    pub fn edge(&self, index: Index) -> Edge {
        self.edges[index as usize]
    }

    /// A cursor at the root sentinel; its [`child`](Cursor::child) is the
    /// first edge of the root node.
    pub fn root(&self) -> Cursor<'_> {
        Cursor {
            graph: self,
            index: self.num_edges() as Index,
        }
    }

    /// Whether `word` is stored in the graph.
    ///
    /// The empty string is never stored; looking it up returns false.
    pub fn contains(&self, word: impl AsRef<[u8]>) -> bool {
        let mut cursor = self.root().child();
        let mut end_of_word = false;
        for &letter in word.as_ref() {
            cursor = cursor.find(letter);
            if cursor.is_null() {
                return false;
            }
            end_of_word = cursor.edge().end_of_word();
            cursor = cursor.child();
        }
        end_of_word
    }

    /// Whether any stored word starts with `prefix`.
    pub fn contains_prefix(&self, prefix: impl AsRef<[u8]>) -> bool {
        let mut cursor = self.root().child();
        for &letter in prefix.as_ref() {
            cursor = cursor.find(letter);
            if cursor.is_null() {
                return false;
            }
            cursor = cursor.child();
        }
        true
    }

    /// Every stored word, in ascending byte order.
    pub fn words(&self) -> Vec<Vec<u8>> {
        let mut words = Vec::new();
        let mut prefix = SmallVec::<[u8; MAX_WORD_LENGTH]>::new();
        collect_words(self.root().child(), &mut prefix, &mut words);
        words
    }
}

fn collect_words(
    node: Cursor<'_>,
    prefix: &mut SmallVec<[u8; MAX_WORD_LENGTH]>,
    words: &mut Vec<Vec<u8>>,
) {
    for cursor in node.edges() {
        let edge = cursor.edge();
        prefix.push(edge.letter());
        if edge.end_of_word() {
            words.push(prefix.to_vec());
        }
        let child = cursor.child();
        if !child.is_null() {
            collect_words(child, prefix, words);
        }
        prefix.pop();
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("num_edges", &self.num_edges())
            .finish_non_exhaustive()
    }
}

/// Fills `buf` as far as the reader allows, returning the byte count so
/// truncation errors can report exactly how much arrived.
fn read_fully<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<usize, GraphError> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(GraphError::IoRead(e)),
        }
    }
    Ok(filled)
}

/// A position in a graph's edge array.
///
/// A cursor is an opaque index plus a reference to its graph; copying is
/// free and never touches the graph. The cursor on the null edge (index 0)
/// is the universal terminator: every scan and every descent through a
/// childless edge lands there.
#[derive(Clone, Copy)]
pub struct Cursor<'g> {
    graph: &'g Graph,
    index: Index,
}

impl<'g> Cursor<'g> {
    /// The index this cursor points at.
    pub fn index(self) -> Index {
        self.index
    }

    /// The edge this cursor points at.
    pub fn edge(self) -> Edge {
        self.graph.edge(self.index)
    }

    /// Whether this cursor sits on the null edge.
    pub fn is_null(self) -> bool {
        self.index == 0
    }

    /// The next edge of the same node, or the null cursor if this edge is
    /// the node's last (or is itself the null edge).
    pub fn advance(self) -> Cursor<'g> {
        if self.is_null() || self.edge().end_of_node() {
            Cursor {
                graph: self.graph,
                index: 0,
            }
        } else {
            Cursor {
                graph: self.graph,
                index: self.index + 1,
            }
        }
    }

    /// A cursor at the first edge of this edge's child node; the null
    /// cursor if there is no subtree.
    pub fn child(self) -> Cursor<'g> {
        Cursor {
            graph: self.graph,
            index: self.edge().child(),
        }
    }

    /// Scans from this edge through the rest of the node for `letter`,
    /// returning the null cursor if no edge matches.
    pub fn find(self, letter: u8) -> Cursor<'g> {
        let mut cursor = self;
        while !cursor.is_null() {
            if cursor.edge().letter() == letter {
                return cursor;
            }
            cursor = cursor.advance();
        }
        cursor
    }

    /// Iterates the remaining edges of this node.
    ///
    /// Unused slots of the root block are skipped. Edges of committed
    /// nodes are never filtered, so a genuine NUL-lettered edge is
    /// yielded like any other.
    pub fn edges(self) -> Edges<'g> {
        Edges { cursor: self }
    }

    /// Whether this cursor sits on an unused slot of the root block. The
    /// block is written in full, so slots past the last used edge hold
    /// zeroed words, plus the bare terminator at `MAX_CHARS`. A real root
    /// edge carries an end-of-word flag or a child even when its letter
    /// is zero.
    fn is_root_padding(self) -> bool {
        if !(1..=MAX_CHARS).contains(&(self.index as usize)) {
            return false;
        }
        let edge = self.edge();
        edge.letter() == 0 && !edge.end_of_word() && edge.child() == 0
    }
}

// Cursors into different graphs never compare equal, even at equal
// indices.
impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.index == other.index
    }
}

impl Eq for Cursor<'_> {}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({} @ {:?})", self.index, self.edge())
    }
}

/// Iterator over the edges of one node. See [`Cursor::edges`].
pub struct Edges<'g> {
    cursor: Cursor<'g>,
}

impl<'g> Iterator for Edges<'g> {
    type Item = Cursor<'g>;

    fn next(&mut self) -> Option<Cursor<'g>> {
        while !self.cursor.is_null() {
            let current = self.cursor;
            self.cursor = current.advance();
            if !current.is_root_padding() {
                return Some(current);
            }
            // unused slot in the root block; nothing lives here
        }
        None
    }
}
