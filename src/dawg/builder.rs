use tracing::debug;

use super::edge::{Edge, Index};
use super::error::BuildError;
use super::graph::Graph;
use super::{HASH_TABLE_SIZE, MAX_CHARS, MAX_EDGES, MAX_WORD_LENGTH};

/// Builds a minimal [`Graph`] from words fed in ascending byte order.
///
/// The builder keeps only a single root-to-frontier path of partial nodes
/// in memory. When a new word diverges from that path, everything below
/// the divergence point is complete and gets committed bottom-up; each
/// committed node is deduplicated against every node committed so far, so
/// structurally identical subtrees share one copy. The result is minimal
/// with no post-pass.
///
/// ```
/// use flatdawg::dawg::Builder;
///
/// let mut builder = Builder::new();
/// builder.start()?;
/// builder.add_word("tap")?;
/// builder.add_word("top")?;
/// let graph = builder.finish()?;
/// assert!(graph.contains("top"));
/// # Ok::<(), flatdawg::dawg::BuildError>(())
/// ```
///
/// Any error is terminal for the build in progress; discard the builder
/// (or [`clear`](Builder::clear) it) and start over.
pub struct Builder {
    working: Option<Working>,
}

impl Builder {
    /// Creates a builder with no working buffers allocated.
    pub fn new() -> Builder {
        Builder { working: None }
    }

    /// Allocates the working buffers (about 8 MB) and readies the builder
    /// for [`add_word`](Builder::add_word).
    pub fn start(&mut self) -> Result<(), BuildError> {
        if self.working.is_some() {
            return Err(BuildError::AlreadyStarted);
        }
        self.working = Some(Working::new());
        Ok(())
    }

    /// Drops any build in progress, returning the builder to its initial
    /// state.
    pub fn clear(&mut self) {
        self.working = None;
    }

    /// Adds a word.
    ///
    /// Words must arrive in ascending byte order; repeating the previous
    /// word is a no-op. Accepts anything byte-like: `&str`, `String`,
    /// `&[u8]`, `Vec<u8>`, arrays.
    pub fn add_word(&mut self, word: impl AsRef<[u8]>) -> Result<(), BuildError> {
        self.working
            .as_mut()
            .ok_or(BuildError::NotStarted)?
            .add_word(word.as_ref())
    }

    /// Commits everything still on the stack, emits the root node, and
    /// returns the finished graph. The working buffers are released.
    pub fn finish(mut self) -> Result<Graph, BuildError> {
        self.working.take().ok_or(BuildError::NotStarted)?.finish()
    }

    /// Edges committed so far, including the reserved null-and-root block.
    pub fn num_edges(&self) -> usize {
        self.working.as_ref().map_or(0, |w| w.edges.len())
    }

    /// Occupied canonicalization slots: one per distinct committed node.
    pub fn hash_slots_used(&self) -> usize {
        self.working.as_ref().map_or(0, |w| w.hash_used)
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

/// Builds a graph from an iterator of words in ascending byte order.
///
/// ```
/// use flatdawg::dawg::build_graph;
///
/// let graph = build_graph(["bake", "cake", "fake"]).unwrap();
/// assert!(graph.contains("cake"));
/// assert!(!graph.contains("ake"));
/// ```
pub fn build_graph<W, I>(words: I) -> Result<Graph, BuildError>
where
    W: AsRef<[u8]>,
    I: IntoIterator<Item = W>,
{
    let mut builder = Builder::new();
    builder.start()?;
    for word in words {
        builder.add_word(word)?;
    }
    builder.finish()
}

/// Live state between `start` and `finish`.
struct Working {
    /// Output arena. Slot 0 is the null edge and slots `1..1 + MAX_CHARS`
    /// are reserved for the root block; committed nodes append after.
    edges: Vec<Edge>,
    /// One partial node per depth of the current path.
    stack: EdgeStack,
    /// Open-addressed map from node hash to the arena index of the
    /// canonical copy. 0 means empty: no node can start at the null edge.
    hash_table: Box<[Index]>,
    hash_used: usize,
    /// Depth of the deepest active node.
    stack_pos: usize,
}

impl Working {
    fn new() -> Working {
        let mut edges = Vec::with_capacity(4 * MAX_CHARS);
        edges.resize(1 + MAX_CHARS, Edge::default());
        Working {
            edges,
            stack: EdgeStack::new(),
            hash_table: vec![0; HASH_TABLE_SIZE].into_boxed_slice(),
            hash_used: 0,
            stack_pos: 0,
        }
    }

    fn add_word(&mut self, word: &[u8]) -> Result<(), BuildError> {
        if word.is_empty() {
            return Err(BuildError::EmptyWord);
        }
        if word.len() >= MAX_WORD_LENGTH {
            return Err(BuildError::WordTooLong {
                word: word.to_vec(),
            });
        }

        if self.stack.count(0) > 0 {
            // Find the first letter that differs from the path on the
            // stack (the letter of the last-appended edge at each depth).
            let mut i = 0;
            while i <= self.stack_pos
                && i < word.len()
                && word[i] == self.stack.active(i).letter()
            {
                i += 1;
            }

            if i <= self.stack_pos {
                // A word that runs out before the stacked path compares as
                // byte 0, so prefixes of the previous word land here too.
                let found = word.get(i).copied().unwrap_or(0);
                let prior = self.stack.active(i).letter();
                if found < prior {
                    return Err(BuildError::OutOfOrder {
                        word: word.to_vec(),
                        position: i,
                        found,
                        prior,
                    });
                }
                // Everything below the divergence point is complete.
                while self.stack_pos > i {
                    self.finish_node(self.stack_pos)?;
                    self.stack_pos -= 1;
                }
            } else {
                // The previous word is a proper prefix; open a fresh depth
                // so the remaining letters append below it.
                self.stack_pos += 1;
            }
        }

        // Append the remaining letters, one depth each.
        while self.stack_pos < word.len() {
            self.stack.push(self.stack_pos, word[self.stack_pos]);
            self.stack_pos += 1;
        }
        self.stack_pos -= 1;

        self.stack
            .active_mut(self.stack_pos)
            .set_end_of_word(true);
        Ok(())
    }

    /// Commits the partial node at `depth` into the arena, reusing the
    /// canonical copy if an identical node was committed before, and links
    /// the parent's active edge to it.
    fn finish_node(&mut self, depth: usize) -> Result<(), BuildError> {
        self.stack.active_mut(depth).set_end_of_node(true);

        let node = self.stack.node(depth);
        let slot = find_hash_slot(&self.edges, &self.hash_table, node)?;
        if self.hash_table[slot] == 0 {
            if self.edges.len() + node.len() > MAX_EDGES {
                return Err(BuildError::Full {
                    committed: self.edges.len(),
                    incoming: node.len(),
                });
            }
            self.hash_table[slot] = self.edges.len() as Index;
            self.hash_used += 1;
            self.edges.extend_from_slice(node);
        }

        let child = self.hash_table[slot];
        self.stack.active_mut(depth - 1).set_child(child);
        self.stack.clear_level(depth);
        Ok(())
    }

    fn finish(mut self) -> Result<Graph, BuildError> {
        while self.stack_pos > 0 {
            self.finish_node(self.stack_pos)?;
            self.stack_pos -= 1;
        }

        // An empty builder has no active edge at depth 0 to terminate.
        if self.stack.count(0) > 0 {
            self.stack.active_mut(0).set_end_of_node(true);
        }

        // The bottom stack level becomes the root block, zeroed tail and
        // all; the last slot is terminated unconditionally so scans stay
        // bounded even with all 256 first letters in use.
        self.edges[1..1 + MAX_CHARS].copy_from_slice(self.stack.level(0));
        self.edges[MAX_CHARS].set_end_of_node(true);

        debug!(
            num_edges = self.edges.len(),
            hash_slots_used = self.hash_used,
            "graph finalized"
        );
        Ok(Graph::load_buffer(&self.edges))
    }
}

/// The in-progress path: one partial node per depth, each with room for
/// every possible letter.
struct EdgeStack {
    slab: Box<[Edge]>,
    counts: [Index; MAX_WORD_LENGTH],
}

impl EdgeStack {
    fn new() -> EdgeStack {
        EdgeStack {
            slab: vec![Edge::default(); MAX_WORD_LENGTH * MAX_CHARS].into_boxed_slice(),
            counts: [0; MAX_WORD_LENGTH],
        }
    }

    fn count(&self, depth: usize) -> usize {
        self.counts[depth] as usize
    }

    /// The used slots of the partial node at `depth`.
    fn node(&self, depth: usize) -> &[Edge] {
        let base = depth * MAX_CHARS;
        &self.slab[base..base + self.count(depth)]
    }

    /// All `MAX_CHARS` slots at `depth`, zeroed tail included.
    fn level(&self, depth: usize) -> &[Edge] {
        let base = depth * MAX_CHARS;
        &self.slab[base..base + MAX_CHARS]
    }

    /// The last-appended edge at `depth`.
    fn active(&self, depth: usize) -> Edge {
        self.slab[depth * MAX_CHARS + self.count(depth) - 1]
    }

    fn active_mut(&mut self, depth: usize) -> &mut Edge {
        let index = depth * MAX_CHARS + self.count(depth) - 1;
        &mut self.slab[index]
    }

    /// Appends a fresh edge for `letter` at `depth`. The slot is known to
    /// be zeroed: levels are wiped whenever a node commits.
    fn push(&mut self, depth: usize, letter: u8) {
        self.counts[depth] += 1;
        self.active_mut(depth).set_letter(letter);
    }

    fn clear_level(&mut self, depth: usize) {
        let base = depth * MAX_CHARS;
        self.slab[base..base + MAX_CHARS].fill(Edge::default());
        self.counts[depth] = 0;
    }
}

/// Open-addressed probe for `node`'s slot: either the slot holding the
/// canonical copy's index, or the empty slot where it should be inserted.
///
/// The probe sequence (steps 9, 18, 27, … from the hash origin) decides
/// where canonical nodes land in the arena, and therefore the exact bytes
/// of every graph this crate writes. It must not change.
fn find_hash_slot(
    arena: &[Edge],
    table: &[Index],
    node: &[Edge],
) -> Result<usize, BuildError> {
    let origin = hash_node(node) as usize % HASH_TABLE_SIZE;
    let mut idx = origin;
    let mut step = 9;
    loop {
        let start = table[idx] as usize;
        if start == 0 {
            return Ok(idx);
        }
        if arena.get(start..start + node.len()) == Some(node) {
            return Ok(idx);
        }
        idx = (idx + step) % HASH_TABLE_SIZE;
        step = (step + 9) % HASH_TABLE_SIZE;
        if idx == origin {
            return Err(BuildError::HashFull);
        }
    }
}

/// Rotate-and-xor over the node's packed words. Two nodes hash equal iff
/// their edge sequences are bit-identical, which is exactly the builder's
/// definition of node equality.
fn hash_node(node: &[Edge]) -> u32 {
    node.iter()
        .fold(0, |hash, edge| hash.rotate_left(1) ^ edge.bits())
}
