//! # flatdawg
//!
//! A [DAWG](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (Directed Acyclic Word Graph) stored as a flat array of bit-packed
//! 32-bit edges.
//!
//! A DAWG is a minimal acyclic finite-state automaton — a trie with shared
//! prefixes *and* suffixes — giving compact storage and O(word length)
//! lookups. This implementation builds the minimal graph in a single pass
//! over sorted input, and the finished graph is a plain `u32` array that
//! serializes to disk as-is and reloads with no rebuild work.
//!
//! ## Features
//!
//! - **Compact**: every edge is one 32-bit word (letter, two flags, child
//!   index); shared suffixes are stored once
//! - **Fast**: lookups are index arithmetic over one contiguous array
//! - **Persistent**: graphs save to and load from a small binary format
//!   byte for byte
//! - **Thread-safe reads**: a finished [`Graph`](dawg::Graph) is immutable
//!   and freely shareable
//!
//! ## Quick Start
//!
//! Build a graph from sorted words with [`build_graph`](dawg::build_graph):
//!
//! ```
//! use flatdawg::dawg::build_graph;
//!
//! let graph = build_graph(["bake", "cake", "fake", "lake", "make"]).unwrap();
//! assert!(graph.contains("cake"));
//! assert!(!graph.contains("ake"));
//! ```
//!
//! Or drive the [`Builder`](dawg::Builder) directly and persist the result:
//!
//! ```
//! use flatdawg::dawg::{Builder, Graph};
//!
//! let mut builder = Builder::new();
//! builder.start()?;
//! builder.add_word("left")?;
//! builder.add_word("right")?;
//! let graph = builder.finish()?;
//!
//! let mut bytes = Vec::new();
//! graph.save_stream(&mut bytes).unwrap();
//! let reloaded = Graph::load_stream(&mut bytes.as_slice()).unwrap();
//! assert!(reloaded.contains("right"));
//! # Ok::<(), flatdawg::dawg::BuildError>(())
//! ```
//!
//! Words are raw byte strings: anything `AsRef<[u8]>` works, and lookups
//! compare bytes exactly. Input to the builder must arrive in ascending
//! byte order — sorting is the caller's job.

#![warn(missing_docs)]

/// Core DAWG data structures: packed edges, graph, cursors, and builder.
pub mod dawg;
