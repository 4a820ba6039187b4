//! Example: using a graph as a wordlist.
//!
//! Builds a small graph, runs word and prefix lookups, enumerates the
//! stored words, and round-trips the graph through its binary format.
//!
//! Run with: cargo run --example wordlist

use flatdawg::dawg::{build_graph, Graph};

fn main() {
    let words = ["bake", "baked", "baker", "cake", "caked", "fake", "lake"];
    let graph = build_graph(words).unwrap();

    // Word lookup
    println!("Word lookup:");
    for word in ["bake", "baker", "bakes", "cake", "lake", "make"] {
        let answer = if graph.contains(word) { "yes" } else { "no" };
        println!("  {word}: {answer}");
    }

    // Prefix checking
    println!("\nPrefix checking:");
    for prefix in ["ba", "cak", "ma", "fak"] {
        let answer = if graph.contains_prefix(prefix) { "yes" } else { "no" };
        println!("  {prefix}*: {answer}");
    }

    // List all words
    let all: Vec<String> = graph
        .words()
        .into_iter()
        .map(|w| String::from_utf8_lossy(&w).into_owned())
        .collect();
    println!("\nAll words: {all:?}");

    // Round-trip through the binary format
    let mut bytes = Vec::new();
    graph.save_stream(&mut bytes).unwrap();
    let reloaded = Graph::load_stream(&mut bytes.as_slice()).unwrap();
    println!(
        "\nSaved {} bytes ({} edges); reloaded graph still contains \"caked\": {}",
        bytes.len(),
        reloaded.num_edges(),
        reloaded.contains("caked")
    );
}
