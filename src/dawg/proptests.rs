use std::collections::BTreeSet;

use proptest::prelude::*;

use super::*;

/// Sorted, deduplicated word sets over a small alphabet, so shared
/// prefixes and suffixes show up often.
fn dense_word_sets() -> impl Strategy<Value = BTreeSet<Vec<u8>>> {
    proptest::collection::btree_set(proptest::collection::vec(b'a'..=b'd', 1..10), 0..48)
}

/// Word sets over the full byte range, NUL included: letters are raw
/// bytes, and a zero letter is as real as any other.
fn binary_word_sets() -> impl Strategy<Value = BTreeSet<Vec<u8>>> {
    proptest::collection::btree_set(
        proptest::collection::vec(any::<u8>(), 1..(MAX_WORD_LENGTH - 1)),
        0..32,
    )
}

fn committed_nodes(graph: &Graph) -> Vec<Vec<u32>> {
    let edges = graph.edges();
    let mut nodes = Vec::new();
    let mut start = 1 + MAX_CHARS;
    for i in start..graph.num_edges() {
        if edges[i].end_of_node() {
            nodes.push(edges[start..=i].iter().map(|e| e.bits()).collect());
            start = i + 1;
        }
    }
    nodes
}

proptest! {
    #[test]
    fn membership_matches_the_input_set(words in dense_word_sets()) {
        let graph = build_graph(&words).unwrap();

        for word in &words {
            prop_assert!(graph.contains(word));
        }

        // Close neighbors of every stored word must be absent unless they
        // are themselves stored.
        for word in &words {
            let mut extended = word.clone();
            extended.push(b'a');
            if !words.contains(&extended) {
                prop_assert!(!graph.contains(&extended));
            }

            let shortened = &word[..word.len() - 1];
            if !words.contains(shortened) {
                prop_assert!(!graph.contains(shortened));
            }
        }
        prop_assert!(!graph.contains(""));
    }

    #[test]
    fn enumeration_returns_exactly_the_input(words in dense_word_sets()) {
        let graph = build_graph(&words).unwrap();
        let expected: Vec<Vec<u8>> = words.iter().cloned().collect();
        prop_assert_eq!(graph.words(), expected);
    }

    #[test]
    fn arbitrary_bytes_survive_storage(words in binary_word_sets()) {
        let graph = build_graph(&words).unwrap();
        for word in &words {
            prop_assert!(graph.contains(word));
        }
        let expected: Vec<Vec<u8>> = words.iter().cloned().collect();
        prop_assert_eq!(graph.words(), expected);
    }

    #[test]
    fn committed_nodes_are_unique_and_terminated(words in dense_word_sets()) {
        let graph = build_graph(&words).unwrap();

        prop_assert!(graph.edge(0).is_null());
        prop_assert!(graph.edge(MAX_CHARS as Index).end_of_node());

        let nodes = committed_nodes(&graph);
        let total: usize = nodes.iter().map(Vec::len).sum();
        prop_assert_eq!(total + 1 + MAX_CHARS, graph.num_edges());

        let distinct: std::collections::HashSet<&Vec<u32>> = nodes.iter().collect();
        prop_assert_eq!(distinct.len(), nodes.len());
    }

    #[test]
    fn save_load_round_trips(words in dense_word_sets()) {
        let graph = build_graph(&words).unwrap();

        let mut bytes = Vec::new();
        graph.save_stream(&mut bytes).unwrap();
        let reloaded = Graph::load_stream(&mut bytes.as_slice()).unwrap();

        prop_assert_eq!(reloaded.edges(), graph.edges());
        for word in &words {
            prop_assert!(reloaded.contains(word));
        }

        // A second save must reproduce the same bytes.
        let mut again = Vec::new();
        reloaded.save_stream(&mut again).unwrap();
        prop_assert_eq!(bytes, again);
    }

    #[test]
    fn rebuilding_the_enumeration_reproduces_the_graph(words in dense_word_sets()) {
        let graph = build_graph(&words).unwrap();
        let rebuilt = build_graph(graph.words()).unwrap();
        prop_assert_eq!(rebuilt.edges(), graph.edges());
    }
}
