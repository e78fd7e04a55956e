use std::collections::HashMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::Result;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use crate::fa::Fa;

fn generate_graph(fa: &dyn Fa) -> DiGraph<String, String> {
    let mut graph = DiGraph::new();

    let num_states = fa.get_num_states();
    let start_state = fa.get_start_state();
    let acceptor_states = fa.get_acceptor_states();

    for state_idx in 0..num_states {
        let mut node_label = fa.get_state_label(state_idx).to_string();
        if state_idx == start_state {
            node_label.push_str(" (start)");
        }
        if acceptor_states[state_idx] {
            node_label.push_str(" (accept)");
        }
        graph.add_node(node_label);
    }

    // Parallel edges collapse into one edge carrying every symbol.
    let mut edge_map: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();

    let mut edges = fa.get_edges();
    edges.sort_unstable();

    for (source, symbol, target) in edges {
        let symbol_label = fa.get_alphabet()[symbol].clone();
        let endpoints = (NodeIndex::new(source), NodeIndex::new(target));

        match edge_map.get(&endpoints) {
            Some(&edge_idx) => {
                let label: &mut String = &mut graph[edge_idx];
                label.push_str(", ");
                label.push_str(&symbol_label);
            }
            None => {
                let edge_idx = graph.add_edge(endpoints.0, endpoints.1, symbol_label);
                edge_map.insert(endpoints, edge_idx);
            }
        }
    }

    graph
}

/// Renders the automaton's transition graph as a Graphviz dot file.
pub fn save_dot(fa: &dyn Fa, path: &Path) -> Result<()> {
    let graph = generate_graph(fa);
    let dot = Dot::with_config(&graph, &[Config::GraphContentOnly]);
    fs::write(path, format!("digraph {{\n{}}}\n", dot))?;
    Ok(())
}

#[cfg(test)]
mod visualizer_tests {
    use super::*;
    use crate::dfa::Dfa;

    #[test]
    fn test_dot_output_names_states_and_merges_edges() {
        let mut dfa = Dfa::new();
        dfa.add_state("q0").unwrap();
        dfa.add_state("q1").unwrap();
        dfa.add_symbol("a").unwrap();
        dfa.add_symbol("b").unwrap();
        dfa.set_start_state("q0").unwrap();
        dfa.set_accept_state("q1").unwrap();
        dfa.add_transition("q0", "a", "q1").unwrap();
        dfa.add_transition("q0", "b", "q1").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.dot");
        save_dot(&dfa, &path).unwrap();

        let dot = fs::read_to_string(&path).unwrap();
        assert!(dot.contains("q0 (start)"));
        assert!(dot.contains("q1 (accept)"));
        assert!(dot.contains("a, b"));
    }
}
