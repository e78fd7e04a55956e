//! # finaut
//!
//! A finite automata toolkit built around the three classical constructions
//! taught in automata theory courses.
//!
//! This library provides functionality to:
//! - Convert NFAs to DFAs using Subset Construction
//! - Minimize DFAs with the table-filling algorithm over state pairs
//! - Simulate a DFA over a batch of input words
//! - Read and write the line-oriented automaton description format
//! - Export the automata as Graphviz dot files

// Re-export the modules
pub mod dfa;
pub mod fa;
pub mod io;
pub mod minimize;
pub mod nfa;
pub mod simulate;
pub mod visualizer;

// Re-export commonly used functions for convenience
pub use dfa::{canonicalize, construct_dfa};
pub use io::{read_dfa, read_nfa, read_words, write_dfa, write_verdicts};
pub use minimize::construct_minimal_dfa;
pub use simulate::{simulate, Verdict};
pub use visualizer::save_dot;
