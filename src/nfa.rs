use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::fa::{AutomatonError, AutomatonKind, Fa};

/// A nondeterministic finite automaton. States and symbols are opaque labels
/// declared up front; internally both are referenced by dense indices in
/// declaration order, which is also the order every rendering uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nfa {
    labels: Vec<String>,
    label_ids: HashMap<String, usize>,
    alphabet: Vec<String>,
    symbol_ids: HashMap<String, usize>,
    start_state: usize,
    accept_states: BitVec<u8>,
    transitions: Vec<HashMap<usize, HashSet<usize>>>,
}

impl Fa for Nfa {
    fn get_kind(&self) -> AutomatonKind {
        AutomatonKind::Nfa
    }

    fn get_num_states(&self) -> usize {
        self.labels.len()
    }

    fn get_state_label(&self, state_id: usize) -> &str {
        &self.labels[state_id]
    }

    fn get_start_state(&self) -> usize {
        self.start_state
    }

    fn get_alphabet(&self) -> &[String] {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        &self.accept_states
    }

    fn get_edges(&self) -> Vec<(usize, usize, usize)> {
        let mut edges = Vec::new();
        for (state, outgoing) in self.transitions.iter().enumerate() {
            for (&symbol, targets) in outgoing.iter() {
                for &target in targets {
                    edges.push((state, symbol, target));
                }
            }
        }
        edges
    }
}

impl Nfa {
    pub fn new() -> Self {
        Nfa {
            labels: Vec::new(),
            label_ids: HashMap::new(),
            alphabet: Vec::new(),
            symbol_ids: HashMap::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn add_state(&mut self, label: &str) -> Result<usize, AutomatonError> {
        if self.label_ids.contains_key(label) {
            return Err(AutomatonError::DuplicateState(label.to_string()));
        }
        let state_id = self.labels.len();
        self.labels.push(label.to_string());
        self.label_ids.insert(label.to_string(), state_id);
        self.accept_states.push(false);
        self.transitions.push(HashMap::new());
        Ok(state_id)
    }

    pub fn add_symbol(&mut self, label: &str) -> Result<usize, AutomatonError> {
        if self.symbol_ids.contains_key(label) {
            return Err(AutomatonError::DuplicateSymbol(label.to_string()));
        }
        let symbol_id = self.alphabet.len();
        self.alphabet.push(label.to_string());
        self.symbol_ids.insert(label.to_string(), symbol_id);
        Ok(symbol_id)
    }

    pub fn set_start_state(&mut self, label: &str) -> Result<(), AutomatonError> {
        self.start_state = self.state_id_checked(label)?;
        Ok(())
    }

    pub fn set_accept_state(&mut self, label: &str) -> Result<(), AutomatonError> {
        let state_id = self.state_id_checked(label)?;
        self.accept_states.set(state_id, true);
        Ok(())
    }

    pub fn add_transition(
        &mut self,
        from: &str,
        symbol: &str,
        to: &str,
    ) -> Result<(), AutomatonError> {
        let from_id = self.state_id_checked(from)?;
        let symbol_id = self.symbol_id_checked(symbol)?;
        let to_id = self.state_id_checked(to)?;
        self.transitions[from_id]
            .entry(symbol_id)
            .or_default()
            .insert(to_id);
        Ok(())
    }

    pub fn state_id(&self, label: &str) -> Option<usize> {
        self.label_ids.get(label).copied()
    }

    pub fn symbol_id(&self, label: &str) -> Option<usize> {
        self.symbol_ids.get(label).copied()
    }

    /// The target set of δ(state, symbol), `None` meaning the empty set.
    pub fn targets(&self, state_id: usize, symbol_id: usize) -> Option<&HashSet<usize>> {
        self.transitions[state_id].get(&symbol_id)
    }

    fn state_id_checked(&self, label: &str) -> Result<usize, AutomatonError> {
        self.state_id(label)
            .ok_or_else(|| AutomatonError::UnknownState(label.to_string()))
    }

    fn symbol_id_checked(&self, label: &str) -> Result<usize, AutomatonError> {
        self.symbol_id(label)
            .ok_or_else(|| AutomatonError::UnknownSymbol(label.to_string()))
    }
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::fa::write_table(f, self, "δN", &|state, symbol| {
            match self.targets(state, symbol) {
                None => "-".to_string(),
                Some(targets) => {
                    let mut ids: Vec<usize> = targets.iter().copied().collect();
                    ids.sort_unstable();
                    let labels: Vec<&str> = ids.iter().map(|&t| self.get_state_label(t)).collect();
                    format!("{{{}}}", labels.join(","))
                }
            }
        })
    }
}
