/* Subset construction to convert an NFA into an equivalent DFA, plus the
 * canonical renaming pass that replaces the verbose composite state labels
 * with small sequential identifiers. */

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::debug;

use crate::fa::{AutomatonError, AutomatonKind, Fa};
use crate::nfa::Nfa;

/// A set of NFA states together with its precomputed hash, so the subset
/// construction can use it as a worklist entry and map key without rehashing
/// the bit vector every lookup. Equality is set membership, never a rendering.
#[derive(Clone, Debug)]
struct StateSet {
    bv: BitVec<u8>,
    hash: u64,
}

impl StateSet {
    fn new(bv: BitVec<u8>) -> Self {
        let mut hasher = DefaultHasher::new();
        bv.hash(&mut hasher);
        let hash = hasher.finish();
        Self { bv, hash }
    }

    fn singleton(member: usize, universe: usize) -> Self {
        let mut bv: BitVec<u8> = BitVec::repeat(false, universe);
        bv.set(member, true);
        Self::new(bv)
    }

    /// Canonical rendering: member labels concatenated in declaration order.
    /// Two sets with the same membership always render identically.
    fn label(&self, nfa: &Nfa) -> String {
        let mut label = String::new();
        for member in self.bv.iter_ones() {
            label.push_str(nfa.get_state_label(member));
        }
        label
    }

    fn intersects(&self, other: &BitVec<u8>) -> bool {
        (self.bv.clone() & other).any()
    }
}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bv == other.bv
    }
}

impl Eq for StateSet {}

/// A deterministic finite automaton. Same label/index scheme as [`Nfa`], but
/// δ maps each (state, symbol) to at most one target; an absent entry means
/// the transition function is partial at that point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dfa {
    labels: Vec<String>,
    label_ids: HashMap<String, usize>,
    alphabet: Vec<String>,
    symbol_ids: HashMap<String, usize>,
    start_state: usize,
    accept_states: BitVec<u8>,
    transitions: Vec<HashMap<usize, usize>>,
}

impl Fa for Dfa {
    fn get_kind(&self) -> AutomatonKind {
        AutomatonKind::Dfa
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
            for (&symbol, &target) in outgoing.iter() {
                edges.push((state, symbol, target));
            }
        }
        edges
    }
}

impl Dfa {
    pub fn new() -> Self {
        Dfa {
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
        Ok(self.push_state(label.to_string()))
    }

    pub fn add_symbol(&mut self, label: &str) -> Result<usize, AutomatonError> {
        if self.symbol_ids.contains_key(label) {
            return Err(AutomatonError::DuplicateSymbol(label.to_string()));
        }
        Ok(self.push_symbol(label.to_string()))
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

    /// Defines δ(from, symbol) = to. A second definition for the same pair is
    /// an upstream defect and is rejected.
    pub fn add_transition(
        &mut self,
        from: &str,
        symbol: &str,
        to: &str,
    ) -> Result<(), AutomatonError> {
        let from_id = self.state_id_checked(from)?;
        let symbol_id = self.symbol_id_checked(symbol)?;
        let to_id = self.state_id_checked(to)?;
        if self.transitions[from_id].contains_key(&symbol_id) {
            return Err(AutomatonError::DuplicateTransition {
                state: from.to_string(),
                symbol: symbol.to_string(),
            });
        }
        self.transitions[from_id].insert(symbol_id, to_id);
        Ok(())
    }

    pub fn state_id(&self, label: &str) -> Option<usize> {
        self.label_ids.get(label).copied()
    }

    pub fn symbol_id(&self, label: &str) -> Option<usize> {
        self.symbol_ids.get(label).copied()
    }

    /// The target of δ(state, symbol), `None` meaning undefined.
    pub fn target(&self, state_id: usize, symbol_id: usize) -> Option<usize> {
        self.transitions[state_id].get(&symbol_id).copied()
    }

    fn state_id_checked(&self, label: &str) -> Result<usize, AutomatonError> {
        self.state_id(label)
            .ok_or_else(|| AutomatonError::UnknownState(label.to_string()))
    }

    fn symbol_id_checked(&self, label: &str) -> Result<usize, AutomatonError> {
        self.symbol_id(label)
            .ok_or_else(|| AutomatonError::UnknownSymbol(label.to_string()))
    }

    // Index-based mutators for the construction algorithms, which generate
    // their own labels and work entirely in indices.

    pub(crate) fn push_state(&mut self, label: String) -> usize {
        let state_id = self.labels.len();
        self.label_ids.insert(label.clone(), state_id);
        self.labels.push(label);
        self.accept_states.push(false);
        self.transitions.push(HashMap::new());
        state_id
    }

    pub(crate) fn push_symbol(&mut self, label: String) -> usize {
        let symbol_id = self.alphabet.len();
        self.symbol_ids.insert(label.clone(), symbol_id);
        self.alphabet.push(label);
        symbol_id
    }

    pub(crate) fn set_start_id(&mut self, state_id: usize) {
        self.start_state = state_id;
    }

    pub(crate) fn set_accept_id(&mut self, state_id: usize) {
        self.accept_states.set(state_id, true);
    }

    pub(crate) fn set_transition_id(&mut self, from: usize, symbol: usize, to: usize) {
        self.transitions[from].insert(symbol, to);
    }
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::fa::write_table(f, self, "δD", &|state, symbol| {
            match self.target(state, symbol) {
                None => "-".to_string(),
                Some(target) => self.get_state_label(target).to_string(),
            }
        })
    }
}

// The set of NFA states reachable from any member of q on symbol c.
fn delta(nfa: &Nfa, q: &StateSet, symbol_id: usize) -> BitVec<u8> {
    let mut result: BitVec<u8> = BitVec::repeat(false, q.bv.len());
    for member in q.bv.iter_ones() {
        if let Some(targets) = nfa.targets(member, symbol_id) {
            for &target in targets {
                result.set(target, true);
            }
        }
    }
    result
}

/// Applies the subset construction algorithm to an NFA and returns the
/// equivalent DFA. States of the result are the reachable subsets of NFA
/// states, labeled with the concatenation of their member labels; the
/// initial state is the singleton set of the NFA's initial state. Only
/// subsets reachable from it are ever materialized.
pub fn construct_dfa(nfa: &Nfa) -> Dfa {
    let mut result = Dfa::new();
    for symbol in nfa.get_alphabet() {
        result.push_symbol(symbol.clone());
    }

    let nfa_accepts = nfa.get_acceptor_states();

    // Maps every discovered subset to its DFA state id; doubles as the
    // queue-membership check so a pending subset is never enqueued twice.
    let mut discovered: HashMap<StateSet, usize> = HashMap::new();
    let mut work_list: VecDeque<StateSet> = VecDeque::new();

    let q0 = StateSet::singleton(nfa.get_start_state(), nfa.get_num_states());

    let d0 = result.push_state(q0.label(nfa));
    result.set_start_id(d0);
    if q0.intersects(nfa_accepts) {
        result.set_accept_id(d0);
    }
    discovered.insert(q0.clone(), d0);
    work_list.push_back(q0);

    while let Some(q) = work_list.pop_front() {
        let dq = discovered[&q];
        for symbol_id in 0..nfa.get_alphabet().len() {
            let end_states = delta(nfa, &q, symbol_id);
            if end_states.not_any() {
                // No member has a move on this symbol; dq simply has no
                // outgoing transition here, which is legal.
                continue;
            }

            let t = StateSet::new(end_states);

            let dt = if let Some(&existing) = discovered.get(&t) {
                existing
            } else {
                let dt = result.push_state(t.label(nfa));
                if t.intersects(nfa_accepts) {
                    result.set_accept_id(dt);
                }
                discovered.insert(t.clone(), dt);
                work_list.push_back(t);
                dt
            };

            result.set_transition_id(dq, symbol_id, dt);
        }
    }

    debug!(
        nfa_states = nfa.get_num_states(),
        dfa_states = result.get_num_states(),
        "subset construction finished"
    );

    result
}

/// Replaces the composite state labels of a determinized DFA with fresh
/// sequential identifiers `0, 1, 2, …` in discovery order. Pure renaming:
/// the result is isomorphic to the input, no state is merged or dropped.
pub fn canonicalize(dfa: &Dfa) -> Dfa {
    let mut result = Dfa::new();
    for symbol in dfa.get_alphabet() {
        result.push_symbol(symbol.clone());
    }
    for state in 0..dfa.get_num_states() {
        result.push_state(state.to_string());
    }
    result.set_start_id(dfa.get_start_state());
    for state in dfa.get_acceptor_states().iter_ones() {
        result.set_accept_id(state);
    }
    for (from, symbol, to) in dfa.get_edges() {
        result.set_transition_id(from, symbol, to);
    }
    result
}

#[cfg(test)]
mod dfa_tests {
    use super::*;

    // NFA over {0,1} accepting every word with a "01" ending the run into q2.
    fn sample_nfa() -> Nfa {
        let mut nfa = Nfa::new();
        for label in ["q0", "q1", "q2"] {
            nfa.add_state(label).unwrap();
        }
        for label in ["0", "1"] {
            nfa.add_symbol(label).unwrap();
        }
        nfa.set_start_state("q0").unwrap();
        nfa.set_accept_state("q2").unwrap();
        nfa.add_transition("q0", "0", "q0").unwrap();
        nfa.add_transition("q0", "0", "q1").unwrap();
        nfa.add_transition("q0", "1", "q0").unwrap();
        nfa.add_transition("q1", "1", "q2").unwrap();
        nfa
    }

    #[test]
    fn test_dfa_basic_construction() {
        let mut dfa = Dfa::new();
        dfa.add_state("s0").unwrap();
        dfa.add_state("s1").unwrap();
        dfa.add_symbol("a").unwrap();
        dfa.set_start_state("s0").unwrap();
        dfa.set_accept_state("s1").unwrap();
        dfa.add_transition("s0", "a", "s1").unwrap();

        assert_eq!(dfa.get_num_states(), 2);
        assert_eq!(dfa.get_start_state(), 0);
        assert!(dfa.get_acceptor_states()[1]);
        assert_eq!(dfa.target(0, 0), Some(1));
        assert_eq!(dfa.target(1, 0), None);
    }

    #[test]
    fn test_duplicate_dfa_transition_is_rejected() {
        let mut dfa = Dfa::new();
        dfa.add_state("s0").unwrap();
        dfa.add_state("s1").unwrap();
        dfa.add_symbol("a").unwrap();
        dfa.add_transition("s0", "a", "s1").unwrap();
        assert_eq!(
            dfa.add_transition("s0", "a", "s0"),
            Err(AutomatonError::DuplicateTransition {
                state: "s0".to_string(),
                symbol: "a".to_string(),
            })
        );
    }

    #[test]
    fn test_state_set_identity_is_membership() {
        let mut a: BitVec<u8> = BitVec::repeat(false, 4);
        a.set(1, true);
        a.set(3, true);
        let mut b: BitVec<u8> = BitVec::repeat(false, 4);
        b.set(3, true);
        b.set(1, true);
        assert_eq!(StateSet::new(a), StateSet::new(b));
    }

    #[test]
    fn test_composite_labels_render_in_declaration_order() {
        let nfa = sample_nfa();
        let mut bv: BitVec<u8> = BitVec::repeat(false, 3);
        bv.set(2, true);
        bv.set(0, true);
        assert_eq!(StateSet::new(bv).label(&nfa), "q0q2");
    }

    #[test]
    fn test_subset_construction_states_and_initial() {
        let nfa = sample_nfa();
        let dfa = construct_dfa(&nfa);

        // Reachable subsets: {q0}, {q0,q1}, {q0,q2}.
        assert_eq!(dfa.get_num_states(), 3);
        assert_eq!(dfa.get_state_label(dfa.get_start_state()), "q0");
        assert_eq!(dfa.get_alphabet(), nfa.get_alphabet());

        let q0q1 = dfa.state_id("q0q1").unwrap();
        let q0q2 = dfa.state_id("q0q2").unwrap();
        assert!(!dfa.get_acceptor_states()[dfa.get_start_state()]);
        assert!(!dfa.get_acceptor_states()[q0q1]);
        assert!(dfa.get_acceptor_states()[q0q2]);
    }

    #[test]
    fn test_subset_construction_is_deterministic() {
        let dfa = construct_dfa(&sample_nfa());
        for state in 0..dfa.get_num_states() {
            for symbol in 0..dfa.get_alphabet().len() {
                // At most one target per pair, by representation; every pair
                // must also be defined for this particular NFA.
                assert!(dfa.target(state, symbol).is_some());
            }
        }
    }

    #[test]
    fn test_dead_end_subset_is_preserved() {
        let mut nfa = Nfa::new();
        nfa.add_state("q0").unwrap();
        nfa.add_state("q1").unwrap();
        nfa.add_symbol("a").unwrap();
        nfa.set_start_state("q0").unwrap();
        nfa.set_accept_state("q1").unwrap();
        nfa.add_transition("q0", "a", "q1").unwrap();

        let dfa = construct_dfa(&nfa);
        let q1 = dfa.state_id("q1").unwrap();
        assert_eq!(dfa.get_num_states(), 2);
        assert_eq!(dfa.target(q1, 0), None);
    }

    #[test]
    fn test_canonicalize_is_a_bijection() {
        let dfa = construct_dfa(&sample_nfa());
        let renamed = canonicalize(&dfa);

        assert_eq!(renamed.get_num_states(), dfa.get_num_states());
        assert_eq!(renamed.get_state_label(0), "0");
        assert_eq!(renamed.get_state_label(2), "2");
        assert_eq!(renamed.get_start_state(), dfa.get_start_state());
        assert_eq!(
            renamed.get_acceptor_states().count_ones(),
            dfa.get_acceptor_states().count_ones()
        );

        let mut expected = dfa.get_edges();
        let mut actual = renamed.get_edges();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(expected, actual);
    }
}
