/* DFA minimization through the table-filling equivalence algorithm, with its
 * two prerequisites (unreachable-state pruning and totalization of the
 * transition function) and dead-state elimination as the final step. */

use bitvec::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::dfa::Dfa;
use crate::fa::Fa;

// Builds a copy of the DFA keeping only the states with a set bit, densely
// re-indexed in their original order. Transitions touching a removed state
// are dropped. The start state must be kept by the caller.
fn retain_states(dfa: &Dfa, keep: &BitVec<u8>) -> Dfa {
    let mut result = Dfa::new();
    for symbol in dfa.get_alphabet() {
        result.push_symbol(symbol.to_string());
    }

    let mut new_id_of: Vec<Option<usize>> = vec![None; dfa.get_num_states()];
    for old_id in keep.iter_ones() {
        let new_id = result.push_state(dfa.get_state_label(old_id).to_string());
        if dfa.get_acceptor_states()[old_id] {
            result.set_accept_id(new_id);
        }
        new_id_of[old_id] = Some(new_id);
    }

    debug_assert!(keep[dfa.get_start_state()]);
    if let Some(start) = new_id_of[dfa.get_start_state()] {
        result.set_start_id(start);
    }

    for (from, symbol, to) in dfa.get_edges() {
        if let (Some(new_from), Some(new_to)) = (new_id_of[from], new_id_of[to]) {
            result.set_transition_id(new_from, symbol, new_to);
        }
    }
    result
}

/// Drops every state not reachable from the initial state by defined
/// transitions and re-indexes the survivors densely. Runs before
/// totalization, so a later trap state cannot make partial states "reach"
/// anything.
pub fn prune_unreachable(dfa: &Dfa) -> Dfa {
    let mut visited: BitVec<u8> = BitVec::repeat(false, dfa.get_num_states());
    let mut stack = vec![dfa.get_start_state()];

    while let Some(state) = stack.pop() {
        if visited[state] {
            continue;
        }
        visited.set(state, true);
        for symbol in 0..dfa.get_alphabet().len() {
            if let Some(target) = dfa.target(state, symbol) {
                if !visited[target] {
                    stack.push(target);
                }
            }
        }
    }

    let removed = dfa.get_num_states() - visited.count_ones();
    if removed > 0 {
        debug!(removed, "pruned unreachable states");
    }
    retain_states(dfa, &visited)
}

/// Makes the transition function total. The first undefined (state, symbol)
/// entry lazily creates a single non-accepting trap state with self-loops on
/// every symbol; every undefined entry is redirected to it. A DFA that is
/// already total comes back unchanged.
pub fn totalize(dfa: &mut Dfa) {
    let num_states = dfa.get_num_states();
    let num_symbols = dfa.get_alphabet().len();

    let mut missing = Vec::new();
    for state in 0..num_states {
        for symbol in 0..num_symbols {
            if dfa.target(state, symbol).is_none() {
                missing.push((state, symbol));
            }
        }
    }
    if missing.is_empty() {
        return;
    }

    let mut label = String::from("d");
    while dfa.state_id(&label).is_some() {
        label.push('d');
    }
    let trap = dfa.push_state(label);
    for symbol in 0..num_symbols {
        dfa.set_transition_id(trap, symbol, trap);
    }
    for (state, symbol) in missing {
        dfa.set_transition_id(state, symbol, trap);
    }
    debug!(trap_label = dfa.get_state_label(trap), "totalized transition function");
}

// Triangular index for the unordered pair {i, j}, i > j.
fn pair_index(i: usize, j: usize) -> usize {
    debug_assert!(i > j);
    i * (i - 1) / 2 + j
}

// Marks the pair and, through the dependency lists, every pair whose
// distinguishability was waiting on it, transitively. Worklist-driven so the
// propagation depth is bounded regardless of automaton shape.
fn mark_transitively(
    marked: &mut BitVec<u8>,
    waiting: &HashMap<(usize, usize), Vec<(usize, usize)>>,
    start: (usize, usize),
) {
    let mut stack = vec![start];
    while let Some(pair) = stack.pop() {
        let index = pair_index(pair.0, pair.1);
        if marked[index] {
            continue;
        }
        marked.set(index, true);
        if let Some(dependents) = waiting.get(&pair) {
            for &dependent in dependents {
                if !marked[pair_index(dependent.0, dependent.1)] {
                    stack.push(dependent);
                }
            }
        }
    }
}

// True if the state is non-accepting and every symbol loops back to it: the
// shape of the trap state (or of the class the trap merged into).
fn is_trap(dfa: &Dfa, state: usize) -> bool {
    !dfa.get_acceptor_states()[state]
        && (0..dfa.get_alphabet().len()).all(|symbol| dfa.target(state, symbol) == Some(state))
}

// True if some accepting state is reachable from the given state, itself
// included. Explicit stack with a visited set, safe on cycles.
fn reaches_final(dfa: &Dfa, state: usize) -> bool {
    let mut visited: BitVec<u8> = BitVec::repeat(false, dfa.get_num_states());
    let mut stack = vec![state];
    while let Some(current) = stack.pop() {
        if dfa.get_acceptor_states()[current] {
            return true;
        }
        if visited[current] {
            continue;
        }
        visited.set(current, true);
        for symbol in 0..dfa.get_alphabet().len() {
            if let Some(target) = dfa.target(current, symbol) {
                if !visited[target] {
                    stack.push(target);
                }
            }
        }
    }
    false
}

fn class_label(dfa: &Dfa, members: &BTreeSet<usize>) -> String {
    let mut label = String::new();
    for &member in members {
        label.push_str(dfa.get_state_label(member));
    }
    label
}

/// Minimizes a DFA with the table-filling algorithm.
///
/// The input is first pruned of unreachable states and made total (in that
/// order). Pairs split by acceptance are marked distinguishable up front;
/// one pass over the remaining pairs either marks them from an
/// already-marked successor pair (propagating through the dependency lists)
/// or records them as waiting on that successor. Unmarked pairs are
/// equivalent and collapse into at most two classes, one accepting and one
/// non-accepting; finally, states that cannot reach acceptance are removed,
/// except the trap state so total rejection keeps a representative.
pub fn construct_minimal_dfa(dfa: &Dfa) -> Dfa {
    let mut work = prune_unreachable(dfa);
    totalize(&mut work);

    let num_states = work.get_num_states();
    let num_symbols = work.get_alphabet().len();
    let finals = work.get_acceptor_states().clone();

    // Step 1: the marking table, one bit per unordered state pair.
    let table_len = num_states * num_states.saturating_sub(1) / 2;
    let mut marked: BitVec<u8> = BitVec::repeat(false, table_len);

    // Step 2: a pair split by acceptance can never be equivalent.
    for i in 1..num_states {
        for j in 0..i {
            if finals[i] != finals[j] {
                marked.set(pair_index(i, j), true);
            }
        }
    }

    // Step 3: single propagation pass. An unmarked pair whose successor pair
    // on some symbol is marked becomes marked (and so does everything
    // waiting on it); otherwise it is appended to that successor's list and
    // may be marked later when the successor is.
    let mut waiting: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
    for i in 1..num_states {
        for j in 0..i {
            if marked[pair_index(i, j)] {
                continue;
            }
            for symbol in 0..num_symbols {
                let (Some(si), Some(sj)) = (work.target(i, symbol), work.target(j, symbol)) else {
                    continue;
                };
                let successor = if si > sj { (si, sj) } else { (sj, si) };
                if successor.0 == successor.1 {
                    continue;
                }
                if marked[pair_index(successor.0, successor.1)] {
                    mark_transitively(&mut marked, &waiting, (i, j));
                    break;
                }
                let dependents = waiting.entry(successor).or_default();
                if !dependents.contains(&(i, j)) {
                    dependents.push((i, j));
                }
            }
        }
    }

    // Step 4: unification. States joined by an unmarked pair are equivalent;
    // the base marking guarantees accepting and non-accepting states never
    // pair up, so two classes suffice.
    let mut final_members: BTreeSet<usize> = BTreeSet::new();
    let mut nonfinal_members: BTreeSet<usize> = BTreeSet::new();
    for i in 1..num_states {
        for j in 0..i {
            if marked[pair_index(i, j)] {
                continue;
            }
            if finals[i] {
                final_members.insert(i);
                final_members.insert(j);
            } else {
                nonfinal_members.insert(i);
                nonfinal_members.insert(j);
            }
        }
    }

    let mut unified = Dfa::new();
    for symbol in work.get_alphabet() {
        unified.push_symbol(symbol.to_string());
    }

    let mut new_id_of: Vec<usize> = vec![0; num_states];
    for state in 0..num_states {
        if final_members.contains(&state) || nonfinal_members.contains(&state) {
            continue;
        }
        let new_id = unified.push_state(work.get_state_label(state).to_string());
        if finals[state] {
            unified.set_accept_id(new_id);
        }
        new_id_of[state] = new_id;
    }
    if !final_members.is_empty() {
        let class_id = unified.push_state(class_label(&work, &final_members));
        unified.set_accept_id(class_id);
        for &member in &final_members {
            new_id_of[member] = class_id;
        }
    }
    if !nonfinal_members.is_empty() {
        let class_id = unified.push_state(class_label(&work, &nonfinal_members));
        for &member in &nonfinal_members {
            new_id_of[member] = class_id;
        }
    }
    unified.set_start_id(new_id_of[work.get_start_state()]);

    for state in 0..num_states {
        for symbol in 0..num_symbols {
            if let Some(target) = work.target(state, symbol) {
                unified.set_transition_id(new_id_of[state], symbol, new_id_of[target]);
            }
        }
    }

    debug!(
        before = num_states,
        after = unified.get_num_states(),
        "unified equivalent states"
    );

    // Step 5: dead-state elimination. A non-accepting state that cannot
    // reach acceptance is removed and transitions into it dropped. The trap
    // state is exempt, so total rejection keeps its representative, and so
    // is the initial state, which must always remain.
    let mut keep: BitVec<u8> = BitVec::repeat(true, unified.get_num_states());
    for state in 0..unified.get_num_states() {
        if unified.get_acceptor_states()[state]
            || state == unified.get_start_state()
            || is_trap(&unified, state)
        {
            continue;
        }
        if !reaches_final(&unified, state) {
            keep.set(state, false);
        }
    }
    retain_states(&unified, &keep)
}
