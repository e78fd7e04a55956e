use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dfa::Dfa;
use crate::fa::Fa;

/// Sentinel character that truncates a word: acceptance is judged as if the
/// word ended right before it. Used to pad fixed-width word files.
pub const WORD_END: char = '_';

/// The outcome of simulating one word, paired with the word exactly as it
/// appeared in the input (sentinel and padding included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    word: String,
    accepted: bool,
}

impl Verdict {
    pub fn new(word: String, accepted: bool) -> Self {
        Verdict { word, accepted }
    }

    pub fn get_word(&self) -> &str {
        &self.word
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
}

/// Walks the DFA over one word, one character per symbol, starting from the
/// initial state. A character outside the alphabet or a (state, symbol) pair
/// with no defined transition fails the walk, which is an ordinary
/// rejection, not an error. The word is accepted iff the walk survives and
/// ends in a final state.
pub fn run_word(dfa: &Dfa, word: &str) -> bool {
    let mut current = dfa.get_start_state();
    for ch in word.chars() {
        if ch == WORD_END {
            break;
        }
        let Some(symbol) = dfa.symbol_id(&ch.to_string()) else {
            return false;
        };
        match dfa.target(current, symbol) {
            Some(next) => current = next,
            None => return false,
        }
    }
    dfa.get_acceptor_states()[current]
}

/// Classifies a batch of words against the DFA, preserving input order.
pub fn simulate(dfa: &Dfa, words: &[String]) -> Vec<Verdict> {
    let verdicts: Vec<Verdict> = words
        .iter()
        .map(|word| Verdict::new(word.clone(), run_word(dfa, word)))
        .collect();
    debug!(
        words = verdicts.len(),
        accepted = verdicts.iter().filter(|v| v.is_accepted()).count(),
        "simulation finished"
    );
    verdicts
}

#[cfg(test)]
mod simulate_tests {
    use super::*;

    // DFA accepting every word over {0,1} containing the substring "01".
    fn substring_dfa() -> Dfa {
        let mut dfa = Dfa::new();
        for label in ["s", "z", "f"] {
            dfa.add_state(label).unwrap();
        }
        for label in ["0", "1"] {
            dfa.add_symbol(label).unwrap();
        }
        dfa.set_start_state("s").unwrap();
        dfa.set_accept_state("f").unwrap();
        dfa.add_transition("s", "0", "z").unwrap();
        dfa.add_transition("s", "1", "s").unwrap();
        dfa.add_transition("z", "0", "z").unwrap();
        dfa.add_transition("z", "1", "f").unwrap();
        dfa.add_transition("f", "0", "f").unwrap();
        dfa.add_transition("f", "1", "f").unwrap();
        dfa
    }

    #[test]
    fn test_accepts_and_rejects() {
        let dfa = substring_dfa();
        assert!(run_word(&dfa, "01"));
        assert!(run_word(&dfa, "001"));
        assert!(run_word(&dfa, "0101"));
        assert!(!run_word(&dfa, "0"));
        assert!(!run_word(&dfa, "1"));
        assert!(!run_word(&dfa, "10"));
        assert!(!run_word(&dfa, ""));
    }

    #[test]
    fn test_sentinel_truncates_the_word() {
        let dfa = substring_dfa();
        // Truncated to the empty word: judged at the initial state.
        assert!(!run_word(&dfa, "_01"));
        assert!(run_word(&dfa, "01_111"));
        assert!(!run_word(&dfa, "0_1"));
    }

    #[test]
    fn test_symbol_outside_alphabet_rejects() {
        let dfa = substring_dfa();
        assert!(!run_word(&dfa, "0x1"));
        assert!(!run_word(&dfa, "012"));
    }

    #[test]
    fn test_undefined_transition_rejects() {
        let mut dfa = Dfa::new();
        dfa.add_state("q0").unwrap();
        dfa.add_state("q1").unwrap();
        dfa.add_symbol("a").unwrap();
        dfa.set_start_state("q0").unwrap();
        dfa.set_accept_state("q1").unwrap();
        dfa.add_transition("q0", "a", "q1").unwrap();

        assert!(run_word(&dfa, "a"));
        // No transition out of q1: the walk fails partway through.
        assert!(!run_word(&dfa, "aa"));
    }

    #[test]
    fn test_batch_preserves_order_and_words() {
        let dfa = substring_dfa();
        let words = vec!["01".to_string(), "10".to_string(), "_01".to_string()];
        let verdicts = simulate(&dfa, &words);

        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0].get_word(), "01");
        assert!(verdicts[0].is_accepted());
        assert!(!verdicts[1].is_accepted());
        assert_eq!(verdicts[2].get_word(), "_01");
        assert!(!verdicts[2].is_accepted());
    }
}
