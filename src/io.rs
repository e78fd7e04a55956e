/* Readers and writers for the line-oriented automaton description format,
 * the words file consumed by the simulator and the verdict file it
 * produces, plus JSON persistence of the in-memory automata. */

use color_eyre::eyre::{Report, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::dfa::Dfa;
use crate::fa::{AutomatonKind, Fa};
use crate::nfa::Nfa;
use crate::simulate::Verdict;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    MissingLine { line: usize },
    BadCount { line: usize },
    BadKind { found: String },
    WrongKind { expected: AutomatonKind, found: AutomatonKind },
    BadTransition { line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLine { line } => {
                write!(f, "Error: description ended early, expected line {}", line)
            }
            Self::BadCount { line } => {
                write!(
                    f,
                    "Error: line {} does not match its declared element count",
                    line
                )
            }
            Self::BadKind { found } => {
                write!(f, "Error: unknown automaton kind tag {}", found)
            }
            Self::WrongKind { expected, found } => {
                write!(f, "Error: expected a {} description, found {}", expected, found)
            }
            Self::BadTransition { line } => {
                write!(f, "Error: malformed transition on line {}", line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

// One parsed description file, still in label form.
struct Description {
    kind: AutomatonKind,
    states: Vec<String>,
    symbols: Vec<String>,
    initial: String,
    finals: Vec<String>,
    // (line number, source, symbol, targets)
    transitions: Vec<(usize, String, String, Vec<String>)>,
}

// Everything from the first `#` on is a human-readable comment.
fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("")
}

fn tokens(line: &str) -> Vec<String> {
    strip_comment(line)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

// `<count> <item_1> … <item_count>` lines (states, symbols, finals).
fn counted_list(line: &str, line_number: usize) -> Result<Vec<String>> {
    let mut items = tokens(line);
    if items.is_empty() {
        return Err(Report::new(ParseError::MissingLine { line: line_number }));
    }
    let count: usize = items[0]
        .parse()
        .map_err(|_| Report::new(ParseError::BadCount { line: line_number }))?;
    items.remove(0);
    if items.len() != count {
        return Err(Report::new(ParseError::BadCount { line: line_number }));
    }
    Ok(items)
}

fn parse_description(path: &Path) -> Result<Description> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;

    let header = |index: usize| -> Result<&String> {
        lines
            .get(index)
            .ok_or_else(|| Report::new(ParseError::MissingLine { line: index + 1 }))
    };

    let kind_tokens = tokens(header(0)?);
    let kind_tag = kind_tokens
        .first()
        .ok_or_else(|| Report::new(ParseError::MissingLine { line: 1 }))?;
    let kind = match kind_tag.as_str() {
        // The legacy tags are accepted as aliases of the current ones.
        "NFA" | "AFN" => AutomatonKind::Nfa,
        "DFA" | "AFD" => AutomatonKind::Dfa,
        other => {
            return Err(Report::new(ParseError::BadKind {
                found: other.to_string(),
            }))
        }
    };

    let states = counted_list(header(1)?, 2)?;
    let symbols = counted_list(header(2)?, 3)?;

    let initial_tokens = tokens(header(3)?);
    let initial = initial_tokens
        .first()
        .ok_or_else(|| Report::new(ParseError::MissingLine { line: 4 }))?
        .clone();

    let finals = counted_list(header(4)?, 5)?;

    let mut transitions = Vec::new();
    for (index, line) in lines.iter().enumerate().skip(5) {
        let line_number = index + 1;
        let mut words = tokens(line);
        if words.is_empty() {
            // Trailing blank lines are permitted.
            continue;
        }
        if words.len() < 3 {
            return Err(Report::new(ParseError::BadTransition { line: line_number }));
        }
        let targets = words.split_off(2);
        let symbol = words.pop().unwrap_or_default();
        let source = words.pop().unwrap_or_default();
        transitions.push((line_number, source, symbol, targets));
    }

    Ok(Description {
        kind,
        states,
        symbols,
        initial,
        finals,
        transitions,
    })
}

/// Reads an NFA description file into an [`Nfa`].
pub fn read_nfa(path: &Path) -> Result<Nfa> {
    let description = parse_description(path)?;
    if description.kind != AutomatonKind::Nfa {
        return Err(Report::new(ParseError::WrongKind {
            expected: AutomatonKind::Nfa,
            found: description.kind,
        }));
    }

    let mut nfa = Nfa::new();
    for state in &description.states {
        nfa.add_state(state)?;
    }
    for symbol in &description.symbols {
        nfa.add_symbol(symbol)?;
    }
    nfa.set_start_state(&description.initial)?;
    for state in &description.finals {
        nfa.set_accept_state(state)?;
    }
    for (_, source, symbol, targets) in &description.transitions {
        for target in targets {
            nfa.add_transition(source, symbol, target)?;
        }
    }
    Ok(nfa)
}

/// Reads a DFA description file into a [`Dfa`]. A transition line with more
/// than one target is malformed for a DFA.
pub fn read_dfa(path: &Path) -> Result<Dfa> {
    let description = parse_description(path)?;
    if description.kind != AutomatonKind::Dfa {
        return Err(Report::new(ParseError::WrongKind {
            expected: AutomatonKind::Dfa,
            found: description.kind,
        }));
    }

    let mut dfa = Dfa::new();
    for state in &description.states {
        dfa.add_state(state)?;
    }
    for symbol in &description.symbols {
        dfa.add_symbol(symbol)?;
    }
    dfa.set_start_state(&description.initial)?;
    for state in &description.finals {
        dfa.set_accept_state(state)?;
    }
    for (line_number, source, symbol, targets) in &description.transitions {
        let [target] = targets.as_slice() else {
            return Err(Report::new(ParseError::BadTransition { line: *line_number }));
        };
        dfa.add_transition(source, symbol, target)?;
    }
    Ok(dfa)
}

// "a", "a and b", "a, b and c" for the writer's comments.
fn joined_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Writes a DFA description file in the same shape the reader accepts, with
/// a trailing comment per line documenting what the line declares.
pub fn write_dfa(dfa: &Dfa, path: &Path) -> Result<()> {
    let mut out = String::new();

    out.push_str("DFA # (line 1) the formalism\n");

    let states: Vec<&str> = (0..dfa.get_num_states())
        .map(|s| dfa.get_state_label(s))
        .collect();
    out.push_str(&format!(
        "{} {} # (line 2) {} states: {}\n",
        states.len(),
        states.join(" "),
        states.len(),
        joined_list(&states)
    ));

    let symbols: Vec<&str> = dfa.get_alphabet().iter().map(|s| s.as_str()).collect();
    out.push_str(&format!(
        "{} {} # (line 3) {} symbols: {}\n",
        symbols.len(),
        symbols.join(" "),
        symbols.len(),
        joined_list(&symbols)
    ));

    let initial = dfa.get_state_label(dfa.get_start_state());
    out.push_str(&format!(
        "{} # (line 4) the initial state is {}\n",
        initial, initial
    ));

    let finals: Vec<&str> = dfa
        .get_acceptor_states()
        .iter_ones()
        .map(|s| dfa.get_state_label(s))
        .collect();
    let final_noun = if finals.len() == 1 {
        "final state"
    } else {
        "final states"
    };
    out.push_str(&format!(
        "{} {} # (line 5) has {} {}: {}\n",
        finals.len(),
        finals.join(" "),
        finals.len(),
        final_noun,
        joined_list(&finals)
    ));

    let mut first = true;
    for state in 0..dfa.get_num_states() {
        for symbol in 0..dfa.get_alphabet().len() {
            if let Some(target) = dfa.target(state, symbol) {
                let comment = if first { "(line 6 onwards) " } else { "" };
                first = false;
                out.push_str(&format!(
                    "{} {} {} # {}δ({}, {}) = {}\n",
                    dfa.get_state_label(state),
                    dfa.get_alphabet()[symbol],
                    dfa.get_state_label(target),
                    comment,
                    dfa.get_state_label(state),
                    dfa.get_alphabet()[symbol],
                    dfa.get_state_label(target)
                ));
            }
        }
    }

    fs::write(path, out)?;
    Ok(())
}

/// Reads the words to simulate, one per line; blank lines are skipped and
/// each line's first whitespace-delimited token is the word.
pub fn read_words(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(word) = line.split_whitespace().next() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

/// Writes one `<word> aceita` / `<word> rejeita` line per verdict, in order.
/// The two verdict strings are part of the file format.
pub fn write_verdicts(verdicts: &[Verdict], path: &Path) -> Result<()> {
    let mut out = String::new();
    for verdict in verdicts {
        let outcome = if verdict.is_accepted() {
            "aceita"
        } else {
            "rejeita"
        };
        out.push_str(&format!("{} {}\n", verdict.get_word(), outcome));
    }
    fs::write(path, out)?;
    Ok(())
}

/// Persists an automaton as JSON.
pub fn save_automaton<T: Serialize>(automaton: &T, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer(file, automaton)?;
    Ok(())
}

/// Loads an automaton previously written by [`save_automaton`].
pub fn load_automaton<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let automaton = serde_json::from_reader(BufReader::new(file))?;
    Ok(automaton)
}
