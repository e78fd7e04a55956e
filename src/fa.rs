use bitvec::prelude::BitVec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which formalism an automaton description declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutomatonKind {
    Nfa,
    Dfa,
}

impl fmt::Display for AutomatonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomatonKind::Nfa => write!(f, "NFA"),
            AutomatonKind::Dfa => write!(f, "DFA"),
        }
    }
}

/// Structural errors raised when an automaton is built from labels that were
/// never declared. These indicate a defect in whatever produced the
/// description, so they are reported immediately instead of being tolerated.
#[derive(Debug, PartialEq, Eq)]
pub enum AutomatonError {
    UnknownState(String),
    UnknownSymbol(String),
    DuplicateState(String),
    DuplicateSymbol(String),
    DuplicateTransition { state: String, symbol: String },
}

impl fmt::Display for AutomatonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownState(label) => {
                write!(f, "Error: state {} is not in the declared state set", label)
            }
            Self::UnknownSymbol(label) => {
                write!(f, "Error: symbol {} is not in the declared alphabet", label)
            }
            Self::DuplicateState(label) => {
                write!(f, "Error: state {} is declared more than once", label)
            }
            Self::DuplicateSymbol(label) => {
                write!(f, "Error: symbol {} is declared more than once", label)
            }
            Self::DuplicateTransition { state, symbol } => {
                write!(
                    f,
                    "Error: more than one transition defined for ({}, {})",
                    state, symbol
                )
            }
        }
    }
}

impl std::error::Error for AutomatonError {}

pub trait Fa {
    fn get_kind(&self) -> AutomatonKind;
    fn get_num_states(&self) -> usize;
    fn get_state_label(&self, state_id: usize) -> &str;
    fn get_start_state(&self) -> usize;
    fn get_alphabet(&self) -> &[String];
    fn get_acceptor_states(&self) -> &BitVec<u8>;
    /// Every transition as a (source, symbol id, target) triple.
    fn get_edges(&self) -> Vec<(usize, usize, usize)>;
}

fn braced_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::from("{");
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(item);
    }
    out.push('}');
    out
}

/// Prints the formal tuple and the transition table of an automaton the way
/// the command line tools show it. The cell callback renders one
/// (state, symbol) entry, `-` meaning undefined.
pub(crate) fn write_table(
    f: &mut fmt::Formatter<'_>,
    fa: &dyn Fa,
    delta_name: &str,
    cell: &dyn Fn(usize, usize) -> String,
) -> fmt::Result {
    let symbols = braced_list(fa.get_alphabet().iter().map(|s| s.as_str()));
    let states = braced_list((0..fa.get_num_states()).map(|s| fa.get_state_label(s)));
    let finals = braced_list(
        fa.get_acceptor_states()
            .iter_ones()
            .map(|s| fa.get_state_label(s)),
    );

    writeln!(
        f,
        "{} = ({}, {}, {}, {}, {})",
        fa.get_kind(),
        symbols,
        states,
        delta_name,
        fa.get_state_label(fa.get_start_state()),
        finals
    )?;

    write!(f, "{:<10}", delta_name)?;
    for symbol in fa.get_alphabet() {
        write!(f, "{:<10}", symbol)?;
    }
    writeln!(f)?;

    for state in 0..fa.get_num_states() {
        write!(f, "{:<10}", fa.get_state_label(state))?;
        for symbol in 0..fa.get_alphabet().len() {
            write!(f, "{:<10}", cell(state, symbol))?;
        }
        writeln!(f)?;
    }
    Ok(())
}
