//! Dense byte-transition tables for merged scans.
//!
//! Some token classes share long prefixes (`10` could start a number, an
//! IPv4 address, or a date) and cannot be told apart with fixed lookahead.
//! A [`TransitionTable`] merges them into one automaton that
//! [`Scanner::scan_with_table`](crate::Scanner::scan_with_table) walks over
//! the raw window; the caller maps the accepting state to a token kind.
//!
//! # Model
//!
//! States are `0..states`; scanning starts in state 0. The *final* state is
//! `states` itself (one past the last real state): a transition into it
//! stops the scan without consuming the byte. Each state may carry one
//! catch-all transition, used when no explicit byte matches.
//!
//! # Encodings
//!
//! Tables are compiled once into a flat `states * 256` array indexed by
//! `(state, byte)`, so a step is a single load. Two input formats compile
//! into it:
//!
//! - [`from_pairs`](TransitionTable::from_pairs): generated rows of flat
//!   `(byte, next)` pairs, one row per state, with [`CATCH_ALL`] as the
//!   catch-all byte.
//! - [`from_spec`](TransitionTable::from_spec): the human-readable
//!   `state input next` format, one transition per line.
//!
//! ```text
//! # state  input  next
//! numeral  0-9    numeral
//! numeral  .      ip
//! numeral  ;      final
//! ip       0-9    ip
//! ip       *      final
//! ```
//!
//! Inputs are a single byte, a quoted byte (`'#'`), an inclusive range
//! (`a-z`), an escape (`\s` space, `\t`, `\n`, `\r`, `\\`, `\*`, `\#`), or
//! `*` for the catch-all. Lines starting with `#` are comments. The target
//! name `final` is reserved for the final state.

use std::fmt;
use thiserror::Error;

/// Byte that marks the catch-all transition in generated pair rows.
///
/// `0xFF` never occurs in UTF-8 text, so it is outside the normal alphabet.
pub const CATCH_ALL: u8 = 0xFF;

/// Largest number of real states (the final state and the empty cell
/// marker take the two remaining `u8` values).
pub const MAX_STATES: usize = 254;

/// Reserved target name for the final state in textual specs.
pub const FINAL: &str = "final";

/// Empty cell: no transition.
const NONE: u8 = u8::MAX;

/// Failure to compile a transition table.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("transition table has no states")]
    Empty,
    #[error("transition table has {0} states, at most {MAX_STATES} are supported")]
    TooManyStates(usize),
    #[error("state {state}: transition row has an odd number of bytes")]
    OddRow { state: usize },
    #[error("state {state}: target {target} is past the final state {final_state}")]
    TargetOutOfRange {
        state: usize,
        target: u8,
        final_state: u8,
    },
    #[error("line {line}: expected `state input next`, found {found:?}")]
    Syntax { line: usize, found: String },
    #[error("line {line}: invalid input {input:?}")]
    InvalidInput { line: usize, input: String },
    #[error("line {line}: state {state:?} already has a catch-all transition")]
    DuplicateCatchAll { line: usize, state: String },
    #[error("line {line}: the final state cannot have transitions")]
    FinalHasTransitions { line: usize },
}

/// What a transition matches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Input {
    Range(u8, u8),
    CatchAll,
}

/// Transitions of one state before compilation.
#[derive(Clone, Debug, Default)]
struct Row {
    catch_all: Option<u8>,
    explicit: Vec<(u8, u8, u8)>,
}

/// Compiled transition table.
#[derive(Clone, PartialEq, Eq)]
pub struct TransitionTable {
    /// `states * 256` cells of next state, or [`NONE`].
    next: Box<[u8]>,
    states: u8,
    /// State names, indexed by state. Empty for tables built from pairs.
    names: Vec<String>,
}

impl TransitionTable {
    /// Compile generated `(byte, next)` pair rows, one row per state.
    ///
    /// A pair whose byte is [`CATCH_ALL`] is the state's catch-all.
    /// Explicit bytes take precedence over the catch-all regardless of the
    /// order they appear in.
    pub fn from_pairs(rows: &[&[u8]]) -> Result<Self, TableError> {
        let states = check_state_count(rows.len())?;
        let mut compiled = Vec::with_capacity(rows.len());
        for (state, pairs) in rows.iter().enumerate() {
            if pairs.len() % 2 != 0 {
                return Err(TableError::OddRow { state });
            }
            let mut row = Row::default();
            for pair in pairs.chunks_exact(2) {
                if pair[0] == CATCH_ALL {
                    row.catch_all = Some(pair[1]);
                } else {
                    row.explicit.push((pair[0], pair[0], pair[1]));
                }
            }
            compiled.push(row);
        }
        Self::compile(states, &compiled, Vec::new())
    }

    /// Compile a textual `state input next` specification.
    ///
    /// States are numbered in the order they first appear as a source state;
    /// states only ever named as targets are numbered after those. The first
    /// state is the start state.
    pub fn from_spec(spec: &str) -> Result<Self, TableError> {
        let mut entries = Vec::new();
        for (i, raw) in spec.lines().enumerate() {
            let line = i + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = text.split_whitespace().collect();
            let &[from, input, to] = fields.as_slice() else {
                return Err(TableError::Syntax {
                    line,
                    found: text.to_owned(),
                });
            };
            if from == FINAL {
                return Err(TableError::FinalHasTransitions { line });
            }
            let input = parse_input(input).ok_or_else(|| TableError::InvalidInput {
                line,
                input: input.to_owned(),
            })?;
            entries.push((line, from, input, to));
        }

        let mut names: Vec<String> = Vec::new();
        for &(_, from, _, _) in &entries {
            if !names.iter().any(|n| n == from) {
                names.push(from.to_owned());
            }
        }
        for &(_, _, _, to) in &entries {
            if to != FINAL && !names.iter().any(|n| n == to) {
                names.push(to.to_owned());
            }
        }
        let states = check_state_count(names.len())?;

        let index = |name: &str| -> u8 {
            // Every name was registered above; `final` is one past the last.
            let found = names.iter().position(|n| n == name).unwrap_or(names.len());
            u8::try_from(found).unwrap_or(states)
        };

        let mut rows = vec![Row::default(); names.len()];
        for (line, from, input, to) in entries {
            let row = &mut rows[usize::from(index(from))];
            let target = index(to);
            match input {
                Input::CatchAll if row.catch_all.is_some() => {
                    return Err(TableError::DuplicateCatchAll {
                        line,
                        state: from.to_owned(),
                    });
                }
                Input::CatchAll => row.catch_all = Some(target),
                Input::Range(lo, hi) => row.explicit.push((lo, hi, target)),
            }
        }
        Self::compile(states, &rows, names)
    }

    fn compile(states: u8, rows: &[Row], names: Vec<String>) -> Result<Self, TableError> {
        let mut next = vec![NONE; rows.len() * 256].into_boxed_slice();
        for (state, row) in rows.iter().enumerate() {
            let cells = &mut next[state * 256..(state + 1) * 256];
            let targets = row
                .catch_all
                .iter()
                .copied()
                .chain(row.explicit.iter().map(|&(_, _, t)| t));
            for target in targets {
                if target > states {
                    return Err(TableError::TargetOutOfRange {
                        state,
                        target,
                        final_state: states,
                    });
                }
            }
            if let Some(target) = row.catch_all {
                cells.fill(target);
            }
            for &(lo, hi, target) in &row.explicit {
                cells[usize::from(lo)..=usize::from(hi)].fill(target);
            }
        }
        Ok(TransitionTable {
            next,
            states,
            names,
        })
    }

    /// Next state for `byte` in `state`, or `None` when the scan must stop.
    #[inline]
    pub fn transition(&self, state: u8, byte: u8) -> Option<u8> {
        if state >= self.states {
            return None;
        }
        let cell = self.next[usize::from(state) * 256 + usize::from(byte)];
        (cell != NONE).then_some(cell)
    }

    /// The final state: one past the last real state.
    #[inline]
    pub fn final_state(&self) -> u8 {
        self.states
    }

    /// Number of real states.
    pub fn states(&self) -> usize {
        usize::from(self.states)
    }

    /// Look up a state by the name it had in the textual spec.
    pub fn state(&self, name: &str) -> Option<u8> {
        if name == FINAL {
            return Some(self.states);
        }
        let found = self.names.iter().position(|n| n == name)?;
        u8::try_from(found).ok()
    }

    /// Name of `state` in the textual spec, if the table came from one.
    pub fn state_name(&self, state: u8) -> Option<&str> {
        if state == self.states {
            return Some(FINAL);
        }
        self.names.get(usize::from(state)).map(String::as_str)
    }
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("states", &self.states)
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

fn check_state_count(count: usize) -> Result<u8, TableError> {
    if count == 0 {
        return Err(TableError::Empty);
    }
    match u8::try_from(count) {
        Ok(states) if count <= MAX_STATES => Ok(states),
        _ => Err(TableError::TooManyStates(count)),
    }
}

fn parse_input(text: &str) -> Option<Input> {
    match *text.as_bytes() {
        [b'*'] => Some(Input::CatchAll),
        [b'\\', escaped] => {
            let byte = match escaped {
                b's' => b' ',
                b't' => b'\t',
                b'n' => b'\n',
                b'r' => b'\r',
                b'\\' | b'*' | b'#' => escaped,
                _ => return None,
            };
            Some(Input::Range(byte, byte))
        }
        [b'\'', byte, b'\''] => Some(Input::Range(byte, byte)),
        [lo, b'-', hi] if lo <= hi => Some(Input::Range(lo, hi)),
        [byte] => Some(Input::Range(byte, byte)),
        _ => None,
    }
}
