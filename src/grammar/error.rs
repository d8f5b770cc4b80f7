use thiserror::Error;

use super::Symbol;

/// A rule entry that cannot be turned into a production.
///
/// Line numbers are 1-based and count blank lines, so they point back into
/// the text the grammar was read from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Line {line}: missing \"->\"")]
    MissingArrow { line: usize },
    #[error("Line {line}: too many \"->\"")]
    TooManyArrows { line: usize },
    #[error("Line {line}: empty left side")]
    EmptyLeft { line: usize },
    #[error("Line {line}: left side `{left}` is not a single uppercase letter")]
    InvalidLeft { line: usize, left: String },
    #[error("Line {line}: cannot find left side")]
    NoPreviousLeft { line: usize },
    #[error("Line {line}: `$` is reserved for the end of input")]
    ReservedEndMark { line: usize },
}

/// Why a predictive parse stopped without accepting its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("expected {expected} but found `{found}` at position {position}")]
    TerminalMismatch {
        expected: Symbol,
        found: char,
        position: usize,
    },
    #[error("no rule for [{non_terminal}, {lookahead}] at position {position}")]
    NoTableEntry {
        non_terminal: char,
        lookahead: char,
        position: usize,
    },
    #[error("input left over after the end marker at position {position}")]
    UnconsumedInput { position: usize },
    #[error("input ended with {remaining} symbols left on the stack")]
    LeftoverStack { remaining: usize, position: usize },
    #[error("{non_terminal} is expanded into itself without consuming input at position {position}")]
    LeftRecursion { non_terminal: char, position: usize },
    #[error("grammar has no start symbol")]
    NoStartSymbol,
}

impl ParseFailure {
    /// Cursor position the parse stopped at, if any input was looked at.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseFailure::TerminalMismatch { position, .. }
            | ParseFailure::NoTableEntry { position, .. }
            | ParseFailure::UnconsumedInput { position }
            | ParseFailure::LeftoverStack { position, .. }
            | ParseFailure::LeftRecursion { position, .. } => Some(*position),
            ParseFailure::NoStartSymbol => None,
        }
    }
}
