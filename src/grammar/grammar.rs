use std::fmt;

use indexmap::IndexSet;
use log::warn;

use super::{END_MARK, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(char),
    NonTerminal(char),
    Epsilon,
    EndOfInput,
}

impl Symbol {
    /// Classifies a single grammar character. Callers strip the `|`
    /// separator before classification.
    pub fn from_char(c: char) -> Self {
        match c {
            EPSILON => Symbol::Epsilon,
            END_MARK => Symbol::EndOfInput,
            c if c.is_ascii_uppercase() => Symbol::NonTerminal(c),
            c => Symbol::Terminal(c),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::Terminal(c) | Symbol::NonTerminal(c) => *c,
            Symbol::Epsilon => EPSILON,
            Symbol::EndOfInput => END_MARK,
        }
    }

    pub fn non_terminal(&self) -> Option<char> {
        match self {
            Symbol::NonTerminal(c) => Some(*c),
            _ => None,
        }
    }

    /// Terminals and the end marker are both matched against input.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndOfInput)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A sentential form. The empty string is `[Symbol::Epsilon]`.
pub type Alternative = Vec<Symbol>;

pub fn alternative_to_string(alternative: &[Symbol]) -> String {
    alternative.iter().map(Symbol::as_char).collect()
}

pub fn is_epsilon_alternative(alternative: &[Symbol]) -> bool {
    alternative == [Symbol::Epsilon]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub left: char,
    pub alternatives: Vec<Alternative>,
}

impl Production {
    pub fn new(left: char, alternatives: Vec<Alternative>) -> Self {
        Self { left, alternatives }
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub productions: Vec<Production>,
    non_terminals: IndexSet<char>,
    terminals: IndexSet<char>,
    start_symbol: Option<char>,
}

impl Grammar {
    /// Classifies every symbol of `productions` once. Non-terminals are
    /// ordered by their first appearance as a left side, terminals by
    /// first appearance, and `$` always comes last.
    pub fn new(productions: Vec<Production>) -> Self {
        let mut non_terminals: IndexSet<char> = productions.iter().map(|p| p.left).collect();
        let mut terminals: IndexSet<char> = IndexSet::new();

        for production in &productions {
            for symbol in production.alternatives.iter().flatten() {
                match symbol {
                    Symbol::NonTerminal(c) => {
                        if non_terminals.insert(*c) {
                            warn!("non-terminal {} has no production", c);
                        }
                    }
                    Symbol::Terminal(c) => {
                        terminals.insert(*c);
                    }
                    Symbol::Epsilon | Symbol::EndOfInput => {}
                }
            }
        }
        terminals.insert(END_MARK);

        let start_symbol = productions.first().map(|p| p.left);

        Self {
            productions,
            non_terminals,
            terminals,
            start_symbol,
        }
    }

    pub fn start_symbol(&self) -> Option<char> {
        self.start_symbol
    }

    pub fn non_terminals(&self) -> &IndexSet<char> {
        &self.non_terminals
    }

    /// Terminals in first-seen order, ending with `$`.
    pub fn terminals(&self) -> &IndexSet<char> {
        &self.terminals
    }

    pub fn is_non_terminal(&self, c: char) -> bool {
        self.non_terminals.contains(&c)
    }

    pub fn is_terminal(&self, c: char) -> bool {
        self.terminals.contains(&c)
    }

    /// Every `(left, alternative)` pair in rule order.
    pub fn alternatives(&self) -> impl Iterator<Item = (char, &Alternative)> {
        self.productions
            .iter()
            .flat_map(|p| p.alternatives.iter().map(move |a| (p.left, a)))
    }

    pub fn alternatives_of(&self, non_terminal: char) -> impl Iterator<Item = &Alternative> {
        self.productions
            .iter()
            .filter(move |p| p.left == non_terminal)
            .flat_map(|p| p.alternatives.iter())
    }
}
