use indexmap::{IndexMap, IndexSet};
use log::debug;

use super::{grammar::Symbol, Grammar, END_MARK};

/// FIRST set of one non-terminal. Epsilon is never a member of
/// `terminals`; a non-terminal deriving the empty string is `nullable`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstEntry {
    pub terminals: IndexSet<char>,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    entries: IndexMap<char, FirstEntry>,
}

impl FirstSets {
    /// Every non-terminal starts with an empty set and is not nullable.
    pub fn new(grammar: &Grammar) -> Self {
        Self {
            entries: grammar
                .non_terminals()
                .iter()
                .map(|&nt| (nt, FirstEntry::default()))
                .collect(),
        }
    }

    pub fn compute(grammar: &Grammar) -> Self {
        let mut first = Self::new(grammar);
        let mut passes = 1;
        while first.step(grammar) {
            passes += 1;
        }
        debug!("FIRST sets reached a fixed point after {} passes", passes);
        first
    }

    /// One pass over every alternative of every rule. Returns whether any
    /// set grew or any non-terminal became nullable.
    pub fn step(&mut self, grammar: &Grammar) -> bool {
        let mut changed = false;
        for (left, alternative) in grammar.alternatives() {
            let (first, nullable) = self.first_of_sequence(alternative);
            let entry = self.entries.entry(left).or_default();

            let before = entry.terminals.len();
            entry.terminals.extend(first);
            changed |= entry.terminals.len() != before;

            if nullable && !entry.nullable {
                entry.nullable = true;
                changed = true;
            }
        }
        changed
    }

    /// FIRST of a sentential form and whether the whole form can derive
    /// the empty string. An empty slice is nullable.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> (IndexSet<char>, bool) {
        let mut first = IndexSet::new();
        for symbol in symbols {
            match symbol {
                Symbol::Terminal(c) => {
                    first.insert(*c);
                    return (first, false);
                }
                Symbol::EndOfInput => {
                    first.insert(END_MARK);
                    return (first, false);
                }
                Symbol::NonTerminal(nt) => {
                    if let Some(entry) = self.entries.get(nt) {
                        first.extend(entry.terminals.iter().copied());
                    }
                    if !self.is_nullable(*nt) {
                        return (first, false);
                    }
                }
                Symbol::Epsilon => {}
            }
        }
        (first, true)
    }

    pub fn first(&self, non_terminal: char) -> Option<&IndexSet<char>> {
        self.entries.get(&non_terminal).map(|e| &e.terminals)
    }

    pub fn is_nullable(&self, non_terminal: char) -> bool {
        self.entries
            .get(&non_terminal)
            .map_or(false, |e| e.nullable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &FirstEntry)> {
        self.entries.iter().map(|(nt, e)| (*nt, e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    entries: IndexMap<char, IndexSet<char>>,
}

impl FollowSets {
    /// Every set starts empty except FOLLOW(start) = {$}.
    pub fn new(grammar: &Grammar) -> Self {
        let mut entries: IndexMap<char, IndexSet<char>> = grammar
            .non_terminals()
            .iter()
            .map(|&nt| (nt, IndexSet::new()))
            .collect();
        if let Some(start) = grammar.start_symbol() {
            entries.entry(start).or_default().insert(END_MARK);
        }
        Self { entries }
    }

    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut follow = Self::new(grammar);
        let mut passes = 1;
        while follow.step(grammar, first) {
            passes += 1;
        }
        debug!("FOLLOW sets reached a fixed point after {} passes", passes);
        follow
    }

    /// One pass over every non-terminal occurrence on a right side.
    pub fn step(&mut self, grammar: &Grammar, first: &FirstSets) -> bool {
        let mut changed = false;
        for (left, alternative) in grammar.alternatives() {
            for (i, symbol) in alternative.iter().enumerate() {
                let occurrence = match symbol.non_terminal() {
                    Some(nt) => nt,
                    None => continue,
                };

                let (mut additions, rest_nullable) = first.first_of_sequence(&alternative[i + 1..]);
                // FOLLOW(left) into FOLLOW(left) is a self-union.
                if rest_nullable && occurrence != left {
                    additions.extend(self.follow(left).into_iter().flatten().copied());
                }

                let entry = self.entries.entry(occurrence).or_default();
                let before = entry.len();
                entry.extend(additions);
                changed |= entry.len() != before;
            }
        }
        changed
    }

    pub fn follow(&self, non_terminal: char) -> Option<&IndexSet<char>> {
        self.entries.get(&non_terminal)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &IndexSet<char>)> {
        self.entries.iter().map(|(nt, s)| (*nt, s))
    }
}
