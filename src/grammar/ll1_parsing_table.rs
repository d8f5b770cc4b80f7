use std::collections::{HashMap, HashSet};
use std::fmt;

use crowbook_text_processing::escape::tex as escape_tex;
use log::{info, warn};
use serde::Serialize;

use super::{
    grammar::{alternative_to_string, is_epsilon_alternative, Alternative},
    pretty_print::{error_json, ProductionOutput},
    FirstSets, FollowSets, Grammar,
};

/// Two alternatives competed for one table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub non_terminal: char,
    pub terminal: char,
    pub previous: Alternative,
    pub replacement: Alternative,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grammar is not LL(1): multiple entries for [{}, {}] ({} -> {} replaced by {} -> {})",
            self.non_terminal,
            self.terminal,
            self.non_terminal,
            alternative_to_string(&self.previous),
            self.non_terminal,
            alternative_to_string(&self.replacement),
        )
    }
}

#[derive(Debug, Clone)]
pub struct LL1Table {
    start_symbol: Option<char>,
    non_terminals: Vec<char>,
    terminals: Vec<char>,
    /// Each cell remembers which alternative wrote it as
    /// `(rule index, alternative index)`.
    cells: HashMap<(char, char), ((usize, usize), Alternative)>,
    conflicts: Vec<Conflict>,
}

impl LL1Table {
    /// Fills the table from the directing set of every alternative.
    /// Conflicting cells keep the alternative written last.
    pub fn build(grammar: &Grammar, first: &FirstSets, follow: &FollowSets) -> Self {
        let mut table = Self {
            start_symbol: grammar.start_symbol(),
            non_terminals: grammar.non_terminals().iter().copied().collect(),
            terminals: grammar.terminals().iter().copied().collect(),
            cells: HashMap::new(),
            conflicts: Vec::new(),
        };

        for (rule, production) in grammar.productions.iter().enumerate() {
            let left = production.left;
            for (index, alternative) in production.alternatives.iter().enumerate() {
                let position = (rule, index);
                let (directing, nullable) = first.first_of_sequence(alternative);
                for terminal in directing {
                    table.set(left, terminal, position, alternative);
                }

                if nullable || is_epsilon_alternative(alternative) {
                    for &terminal in follow.follow(left).into_iter().flatten() {
                        table.set(left, terminal, position, alternative);
                    }
                }
            }
        }

        table
    }

    /// A cell written again by the same alternative is not a conflict,
    /// even when the symbols of two alternatives are equal.
    fn set(
        &mut self,
        non_terminal: char,
        terminal: char,
        position: (usize, usize),
        alternative: &Alternative,
    ) {
        let previous = self
            .cells
            .insert((non_terminal, terminal), (position, alternative.clone()));
        if let Some((previous_position, previous)) = previous {
            if previous_position != position {
                let conflict = Conflict {
                    non_terminal,
                    terminal,
                    previous,
                    replacement: alternative.clone(),
                };
                warn!("{}", conflict);
                self.conflicts.push(conflict);
            }
        }
    }

    pub fn get(&self, non_terminal: char, terminal: char) -> Option<&Alternative> {
        self.cells.get(&(non_terminal, terminal)).map(|(_, a)| a)
    }

    pub fn start_symbol(&self) -> Option<char> {
        self.start_symbol
    }

    pub fn non_terminals(&self) -> &[char] {
        &self.non_terminals
    }

    /// Column order of the table, ending with `$`.
    pub fn terminals(&self) -> &[char] {
        &self.terminals
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Filled cells of one row in column order.
    pub fn row(&self, non_terminal: char) -> impl Iterator<Item = (char, &Alternative)> {
        self.terminals
            .iter()
            .filter_map(move |&t| self.get(non_terminal, t).map(|a| (t, a)))
    }
}

/// Result of one analysis run: every stage of the pipeline, built from
/// scratch for the grammar it owns.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub grammar: Grammar,
    pub first: FirstSets,
    pub follow: FollowSets,
    pub table: LL1Table,
}

impl Analysis {
    pub fn new(grammar: Grammar) -> Self {
        let first = FirstSets::compute(&grammar);
        let follow = FollowSets::compute(&grammar, &first);
        let table = LL1Table::build(&grammar, &first, &follow);
        info!(
            "analyzed {} non-terminals and {} terminals, {} LL(1) conflicts",
            grammar.non_terminals().len(),
            grammar.terminals().len(),
            table.conflicts().len()
        );
        Self {
            grammar,
            first,
            follow,
            table,
        }
    }

    pub fn conflicts(&self) -> &[Conflict] {
        self.table.conflicts()
    }
}

impl Grammar {
    pub fn analyze(self) -> Analysis {
        Analysis::new(self)
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput {
    terminals: Vec<String>,
    rows: Vec<(String, Vec<Option<String>>)>,
    conflicts: Vec<String>,
    #[serde(skip)]
    conflicted_cells: HashSet<(String, String)>,
}

impl LL1ParsingTableOutput {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().cloned());
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.clone()];
            line.extend(row.iter().map(|cell| {
                cell.as_ref()
                    .map(|right| format!("{} -> {}", left, right))
                    .unwrap_or_default()
            }));
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| output.iter().map(|line| line[j].len()).max().unwrap_or(0))
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .chain(self.conflicts.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape_tex(t.as_str()))),
        );
        let header = header.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().map(|t| t.as_str()).collect();
        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape_tex(left.as_str()).to_string()];
            line.extend(row.iter().zip(self.terminals.iter()).map(|(cell, t)| {
                let right = match cell {
                    Some(right) => right,
                    None => return String::new(),
                };
                let cell = ProductionOutput {
                    left: left.clone(),
                    rights: vec![right.chars().map(|c| c.to_string()).collect()],
                }
                .to_latex(false, &terminal_set);
                let conflicted = self.conflicted_cells.contains(&(left.clone(), t.clone()));
                if conflicted {
                    format!("{{\\color{{red}}{}}}", cell)
                } else {
                    cell
                }
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| error_json(&e.to_string()))
    }
}

impl LL1Table {
    pub fn to_output(&self) -> LL1ParsingTableOutput {
        let rows = self
            .non_terminals
            .iter()
            .map(|&nt| {
                let row = self
                    .terminals
                    .iter()
                    .map(|&t| self.get(nt, t).map(|a| alternative_to_string(a)))
                    .collect();
                (nt.to_string(), row)
            })
            .collect();

        LL1ParsingTableOutput {
            terminals: self.terminals.iter().map(|t| t.to_string()).collect(),
            rows,
            conflicts: self.conflicts.iter().map(|c| c.to_string()).collect(),
            conflicted_cells: self
                .conflicts
                .iter()
                .map(|c| (c.non_terminal.to_string(), c.terminal.to_string()))
                .collect(),
        }
    }
}
