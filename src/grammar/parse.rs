use log::debug;

use super::{
    grammar::{Alternative, Production, Symbol},
    Grammar, GrammarError, ALTERNATIVE_SEPARATOR, ARROW, END_MARK,
};

impl Grammar {
    /// Reads one rule per line. A line starting with `|` adds alternatives
    /// to the rule above it.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut productions: Vec<Production> = Vec::new();

        for (i, line) in grammar.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_no = i + 1;
            if line.contains(END_MARK) {
                return Err(GrammarError::ReservedEndMark { line: line_no });
            }

            let parts: Vec<&str> = line.split(ARROW).collect();
            match parts.as_slice() {
                [left, rights] => {
                    let left = parse_left(left.trim(), line_no)?;
                    productions.push(Production::new(left, parse_alternatives(rights)));
                }
                [continuation] => {
                    let rights = continuation
                        .strip_prefix(ALTERNATIVE_SEPARATOR)
                        .ok_or(GrammarError::MissingArrow { line: line_no })?;
                    let previous = productions
                        .last_mut()
                        .ok_or(GrammarError::NoPreviousLeft { line: line_no })?;
                    previous.alternatives.extend(parse_alternatives(rights));
                }
                _ => return Err(GrammarError::TooManyArrows { line: line_no }),
            }
        }

        debug!("parsed {} rules", productions.len());
        Ok(Grammar::new(productions))
    }

    /// Same as [`Grammar::parse`] with one entry per rule.
    pub fn from_rules<S: AsRef<str>>(rules: &[S]) -> Result<Self, GrammarError> {
        let text = rules
            .iter()
            .map(|r| r.as_ref().trim())
            .collect::<Vec<_>>()
            .join("\n");
        Self::parse(&text)
    }
}

fn parse_left(left: &str, line: usize) -> Result<char, GrammarError> {
    let mut chars = left.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(GrammarError::EmptyLeft { line }),
        (Some(c), None) if c.is_ascii_uppercase() => Ok(c),
        _ => Err(GrammarError::InvalidLeft {
            line,
            left: left.to_string(),
        }),
    }
}

fn parse_alternatives(rights: &str) -> Vec<Alternative> {
    rights.split(ALTERNATIVE_SEPARATOR).map(parse_alternative).collect()
}

/// Whitespace and epsilon markers inside a longer alternative are dropped;
/// what is left empty becomes the epsilon alternative.
fn parse_alternative(right: &str) -> Alternative {
    let symbols: Alternative = right
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(Symbol::from_char)
        .filter(|s| *s != Symbol::Epsilon)
        .collect();
    if symbols.is_empty() {
        vec![Symbol::Epsilon]
    } else {
        symbols
    }
}
