use std::collections::HashSet;

use crowbook_text_processing::escape;
use indexmap::IndexSet;
use serde::Serialize;

use super::{
    predictive_parse::NodeId, Analysis, Grammar, ParseResult, ParseTree, EPSILON,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput {
    pub left: String,
    pub rights: Vec<Vec<String>>,
}

impl ProductionOutput {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.concat())
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left.as_str()))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left.as_str()))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| {
                        if s.starts_with(EPSILON) {
                            "\\epsilon".to_string()
                        } else if terminal_set.contains(s.as_str()) {
                            format!("\\text{{{}}}", escape::tex(s.as_str()))
                        } else {
                            escape::tex(s.as_str()).to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec {
    productions: Vec<ProductionOutput>,
    #[serde(skip)]
    terminals: Vec<String>,
}

impl ProductionOutputVec {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self.productions.iter().map(|p| p.left.len()).max().unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    pub fn to_latex(&self) -> String {
        let terminal_set: HashSet<&str> = self.terminals.iter().map(|t| t.as_str()).collect();
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true, &terminal_set)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .productions
            .iter()
            .map(|production| ProductionOutput {
                left: production.left.to_string(),
                rights: production
                    .alternatives
                    .iter()
                    .map(|a| a.iter().map(|s| s.to_string()).collect())
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminals().iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput {
    name: String,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[String]) -> String {
            a.iter()
                .map(|s| {
                    if s.starts_with(EPSILON) {
                        r"$\epsilon$".to_string()
                    } else {
                        escape::tex(s.as_str()).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name.as_str()),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec {
    data: Vec<NonTerminalOutput>,
}

impl NonTerminalOutputVec {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

/// Orders a set the way the grammar's terminals are ordered.
fn in_terminal_order(set: &IndexSet<char>, terminals: &IndexSet<char>) -> Vec<String> {
    let mut sorted: Vec<char> = set.iter().copied().collect();
    sorted.sort_by_key(|c| terminals.get_index_of(c).unwrap_or(usize::MAX));
    sorted.into_iter().map(|c| c.to_string()).collect()
}

impl Analysis {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let terminals = self.grammar.terminals();
        let data = self
            .grammar
            .non_terminals()
            .iter()
            .map(|&nt| {
                let mut first = self
                    .first
                    .first(nt)
                    .map(|s| in_terminal_order(s, terminals))
                    .unwrap_or_default();
                let nullable = self.first.is_nullable(nt);
                if nullable {
                    first.push(EPSILON.to_string());
                }
                NonTerminalOutput {
                    name: nt.to_string(),
                    nullable,
                    first,
                    follow: self
                        .follow
                        .follow(nt)
                        .map(|s| in_terminal_order(s, terminals))
                        .unwrap_or_default(),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct TreeOutput {
    value: String,
    children: Vec<TreeOutput>,
}

impl TreeOutput {
    fn from_tree(tree: &ParseTree, id: NodeId) -> Self {
        Self {
            value: tree.node(id).symbol.to_string(),
            children: tree
                .children(id)
                .iter()
                .map(|&child| Self::from_tree(tree, child))
                .collect(),
        }
    }

    fn write_plaintext(&self, depth: usize, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", "  ".repeat(depth), self.value));
        for child in &self.children {
            child.write_plaintext(depth + 1, lines);
        }
    }
}

#[derive(Serialize)]
pub struct ParseOutput {
    input: String,
    success: bool,
    error: Option<String>,
    trace: Vec<String>,
    tree: Option<TreeOutput>,
}

impl ParseOutput {
    pub fn to_plaintext(&self) -> String {
        let mut lines = vec![format!(
            "{}: {}",
            if self.success {
                "Parsing successful"
            } else {
                "Parsing failed"
            },
            self.input
        )];
        lines.extend(self.trace.iter().cloned());
        if let Some(error) = &self.error {
            lines.push(error.clone());
        }
        if let Some(tree) = &self.tree {
            tree.write_plaintext(0, &mut lines);
        }
        lines.join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| error_json(&e.to_string()))
    }
}

impl ParseResult {
    pub fn to_output(&self, input: &str) -> ParseOutput {
        ParseOutput {
            input: input.to_string(),
            success: self.is_success(),
            error: self.failure().map(|f| f.to_string()),
            trace: self.trace().iter().map(|s| s.to_string()).collect(),
            tree: self.tree().map(|t| TreeOutput::from_tree(t, t.root())),
        }
    }
}

pub fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
