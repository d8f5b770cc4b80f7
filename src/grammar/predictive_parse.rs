use std::collections::HashMap;
use std::fmt;

use log::{debug, trace};

use super::{
    grammar::{alternative_to_string, is_epsilon_alternative, Alternative, Symbol},
    LL1Table, ParseFailure, END_MARK,
};

/// Index of a node in its [`ParseTree`].
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTreeNode {
    pub symbol: Symbol,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Parse tree stored as an arena. Node 0 is the root; children are kept in
/// left-to-right order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<ParseTreeNode>,
}

impl ParseTree {
    fn new(root: Symbol) -> Self {
        Self {
            nodes: vec![ParseTreeNode {
                symbol: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    fn add_child(&mut self, parent: NodeId, symbol: Symbol) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ParseTreeNode {
            symbol,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &ParseTreeNode {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, move |&p| self.nodes[p].parent)
    }

    /// Terminal leaves read left to right.
    pub fn leaves(&self) -> String {
        let mut leaves = String::new();
        let mut pending = vec![self.root()];
        while let Some(id) = pending.pop() {
            let node = &self.nodes[id];
            if let Symbol::Terminal(c) = node.symbol {
                leaves.push(c);
            }
            pending.extend(node.children.iter().rev());
        }
        leaves
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Match(Symbol),
    Expand(char, Alternative),
    Reject,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Match(symbol) => write!(f, "match {}", symbol),
            Action::Expand(left, right) => write!(f, "{} -> {}", left, alternative_to_string(right)),
            Action::Reject => write!(f, "error"),
        }
    }
}

/// Parser configuration recorded before a step, with the action taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Stack contents, bottom first.
    pub stack: Vec<Symbol>,
    /// Remaining input including the end marker.
    pub input: String,
    pub action: Option<Action>,
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = self
            .stack
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "Stack: {} | Input: {}", stack, self.input)?;
        if let Some(action) = &self.action {
            write!(f, " | {}", action)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ParseResult {
    trace: Vec<TraceStep>,
    tree: Option<ParseTree>,
    failure: Option<ParseFailure>,
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn trace(&self) -> &[TraceStep] {
        &self.trace
    }

    /// The tree is only meaningful for an accepted input.
    pub fn tree(&self) -> Option<&ParseTree> {
        if self.is_success() {
            self.tree.as_ref()
        } else {
            None
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        self.failure.as_ref()
    }
}

struct StackEntry {
    symbol: Symbol,
    /// `None` for the `$` sentinel.
    node: Option<NodeId>,
}

struct ParserState {
    stack: Vec<StackEntry>,
    input: Vec<char>,
    cursor: usize,
    /// Cursor position at which each non-terminal node was expanded.
    expanded_at: HashMap<NodeId, usize>,
}

impl ParserState {
    fn snapshot(&self) -> TraceStep {
        TraceStep {
            stack: self.stack.iter().map(|e| e.symbol).collect(),
            input: self.input[self.cursor..].iter().collect(),
            action: None,
        }
    }

    /// Whether expanding `node` would repeat an expansion of the same
    /// non-terminal above it without any input consumed in between.
    fn is_left_recursive(&self, tree: &ParseTree, node: NodeId) -> bool {
        let symbol = tree.node(node).symbol;
        for ancestor in tree.ancestors(node) {
            if self.expanded_at.get(&ancestor) != Some(&self.cursor) {
                break;
            }
            if tree.node(ancestor).symbol == symbol {
                return true;
            }
        }
        false
    }
}

impl LL1Table {
    /// Runs the predictive parser over `input` with `$` appended.
    pub fn parse(&self, input: &str) -> ParseResult {
        let start = match self.start_symbol() {
            Some(start) => start,
            None => {
                return ParseResult {
                    trace: Vec::new(),
                    tree: None,
                    failure: Some(ParseFailure::NoStartSymbol),
                }
            }
        };

        let mut tree = ParseTree::new(Symbol::NonTerminal(start));
        let mut state = ParserState {
            stack: vec![
                StackEntry {
                    symbol: Symbol::EndOfInput,
                    node: None,
                },
                StackEntry {
                    symbol: Symbol::NonTerminal(start),
                    node: Some(tree.root()),
                },
            ],
            input: input.chars().chain(std::iter::once(END_MARK)).collect(),
            cursor: 0,
            expanded_at: HashMap::new(),
        };
        let mut trace: Vec<TraceStep> = Vec::new();
        let mut failure: Option<ParseFailure> = None;

        while state.cursor < state.input.len() {
            let (top, node) = match state.stack.last() {
                Some(entry) => (entry.symbol, entry.node),
                None => break,
            };
            let current = state.input[state.cursor];
            let mut step = state.snapshot();

            let action = match top {
                Symbol::Terminal(_) | Symbol::EndOfInput => {
                    if top.as_char() == current {
                        state.stack.pop();
                        state.cursor += 1;
                        Action::Match(top)
                    } else {
                        failure = Some(ParseFailure::TerminalMismatch {
                            expected: top,
                            found: current,
                            position: state.cursor,
                        });
                        Action::Reject
                    }
                }
                Symbol::NonTerminal(nt) => match (self.get(nt, current), node) {
                    (None, _) => {
                        failure = Some(ParseFailure::NoTableEntry {
                            non_terminal: nt,
                            lookahead: current,
                            position: state.cursor,
                        });
                        Action::Reject
                    }
                    (Some(_), Some(node)) if state.is_left_recursive(&tree, node) => {
                        failure = Some(ParseFailure::LeftRecursion {
                            non_terminal: nt,
                            position: state.cursor,
                        });
                        Action::Reject
                    }
                    (Some(alternative), node) => {
                        state.stack.pop();
                        if let Some(node) = node {
                            state.expanded_at.insert(node, state.cursor);
                        }
                        if !is_epsilon_alternative(alternative) {
                            let children: Vec<(Symbol, Option<NodeId>)> = alternative
                                .iter()
                                .map(|&symbol| (symbol, node.map(|n| tree.add_child(n, symbol))))
                                .collect();
                            for (symbol, child) in children.into_iter().rev() {
                                state.stack.push(StackEntry {
                                    symbol,
                                    node: child,
                                });
                            }
                        }
                        Action::Expand(nt, alternative.clone())
                    }
                },
                Symbol::Epsilon => {
                    state.stack.pop();
                    Action::Match(top)
                }
            };

            step.action = Some(action);
            trace!("{}", step);
            trace.push(step);
            if failure.is_some() {
                break;
            }
        }

        // Rule text cannot contain `$`, so only a grammar assembled with an
        // `EndOfInput` inside an alternative can run out of input with
        // symbols still stacked.
        if failure.is_none() {
            if !state.stack.is_empty() {
                failure = Some(ParseFailure::LeftoverStack {
                    remaining: state.stack.len(),
                    position: state.cursor,
                });
            } else if state.cursor < state.input.len() {
                failure = Some(ParseFailure::UnconsumedInput {
                    position: state.cursor,
                });
            }
        }

        match &failure {
            Some(failure) => debug!("rejected {:?}: {}", input, failure),
            None => debug!("accepted {:?} in {} steps", input, trace.len()),
        }

        ParseResult {
            trace,
            tree: Some(tree),
            failure,
        }
    }
}
