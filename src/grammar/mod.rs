pub mod error;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod nullable_first_follow;
pub mod parse;
pub mod predictive_parse;
pub mod pretty_print;
pub use error::{GrammarError, ParseFailure};
pub use grammar::{Alternative, Grammar, Production, Symbol};
pub use ll1_parsing_table::{Analysis, Conflict, LL1Table};
pub use nullable_first_follow::{FirstSets, FollowSets};
pub use predictive_parse::{NodeId, ParseResult, ParseTree, ParseTreeNode, TraceStep};

pub const EPSILON: char = '!';
pub const END_MARK: char = '$';
pub const ARROW: &str = "->";
pub const ALTERNATIVE_SEPARATOR: char = '|';
