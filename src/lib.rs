extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{Analysis, Grammar, GrammarError, LL1Table, ParseFailure, ParseResult};

use grammar::pretty_print::error_json;

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => g.analyze().to_non_terminal_output_vec().to_json(),
        Err(e) => error_json(&e.to_string()),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => g.analyze().table.to_output().to_json(),
        Err(e) => error_json(&e.to_string()),
    }
}

#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, input: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => g.analyze().table.parse(input).to_output(input).to_json(),
        Err(e) => error_json(&e.to_string()),
    }
}


#[cfg(test)]
mod nullable_first_follow_test {
    use crate::grammar::{FirstSets, FollowSets};
    use crate::Grammar;
    use pretty_assertions::assert_eq;

    fn sorted(set: Option<&indexmap::IndexSet<char>>) -> Vec<char> {
        let mut v: Vec<char> = set.into_iter().flatten().copied().collect();
        v.sort();
        v
    }

    fn expression_grammar() -> Grammar {
        Grammar::from_rules(&["E->TX", "X->+TX|!", "T->n"]).unwrap()
    }

    #[test]
    fn expression_first_follow() {
        let g = expression_grammar();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);

        assert_eq!(sorted(first.first('E')), vec!['n']);
        assert_eq!(sorted(first.first('X')), vec!['+']);
        assert!(first.is_nullable('X'));
        assert!(!first.is_nullable('E'));

        assert_eq!(sorted(follow.follow('E')), vec!['$']);
        assert_eq!(sorted(follow.follow('X')), vec!['$']);
        assert_eq!(sorted(follow.follow('T')), vec!['$', '+']);
    }

    #[test]
    fn nullable_chain() {
        // S derives empty only through A and B.
        let g = Grammar::from_rules(&["S->ABc", "A->a|!", "B->b|!"]).unwrap();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);

        assert_eq!(sorted(first.first('S')), vec!['a', 'b', 'c']);
        assert!(!first.is_nullable('S'));
        assert_eq!(sorted(follow.follow('A')), vec!['b', 'c']);
        assert_eq!(sorted(follow.follow('B')), vec!['c']);
    }

    #[test]
    fn epsilon_only_rule() {
        let g = Grammar::from_rules(&["S->Aa", "A->!"]).unwrap();
        let first = FirstSets::compute(&g);

        assert!(first.is_nullable('A'));
        assert!(sorted(first.first('A')).is_empty());
        assert_eq!(sorted(first.first('S')), vec!['a']);
    }

    #[test]
    fn first_of_sequence() {
        let g = Grammar::from_rules(&["S->AB", "A->a|!", "B->b|!"]).unwrap();
        let first = FirstSets::compute(&g);

        let (set, nullable) = first.first_of_sequence(&g.productions[0].alternatives[0]);
        let mut set: Vec<char> = set.into_iter().collect();
        set.sort();
        assert_eq!(set, vec!['a', 'b']);
        assert!(nullable);

        let (set, nullable) = first.first_of_sequence(&[]);
        assert!(set.is_empty());
        assert!(nullable);
    }

    #[test]
    fn trailing_self_recursion() {
        let g = Grammar::from_rules(&["S->aS|b"]).unwrap();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);

        assert_eq!(sorted(follow.follow('S')), vec!['$']);
    }

    #[test]
    fn trailing_self_recursion_through_nullable() {
        let g = Grammar::from_rules(&["S->xAy", "A->BA|!", "B->b"]).unwrap();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);

        assert_eq!(sorted(follow.follow('A')), vec!['y']);
        assert_eq!(sorted(follow.follow('B')), vec!['b', 'y']);
    }

    #[test]
    fn follow_reaches_through_right_recursion() {
        let g = Grammar::from_rules(&["S->Ac", "A->aA|B", "B->b"]).unwrap();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);

        assert_eq!(sorted(follow.follow('A')), vec!['c']);
        assert_eq!(sorted(follow.follow('B')), vec!['c']);
    }

    #[test]
    fn monotonic_passes() {
        let g = Grammar::from_rules(&["E->TX", "X->+TX|!", "T->FY", "Y->*FY|!", "F->(E)|i"])
            .unwrap();

        let mut first = FirstSets::new(&g);
        loop {
            let before = first.clone();
            let changed = first.step(&g);
            for (nt, entry) in before.iter() {
                let after = first.first(nt).unwrap();
                assert!(entry.terminals.iter().all(|t| after.contains(t)));
                assert!(!entry.nullable || first.is_nullable(nt));
            }
            if !changed {
                assert_eq!(before, first);
                break;
            }
        }

        let mut follow = FollowSets::new(&g);
        loop {
            let before = follow.clone();
            let changed = follow.step(&g, &first);
            for (nt, set) in before.iter() {
                let after = follow.follow(nt).unwrap();
                assert!(set.iter().all(|t| after.contains(t)));
            }
            if !changed {
                break;
            }
        }

        assert_eq!(sorted(first.first('E')), vec!['(', 'i']);
        assert_eq!(sorted(follow.follow('F')), vec!['$', ')', '*', '+']);
    }

    #[test]
    fn idempotent() {
        let g = expression_grammar();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);

        assert_eq!(first, FirstSets::compute(&g));
        assert_eq!(follow, FollowSets::compute(&g, &first));

        let mut again = first.clone();
        assert!(!again.step(&g));
        let mut again = follow.clone();
        assert!(!again.step(&g, &first));
    }
}


#[cfg(test)]
mod predictive_parse_tests {
    use crate::grammar::{ParseTree, Production, Symbol};
    use crate::{Analysis, Grammar, ParseFailure};
    use pretty_assertions::assert_eq;

    fn expression() -> Analysis {
        Grammar::from_rules(&["E->TX", "X->+TX|!", "T->n"])
            .unwrap()
            .analyze()
    }

    fn symbols(tree: &ParseTree, id: usize) -> Vec<Symbol> {
        tree.children(id)
            .iter()
            .map(|&c| tree.node(c).symbol)
            .collect()
    }

    #[test]
    fn accepts_expression() {
        let result = expression().table.parse("n+n+n");

        assert!(result.is_success());
        let tree = result.tree().unwrap();
        assert_eq!(tree.node(tree.root()).symbol, Symbol::NonTerminal('E'));
        assert_eq!(
            symbols(tree, tree.root()),
            vec![Symbol::NonTerminal('T'), Symbol::NonTerminal('X')]
        );
        assert_eq!(tree.leaves(), "n+n+n");
    }

    #[test]
    fn trace_records_each_step() {
        let result = expression().table.parse("n");

        let trace: Vec<String> = result.trace().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            trace,
            vec![
                "Stack: $ E | Input: n$ | E -> TX",
                "Stack: $ X T | Input: n$ | T -> n",
                "Stack: $ X n | Input: n$ | match n",
                "Stack: $ X | Input: $ | X -> !",
                "Stack: $ | Input: $ | match $",
            ]
        );
    }

    #[test]
    fn rejects_trailing_operator() {
        let result = expression().table.parse("n+");

        assert!(!result.is_success());
        assert!(result.tree().is_none());
        assert_eq!(
            result.failure(),
            Some(&ParseFailure::NoTableEntry {
                non_terminal: 'T',
                lookahead: '$',
                position: 2,
            })
        );
        assert!(!result.trace().is_empty());
    }

    #[test]
    fn rejects_terminal_mismatch() {
        let a = Grammar::from_rules(&["S->(S)|x"]).unwrap().analyze();
        let result = a.table.parse("(x");

        assert_eq!(
            result.failure(),
            Some(&ParseFailure::TerminalMismatch {
                expected: Symbol::Terminal(')'),
                found: '$',
                position: 2,
            })
        );
    }

    #[test]
    fn rejects_input_after_end_marker() {
        let result = expression().table.parse("n$n");

        assert_eq!(
            result.failure(),
            Some(&ParseFailure::UnconsumedInput { position: 2 })
        );
    }

    #[test]
    fn end_marker_inside_alternative_leaves_stack() {
        // Only reachable by building the grammar without rule text.
        let g = Grammar::new(vec![Production::new(
            'S',
            vec![vec![
                Symbol::Terminal('a'),
                Symbol::EndOfInput,
                Symbol::Terminal('b'),
            ]],
        )]);
        let result = g.analyze().table.parse("a");

        assert_eq!(
            result.failure(),
            Some(&ParseFailure::LeftoverStack {
                remaining: 2,
                position: 2,
            })
        );
        assert!(result.tree().is_none());
    }

    #[test]
    fn rejects_unknown_symbol() {
        let result = expression().table.parse("n*n");

        assert!(matches!(
            result.failure(),
            Some(ParseFailure::NoTableEntry {
                non_terminal: 'X',
                lookahead: '*',
                ..
            })
        ));
    }

    #[test]
    fn epsilon_on_empty_input() {
        let a = Grammar::from_rules(&["S->a|!"]).unwrap().analyze();
        let result = a.table.parse("");

        assert!(result.is_success());
        let tree = result.tree().unwrap();
        assert_eq!(tree.node(tree.root()).symbol, Symbol::NonTerminal('S'));
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(tree.leaves(), "");
    }

    #[test]
    fn nested_tree_shape() {
        let a = Grammar::from_rules(&["E->TX", "X->+TX|!", "T->FY", "Y->*FY|!", "F->(E)|i"])
            .unwrap()
            .analyze();
        let result = a.table.parse("(i+i)*i");

        assert!(result.is_success());
        let tree = result.tree().unwrap();
        assert_eq!(tree.leaves(), "(i+i)*i");
        for id in 0..tree.len() {
            for &child in tree.children(id) {
                assert_eq!(tree.node(child).parent, Some(id));
            }
        }
    }

    #[test]
    fn never_accepts_outside_language() {
        let a = Grammar::from_rules(&["S->aSb|!"]).unwrap().analyze();

        for input in ["", "ab", "aabb", "aaabbb"] {
            assert!(a.table.parse(input).is_success(), "{}", input);
        }
        for input in ["a", "b", "ba", "aab", "abb", "abab"] {
            assert!(!a.table.parse(input).is_success(), "{}", input);
        }
    }

    #[test]
    fn left_recursion_stops() {
        // A->c is overwritten by A->Ab in cell (A, c).
        let a = Grammar::from_rules(&["A->c|Ab"]).unwrap().analyze();
        let result = a.table.parse("cb");

        assert!(!a.table.is_ll1());
        assert_eq!(
            result.failure(),
            Some(&ParseFailure::LeftRecursion {
                non_terminal: 'A',
                position: 0,
            })
        );
    }

    #[test]
    fn empty_grammar_never_accepts() {
        let a = Grammar::parse("").unwrap().analyze();
        let result = a.table.parse("a");

        assert_eq!(result.failure(), Some(&ParseFailure::NoStartSymbol));
        assert!(result.trace().is_empty());
    }

    #[test]
    fn json_output() {
        let json = crate::parse_to_json("S->a|!", "a");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["tree"]["value"], "S");
        assert_eq!(value["tree"]["children"][0]["value"], "a");

        let json = crate::first_follow_to_json("->a");
        assert!(json.contains("empty left side"));
    }
}
