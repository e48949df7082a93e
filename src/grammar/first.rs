//! Nullable and FIRST sets
//!
//! Both are computed together by iterating over all productions until a full
//! pass adds nothing. Sets only ever grow and are bounded by the terminal
//! alphabet, so the loop terminates even with mutual recursion.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{Grammar, Symbol};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSets {
    first: FxHashMap<String, BTreeSet<String>>,
    nullable: FxHashSet<String>,
}

impl FirstSets {
    /// Iterate to the fixed point.
    pub fn compute(grammar: &Grammar) -> Self {
        let mut sets = FirstSets {
            first: grammar
                .productions()
                .map(|p| (p.lhs().to_string(), BTreeSet::new()))
                .collect(),
            nullable: FxHashSet::default(),
        };
        let mut passes = 1;
        while sets.iterate(grammar) {
            passes += 1;
        }
        log::debug!("FIRST sets closed after {passes} passes");
        sets
    }

    /// One pass over every production. Returns true if any set changed.
    pub fn iterate(&mut self, grammar: &Grammar) -> bool {
        let mut changed = false;
        for production in grammar.productions() {
            let (first, nullable) = self.sequence(production.symbols());
            let entry = self.first.entry(production.lhs().to_string()).or_default();
            let before = entry.len();
            entry.extend(first);
            changed |= entry.len() > before;
            if nullable && self.nullable.insert(production.lhs().to_string()) {
                changed = true;
            }
        }
        changed
    }

    /// FIRST set of a symbol sequence, and whether the whole sequence can
    /// derive the empty string. Actions are transparent.
    pub fn sequence(&self, symbols: &[Symbol]) -> (BTreeSet<String>, bool) {
        let mut first = BTreeSet::new();
        for symbol in symbols {
            match symbol {
                Symbol::Terminal(t) => {
                    first.insert(t.clone());
                    return (first, false);
                }
                Symbol::Nonterminal(name) => {
                    if let Some(set) = self.first.get(name) {
                        first.extend(set.iter().cloned());
                    }
                    if !self.nullable.contains(name) {
                        return (first, false);
                    }
                }
                Symbol::Action(_) | Symbol::Epsilon => {}
            }
        }
        (first, true)
    }

    pub fn first(&self, nonterminal: &str) -> Option<&BTreeSet<String>> {
        self.first.get(nonterminal)
    }

    pub fn is_nullable(&self, nonterminal: &str) -> bool {
        self.nullable.contains(nonterminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::reader::read_grammar;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const CALC: &str = "
        <Program>    -> <Expr> EndOfFile
        <Expr>       -> <Term> <ExprTail>
        <ExprTail>   -> Plus <Term> {binary_add} <ExprTail>
        <ExprTail>   -> Minus <Term> {binary_sub} <ExprTail>
        <ExprTail>   -> #Eps#
        <Term>       -> <Factor> <TermTail>
        <TermTail>   -> Mul <Factor> {binary_mul} <TermTail>
        <TermTail>   -> #Eps#
        <Factor>     -> LeftParenthesis <Expr> RightParenthesis
        <Factor>     -> IntegerConstant {push_int}
        <Factor>     -> Minus <Factor> {unary_minus}
    ";

    #[test]
    fn test_calculator_first_sets() {
        let grammar = read_grammar(CALC).unwrap();
        let sets = FirstSets::compute(&grammar);

        let atoms = set(&["IntegerConstant", "LeftParenthesis", "Minus"]);
        assert_eq!(sets.first("Factor"), Some(&atoms));
        assert_eq!(sets.first("Term"), Some(&atoms));
        assert_eq!(sets.first("Expr"), Some(&atoms));
        assert_eq!(sets.first("Program"), Some(&atoms));
        assert_eq!(sets.first("ExprTail"), Some(&set(&["Minus", "Plus"])));
        assert_eq!(sets.first("TermTail"), Some(&set(&["Mul"])));

        assert!(sets.is_nullable("ExprTail"));
        assert!(sets.is_nullable("TermTail"));
        assert!(!sets.is_nullable("Expr"));
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let grammar = read_grammar(CALC).unwrap();
        let mut sets = FirstSets::compute(&grammar);
        let closed = sets.clone();
        assert!(!sets.iterate(&grammar));
        assert_eq!(sets, closed);
    }

    #[test]
    fn test_nullable_prefix_and_mutual_recursion() {
        let grammar = read_grammar(
            "
            <S> -> <A> <B> End
            <A> -> {mark} #Eps#
            <A> -> a <B>
            <B> -> #Eps#
            <B> -> b <A>
            ",
        );
        // epsilon mixed with an action is rejected by the reader
        assert!(grammar.is_err());

        let grammar = read_grammar(
            "
            <S> -> <A> <B> End
            <A> -> {mark}
            <A> -> a <B>
            <B> -> #Eps#
            <B> -> b <A>
            ",
        )
        .unwrap();
        let sets = FirstSets::compute(&grammar);
        assert!(sets.is_nullable("A"));
        assert!(sets.is_nullable("B"));
        assert_eq!(sets.first("A"), Some(&set(&["a"])));
        assert_eq!(sets.first("S"), Some(&set(&["End", "a", "b"])));
    }
}
