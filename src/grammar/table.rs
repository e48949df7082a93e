//! Grammar → flat LL(1) automaton
//!
//! Every nonterminal compiles to a contiguous region:
//!
//! ```text
//! head 0      try alternative 0 if the lookahead is in its FIRST set
//! head 1      ... otherwise fall to the next head
//! failure     (only without a default alternative) report the mismatch
//! body 0      steps of alternative 0
//! body 1      steps of alternative 1
//! ```
//!
//! A body step is a terminal match, a call (push the return point, jump to the
//! callee's first head), or an action (fire a handler, consume nothing). A step
//! without a branch target returns to the address on top of the stack. The
//! alternative that can derive the empty string, if any, is the default: it is
//! tried last and accepts any lookahead.
//!
//! The last step of the table is the accept step. The only way to reach it is
//! the end-of-input terminal of the start production, and the start symbol is
//! entered at step 0 without a push, so the address stack is empty on accept.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;

use super::first::FirstSets;
use super::{Grammar, GrammarError, Production, Symbol};

/// One unit of the compiled automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Terminal text, callee nonterminal, action name, or owning rule for heads
    pub name: String,
    /// Fires the `name` handler; consumes nothing
    pub action: bool,
    /// Remember `index + 1` before branching
    pub push: bool,
    /// Advance the token stream on match
    pub consume: bool,
    /// Next step; `None` returns to the caller
    pub next: Option<usize>,
    /// A mismatch here is reported instead of trying the next step
    pub failure: bool,
    /// The unique terminal state
    pub accept: bool,
    /// When false, `expected` is informational and every lookahead passes
    pub guarded: bool,
    pub expected: BTreeSet<String>,
}

impl Step {
    fn new(name: impl Into<String>) -> Self {
        Step {
            name: name.into(),
            action: false,
            push: false,
            consume: false,
            next: None,
            failure: false,
            accept: false,
            guarded: false,
            expected: BTreeSet::new(),
        }
    }

    /// Whether a lookahead of kind `terminal` may pass this step.
    pub fn accepts(&self, terminal: &str) -> bool {
        if self.is_diagnostic() {
            return false;
        }
        !self.guarded || self.expected.contains(terminal)
    }

    /// The step closing an alternative chain; it exists only to report.
    pub fn is_diagnostic(&self) -> bool {
        self.failure && !self.consume && !self.accept && self.guarded && self.next.is_none()
    }

    /// Terminal to propose in a "maybe you meant" hint.
    pub fn suggestion(&self) -> Option<&str> {
        self.expected.iter().next().map(String::as_str)
    }
}

/// The compiled, immutable automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    steps: Vec<Step>,
    start: String,
    end: String,
}

/// Productions sharing a left-hand side, in chain order.
struct Rule<'g> {
    name: &'g str,
    alternatives: Vec<&'g Production>,
    /// Index into `alternatives` of the alternative deriving empty, always last
    default: Option<usize>,
}

impl Rule<'_> {
    fn heads(&self) -> usize {
        self.alternatives.len() + usize::from(self.default.is_none())
    }
}

impl Table {
    pub fn build(grammar: &Grammar) -> Result<Table, GrammarError> {
        let start = grammar.start_symbol()?.to_string();
        let end = grammar.end_symbol()?.to_string();

        let first = FirstSets::compute(grammar);
        let rules = group_rules(grammar, &first);
        let index: FxHashMap<&str, usize> = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.name, i))
            .collect();

        check_references(grammar, &index, &start)?;
        if rules[0].alternatives.len() != 1 {
            return Err(GrammarError::StartAlternatives { name: start });
        }
        check_left_recursion(&rules, &index, &first)?;
        for rule in &rules {
            check_disjoint(rule, &first)?;
        }
        warn_unreachable(&rules, &index);

        let steps = Compiler::new(&rules, &index, &first, end.clone()).compile();
        log::debug!(
            "compiled {} productions over {} nonterminals into {} steps",
            grammar.len(),
            rules.len(),
            steps.len()
        );
        Ok(Table {
            steps,
            start,
            end,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    pub fn end_symbol(&self) -> &str {
        &self.end
    }

    /// Distinct action names referenced by the table.
    pub fn actions(&self) -> BTreeSet<&str> {
        self.steps
            .iter()
            .filter(|s| s.action)
            .map(|s| s.name.as_str())
            .collect()
    }
}

fn group_rules<'g>(grammar: &'g Grammar, first: &FirstSets) -> Vec<Rule<'g>> {
    let mut rules: Vec<Rule<'g>> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    for production in grammar.productions() {
        let i = *index.entry(production.lhs()).or_insert_with(|| {
            rules.push(Rule {
                name: production.lhs(),
                alternatives: Vec::new(),
                default: None,
            });
            rules.len() - 1
        });
        rules[i].alternatives.push(production);
    }

    // move the alternative deriving empty (if unique) behind the others;
    // duplicates are reported by `check_disjoint`
    for rule in &mut rules {
        let nullable: Vec<usize> = rule
            .alternatives
            .iter()
            .enumerate()
            .filter(|(_, alt)| first.sequence(alt.symbols()).1)
            .map(|(i, _)| i)
            .collect();
        if let [i] = nullable[..] {
            let alt = rule.alternatives.remove(i);
            rule.alternatives.push(alt);
            rule.default = Some(rule.alternatives.len() - 1);
        }
    }
    rules
}

fn check_references(
    grammar: &Grammar,
    index: &FxHashMap<&str, usize>,
    start: &str,
) -> Result<(), GrammarError> {
    for symbol in grammar.productions().flat_map(|p| p.symbols()) {
        if let Symbol::Nonterminal(name) = symbol {
            if !index.contains_key(name.as_str()) {
                return Err(GrammarError::UndefinedNonterminal { name: name.clone() });
            }
            if name == start {
                return Err(GrammarError::StartReferenced { name: name.clone() });
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Active,
    Done,
}

/// Reject rules that can reach themselves without consuming a terminal.
fn check_left_recursion(
    rules: &[Rule<'_>],
    index: &FxHashMap<&str, usize>,
    first: &FirstSets,
) -> Result<(), GrammarError> {
    // edge A -> B when B can be the leftmost symbol expanded from A
    let edges: Vec<Vec<usize>> = rules
        .iter()
        .map(|rule| {
            let mut out = Vec::new();
            for alt in &rule.alternatives {
                for symbol in alt.symbols() {
                    match symbol {
                        Symbol::Terminal(_) => break,
                        Symbol::Nonterminal(name) => {
                            out.extend(index.get(name.as_str()).copied());
                            if !first.is_nullable(name) {
                                break;
                            }
                        }
                        Symbol::Action(_) | Symbol::Epsilon => {}
                    }
                }
            }
            out
        })
        .collect();

    fn visit(
        node: usize,
        edges: &[Vec<usize>],
        marks: &mut [Mark],
        rules: &[Rule<'_>],
    ) -> Result<(), GrammarError> {
        marks[node] = Mark::Active;
        for &next in &edges[node] {
            match marks[next] {
                Mark::Active => {
                    return Err(GrammarError::LeftRecursive {
                        nonterminal: rules[next].name.to_string(),
                    })
                }
                Mark::New => visit(next, edges, marks, rules)?,
                Mark::Done => {}
            }
        }
        marks[node] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::New; rules.len()];
    for root in 0..rules.len() {
        if marks[root] == Mark::New {
            visit(root, &edges, &mut marks, rules)?;
        }
    }
    Ok(())
}

/// Alternatives of one rule must be selectable by a single lookahead.
fn check_disjoint(rule: &Rule<'_>, first: &FirstSets) -> Result<(), GrammarError> {
    let sets: Vec<(BTreeSet<String>, bool)> = rule
        .alternatives
        .iter()
        .map(|alt| first.sequence(alt.symbols()))
        .collect();

    if sets.iter().filter(|(_, nullable)| *nullable).count() > 1 {
        return Err(GrammarError::AmbiguousEmpty {
            nonterminal: rule.name.to_string(),
        });
    }
    for (i, (left, _)) in sets.iter().enumerate() {
        for (right, _) in &sets[i + 1..] {
            if let Some(terminal) = left.intersection(right).next() {
                return Err(GrammarError::Ambiguous {
                    nonterminal: rule.name.to_string(),
                    terminal: terminal.clone(),
                });
            }
        }
    }
    Ok(())
}

fn warn_unreachable(rules: &[Rule<'_>], index: &FxHashMap<&str, usize>) {
    let mut reached = vec![false; rules.len()];
    let mut stack = vec![0];
    reached[0] = true;
    while let Some(i) = stack.pop() {
        for symbol in rules[i].alternatives.iter().flat_map(|p| p.symbols()) {
            if let Symbol::Nonterminal(name) = symbol {
                if let Some(&j) = index.get(name.as_str()) {
                    if !reached[j] {
                        reached[j] = true;
                        stack.push(j);
                    }
                }
            }
        }
    }
    for (rule, _) in rules.iter().zip(reached).filter(|(_, r)| !r) {
        log::warn!("nonterminal <{}> is unreachable from the start symbol", rule.name);
    }
}

struct Compiler<'a, 'g> {
    rules: &'a [Rule<'g>],
    index: &'a FxHashMap<&'g str, usize>,
    first: &'a FirstSets,
    end: String,
    /// First head step of each rule
    entries: Vec<usize>,
    /// First body step of each alternative, per rule
    bodies: Vec<Vec<usize>>,
    accept: usize,
}

impl<'a, 'g> Compiler<'a, 'g> {
    fn new(
        rules: &'a [Rule<'g>],
        index: &'a FxHashMap<&'g str, usize>,
        first: &'a FirstSets,
        end: String,
    ) -> Self {
        let mut entries = Vec::with_capacity(rules.len());
        let mut bodies = Vec::with_capacity(rules.len());
        let mut cursor = 0;
        for rule in rules {
            entries.push(cursor);
            cursor += rule.heads();
            let mut starts = Vec::with_capacity(rule.alternatives.len());
            for alt in &rule.alternatives {
                starts.push(cursor);
                cursor += body_len(alt);
            }
            bodies.push(starts);
        }
        Compiler {
            rules,
            index,
            first,
            end,
            entries,
            bodies,
            accept: cursor,
        }
    }

    fn compile(self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(self.accept + 1);
        for (r, rule) in self.rules.iter().enumerate() {
            self.emit_heads(r, rule, &mut steps);
            for (a, alt) in rule.alternatives.iter().enumerate() {
                debug_assert_eq!(steps.len(), self.bodies[r][a]);
                self.emit_body(r == 0, rule, alt, &mut steps);
            }
        }

        debug_assert_eq!(steps.len(), self.accept);
        let mut accept = Step::new(self.end.clone());
        accept.accept = true;
        steps.push(accept);
        steps
    }

    fn emit_heads(&self, r: usize, rule: &Rule<'_>, steps: &mut Vec<Step>) {
        let mut union = BTreeSet::new();
        for (a, alt) in rule.alternatives.iter().enumerate() {
            let (expected, _) = self.first.sequence(alt.symbols());
            union.extend(expected.iter().cloned());

            let mut head = Step::new(rule.name);
            head.guarded = rule.default != Some(a);
            head.expected = expected;
            head.next = (!alt.is_epsilon()).then(|| self.bodies[r][a]);
            steps.push(head);
        }
        if rule.default.is_none() {
            let mut failure = Step::new(rule.name);
            failure.failure = true;
            failure.guarded = true;
            failure.expected = union;
            steps.push(failure);
        }
    }

    fn emit_body(&self, is_start: bool, rule: &Rule<'_>, alt: &Production, steps: &mut Vec<Step>) {
        if alt.is_epsilon() {
            return;
        }
        let symbols = alt.symbols();
        for (k, symbol) in symbols.iter().enumerate() {
            let here = steps.len();
            let last = k + 1 == symbols.len();
            let fallthrough = (!last).then_some(here + 1);

            match symbol {
                Symbol::Terminal(text) => {
                    let mut step = Step::new(text.as_str());
                    step.failure = true;
                    step.guarded = true;
                    step.expected.insert(text.clone());
                    if is_start && last {
                        // end of input: nothing left to read
                        step.next = Some(self.accept);
                    } else {
                        step.consume = true;
                        step.next = fallthrough;
                    }
                    steps.push(step);
                }
                Symbol::Nonterminal(name) => {
                    let callee = self.index[name.as_str()];
                    let mut step = Step::new(name.as_str());
                    step.push = true;
                    step.next = Some(self.entries[callee]);
                    step.expected = self.first.first(name).cloned().unwrap_or_default();
                    steps.push(step);
                    if last {
                        steps.push(Step::new(rule.name));
                    }
                }
                Symbol::Action(name) => {
                    let mut step = Step::new(name.as_str());
                    step.action = true;
                    step.next = fallthrough;
                    steps.push(step);
                }
                Symbol::Epsilon => {}
            }
        }
    }
}

fn body_len(alt: &Production) -> usize {
    if alt.is_epsilon() {
        return 0;
    }
    let ret = usize::from(matches!(alt.last_symbol(), Symbol::Nonterminal(_)));
    alt.symbols().len() + ret
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '.' };
        write!(
            f,
            "{}{}{}{}{} {:<20}",
            flag(self.action, 'A'),
            flag(self.push, 'P'),
            flag(self.consume, 'C'),
            flag(self.failure, 'F'),
            flag(self.accept, '!'),
            self.name,
        )?;
        match self.next {
            Some(next) => write!(f, " -> {next:<4}")?,
            None => write!(f, " -> ret ")?,
        }
        if !self.expected.is_empty() {
            let list = self.expected.iter().cloned().collect::<Vec<_>>().join(", ");
            if self.guarded {
                write!(f, " [{list}]")?;
            } else {
                write!(f, " ({list})")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "{i:<4} {}", step.to_string().trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::reader::read_grammar;

    fn build(text: &str) -> Result<Table, GrammarError> {
        Table::build(&read_grammar(text).unwrap())
    }

    #[test]
    fn test_empty_grammar() {
        assert_eq!(Table::build(&Grammar::new()), Err(GrammarError::Empty));
    }

    #[test]
    fn test_shared_first_terminal_is_ambiguous() {
        let err = build(
            "
            <S> -> <A> End
            <A> -> x y
            <A> -> x z
            ",
        )
        .unwrap_err();
        assert_eq!(
            err,
            GrammarError::Ambiguous {
                nonterminal: "A".to_string(),
                terminal: "x".to_string()
            }
        );
    }

    #[test]
    fn test_indirect_overlap_is_ambiguous() {
        let err = build(
            "
            <S> -> <A> End
            <A> -> <B>
            <A> -> <C>
            <B> -> {b} x
            <C> -> x
            ",
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::Ambiguous { ref terminal, .. } if terminal == "x"));
    }

    #[test]
    fn test_two_empty_alternatives() {
        let err = build(
            "
            <S> -> <A> End
            <A> -> #Eps#
            <A> -> {nothing}
            ",
        )
        .unwrap_err();
        assert_eq!(err, GrammarError::AmbiguousEmpty { nonterminal: "A".to_string() });
    }

    #[test]
    fn test_left_recursion() {
        let err = build(
            "
            <S> -> <E> End
            <E> -> <T> <E> plus
            <T> -> #Eps#
            <T> -> t
            ",
        )
        .unwrap_err();
        assert_eq!(err, GrammarError::LeftRecursive { nonterminal: "E".to_string() });
    }

    #[test]
    fn test_undefined_nonterminal() {
        let err = build("<S> -> <Missing> End").unwrap_err();
        assert_eq!(err, GrammarError::UndefinedNonterminal { name: "Missing".to_string() });
    }

    #[test]
    fn test_start_symbol_constraints() {
        let err = build(
            "
            <S> -> x End
            <S> -> y End
            ",
        )
        .unwrap_err();
        assert_eq!(err, GrammarError::StartAlternatives { name: "S".to_string() });

        let err = build(
            "
            <S> -> <A> End
            <A> -> open <S>
            ",
        )
        .unwrap_err();
        assert_eq!(err, GrammarError::StartReferenced { name: "S".to_string() });
    }

    #[test]
    fn test_layout() {
        let table = build(
            "
            <S> -> <L> End
            <L> -> #Eps#
            <L> -> x {item} <L>
            ",
        )
        .unwrap();

        // S: head, failure, body(call, End)
        // L: head x, default head, body(x, item, call, ret)
        // accept
        assert_eq!(table.len(), 11);
        assert_eq!(table.start_symbol(), "S");
        assert_eq!(table.end_symbol(), "End");
        let steps = table.steps();

        assert!(steps[0].guarded && steps[0].next == Some(2));
        assert_eq!(steps[0].expected, BTreeSet::from(["End".to_string(), "x".to_string()]));
        assert!(steps[1].is_diagnostic());
        assert!(steps[2].push && steps[2].next == Some(4));
        assert_eq!(steps[3].name, "End");
        assert_eq!(steps[3].next, Some(10));
        assert!(!steps[3].consume);

        // the epsilon alternative is moved behind `x`
        assert_eq!(steps[4].expected, BTreeSet::from(["x".to_string()]));
        assert_eq!(steps[4].next, Some(6));
        assert!(!steps[5].guarded && steps[5].next.is_none());

        assert!(steps[6].consume && steps[6].failure);
        assert!(steps[7].action && steps[7].next == Some(8));
        assert!(steps[8].push && steps[8].next == Some(4));
        assert!(steps[9].next.is_none() && !steps[9].guarded);
        assert!(steps[10].accept);

        assert_eq!(table.actions(), BTreeSet::from(["item"]));
    }

    #[test]
    fn test_build_is_deterministic() {
        let text = "
            <S> -> <E> End
            <E> -> a {a}
            <E> -> b {b} <E>
            <E> -> c
        ";
        assert_eq!(build(text).unwrap(), build(text).unwrap());
    }

    #[test]
    fn test_dump() {
        let table = build(
            "
            <S> -> <L> End
            <L> -> #Eps#
            <L> -> x {item} <L>
            ",
        )
        .unwrap();
        expect_test::expect![[r#"
            0    ..... S                    -> 2    [End, x]
            1    ...F. S                    -> ret  [End, x]
            2    .P... L                    -> 4    (x)
            3    ...F. End                  -> 10   [End]
            4    ..... L                    -> 6    [x]
            5    ..... L                    -> ret
            6    ..CF. x                    -> 7    [x]
            7    A.... item                 -> 8
            8    .P... L                    -> 4    (x)
            9    ..... L                    -> ret
            10   ....! End                  -> ret
        "#]]
        .assert_eq(&table.to_string());
    }
}
