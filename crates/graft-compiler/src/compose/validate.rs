//! Validation of the merged rule set.
//!
//! - every rule and lexer-rule reference resolves
//! - no parser rule can reach itself without consuming a token
//! - no loop body can match the empty string

use indexmap::{IndexMap, IndexSet};

use graft_core::grammar::{Alternative, Element, RuleDef};

use super::rules::RuleSet;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};

pub(crate) fn validate_rules(rules: &RuleSet, diag: &mut Diagnostics) {
    validate_references(rules, diag);

    let nullable = Nullability::compute(rules);
    validate_closures(rules, &nullable, diag);
    validate_left_recursion(rules, &nullable, diag);
}

fn validate_references(rules: &RuleSet, diag: &mut Diagnostics) {
    for resolved in rules.values() {
        let def = &resolved.def;
        let in_lexer = def.is_lexer_rule();
        let mut missing: IndexSet<(DiagnosticKind, &str)> = IndexSet::new();

        def.walk(|e| match e {
            Element::Rule { name, .. } if !rules.contains_key(name.as_str()) => {
                missing.insert((DiagnosticKind::UndefinedRule, name));
            }
            // Inside a lexer rule a token reference names another lexer rule.
            Element::Token { name, .. }
                if in_lexer
                    && !rules
                        .get(name.as_str())
                        .is_some_and(|r| r.def.is_lexer_rule()) =>
            {
                missing.insert((DiagnosticKind::UndefinedToken, name));
            }
            _ => {}
        });

        for (kind, name) in missing {
            diag.report(kind, Location::rule(&resolved.origin, &def.name))
                .message(name)
                .emit();
        }
    }
}

/// Which rules can match without consuming input.
struct Nullability<'a> {
    rules: &'a RuleSet,
    nullable: IndexMap<&'a str, bool>,
}

impl<'a> Nullability<'a> {
    fn compute(rules: &'a RuleSet) -> Self {
        let mut this = Self {
            rules,
            nullable: rules.keys().map(|k| (k.as_str(), false)).collect(),
        };
        // Monotone: a rule only ever flips from false to true.
        loop {
            let mut changed = false;
            for (name, resolved) in rules {
                if this.nullable[name.as_str()] {
                    continue;
                }
                if this.rule_nullable(&resolved.def) {
                    this.nullable.insert(name.as_str(), true);
                    changed = true;
                }
            }
            if !changed {
                break this;
            }
        }
    }

    fn rule(&self, name: &str) -> bool {
        self.nullable.get(name).copied().unwrap_or(false)
    }

    fn rule_nullable(&self, def: &RuleDef) -> bool {
        let in_lexer = def.is_lexer_rule();
        def.alternatives
            .iter()
            .any(|alt| self.alt_nullable(alt, in_lexer))
    }

    fn alt_nullable(&self, alt: &Alternative, in_lexer: bool) -> bool {
        alt.elements.iter().all(|e| self.element_nullable(e, in_lexer))
    }

    fn element_nullable(&self, element: &Element, in_lexer: bool) -> bool {
        match element {
            Element::Literal { value, .. } => value.is_empty(),
            Element::Token { name, .. } => in_lexer && self.rule(name),
            Element::Rule { name, .. } => self.rule(name),
            Element::Block {
                alternatives,
                quantifier,
            } => {
                quantifier.is_optional()
                    || alternatives.iter().any(|alt| self.alt_nullable(alt, in_lexer))
            }
            Element::Range { .. } => false,
            Element::Action(_) => true,
        }
    }

    /// Parser rules reachable from `alt` before any input is consumed.
    fn left_refs(&self, alt: &Alternative, out: &mut IndexSet<&'a str>) -> bool {
        for element in &alt.elements {
            match element {
                Element::Rule { name, .. } => {
                    if let Some((key, _)) = self.rules.get_key_value(name.as_str()) {
                        out.insert(key.as_str());
                    }
                }
                Element::Block { alternatives, .. } => {
                    for inner in alternatives {
                        self.left_refs(inner, out);
                    }
                }
                _ => {}
            }
            if !self.element_nullable(element, false) {
                return false;
            }
        }
        true
    }
}

fn validate_closures(rules: &RuleSet, nullable: &Nullability<'_>, diag: &mut Diagnostics) {
    for resolved in rules.values() {
        let def = &resolved.def;
        let in_lexer = def.is_lexer_rule();
        let mut offending: Vec<String> = Vec::new();
        def.walk(|e| {
            if let Element::Block {
                alternatives,
                quantifier,
            } = e
                && quantifier.is_loop()
                && alternatives.iter().any(|alt| nullable.alt_nullable(alt, in_lexer))
            {
                offending.push(e.to_string());
            }
        });
        for block in offending {
            diag.report(
                DiagnosticKind::EpsilonClosure,
                Location::rule(&resolved.origin, &def.name),
            )
            .message(format!("`{block}`"))
            .emit();
        }
    }
}

fn validate_left_recursion(rules: &RuleSet, nullable: &Nullability<'_>, diag: &mut Diagnostics) {
    let mut graph: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
    for (name, resolved) in rules {
        if resolved.def.is_lexer_rule() {
            continue;
        }
        let mut edges = IndexSet::new();
        for alt in &resolved.def.alternatives {
            nullable.left_refs(alt, &mut edges);
        }
        graph.insert(name.as_str(), edges);
    }

    for scc in SccFinder::find(&graph) {
        let recursive = scc.len() > 1 || graph[scc[0]].contains(scc[0]);
        if !recursive {
            continue;
        }

        // Report at the earliest-defined member for a stable location.
        let head = scc
            .iter()
            .copied()
            .min_by_key(|n| graph.get_index_of(n))
            .unwrap_or(scc[0]);
        let cycle = describe_cycle(head, &scc, &graph);
        let origin = &rules[head].origin;
        diag.report(DiagnosticKind::LeftRecursion, Location::rule(origin, head))
            .message(cycle)
            .emit();
    }
}

/// Walk left edges inside the component from `head` back to `head`.
fn describe_cycle(head: &str, scc: &[&str], graph: &IndexMap<&str, IndexSet<&str>>) -> String {
    let members: IndexSet<&str> = scc.iter().copied().collect();
    let mut path = vec![head];
    let mut current = head;
    loop {
        let edges = &graph[current];
        if edges.contains(head) {
            path.push(head);
            break;
        }
        let next = edges
            .iter()
            .copied()
            .find(|n| members.contains(n) && !path.contains(n));
        match next {
            Some(n) => {
                path.push(n);
                current = n;
            }
            None => break,
        }
    }
    path.join(" -> ")
}

struct SccFinder<'g, 'a> {
    graph: &'g IndexMap<&'a str, IndexSet<&'a str>>,
    index: usize,
    stack: Vec<&'a str>,
    on_stack: IndexSet<&'a str>,
    indices: IndexMap<&'a str, usize>,
    lowlinks: IndexMap<&'a str, usize>,
    sccs: Vec<Vec<&'a str>>,
}

impl<'g, 'a> SccFinder<'g, 'a> {
    fn find(graph: &'g IndexMap<&'a str, IndexSet<&'a str>>) -> Vec<Vec<&'a str>> {
        let mut finder = Self {
            graph,
            index: 0,
            stack: Vec::new(),
            on_stack: IndexSet::new(),
            indices: IndexMap::new(),
            lowlinks: IndexMap::new(),
            sccs: Vec::new(),
        };

        for &name in graph.keys() {
            if !finder.indices.contains_key(name) {
                finder.strongconnect(name);
            }
        }

        finder.sccs
    }

    fn strongconnect(&mut self, name: &'a str) {
        self.indices.insert(name, self.index);
        self.lowlinks.insert(name, self.index);
        self.index += 1;
        self.stack.push(name);
        self.on_stack.insert(name);

        if let Some(edges) = self.graph.get(name) {
            for &target in edges {
                if !self.indices.contains_key(target) {
                    self.strongconnect(target);
                    let low = self.lowlinks[target].min(self.lowlinks[name]);
                    self.lowlinks.insert(name, low);
                } else if self.on_stack.contains(target) {
                    let low = self.indices[target].min(self.lowlinks[name]);
                    self.lowlinks.insert(name, low);
                }
            }
        }

        if self.lowlinks[name] == self.indices[name] {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack.swap_remove(w);
                scc.push(w);
                if w == name {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}
