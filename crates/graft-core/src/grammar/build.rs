//! Builder API for constructing grammars in code.
//!
//! ```
//! use graft_core::grammar::{Grammar, RuleDef, lit, star};
//!
//! let g = Grammar::combined("T")
//!     .rule(RuleDef::new("a").alt([lit("x"), star([lit("y")]), lit("!")]));
//! assert_eq!(g.rules[0].to_string(), "a : 'x' 'y'* '!' ;");
//! ```

use indexmap::IndexMap;

use super::types::{Alternative, Element, Grammar, GrammarKind, Quantifier, RuleDef};

impl Grammar {
    pub fn new(name: impl Into<String>, kind: GrammarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            imports: Vec::new(),
            tokens: Vec::new(),
            options: IndexMap::new(),
            named_actions: IndexMap::new(),
            rules: Vec::new(),
        }
    }

    pub fn combined(name: impl Into<String>) -> Self {
        Self::new(name, GrammarKind::Combined)
    }

    pub fn parser(name: impl Into<String>) -> Self {
        Self::new(name, GrammarKind::Parser)
    }

    pub fn lexer(name: impl Into<String>) -> Self {
        Self::new(name, GrammarKind::Lexer)
    }

    pub fn import(mut self, name: impl Into<String>) -> Self {
        self.imports.push(name.into());
        self
    }

    pub fn tokens<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn named_action(mut self, name: impl Into<String>, payload: impl Into<String>) -> Self {
        self.named_actions.insert(name.into(), payload.into());
        self
    }

    pub fn rule(mut self, rule: RuleDef) -> Self {
        self.rules.push(rule);
        self
    }
}

impl RuleDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragment: false,
            alternatives: Vec::new(),
            init: None,
            after: None,
            commands: Vec::new(),
        }
    }

    /// Append an alternative.
    pub fn alt(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.alternatives.push(Alternative::new(elements));
        self
    }

    pub fn fragment(mut self) -> Self {
        self.fragment = true;
        self
    }

    pub fn init(mut self, payload: impl Into<String>) -> Self {
        self.init = Some(payload.into());
        self
    }

    pub fn after(mut self, payload: impl Into<String>) -> Self {
        self.after = Some(payload.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }
}

pub fn lit(value: impl Into<String>) -> Element {
    Element::Literal {
        value: value.into(),
        label: None,
    }
}

pub fn tok(name: impl Into<String>) -> Element {
    Element::Token {
        name: name.into(),
        label: None,
    }
}

pub fn rule(name: impl Into<String>) -> Element {
    Element::Rule {
        name: name.into(),
        label: None,
    }
}

pub fn range(from: char, to: char) -> Element {
    Element::Range { from, to }
}

pub fn action(payload: impl Into<String>) -> Element {
    Element::Action(payload.into())
}

fn block(elements: impl IntoIterator<Item = Element>, quantifier: Quantifier) -> Element {
    Element::Block {
        alternatives: vec![Alternative::new(elements)],
        quantifier,
    }
}

/// `( a | b | ... )` with each alternative given as an element list.
pub fn choice<A, I>(alternatives: A) -> Element
where
    A: IntoIterator<Item = I>,
    I: IntoIterator<Item = Element>,
{
    Element::Block {
        alternatives: alternatives.into_iter().map(Alternative::new).collect(),
        quantifier: Quantifier::One,
    }
}

/// Apply a quantifier to a block built with [`choice`].
pub fn quantified(element: Element, quantifier: Quantifier) -> Element {
    match element {
        Element::Block { alternatives, .. } => Element::Block {
            alternatives,
            quantifier,
        },
        other => block([other], quantifier),
    }
}

pub fn group(elements: impl IntoIterator<Item = Element>) -> Element {
    block(elements, Quantifier::One)
}

pub fn opt(elements: impl IntoIterator<Item = Element>) -> Element {
    block(elements, Quantifier::Optional)
}

pub fn star(elements: impl IntoIterator<Item = Element>) -> Element {
    block(elements, Quantifier::ZeroOrMore)
}

pub fn plus(elements: impl IntoIterator<Item = Element>) -> Element {
    block(elements, Quantifier::OneOrMore)
}
