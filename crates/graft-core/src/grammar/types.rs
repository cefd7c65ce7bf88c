//! Grammar type definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a grammar file is allowed to define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrammarKind {
    /// Parser and lexer rules together.
    Combined,
    /// Parser rules only.
    Parser,
    /// Lexer rules only.
    Lexer,
}

impl GrammarKind {
    /// Whether a grammar of this kind may import a grammar of `other` kind.
    ///
    /// Combined grammars import anything; parser and lexer grammars only
    /// import their own kind.
    pub fn can_import(self, other: GrammarKind) -> bool {
        match self {
            Self::Combined => true,
            Self::Parser => other == Self::Parser,
            Self::Lexer => other == Self::Lexer,
        }
    }

    pub fn allows_parser_rules(self) -> bool {
        self != Self::Lexer
    }

    pub fn allows_lexer_rules(self) -> bool {
        self != Self::Parser
    }
}

impl std::fmt::Display for GrammarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Combined => write!(f, "combined"),
            Self::Parser => write!(f, "parser"),
            Self::Lexer => write!(f, "lexer"),
        }
    }
}

/// One grammar file, already parsed from source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar identifier, also the key other grammars import it by.
    pub name: String,
    pub kind: GrammarKind,
    /// Imported grammar identifiers, in declared order.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Names declared in a `tokens { ... }` block.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// The `options { ... }` block. Empty when absent.
    #[serde(default)]
    pub options: IndexMap<String, String>,
    /// Named actions (`@members`, `@header`, ...) as opaque payloads.
    #[serde(default)]
    pub named_actions: IndexMap<String, String>,
    /// Rules in definition order.
    pub rules: Vec<RuleDef>,
}

impl Grammar {
    pub fn find_rule(&self, name: &str) -> Option<&RuleDef> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn parser_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.iter().filter(|r| !r.is_lexer_rule())
    }

    pub fn lexer_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.iter().filter(|r| r.is_lexer_rule())
    }
}

/// A parser or lexer rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    /// Lexer-only helper, never promoted to a token.
    #[serde(default)]
    pub fragment: bool,
    pub alternatives: Vec<Alternative>,
    /// `@init` payload, fired on rule entry.
    #[serde(default)]
    pub init: Option<String>,
    /// `@after` payload, fired on successful rule exit.
    #[serde(default)]
    pub after: Option<String>,
    /// Lexer commands (`skip`, `channel(HIDDEN)`, ...).
    #[serde(default)]
    pub commands: Vec<String>,
}

impl RuleDef {
    /// Lexer rules are named with an upper-case initial.
    pub fn is_lexer_rule(&self) -> bool {
        is_token_name(&self.name)
    }

    pub fn has_command(&self, command: &str) -> bool {
        self.commands.iter().any(|c| c == command)
    }

    /// The literal this lexer rule matches, if its whole body is one literal.
    ///
    /// Actions around the literal are ignored, so `B : 'b' {...} ;` still
    /// aliases `'b'`.
    pub fn sole_literal(&self) -> Option<&str> {
        let [alt] = self.alternatives.as_slice() else {
            return None;
        };
        let mut found = None;
        for element in &alt.elements {
            match element {
                Element::Action(_) => {}
                Element::Literal { value, .. } if found.is_none() => found = Some(value.as_str()),
                _ => return None,
            }
        }
        found
    }

    /// Visit every element of every alternative, nested blocks included.
    pub fn walk<'a>(&'a self, mut f: impl FnMut(&'a Element)) {
        for alt in &self.alternatives {
            for element in &alt.elements {
                element.walk(&mut f);
            }
        }
    }
}

/// Upper-case initial marks a token (lexer rule) name.
pub fn is_token_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// An ordered sequence of elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub elements: Vec<Element>,
}

impl Alternative {
    pub fn new(elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// How many times a block may match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    #[default]
    One,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Quantifier {
    pub fn is_loop(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    /// Whether the block may match nothing at all.
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::One => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

/// Rule body element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    /// Quoted literal such as `'x'`.
    Literal {
        value: String,
        label: Option<String>,
    },
    /// Token reference (`ID`), or a lexer-rule reference inside a lexer rule.
    Token { name: String, label: Option<String> },
    /// Parser rule reference.
    Rule { name: String, label: Option<String> },
    /// Parenthesized sub-alternatives with a quantifier.
    Block {
        alternatives: Vec<Alternative>,
        quantifier: Quantifier,
    },
    /// Lexer character range `'a'..'z'`.
    Range { from: char, to: char },
    /// Embedded action, never interpreted.
    Action(String),
}

impl Element {
    /// Attach a `label=` binding. Only references and literals carry labels.
    pub fn labeled(self, label: impl Into<String>) -> Self {
        let label = Some(label.into());
        match self {
            Self::Literal { value, .. } => Self::Literal { value, label },
            Self::Token { name, .. } => Self::Token { name, label },
            Self::Rule { name, .. } => Self::Rule { name, label },
            other => other,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Literal { label, .. } | Self::Token { label, .. } | Self::Rule { label, .. } => {
                label.as_deref()
            }
            _ => None,
        }
    }

    /// Visit this element and every element nested in its blocks.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        if let Self::Block { alternatives, .. } = self {
            for alt in alternatives {
                for element in &alt.elements {
                    element.walk(f);
                }
            }
        }
    }
}

// ============================================================================
// Display: grammar notation
// ============================================================================

/// Quote a literal the way grammar source and diagnostics show it.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn write_label(f: &mut std::fmt::Formatter<'_>, label: &Option<String>) -> std::fmt::Result {
    match label {
        Some(label) => write!(f, "{label}="),
        None => Ok(()),
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal { value, label } => {
                write_label(f, label)?;
                f.write_str(&quote_literal(value))
            }
            Self::Token { name, label } | Self::Rule { name, label } => {
                write_label(f, label)?;
                f.write_str(name)
            }
            Self::Block {
                alternatives,
                quantifier,
            } => {
                // A single plain element needs no parentheses: `'y'*`.
                if let [alt] = alternatives.as_slice()
                    && let [element] = alt.elements.as_slice()
                    && !matches!(element, Element::Block { .. } | Element::Action(_))
                    && *quantifier != Quantifier::One
                {
                    return write!(f, "{element}{}", quantifier.suffix());
                }
                f.write_str("(")?;
                write_alternatives(f, alternatives)?;
                write!(f, "){}", quantifier.suffix())
            }
            Self::Range { from, to } => write!(
                f,
                "{}..{}",
                quote_literal(&from.to_string()),
                quote_literal(&to.to_string())
            ),
            Self::Action(payload) => write!(f, "{{{payload}}}"),
        }
    }
}

impl std::fmt::Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

fn write_alternatives(f: &mut std::fmt::Formatter<'_>, alts: &[Alternative]) -> std::fmt::Result {
    for (i, alt) in alts.iter().enumerate() {
        if i > 0 {
            f.write_str(" | ")?;
        }
        write!(f, "{alt}")?;
    }
    Ok(())
}

impl std::fmt::Display for RuleDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fragment {
            f.write_str("fragment ")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(init) = &self.init {
            write!(f, " @init {{{init}}}")?;
        }
        if let Some(after) = &self.after {
            write!(f, " @after {{{after}}}")?;
        }
        f.write_str(" : ")?;
        write_alternatives(f, &self.alternatives)?;
        if !self.commands.is_empty() {
            write!(f, " -> {}", self.commands.join(", "))?;
        }
        f.write_str(" ;")
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            GrammarKind::Combined => writeln!(f, "grammar {};", self.name)?,
            kind => writeln!(f, "{kind} grammar {};", self.name)?,
        }
        if !self.options.is_empty() {
            f.write_str("options {")?;
            for (key, value) in &self.options {
                write!(f, " {key}={value};")?;
            }
            f.write_str(" }\n")?;
        }
        if !self.imports.is_empty() {
            writeln!(f, "import {};", self.imports.join(", "))?;
        }
        if !self.tokens.is_empty() {
            writeln!(f, "tokens {{ {} }}", self.tokens.join(", "))?;
        }
        for (name, payload) in &self.named_actions {
            writeln!(f, "@{name} {{{payload}}}")?;
        }
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
