//! JSON interchange for grammar models.
//!
//! Element nodes use an internally tagged `type` field, the same shape
//! tree-sitter uses for `grammar.json`:
//!
//! ```json
//! { "type": "BLOCK", "quantifier": "*", "alternatives": [[{ "type": "LITERAL", "value": "y" }]] }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{Alternative, Element, Grammar, GrammarKind, Quantifier, RuleDef};

/// Error while reading a grammar or combined grammar artifact.
#[derive(Debug)]
pub enum GrammarError {
    Json(serde_json::Error),
    Binary(postcard::Error),
}

impl std::fmt::Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Binary(e) => write!(f, "binary decode error: {e}"),
        }
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Binary(e) => Some(e),
        }
    }
}

impl Grammar {
    /// Parse a grammar model from JSON.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(json).map_err(GrammarError::Json)?;
        Ok(raw.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Combined,
    Parser,
    Lexer,
}

#[derive(Debug, Deserialize)]
struct RawGrammar {
    name: String,
    #[serde(default = "default_kind")]
    kind: RawKind,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    tokens: Vec<String>,
    #[serde(default)]
    options: IndexMap<String, String>,
    #[serde(default)]
    actions: IndexMap<String, String>,
    /// Rule name to rule body; map order is definition order.
    rules: IndexMap<String, RawRule>,
}

fn default_kind() -> RawKind {
    RawKind::Combined
}

/// A rule is either a bare list of alternatives or an object with modifiers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRule {
    Alternatives(Vec<Vec<RawElement>>),
    Full {
        #[serde(default)]
        fragment: bool,
        alternatives: Vec<Vec<RawElement>>,
        #[serde(default)]
        init: Option<String>,
        #[serde(default)]
        after: Option<String>,
        #[serde(default)]
        commands: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms)]
enum RawElement {
    LITERAL {
        value: String,
        #[serde(default)]
        label: Option<String>,
    },
    TOKEN {
        name: String,
        #[serde(default)]
        label: Option<String>,
    },
    RULE {
        name: String,
        #[serde(default)]
        label: Option<String>,
    },
    BLOCK {
        alternatives: Vec<Vec<RawElement>>,
        #[serde(default)]
        quantifier: RawQuantifier,
    },
    RANGE {
        from: char,
        to: char,
    },
    ACTION {
        value: String,
    },
}

#[derive(Debug, Default, Deserialize)]
enum RawQuantifier {
    #[default]
    #[serde(rename = "")]
    One,
    #[serde(rename = "?")]
    Optional,
    #[serde(rename = "*")]
    ZeroOrMore,
    #[serde(rename = "+")]
    OneOrMore,
}

impl From<RawGrammar> for Grammar {
    fn from(raw: RawGrammar) -> Self {
        let kind = match raw.kind {
            RawKind::Combined => GrammarKind::Combined,
            RawKind::Parser => GrammarKind::Parser,
            RawKind::Lexer => GrammarKind::Lexer,
        };
        Self {
            name: raw.name,
            kind,
            imports: raw.imports,
            tokens: raw.tokens,
            options: raw.options,
            named_actions: raw.actions,
            rules: raw
                .rules
                .into_iter()
                .map(|(name, rule)| convert_rule(name, rule))
                .collect(),
        }
    }
}

fn convert_rule(name: String, raw: RawRule) -> RuleDef {
    match raw {
        RawRule::Alternatives(alts) => RuleDef {
            name,
            fragment: false,
            alternatives: convert_alts(alts),
            init: None,
            after: None,
            commands: Vec::new(),
        },
        RawRule::Full {
            fragment,
            alternatives,
            init,
            after,
            commands,
        } => RuleDef {
            name,
            fragment,
            alternatives: convert_alts(alternatives),
            init,
            after,
            commands,
        },
    }
}

fn convert_alts(alts: Vec<Vec<RawElement>>) -> Vec<Alternative> {
    alts.into_iter()
        .map(|elements| Alternative::new(elements.into_iter().map(Into::into)))
        .collect()
}

impl From<RawElement> for Element {
    fn from(raw: RawElement) -> Self {
        match raw {
            RawElement::LITERAL { value, label } => Element::Literal { value, label },
            RawElement::TOKEN { name, label } => Element::Token { name, label },
            RawElement::RULE { name, label } => Element::Rule { name, label },
            RawElement::BLOCK {
                alternatives,
                quantifier,
            } => Element::Block {
                alternatives: convert_alts(alternatives),
                quantifier: match quantifier {
                    RawQuantifier::One => Quantifier::One,
                    RawQuantifier::Optional => Quantifier::Optional,
                    RawQuantifier::ZeroOrMore => Quantifier::ZeroOrMore,
                    RawQuantifier::OneOrMore => Quantifier::OneOrMore,
                },
            },
            RawElement::RANGE { from, to } => Element::Range { from, to },
            RawElement::ACTION { value } => Element::Action(value),
        }
    }
}
