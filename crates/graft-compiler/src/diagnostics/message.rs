/// Composition diagnostic kinds ordered by priority (highest priority first).
///
/// Import problems come first because a missing or incompatible delegate
/// makes every later complaint about its rules noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Import graph
    ImportNotFound,
    IncompatibleImport,

    // Rule set
    DuplicateRule,
    ParserRuleInLexer,
    LexerRuleInParser,

    // Token numbering
    ConflictingLiteralTypes,
    LiteralWithoutToken,

    // References and rule shape
    UndefinedRule,
    UndefinedToken,
    LeftRecursion,
    EpsilonClosure,

    // Warnings
    ImplicitTokenDefinition,
    OptionsIgnoredInImport,
    UnreachableDelegate,
}

impl DiagnosticKind {
    /// Default severity for this kind. Can be overridden by policy.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::ImplicitTokenDefinition
            | Self::OptionsIgnoredInImport
            | Self::UnreachableDelegate => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Default hint for this kind, automatically included in diagnostics.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::LeftRecursion => Some("rewrite the rule so input is consumed before recursing"),
            Self::EpsilonClosure => Some("the loop body must consume at least one token"),
            Self::ImplicitTokenDefinition => {
                Some("declare it in `tokens { ... }` or define a lexer rule")
            }
            Self::LiteralWithoutToken => Some("define a lexer rule matching the literal"),
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::ImportNotFound => "imported grammar not found",
            Self::IncompatibleImport => "incompatible grammar import",
            Self::DuplicateRule => "rule defined twice",
            Self::ParserRuleInLexer => "parser rule in lexer grammar",
            Self::LexerRuleInParser => "lexer rule in parser grammar",
            Self::ConflictingLiteralTypes => "literal bound to conflicting token types",
            Self::LiteralWithoutToken => "literal has no token definition",
            Self::UndefinedRule => "undefined rule",
            Self::UndefinedToken => "undefined token",
            Self::LeftRecursion => "left recursion",
            Self::EpsilonClosure => "loop body can match the empty string",
            Self::ImplicitTokenDefinition => "implicit token definition",
            Self::OptionsIgnoredInImport => "options ignored in imported grammar",
            Self::UnreachableDelegate => "grammar is never imported",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::ImportNotFound => "imported grammar `{}` not found".to_string(),
            Self::DuplicateRule => "rule `{}` is already defined in this grammar".to_string(),
            Self::UndefinedRule => "rule `{}` is not defined".to_string(),
            Self::UndefinedToken => "token `{}` is not defined".to_string(),
            Self::LiteralWithoutToken => {
                "literal {} has no token definition in a non-combined grammar".to_string()
            }
            Self::ImplicitTokenDefinition => {
                "implicit token definition `{}` in parser rule".to_string()
            }
            Self::UnreachableDelegate => "grammar `{}` is never imported".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Where a diagnostic points: a grammar, optionally narrowed to one rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub grammar: String,
    pub rule: Option<String>,
}

impl Location {
    pub fn grammar(grammar: impl Into<String>) -> Self {
        Self {
            grammar: grammar.into(),
            rule: None,
        }
    }

    pub fn rule(grammar: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            grammar: grammar.into(),
            rule: Some(rule.into()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rule {
            Some(rule) => write!(f, "{}::{rule}", self.grammar),
            None => write!(f, "{}", self.grammar),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) location: Location,
    pub(crate) severity: Severity,
    pub(crate) message: String,
    pub(crate) related: Vec<(Location, String)>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind, location: Location) -> Self {
        Self {
            kind,
            location,
            severity: kind.default_severity(),
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
            hints: kind.default_hint().map(String::from).into_iter().collect(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.location)
    }
}
