//! Grammar composition.
//!
//! Pipeline: flatten imports → resolve rules → unify tokens → merge
//! options and named actions → validate. Every pass reports into one
//! [`Diagnostics`]; a composition with errors yields no combined grammar.

mod config;
mod imports;
mod rules;
mod tokens;
mod validate;

#[cfg(test)]
mod imports_tests;

use indexmap::IndexMap;

use graft_core::{CombinedGrammar, Grammar};

pub use config::{ComposeConfig, ImplicitTokens, ImportOrder};

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use crate::{Error, PassResult};
use imports::GrammarPool;

/// Result of one composition run.
#[derive(Debug, Clone)]
pub struct Composition {
    grammar: Option<CombinedGrammar>,
    diagnostics: Diagnostics,
}

impl Composition {
    /// The combined grammar, present only when no error was reported.
    pub fn grammar(&self) -> Option<&CombinedGrammar> {
        self.grammar.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn is_valid(&self) -> bool {
        self.grammar.is_some()
    }

    pub fn into_result(self) -> PassResult<CombinedGrammar> {
        match self.grammar {
            Some(grammar) => Ok((grammar, self.diagnostics)),
            None => Err(Error::CompositionFailed(self.diagnostics)),
        }
    }
}

/// A pool of grammars that can import each other by name.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    grammars: IndexMap<String, Grammar>,
    config: ComposeConfig,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ComposeConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a grammar to the pool, replacing any grammar of the same name.
    pub fn add(&mut self, grammar: Grammar) -> &mut Self {
        self.grammars.insert(grammar.name.clone(), grammar);
        self
    }

    pub fn grammar(&self, name: &str) -> Option<&Grammar> {
        self.grammars.get(name)
    }

    /// Compose the named grammar with everything it transitively imports.
    pub fn compose(&self, root: &str) -> Result<Composition, Error> {
        let Some(root) = self.grammars.get(root) else {
            return Err(Error::UnknownGrammar(root.to_owned()));
        };
        let pool: GrammarPool<'_> = self
            .grammars
            .iter()
            .map(|(name, g)| (name.as_str(), g))
            .collect();
        Ok(run(root, &pool, self.config).0)
    }
}

/// Compose a delegator with an ordered list of delegates.
///
/// Import order comes from the grammars' own `imports` declarations;
/// `delegates` is the set those names resolve against. A delegate nobody
/// imports is reported as a warning and contributes nothing.
pub fn compose(delegator: &Grammar, delegates: &[Grammar]) -> Composition {
    compose_with(delegator, delegates, ComposeConfig::default())
}

pub fn compose_with(delegator: &Grammar, delegates: &[Grammar], config: ComposeConfig) -> Composition {
    let pool: GrammarPool<'_> = delegates.iter().map(|g| (g.name.as_str(), g)).collect();
    let (mut composition, reached) = run(delegator, &pool, config);

    for delegate in delegates {
        if !reached.contains(&delegate.name.as_str()) {
            composition
                .diagnostics
                .report(DiagnosticKind::UnreachableDelegate, Location::grammar(&delegate.name))
                .message(&delegate.name)
                .emit();
        }
    }
    composition
}

/// Returns the composition and the names of the grammars it drew from.
fn run<'g>(
    root: &'g Grammar,
    pool: &GrammarPool<'g>,
    config: ComposeConfig,
) -> (Composition, Vec<&'g str>) {
    let mut diag = Diagnostics::new();

    let sources = imports::flatten_imports(root, pool, config.import_order, &mut diag);
    let reached: Vec<&'g str> = sources.iter().map(|g| g.name.as_str()).collect();
    log::debug!(
        "composing `{}` from [{}]",
        root.name,
        reached.join(", ")
    );

    let rules = rules::resolve_rules(&sources, &mut diag);
    let vocabulary =
        tokens::assign_token_types(&sources, &rules, root.kind, config.implicit_tokens, &mut diag);
    let named_actions = merge_named_actions(&sources);
    check_delegate_options(&sources, &mut diag);
    validate::validate_rules(&rules, &mut diag);

    if diag.has_errors() {
        let failed = Composition {
            grammar: None,
            diagnostics: diag,
        };
        return (failed, reached);
    }

    let grammar = CombinedGrammar {
        name: root.name.clone(),
        kind: root.kind,
        sources: sources.iter().map(|g| g.name.clone()).collect(),
        rules,
        vocabulary,
        options: root.options.clone(),
        named_actions,
    };
    let composition = Composition {
        grammar: Some(grammar),
        diagnostics: diag,
    };
    (composition, reached)
}

/// Same-named actions are concatenated in priority order, one per line.
fn merge_named_actions(sources: &[&Grammar]) -> IndexMap<String, String> {
    let mut merged: IndexMap<String, String> = IndexMap::new();
    for grammar in sources {
        for (name, payload) in &grammar.named_actions {
            match merged.get_mut(name) {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(payload);
                }
                None => {
                    merged.insert(name.clone(), payload.clone());
                }
            }
        }
    }
    merged
}

/// Delegate options never apply to the combined grammar. An empty block is
/// silently accepted.
fn check_delegate_options(sources: &[&Grammar], diag: &mut Diagnostics) {
    for delegate in sources.iter().skip(1) {
        if delegate.options.is_empty() {
            continue;
        }
        let keys: Vec<&str> = delegate.options.keys().map(String::as_str).collect();
        diag.report(
            DiagnosticKind::OptionsIgnoredInImport,
            Location::grammar(&delegate.name),
        )
        .message(keys.join(", "))
        .emit();
    }
}
