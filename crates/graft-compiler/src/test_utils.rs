//! Test helpers for composition.

use graft_core::{CombinedGrammar, Grammar};

use crate::{ComposeConfig, Composition, compose_with};

/// Compose and panic with the rendered diagnostics if composition failed.
pub fn expect_valid(delegator: &Grammar, delegates: &[Grammar]) -> CombinedGrammar {
    expect_valid_with(delegator, delegates, ComposeConfig::default())
}

pub fn expect_valid_with(
    delegator: &Grammar,
    delegates: &[Grammar],
    config: ComposeConfig,
) -> CombinedGrammar {
    let composition = compose_with(delegator, delegates, config);
    match composition.grammar() {
        Some(grammar) => grammar.clone(),
        None => panic!(
            "expected valid composition, got:\n{}",
            composition.diagnostics().render()
        ),
    }
}

/// Compose, expect failure, and return the rendered diagnostics.
pub fn expect_invalid(delegator: &Grammar, delegates: &[Grammar]) -> String {
    let composition: Composition = compose_with(delegator, delegates, ComposeConfig::default());
    assert!(
        !composition.is_valid(),
        "expected composition to fail, got:\n{}",
        composition.grammar().map(|g| g.dump()).unwrap_or_default()
    );
    composition.diagnostics().render()
}

/// Compose successfully and return only the rendered warnings.
pub fn expect_warnings(delegator: &Grammar, delegates: &[Grammar]) -> String {
    let composition = compose_with(delegator, delegates, ComposeConfig::default());
    assert!(
        composition.is_valid(),
        "expected valid composition, got:\n{}",
        composition.diagnostics().render()
    );
    composition.diagnostics().render()
}
