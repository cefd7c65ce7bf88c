//! Composition settings.

/// Where a delegate's own imports land relative to the delegate itself
/// in the flattened source list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportOrder {
    /// A delegate's imports precede it: `M imports S, S imports U`
    /// flattens to `M, U, S`. Rules of `U` then win over same-named rules
    /// of `S`.
    #[default]
    PostOrder,
    /// An importer precedes its imports: `M, S, U`. A delegate then
    /// overrides rules of its own delegates, the way the delegator does.
    PreOrder,
}

/// How to treat a parser rule referencing a token nobody declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImplicitTokens {
    /// Define the token and warn.
    #[default]
    Warn,
    /// Define the token and report an error.
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeConfig {
    pub import_order: ImportOrder,
    pub implicit_tokens: ImplicitTokens,
}

impl ComposeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_import_order(mut self, order: ImportOrder) -> Self {
        self.import_order = order;
        self
    }

    pub fn with_implicit_tokens(mut self, policy: ImplicitTokens) -> Self {
        self.implicit_tokens = policy;
        self
    }
}
