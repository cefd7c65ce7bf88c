//! Import flattening.
//!
//! Walks the import graph depth-first, left to right, and produces the
//! priority-ordered source list: delegator first, then every transitive
//! delegate exactly once.

use indexmap::{IndexMap, IndexSet};

use graft_core::Grammar;

use super::config::ImportOrder;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};

/// Grammars available for import, keyed by name.
pub(crate) type GrammarPool<'g> = IndexMap<&'g str, &'g Grammar>;

pub(crate) fn flatten_imports<'g>(
    root: &'g Grammar,
    pool: &GrammarPool<'g>,
    order: ImportOrder,
    diag: &mut Diagnostics,
) -> Vec<&'g Grammar> {
    let mut flattener = Flattener {
        pool,
        order,
        diag,
        visited: IndexSet::new(),
        sources: vec![root],
    };
    flattener.visited.insert(root.name.as_str());
    flattener.visit(root);
    flattener.sources
}

struct Flattener<'g, 'p, 'd> {
    pool: &'p GrammarPool<'g>,
    order: ImportOrder,
    diag: &'d mut Diagnostics,
    /// Grammar names already placed (or being placed); later occurrences are ignored.
    visited: IndexSet<&'g str>,
    sources: Vec<&'g Grammar>,
}

impl<'g> Flattener<'g, '_, '_> {
    fn visit(&mut self, importer: &'g Grammar) {
        for name in &importer.imports {
            if self.visited.contains(name.as_str()) {
                log::debug!("import `{name}` from `{}` already merged", importer.name);
                continue;
            }

            let Some(&delegate) = self.pool.get(name.as_str()) else {
                self.diag
                    .report(DiagnosticKind::ImportNotFound, Location::grammar(&importer.name))
                    .message(name)
                    .emit();
                continue;
            };

            if !importer.kind.can_import(delegate.kind) {
                self.diag
                    .report(DiagnosticKind::IncompatibleImport, Location::grammar(&importer.name))
                    .message(format!(
                        "{} grammar `{}` cannot import {} grammar `{}`",
                        importer.kind, importer.name, delegate.kind, delegate.name
                    ))
                    .emit();
                continue;
            }

            self.visited.insert(delegate.name.as_str());
            match self.order {
                ImportOrder::PostOrder => {
                    self.visit(delegate);
                    self.sources.push(delegate);
                }
                ImportOrder::PreOrder => {
                    self.sources.push(delegate);
                    self.visit(delegate);
                }
            }
            log::debug!("imported `{}` into `{}`", delegate.name, importer.name);
        }
    }
}
