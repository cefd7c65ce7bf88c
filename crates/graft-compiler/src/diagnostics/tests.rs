use super::*;

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::IncompatibleImport, Location::grammar("M"))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.render(), @r"
    error: incompatible grammar import
      --> M
    ");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedRule, Location::rule("M", "s"))
        .message("q")
        .emit();

    insta::assert_snapshot!(diagnostics.render(), @r"
    error: rule `q` is not defined
      --> M::s
    ");
}

#[test]
fn warnings_are_counted_separately() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::OptionsIgnoredInImport, Location::grammar("S"))
        .message("language")
        .emit();

    assert!(!diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 0);
    assert_eq!(diagnostics.printer().warnings(false).render(), "");
}

#[test]
fn severity_override_promotes_warning() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ImplicitTokenDefinition, Location::rule("S", "x"))
        .message("Q")
        .severity(Severity::Error)
        .emit();

    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.render(), @r"
    error: implicit token definition `Q` in parser rule
      --> S::x
    help: declare it in `tokens { ... }` or define a lexer rule
    ");
}

#[test]
fn builder_with_related_and_hint() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ConflictingLiteralTypes, Location::rule("M", "B"))
        .message("'a' is A (1) and B (2)")
        .related_to("first bound here", Location::rule("S", "A"))
        .hint("remove one of the rules")
        .emit();

    insta::assert_snapshot!(diagnostics.render(), @r"
    error: literal bound to conflicting token types: 'a' is A (1) and B (2)
      --> M::B
      = note: first bound here (S::A)
    help: remove one of the rules
    ");
}

#[test]
fn multiple_diagnostics_are_separated() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ImportNotFound, Location::grammar("M"))
        .message("Q")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnreachableDelegate, Location::grammar("R"))
        .message("R")
        .emit();

    insta::assert_snapshot!(diagnostics.render(), @r"
    error: imported grammar `Q` not found
      --> M

    warning: grammar `R` is never imported
      --> R
    ");
}

#[test]
fn colored_output_wraps_severity() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DuplicateRule, Location::rule("M", "a"))
        .message("a")
        .emit();

    let out = diagnostics.render_colored(true);
    assert!(out.starts_with("\x1b[31merror\x1b[0m: rule `a`"));
}

#[test]
fn extend_appends_in_order() {
    let mut a = Diagnostics::new();
    a.report(DiagnosticKind::DuplicateRule, Location::grammar("M")).emit();
    let mut b = Diagnostics::new();
    b.report(DiagnosticKind::LeftRecursion, Location::grammar("M")).emit();

    a.extend(b);
    assert_eq!(
        a.kinds(),
        [DiagnosticKind::DuplicateRule, DiagnosticKind::LeftRecursion]
    );
}
