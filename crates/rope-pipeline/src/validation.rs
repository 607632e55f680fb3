//! Blueprint validation: lint rules and diagnostics.
//!
//! The type chain between steps is advisory (the typed stub surface is where
//! it is enforced), so only arguments that can never succeed are errors.
//! Call [`validate`] for all diagnostics or [`validate_or_raise`] to fail on
//! the first `Error`-severity issue.

use std::fmt;

use rope_codegen::parse_type;

use crate::blueprint::Blueprint;
use crate::ops::OperatorKind;

// ---------------------------------------------------------------------------
// Diagnostic types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    /// Zero-based position of the offending step.
    pub step: Option<usize>,
    pub fix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        })
    }
}

// ---------------------------------------------------------------------------
// LintRule trait
// ---------------------------------------------------------------------------

pub trait LintRule: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, blueprint: &Blueprint) -> Vec<Diagnostic>;
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

struct SignatureChainRule;
impl LintRule for SignatureChainRule {
    fn name(&self) -> &str { "signature_chain" }
    fn apply(&self, blueprint: &Blueprint) -> Vec<Diagnostic> {
        let ops = blueprint.operators();
        let mut diagnostics = Vec::new();
        for (step, pair) in ops.windows(2).enumerate() {
            let (from, to) = (pair[0].descriptor(), pair[1].descriptor());
            // Registry signatures are checked at generation time.
            let (Ok(output), Ok(input)) = (parse_type(from.output), parse_type(to.input)) else {
                continue;
            };
            if !output.is_assignable_to(&input) {
                diagnostics.push(Diagnostic {
                    rule: self.name().into(),
                    severity: Severity::Warning,
                    message: format!(
                        "Step {} ({}) produces {} but step {} ({}) expects {}",
                        step,
                        pair[0],
                        from.output,
                        step + 1,
                        pair[1],
                        to.input
                    ),
                    step: Some(step + 1),
                    fix: Some(format!("Insert a coercion to {} before step {}", to.input, step + 1)),
                });
            }
        }
        diagnostics
    }
}

struct EmptyDelimiterRule;
impl LintRule for EmptyDelimiterRule {
    fn name(&self) -> &str { "empty_delimiter" }
    fn apply(&self, blueprint: &Blueprint) -> Vec<Diagnostic> {
        blueprint
            .operators()
            .iter()
            .enumerate()
            .filter(|(_, op)| matches!(op.kind(), OperatorKind::Split { delim } if delim.is_empty()))
            .map(|(step, _)| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Error,
                message: format!("Step {step} splits on an empty delimiter and always fails"),
                step: Some(step),
                fix: Some("Pass a non-empty delimiter to split".into()),
            })
            .collect()
    }
}

struct FastPathRule;
impl LintRule for FastPathRule {
    fn name(&self) -> &str { "fast_path" }
    fn apply(&self, blueprint: &Blueprint) -> Vec<Diagnostic> {
        blueprint
            .operators()
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, op)| matches!(op.kind(), OperatorKind::JsonDecode))
            .map(|(step, _)| Diagnostic {
                rule: self.name().into(),
                severity: Severity::Info,
                message: format!("JSON decode at step {step} runs on the generic path"),
                step: Some(step),
                fix: Some("Decode first to let the input be parsed directly".into()),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all built-in lint rules and return collected diagnostics.
pub fn validate(blueprint: &Blueprint) -> Vec<Diagnostic> {
    let rules: Vec<Box<dyn LintRule>> = vec![
        Box::new(SignatureChainRule),
        Box::new(EmptyDelimiterRule),
        Box::new(FastPathRule),
    ];

    let mut diagnostics = Vec::new();
    for rule in &rules {
        diagnostics.extend(rule.apply(blueprint));
    }
    diagnostics
}

/// Run all lint rules; return `Err` if any `Error`-severity diagnostic found.
pub fn validate_or_raise(blueprint: &Blueprint) -> rope_types::Result<Vec<Diagnostic>> {
    let diagnostics = validate(blueprint);
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    if !errors.is_empty() {
        let messages: Vec<_> = errors.iter().map(|d| d.message.clone()).collect();
        return Err(rope_types::RopeError::Validation(messages.join("; ")));
    }
    Ok(diagnostics)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
