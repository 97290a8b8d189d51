//! Structured diagnostics for call binding, and the append-only log that
//! collects them for downstream assertion and reporting.

use std::fmt;

use regex::Regex;

use crate::call::bind::BindErrors;
use crate::location::{OneIndexed, SourceLocation};

/// Category of a call-binding diagnostic.
///
/// The string forms are stable identifiers matched by external tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A required parameter was not supplied by any argument.
    MissingParameter,
    /// More positional arguments than the signature can accept.
    WrongArgCount,
    /// A keyword argument matched no parameter, or re-bound one.
    WrongKeywordArgs,
}

impl DiagnosticKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingParameter => "missing-parameter",
            Self::WrongArgCount => "wrong-arg-count",
            Self::WrongKeywordArgs => "wrong-keyword-args",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic for one analyzed call site.
///
/// Diagnostics are terminal: once created they are never mutated, only
/// collected and inspected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    location: SourceLocation,
    detail: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: SourceLocation, detail: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Human-readable description naming the involved parameters/arguments.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.location, self.kind, self.detail)
    }
}

/// An append-only log of diagnostics, ordered by insertion.
///
/// The log is the only mutable piece of the subsystem. Parallel workers
/// should each keep their own log and [`merge`](DiagnosticLog::merge)
/// afterward. Repeated analysis passes over the same call site append
/// fresh entries; nothing is deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticLog {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            kind = diagnostic.kind().as_str(),
            location = %diagnostic.location(),
            "{}",
            diagnostic.detail()
        );
        self.diagnostics.push(diagnostic);
    }

    /// Append every diagnostic of a failed bind, tagged with the call
    /// expression's location.
    pub fn report_bind_errors(&mut self, errors: BindErrors, location: SourceLocation) {
        for diagnostic in errors.into_diagnostics(location) {
            self.report(diagnostic);
        }
    }

    /// Append all entries of `other`, preserving their order.
    pub fn merge(&mut self, other: DiagnosticLog) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Iterate the diagnostics reported for the given source line.
    pub fn at_line(&self, line: OneIndexed) -> impl Iterator<Item = &Diagnostic> {
        self.iter()
            .filter(move |diagnostic| diagnostic.location().line_number() == line)
    }

    /// Whether some diagnostic at `line` has the given kind and a detail
    /// matching `pattern`.
    pub fn matches(&self, line: OneIndexed, kind: DiagnosticKind, pattern: &Regex) -> bool {
        self.at_line(line)
            .any(|diagnostic| diagnostic.kind() == kind && pattern.is_match(diagnostic.detail()))
    }

    /// Whether some diagnostic at `line` has the given kind and a detail
    /// containing `substring`.
    pub fn contains(&self, line: OneIndexed, kind: DiagnosticKind, substring: &str) -> bool {
        self.at_line(line)
            .any(|diagnostic| diagnostic.kind() == kind && diagnostic.detail().contains(substring))
    }
}

impl Extend<Diagnostic> for DiagnosticLog {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for diagnostic in iter {
            self.report(diagnostic);
        }
    }
}

impl IntoIterator for DiagnosticLog {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticLog {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
