//! Binding a call site against a signature.
//!
//! [`bind`] is a pure function: identical inputs always produce identical
//! results, and no state is retained between invocations. A call either
//! binds fully or fails with every diagnostic computed for it.

use std::fmt;

use smallvec::SmallVec;

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::location::SourceLocation;
use crate::name::Name;
use crate::signatures::{ParameterKind, Signature};

use super::argument_matcher::ArgumentMatcher;
use super::arguments::{ArgumentKind, CallArguments};

/// The value resolved for one parameter by a successful bind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundValue<V> {
    /// A single argument was supplied for the parameter.
    Argument(V),
    /// No argument was supplied; the parameter's declared default applies.
    Default,
    /// Positional arguments absorbed by the variadic sink, in call order.
    Variadic(Vec<V>),
    /// Keyword arguments absorbed by the keyword-variadic sink, in call order.
    Keywords(Vec<(Name, V)>),
}

/// The resolved values of every parameter after a successful bind, in
/// declaration order. Variadic sinks are always present, bound to an empty
/// sequence/mapping if nothing was absorbed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundArguments<V> {
    values: Vec<(Name, BoundValue<V>)>,
}

impl<V> BoundArguments<V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value bound to the parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&BoundValue<V>> {
        self.values
            .iter()
            .find_map(|(parameter, value)| (*parameter == name).then_some(value))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Name, BoundValue<V>)> {
        self.values.iter()
    }
}

impl<'a, V> IntoIterator for &'a BoundArguments<V> {
    type Item = &'a (Name, BoundValue<V>);
    type IntoIter = std::slice::Iter<'a, (Name, BoundValue<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Why a call failed to bind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindError {
    /// More positional arguments are provided in the call than can be
    /// handled by the signature.
    TooManyPositionalArguments { expected: usize, provided: usize },
    /// Multiple arguments were provided for a single parameter.
    ParameterAlreadyAssigned { parameter: Name },
    /// Keyword arguments that can't be matched to any parameter.
    UnknownArguments { names: Vec<Name> },
    /// One or more required parameters (that is, with no default) is not
    /// supplied by any argument.
    MissingParameters { names: Vec<Name> },
}

impl BindError {
    /// The diagnostic category this error is reported under.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::TooManyPositionalArguments { .. } => DiagnosticKind::WrongArgCount,
            Self::ParameterAlreadyAssigned { .. } | Self::UnknownArguments { .. } => {
                DiagnosticKind::WrongKeywordArgs
            }
            Self::MissingParameters { .. } => DiagnosticKind::MissingParameter,
        }
    }

    /// Convert into a [`Diagnostic`] at the call expression's location.
    pub fn into_diagnostic(self, location: SourceLocation) -> Diagnostic {
        Diagnostic::new(self.kind(), location, self.to_string())
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[Name]) -> fmt::Result {
    let mut iter = names.iter();
    if let Some(first) = iter.next() {
        write!(f, "`{first}`")?;
        for name in iter {
            write!(f, ", `{name}`")?;
        }
    }
    Ok(())
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyPositionalArguments { expected, provided } => write!(
                f,
                "Too many positional arguments: expected {expected}, got {provided}"
            ),
            Self::ParameterAlreadyAssigned { parameter } => {
                write!(f, "Multiple values provided for parameter `{parameter}`")
            }
            Self::UnknownArguments { names } => {
                let s = if names.len() == 1 { "" } else { "s" };
                write!(f, "Argument{s} ")?;
                write_names(f, names)?;
                write!(
                    f,
                    " do{es} not match any known parameter",
                    es = if names.len() == 1 { "es" } else { "" }
                )
            }
            Self::MissingParameters { names } => {
                let s = if names.len() == 1 { "" } else { "s" };
                write!(f, "No argument{s} provided for required parameter{s} ")?;
                write_names(f, names)
            }
        }
    }
}

/// The errors of one failed bind, ordered wrong-arg-count →
/// wrong-keyword-args → missing-parameter. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindErrors(SmallVec<[BindError; 4]>);

impl BindErrors {
    pub(crate) fn new(errors: SmallVec<[BindError; 4]>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BindError> {
        self.0.iter()
    }

    /// Convert every error into a [`Diagnostic`] at the call expression's
    /// location, preserving order.
    pub fn into_diagnostics(self, location: SourceLocation) -> Vec<Diagnostic> {
        self.0
            .into_iter()
            .map(|error| error.into_diagnostic(location))
            .collect()
    }
}

impl fmt::Display for BindErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();
        if let Some(first) = iter.next() {
            write!(f, "{first}")?;
            for error in iter {
                write!(f, "; {error}")?;
            }
        }
        Ok(())
    }
}

impl IntoIterator for BindErrors {
    type Item = BindError;
    type IntoIter = smallvec::IntoIter<[BindError; 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BindErrors {
    type Item = &'a BindError;
    type IntoIter = std::slice::Iter<'a, BindError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outcome of binding one call site against a signature.
pub type BindingResult<V> = Result<BoundArguments<V>, BindErrors>;

/// Bind `arguments` against `signature`.
///
/// On success, every declared parameter resolves to a [`BoundValue`]; on
/// failure, all diagnostics for the call are returned together. The call
/// never partially succeeds.
pub fn bind<V: Clone>(signature: &Signature, arguments: &CallArguments<V>) -> BindingResult<V> {
    let parameters = signature.parameters();

    let matcher = ArgumentMatcher::new(arguments.len(), parameters);
    let (argument_parameters, errors) = matcher.match_arguments(arguments);

    if !errors.is_empty() {
        tracing::debug!(
            "call binding against {signature} failed with {} error(s)",
            errors.len()
        );
        return Err(BindErrors::new(errors));
    }

    let mut values: Vec<(Name, BoundValue<V>)> = parameters
        .iter()
        .map(|parameter| {
            let unbound = match parameter.kind() {
                ParameterKind::Variadic => BoundValue::Variadic(Vec::new()),
                ParameterKind::KeywordVariadic => BoundValue::Keywords(Vec::new()),
                _ => BoundValue::Default,
            };
            (parameter.name().clone(), unbound)
        })
        .collect();

    for (argument, parameter_index) in arguments.iter().zip(&argument_parameters) {
        let Some(parameter_index) = parameter_index else {
            continue;
        };
        let slot = &mut values[*parameter_index].1;
        match (slot, argument.kind()) {
            (BoundValue::Variadic(absorbed), _) => absorbed.push(argument.value().clone()),
            (BoundValue::Keywords(absorbed), ArgumentKind::Keyword(name)) => {
                absorbed.push((name.clone(), argument.value().clone()));
            }
            (slot, _) => *slot = BoundValue::Argument(argument.value().clone()),
        }
    }

    Ok(BoundArguments { values })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use crate::diagnostic::DiagnosticKind;
    use crate::signatures::{Parameter, Signature};

    use super::*;

    fn signature(parameters: impl IntoIterator<Item = Parameter>) -> Signature {
        Signature::new(parameters, None).unwrap()
    }

    fn x_y() -> Signature {
        signature([
            Parameter::positional_or_keyword("x"),
            Parameter::positional_or_keyword("y"),
        ])
    }

    #[test]
    fn exact_positional_arity_binds() {
        let bound = bind(&x_y(), &CallArguments::positional([1, 2])).unwrap();

        assert_eq!(bound.get("x"), Some(&BoundValue::Argument(1)));
        assert_eq!(bound.get("y"), Some(&BoundValue::Argument(2)));
    }

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(3)]
    fn defaults_accept_lower_arity(count: usize) {
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::positional_or_keyword("y").with_default(),
            Parameter::positional_or_keyword("z").with_default(),
        ]);
        let arguments = CallArguments::positional((0..count).map(|value| value as i64));

        let bound = bind(&sig, &arguments).unwrap();
        assert_eq!(bound.len(), 3);
    }

    #[test]
    fn unsupplied_default_resolves_to_default_marker() {
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::positional_or_keyword("y").with_default(),
        ]);

        let bound = bind(&sig, &CallArguments::positional([1])).unwrap();
        assert_eq!(bound.get("y"), Some(&BoundValue::Default));
    }

    #[test]
    fn missing_required_parameter() {
        let errors = bind(&x_y(), &CallArguments::positional([1])).unwrap_err();

        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.kind(), DiagnosticKind::MissingParameter);
        assert_eq!(
            error.to_string(),
            "No argument provided for required parameter `y`"
        );
    }

    #[test]
    fn multiple_missing_parameters_aggregated() {
        let errors = bind(&x_y(), &CallArguments::<i64>::none()).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.iter().next().unwrap().to_string(),
            "No arguments provided for required parameters `x`, `y`"
        );
    }

    #[test]
    fn excess_positional_arguments() {
        let errors = bind(&x_y(), &CallArguments::positional([1, 2, 3])).unwrap_err();

        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.kind(), DiagnosticKind::WrongArgCount);
        assert_eq!(
            error.to_string(),
            "Too many positional arguments: expected 2, got 3"
        );
    }

    #[test]
    fn keyword_binds_unfilled_parameter() {
        let bound = bind(
            &x_y(),
            &CallArguments::positional([1]).with_keyword("y", 2),
        )
        .unwrap();

        assert_eq!(bound.get("y"), Some(&BoundValue::Argument(2)));
    }

    #[test]
    fn keyword_duplicates_positional_binding() {
        let errors = bind(
            &x_y(),
            &CallArguments::positional([1, 2]).with_keyword("x", 3),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.kind(), DiagnosticKind::WrongKeywordArgs);
        assert_eq!(
            error.to_string(),
            "Multiple values provided for parameter `x`"
        );
    }

    #[test]
    fn unknown_keyword_without_sink() {
        let errors = bind(
            &x_y(),
            &CallArguments::positional([1, 2]).with_keyword("z", 3),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.kind(), DiagnosticKind::WrongKeywordArgs);
        assert_eq!(
            error.to_string(),
            "Argument `z` does not match any known parameter"
        );
    }

    #[test]
    fn unknown_keywords_aggregated() {
        let errors = bind(
            &x_y(),
            &CallArguments::positional([1, 2])
                .with_keyword("a", 3)
                .with_keyword("b", 4),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.iter().next().unwrap().to_string(),
            "Arguments `a`, `b` do not match any known parameter"
        );
    }

    #[test]
    fn keyword_naming_positional_only_parameter_is_unknown() {
        let sig = signature([
            Parameter::positional_only("x"),
            Parameter::positional_or_keyword("y"),
        ]);
        let errors = bind(
            &sig,
            &CallArguments::positional([1]).with_keyword("x", 2),
        )
        .unwrap_err();

        // The keyword can't address `x`, and `y` stays unbound.
        let kinds: Vec<_> = errors.iter().map(BindError::kind).collect();
        assert_eq!(
            kinds,
            [
                DiagnosticKind::WrongKeywordArgs,
                DiagnosticKind::MissingParameter
            ]
        );
    }

    #[test]
    fn variadic_absorbs_excess_positionals() {
        let sig = signature([
            Parameter::variadic("args"),
            Parameter::keyword_only("z"),
        ]);
        let bound = bind(
            &sig,
            &CallArguments::positional([1, 2]).with_keyword("z", 3),
        )
        .unwrap();

        assert_eq!(bound.get("args"), Some(&BoundValue::Variadic(vec![1, 2])));
        assert_eq!(bound.get("z"), Some(&BoundValue::Argument(3)));
    }

    #[test]
    fn variadic_absorption_does_not_satisfy_keyword_only() {
        let sig = signature([
            Parameter::variadic("args"),
            Parameter::keyword_only("z"),
        ]);
        let errors = bind(&sig, &CallArguments::positional([1, 2, 3])).unwrap_err();

        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.kind(), DiagnosticKind::MissingParameter);
        assert_eq!(
            error.to_string(),
            "No argument provided for required parameter `z`"
        );
    }

    #[test]
    fn empty_sinks_are_bound() {
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::variadic("args"),
            Parameter::keyword_variadic("kwargs"),
        ]);
        let bound = bind(&sig, &CallArguments::positional([1])).unwrap();

        assert_eq!(bound.get("args"), Some(&BoundValue::Variadic(vec![])));
        assert_eq!(bound.get("kwargs"), Some(&BoundValue::Keywords(vec![])));
    }

    #[test]
    fn keyword_sink_absorbs_unknown_keywords() {
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::keyword_variadic("kwargs"),
        ]);
        let bound = bind(
            &sig,
            &CallArguments::positional([1])
                .with_keyword("a", 2)
                .with_keyword("b", 3),
        )
        .unwrap();

        assert_eq!(
            bound.get("kwargs"),
            Some(&BoundValue::Keywords(vec![
                (Name::new("a"), 2),
                (Name::new("b"), 3)
            ]))
        );
    }

    #[test]
    fn error_kinds_are_ordered() {
        // Excess positionals, an unknown keyword, and a missing keyword-only
        // parameter in one call: the kinds must come out in the fixed order
        // regardless of discovery order.
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::keyword_only("z"),
        ]);
        let errors = bind(
            &sig,
            &CallArguments::positional([1, 2]).with_keyword("w", 3),
        )
        .unwrap_err();

        let kinds: Vec<_> = errors.iter().map(BindError::kind).collect();
        assert_eq!(
            kinds,
            [
                DiagnosticKind::WrongArgCount,
                DiagnosticKind::WrongKeywordArgs,
                DiagnosticKind::MissingParameter
            ]
        );
    }

    #[test]
    fn binding_is_idempotent() {
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::variadic("args"),
            Parameter::keyword_only("z"),
        ]);
        let arguments = CallArguments::positional([1, 2, 3]).with_keyword("z", 4);

        assert_eq!(bind(&sig, &arguments), bind(&sig, &arguments));

        let failing = CallArguments::positional([1, 2]);
        assert_eq!(bind(&sig, &failing), bind(&sig, &failing));
    }

    #[test]
    fn signature_is_shareable_across_threads() {
        let sig = x_y();
        let expected = bind(&sig, &CallArguments::positional([1, 2]));

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| bind(&sig, &CallArguments::positional([1, 2]))))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
