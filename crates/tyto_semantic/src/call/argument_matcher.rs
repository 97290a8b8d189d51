//! This module handles the logic for matching call-site arguments to
//! target function parameters.

use smallvec::SmallVec;

use crate::name::Name;
use crate::signatures::{Parameter, Parameters};

use super::arguments::{ArgumentKind, CallArguments};
use super::bind::BindError;

/// Matches call arguments to function parameters.
pub(crate) struct ArgumentMatcher<'a> {
    parameters: &'a Parameters,
    errors: SmallVec<[BindError; 4]>,

    /// The parameter that each argument is matched with.
    argument_parameters: Vec<Option<usize>>,
    /// Whether each parameter has been matched with an argument.
    parameter_matched: Vec<bool>,
    /// Keyword names that matched no parameter, in call-site order.
    unmatched_keywords: Vec<Name>,
    next_positional: usize,
    first_excess_positional: Option<usize>,
}

impl<'a> ArgumentMatcher<'a> {
    pub(crate) fn new(argument_count: usize, parameters: &'a Parameters) -> Self {
        Self {
            parameters,
            errors: SmallVec::new(),
            argument_parameters: vec![None; argument_count],
            parameter_matched: vec![false; parameters.len()],
            unmatched_keywords: Vec::new(),
            next_positional: 0,
            first_excess_positional: None,
        }
    }

    /// Assign an argument to a parameter.
    fn assign_argument(
        &mut self,
        argument_index: usize,
        parameter_index: usize,
        parameter: &Parameter,
    ) {
        if self.parameter_matched[parameter_index]
            && !parameter.is_variadic()
            && !parameter.is_keyword_variadic()
        {
            self.errors.push(BindError::ParameterAlreadyAssigned {
                parameter: parameter.display_name(),
            });
        }
        self.argument_parameters[argument_index] = Some(parameter_index);
        self.parameter_matched[parameter_index] = true;
    }

    /// Match a positional argument to a parameter.
    fn match_positional(&mut self, argument_index: usize) {
        let parameters = self.parameters;
        let Some((parameter_index, parameter)) = parameters
            .get_positional(self.next_positional)
            .map(|parameter| (self.next_positional, parameter))
            .or_else(|| parameters.variadic())
        else {
            // Keep counting so the arity diagnostic reports the true
            // supplied count; nothing further binds positionally.
            self.first_excess_positional.get_or_insert(argument_index);
            self.next_positional += 1;
            return;
        };
        self.next_positional += 1;
        self.assign_argument(argument_index, parameter_index, parameter);
    }

    /// Match a keyword argument to a parameter.
    fn match_keyword(&mut self, argument_index: usize, name: &Name) {
        let parameters = self.parameters;
        let Some((parameter_index, parameter)) = parameters
            .keyword_by_name(name)
            .or_else(|| parameters.keyword_variadic())
        else {
            self.unmatched_keywords.push(name.clone());
            return;
        };
        self.assign_argument(argument_index, parameter_index, parameter);
    }

    /// Match all arguments to parameters, returning the argument-to-parameter
    /// mapping and the errors collected for the call.
    pub(crate) fn match_arguments<V>(
        mut self,
        arguments: &CallArguments<V>,
    ) -> (Box<[Option<usize>]>, SmallVec<[BindError; 4]>) {
        for (argument_index, argument) in arguments.iter().enumerate() {
            match argument.kind() {
                ArgumentKind::Positional => self.match_positional(argument_index),
                ArgumentKind::Keyword(name) => self.match_keyword(argument_index, name),
            }
        }
        self.finish()
    }

    fn finish(mut self) -> (Box<[Option<usize>]>, SmallVec<[BindError; 4]>) {
        if self.first_excess_positional.is_some() {
            self.errors.push(BindError::TooManyPositionalArguments {
                expected: self.parameters.positional().count(),
                provided: self.next_positional,
            });
        }

        if !self.unmatched_keywords.is_empty() {
            self.errors.push(BindError::UnknownArguments {
                names: std::mem::take(&mut self.unmatched_keywords),
            });
        }

        let mut missing = vec![];
        for (index, matched) in self.parameter_matched.iter().copied().enumerate() {
            if !matched {
                let parameter = &self.parameters[index];
                if parameter.is_variadic()
                    || parameter.is_keyword_variadic()
                    || parameter.has_default()
                {
                    // Sinks and defaulted parameters are not required.
                    continue;
                }
                missing.push(parameter.name().clone());
            }
        }
        if !missing.is_empty() {
            self.errors.push(BindError::MissingParameters { names: missing });
        }

        // Stable: preserves call-site order within a kind.
        self.errors.sort_by_key(error_rank);

        (self.argument_parameters.into_boxed_slice(), self.errors)
    }
}

/// Reporting order of the error kinds for one call.
fn error_rank(error: &BindError) -> u8 {
    match error {
        BindError::TooManyPositionalArguments { .. } => 0,
        BindError::ParameterAlreadyAssigned { .. } | BindError::UnknownArguments { .. } => 1,
        BindError::MissingParameters { .. } => 2,
    }
}
