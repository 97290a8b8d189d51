//! Call-argument binding and diagnostics for the tyto type checker.
//!
//! Given an immutable [`Signature`] (built by the checker from a parsed
//! declaration) and the [`CallArguments`] of one call expression, [`bind`]
//! decides whether the call is legal. On success it yields the resolved
//! value of every parameter; on failure it yields the full, ordered set of
//! [`BindError`]s for that call, which the checker turns into categorized
//! [`Diagnostic`]s collected in a [`DiagnosticLog`].
//!
//! The binder is a pure function over immutable inputs: signatures may be
//! shared freely across threads, and binding one call is
//! O(parameters + arguments).

pub mod call;
pub mod diagnostic;
pub mod location;
pub mod name;
pub mod signatures;

pub use crate::call::arguments::{Argument, ArgumentKind, CallArguments};
pub use crate::call::bind::{
    BindError, BindErrors, BindingResult, BoundArguments, BoundValue, bind,
};
pub use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticLog};
pub use crate::location::{OneIndexed, SourceLocation};
pub use crate::name::Name;
pub use crate::signatures::{
    InvalidSignature, Parameter, ParameterKind, Parameters, Signature, TypeRef,
};
