//! Front end that turns one-line stub declarations into [`Signature`]s
//! for the binder.
//!
//! A stub text is a sequence of lines, each either blank, a `#` comment,
//! or a `def` declaration:
//!
//! ```text
//! def foo(x: int, y: int = ..., *args: int, z: int, **kwargs: str) -> int
//! ```
//!
//! [`parse_module`] yields a [`StubModule`] mapping names to parsed
//! [`FunctionDecl`]s; downstream code calls [`tyto_semantic::bind`] with
//! each declaration's signature.
//!
//! [`Signature`]: tyto_semantic::Signature

mod cursor;
mod parser;

pub use crate::parser::{FunctionDecl, ParseError, StubModule, parse_function_def, parse_module};
