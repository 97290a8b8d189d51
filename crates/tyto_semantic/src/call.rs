//! The call-site model and the binder: deciding whether one call's
//! arguments legally satisfy a signature.

pub mod arguments;
pub(crate) mod argument_matcher;
pub mod bind;
