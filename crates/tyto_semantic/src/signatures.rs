//! The signature model: an immutable description of a callable's formal
//! parameters, validated at construction and shared read-only across any
//! number of concurrent bindings.

use std::fmt;
use std::fmt::Write as _;

use rustc_hash::FxHashSet;

use crate::name::Name;

/// An opaque reference to a declared type annotation.
///
/// The binder never interprets annotations; type compatibility is the
/// concern of the surrounding checker.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeRef(Name);

impl TypeRef {
    pub fn new(name: impl Into<Name>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &Name {
        &self.0
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Kind of a formal parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Positional-only parameter, e.g. `def f(x, /): ...`
    PositionalOnly,
    /// Positional-or-keyword parameter, e.g. `def f(x): ...`
    PositionalOrKeyword,
    /// Variadic parameter, e.g. `def f(*args): ...`
    Variadic,
    /// Keyword-only parameter, e.g. `def f(*, x): ...`
    KeywordOnly,
    /// Variadic keywords parameter, e.g. `def f(**kwargs): ...`
    KeywordVariadic,
}

impl ParameterKind {
    /// Position of this kind in a valid declaration. Kinds must appear in
    /// non-decreasing rank order.
    const fn rank(self) -> u8 {
        match self {
            Self::PositionalOnly => 0,
            Self::PositionalOrKeyword => 1,
            Self::Variadic => 2,
            Self::KeywordOnly => 3,
            Self::KeywordVariadic => 4,
        }
    }
}

/// A single formal parameter of a [`Signature`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: Name,
    kind: ParameterKind,
    has_default: bool,
    annotated_type: Option<TypeRef>,
}

impl Parameter {
    fn new(name: impl Into<Name>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            has_default: false,
            annotated_type: None,
        }
    }

    pub fn positional_only(name: impl Into<Name>) -> Self {
        Self::new(name, ParameterKind::PositionalOnly)
    }

    pub fn positional_or_keyword(name: impl Into<Name>) -> Self {
        Self::new(name, ParameterKind::PositionalOrKeyword)
    }

    pub fn variadic(name: impl Into<Name>) -> Self {
        Self::new(name, ParameterKind::Variadic)
    }

    pub fn keyword_only(name: impl Into<Name>) -> Self {
        Self::new(name, ParameterKind::KeywordOnly)
    }

    pub fn keyword_variadic(name: impl Into<Name>) -> Self {
        Self::new(name, ParameterKind::KeywordVariadic)
    }

    pub fn with_annotated_type(mut self, annotated_type: impl Into<TypeRef>) -> Self {
        self.annotated_type = Some(annotated_type.into());
        self
    }

    /// Mark the parameter as having a declared default.
    ///
    /// The default's value is not modeled; an unsupplied defaulted
    /// parameter simply is not required.
    pub fn with_default(mut self) -> Self {
        match self.kind {
            ParameterKind::PositionalOnly
            | ParameterKind::PositionalOrKeyword
            | ParameterKind::KeywordOnly => self.has_default = true,
            ParameterKind::Variadic | ParameterKind::KeywordVariadic => {
                panic!("cannot set default value for variadic parameter")
            }
        }
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn annotated_type(&self) -> Option<&TypeRef> {
        self.annotated_type.as_ref()
    }

    /// Returns `true` if this is a positional-only parameter.
    pub fn is_positional_only(&self) -> bool {
        matches!(self.kind, ParameterKind::PositionalOnly)
    }

    /// Returns `true` if this is either a positional-only or standard
    /// (positional or keyword) parameter.
    pub fn is_positional(&self) -> bool {
        matches!(
            self.kind,
            ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword
        )
    }

    /// Returns `true` if this is a keyword-only parameter.
    pub fn is_keyword_only(&self) -> bool {
        matches!(self.kind, ParameterKind::KeywordOnly)
    }

    /// Returns `true` if this is a variadic parameter.
    pub fn is_variadic(&self) -> bool {
        matches!(self.kind, ParameterKind::Variadic)
    }

    /// Returns `true` if this is a keyword-variadic parameter.
    pub fn is_keyword_variadic(&self) -> bool {
        matches!(self.kind, ParameterKind::KeywordVariadic)
    }

    /// Whether a keyword argument named `name` can bind to this parameter.
    ///
    /// Positional-only and variadic parameters are never addressable by
    /// keyword.
    pub fn callable_by_name(&self, name: &str) -> bool {
        match self.kind {
            ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly => self.name == name,
            _ => false,
        }
    }

    /// Name of the parameter as displayed in diagnostics, with the `*` or
    /// `**` sigil for variadic parameters.
    pub fn display_name(&self) -> Name {
        match self.kind {
            ParameterKind::Variadic => Name::new(format!("*{}", self.name)),
            ParameterKind::KeywordVariadic => Name::new(format!("**{}", self.name)),
            _ => self.name.clone(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterKind::Variadic => write!(f, "*{}", self.name)?,
            ParameterKind::KeywordVariadic => write!(f, "**{}", self.name)?,
            _ => fmt::Display::fmt(&self.name, f)?,
        }
        if let Some(annotated_type) = &self.annotated_type {
            write!(f, ": {annotated_type}")?;
        }
        if self.has_default {
            f.write_str(" = ...")?;
        }
        Ok(())
    }
}

/// Why a parameter list cannot be used as a signature.
///
/// Structural errors are fatal at construction time: the declaration is
/// unusable for binding and analysis of it is aborted by the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSignature {
    #[error("duplicate parameter `{name}`")]
    DuplicateParameter { name: Name },
    #[error("more than one variadic parameter (`*{name}`)")]
    MultipleVariadic { name: Name },
    #[error("more than one keyword-variadic parameter (`**{name}`)")]
    MultipleKeywordVariadic { name: Name },
    #[error("parameter `{name}` declared out of order")]
    ParameterOutOfOrder { name: Name },
}

/// An ordered, validated parameter list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Parameters {
    value: Vec<Parameter>,
}

impl Parameters {
    /// Create a parameter list, validating the declaration invariants:
    /// unique names, kinds in declaration order, at most one variadic and
    /// at most one keyword-variadic sink (the latter last).
    pub fn new(
        parameters: impl IntoIterator<Item = Parameter>,
    ) -> Result<Self, InvalidSignature> {
        let value: Vec<Parameter> = parameters.into_iter().collect();

        let mut names = FxHashSet::with_capacity_and_hasher(value.len(), Default::default());
        let mut previous: Option<ParameterKind> = None;
        for parameter in &value {
            if !names.insert(parameter.name().as_str()) {
                return Err(InvalidSignature::DuplicateParameter {
                    name: parameter.name().clone(),
                });
            }
            let kind = parameter.kind();
            match previous {
                Some(ParameterKind::Variadic) if kind == ParameterKind::Variadic => {
                    return Err(InvalidSignature::MultipleVariadic {
                        name: parameter.name().clone(),
                    });
                }
                Some(ParameterKind::KeywordVariadic)
                    if kind == ParameterKind::KeywordVariadic =>
                {
                    return Err(InvalidSignature::MultipleKeywordVariadic {
                        name: parameter.name().clone(),
                    });
                }
                Some(previous) if kind.rank() < previous.rank() => {
                    return Err(InvalidSignature::ParameterOutOfOrder {
                        name: parameter.name().clone(),
                    });
                }
                _ => {}
            }
            previous = Some(kind);
        }

        Ok(Self { value })
    }

    /// An empty parameter list.
    pub fn empty() -> Self {
        Self { value: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.value.iter()
    }

    pub fn as_slice(&self) -> &[Parameter] {
        self.value.as_slice()
    }

    /// Return parameter at given index, or `None` if index is out-of-range.
    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.value.get(index)
    }

    /// Iterate initial positional parameters, not including the variadic
    /// parameter, if any.
    pub fn positional(&self) -> impl Iterator<Item = &Parameter> {
        self.iter().take_while(|param| param.is_positional())
    }

    /// Return positional parameter at given index, or `None` if `index` is
    /// out of range.
    ///
    /// Does not return the variadic parameter.
    pub fn get_positional(&self, index: usize) -> Option<&Parameter> {
        self.get(index)
            .and_then(|parameter| parameter.is_positional().then_some(parameter))
    }

    /// Return the variadic parameter (`*args`), if any, and its index.
    pub fn variadic(&self) -> Option<(usize, &Parameter)> {
        self.iter()
            .enumerate()
            .find(|(_, parameter)| parameter.is_variadic())
    }

    /// Return parameter (with index) callable by the given keyword name,
    /// or `None` if no such parameter.
    ///
    /// Does not return the keywords (`**kwargs`) parameter.
    pub fn keyword_by_name(&self, name: &str) -> Option<(usize, &Parameter)> {
        self.iter()
            .enumerate()
            .find(|(_, parameter)| parameter.callable_by_name(name))
    }

    /// Return the keywords parameter (`**kwargs`), if any, and its index.
    pub fn keyword_variadic(&self) -> Option<(usize, &Parameter)> {
        self.iter()
            .enumerate()
            .rfind(|(_, parameter)| parameter.is_keyword_variadic())
    }

    /// Whether a variadic positional sink (`*args`) is declared.
    pub fn has_variadic(&self) -> bool {
        self.variadic().is_some()
    }

    /// Whether a variadic keyword sink (`**kwargs`) is declared.
    pub fn has_keyword_variadic(&self) -> bool {
        self.keyword_variadic().is_some()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.value.iter()
    }
}

impl std::ops::Index<usize> for Parameters {
    type Output = Parameter;

    fn index(&self, index: usize) -> &Self::Output {
        &self.value[index]
    }
}

/// An immutable description of a callable: its parameter list and an
/// optional return annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    parameters: Parameters,
    return_ty: Option<TypeRef>,
}

impl Signature {
    /// Build a signature, validating the parameter-list invariants.
    pub fn new(
        parameters: impl IntoIterator<Item = Parameter>,
        return_ty: Option<TypeRef>,
    ) -> Result<Self, InvalidSignature> {
        Ok(Self {
            parameters: Parameters::new(parameters)?,
            return_ty,
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn return_ty(&self) -> Option<&TypeRef> {
        self.return_ty.as_ref()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;

        let mut first = true;
        let mut positional_only_open = false;
        let mut keyword_only_open = false;
        for parameter in &self.parameters {
            let mut write_part = |part: &dyn fmt::Display| -> fmt::Result {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                write!(f, "{part}")
            };

            match parameter.kind() {
                ParameterKind::PositionalOnly => positional_only_open = true,
                kind => {
                    if positional_only_open {
                        write_part(&"/")?;
                        positional_only_open = false;
                    }
                    if kind == ParameterKind::KeywordOnly && !keyword_only_open {
                        write_part(&"*")?;
                        keyword_only_open = true;
                    }
                    if kind == ParameterKind::Variadic {
                        keyword_only_open = true;
                    }
                }
            }
            write_part(parameter)?;
        }
        if positional_only_open {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str("/")?;
        }
        f.write_char(')')?;

        if let Some(return_ty) = &self.return_ty {
            write!(f, " -> {return_ty}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(parameters: impl IntoIterator<Item = Parameter>) -> Signature {
        Signature::new(parameters, None).unwrap()
    }

    #[test]
    fn display_full() {
        let sig = Signature::new(
            [
                Parameter::positional_only("a"),
                Parameter::positional_or_keyword("x").with_annotated_type("int"),
                Parameter::positional_or_keyword("y")
                    .with_annotated_type("int")
                    .with_default(),
                Parameter::variadic("args").with_annotated_type("int"),
                Parameter::keyword_only("z"),
                Parameter::keyword_variadic("kwargs").with_annotated_type("str"),
            ],
            Some(TypeRef::new("int")),
        )
        .unwrap();

        insta::assert_snapshot!(
            sig.to_string(),
            @"(a, /, x: int, y: int = ..., *args: int, z, **kwargs: str) -> int"
        );
    }

    #[test]
    fn display_bare_star_separator() {
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::keyword_only("z"),
        ]);
        insta::assert_snapshot!(sig.to_string(), @"(x, *, z)");
    }

    #[test]
    fn display_trailing_positional_only() {
        let sig = signature([
            Parameter::positional_only("x"),
            Parameter::positional_only("y"),
        ]);
        insta::assert_snapshot!(sig.to_string(), @"(x, y, /)");
    }

    #[test]
    fn duplicate_names_rejected() {
        let result = Signature::new(
            [
                Parameter::positional_or_keyword("x"),
                Parameter::positional_or_keyword("x"),
            ],
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            InvalidSignature::DuplicateParameter { name: Name::new("x") }
        );
    }

    #[test]
    fn multiple_variadic_rejected() {
        let result = Signature::new(
            [Parameter::variadic("args"), Parameter::variadic("more")],
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            InvalidSignature::MultipleVariadic { name: Name::new("more") }
        );
    }

    #[test]
    fn keyword_variadic_must_be_last() {
        let result = Signature::new(
            [
                Parameter::keyword_variadic("kwargs"),
                Parameter::positional_or_keyword("x"),
            ],
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            InvalidSignature::ParameterOutOfOrder { name: Name::new("x") }
        );
    }

    #[test]
    fn multiple_keyword_variadic_rejected() {
        let result = Signature::new(
            [
                Parameter::keyword_variadic("kwargs"),
                Parameter::keyword_variadic("more"),
            ],
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            InvalidSignature::MultipleKeywordVariadic { name: Name::new("more") }
        );
    }

    #[test]
    fn positional_only_after_standard_rejected() {
        let result = Signature::new(
            [
                Parameter::positional_or_keyword("x"),
                Parameter::positional_only("y"),
            ],
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            InvalidSignature::ParameterOutOfOrder { name: Name::new("y") }
        );
    }

    #[test]
    fn keyword_lookup_skips_positional_only() {
        let sig = signature([
            Parameter::positional_only("x"),
            Parameter::positional_or_keyword("y"),
            Parameter::keyword_only("z"),
        ]);
        let parameters = sig.parameters();

        assert_eq!(parameters.keyword_by_name("x"), None);
        assert_eq!(parameters.keyword_by_name("y").map(|(index, _)| index), Some(1));
        assert_eq!(parameters.keyword_by_name("z").map(|(index, _)| index), Some(2));
    }

    #[test]
    fn positional_lookup_excludes_sinks() {
        let sig = signature([
            Parameter::positional_or_keyword("x"),
            Parameter::variadic("args"),
            Parameter::keyword_only("z"),
        ]);
        let parameters = sig.parameters();

        assert!(parameters.get_positional(0).is_some());
        assert!(parameters.get_positional(1).is_none());
        assert_eq!(parameters.variadic().map(|(index, _)| index), Some(1));
        assert_eq!(parameters.positional().count(), 1);
    }

    #[test]
    #[should_panic(expected = "cannot set default value for variadic parameter")]
    fn variadic_default_panics() {
        let _ = Parameter::variadic("args").with_default();
    }
}
