//! Arguments of a single call expression, in source order.

use crate::name::Name;

/// How an argument is passed at the call site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// A positional argument.
    Positional,
    /// A keyword argument, e.g. `z=3`.
    Keyword(Name),
}

/// One argument of a call, carrying an opaque value `V` (typically the
/// checker's inferred type for the argument expression).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Argument<V> {
    kind: ArgumentKind,
    value: V,
}

impl<V> Argument<V> {
    pub fn positional(value: V) -> Self {
        Self {
            kind: ArgumentKind::Positional,
            value,
        }
    }

    pub fn keyword(name: impl Into<Name>, value: V) -> Self {
        Self {
            kind: ArgumentKind::Keyword(name.into()),
            value,
        }
    }

    pub fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// All arguments of a single call, in source order.
///
/// Built fresh per call expression and immutable once built. Keyword names
/// must be unique; duplicate keywords are a syntax error caught by the
/// caller's parser before a `CallArguments` is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallArguments<V>(Vec<Argument<V>>);

impl<V> CallArguments<V> {
    /// A call with no arguments.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// A call with only positional arguments.
    pub fn positional(values: impl IntoIterator<Item = V>) -> Self {
        values.into_iter().map(Argument::positional).collect()
    }

    /// Append a keyword argument.
    pub fn with_keyword(mut self, name: impl Into<Name>, value: V) -> Self {
        self.0.push(Argument::keyword(name, value));
        self
    }

    /// Append a positional argument.
    pub fn with_positional(mut self, value: V) -> Self {
        self.0.push(Argument::positional(value));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument<V>> {
        self.0.iter()
    }

    /// Number of positional arguments.
    pub fn positional_count(&self) -> usize {
        self.iter()
            .filter(|argument| matches!(argument.kind(), ArgumentKind::Positional))
            .count()
    }

    /// Iterate the keyword entries in call-site order.
    pub fn keywords(&self) -> impl Iterator<Item = (&Name, &V)> {
        self.iter().filter_map(|argument| match argument.kind() {
            ArgumentKind::Keyword(name) => Some((name, argument.value())),
            ArgumentKind::Positional => None,
        })
    }
}

impl<V> Default for CallArguments<V> {
    fn default() -> Self {
        Self::none()
    }
}

impl<V> FromIterator<Argument<V>> for CallArguments<V> {
    fn from_iter<T: IntoIterator<Item = Argument<V>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, V> IntoIterator for &'a CallArguments<V> {
    type Item = &'a Argument<V>;
    type IntoIter = std::slice::Iter<'a, Argument<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_preserves_source_order() {
        let arguments = CallArguments::positional([1, 2]).with_keyword("z", 3);

        assert_eq!(arguments.len(), 3);
        assert_eq!(arguments.positional_count(), 2);
        let keywords: Vec<_> = arguments.keywords().collect();
        assert_eq!(keywords, [(&Name::new("z"), &3)]);
    }
}
