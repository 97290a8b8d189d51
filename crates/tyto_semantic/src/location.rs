use std::fmt;
use std::num::NonZeroUsize;

/// A one-indexed line or column number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OneIndexed(NonZeroUsize);

impl OneIndexed {
    pub const MIN: Self = Self(NonZeroUsize::MIN);

    /// Creates a one-indexed value, or `None` if `value` is zero.
    #[inline]
    pub fn new(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    /// Converts a zero-indexed value (e.g. an enumeration index) to one-indexed.
    #[inline]
    pub const fn from_zero_indexed(value: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(value))
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for OneIndexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for OneIndexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Location of a call expression in the analyzed source: a one-indexed
/// line, and a column when the caller can provide one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    line: OneIndexed,
    column: Option<OneIndexed>,
}

impl SourceLocation {
    pub fn new(line: OneIndexed, column: OneIndexed) -> Self {
        Self {
            line,
            column: Some(column),
        }
    }

    /// A location identified by line only.
    pub fn line(line: OneIndexed) -> Self {
        Self { line, column: None }
    }

    pub fn line_number(self) -> OneIndexed {
        self.line
    }

    pub fn column(self) -> Option<OneIndexed> {
        self.column
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "{}:{column}", self.line),
            None => fmt::Display::fmt(&self.line, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_indexed() {
        assert_eq!(OneIndexed::new(0), None);
        assert_eq!(OneIndexed::new(2).unwrap().get(), 2);
        assert_eq!(OneIndexed::from_zero_indexed(0), OneIndexed::MIN);
        assert_eq!(OneIndexed::from_zero_indexed(2).get(), 3);
    }

    #[test]
    fn display() {
        let line = OneIndexed::new(4).unwrap();
        assert_eq!(SourceLocation::line(line).to_string(), "4");
        assert_eq!(
            SourceLocation::new(line, OneIndexed::new(9).unwrap()).to_string(),
            "4:9"
        );
    }
}
