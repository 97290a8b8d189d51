use std::str::Chars;

pub(crate) const EOF_CHAR: char = '\0';

/// A character-level cursor over a declaration's source text.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    chars: Chars<'a>,
    source_length: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars(),
            source_length: source.len(),
        }
    }

    /// Peeks the next character without consuming it. Returns [`EOF_CHAR`]
    /// if the cursor is exhausted.
    pub(crate) fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Byte offset of the cursor from the start of the source.
    pub(crate) fn offset(&self) -> usize {
        self.source_length - self.chars.as_str().len()
    }

    /// The source text that has not been consumed yet.
    pub(crate) fn rest(&self) -> &'a str {
        self.chars.as_str()
    }

    /// Consumes the next character, or returns `None` at end of input.
    pub(crate) fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    /// Consumes the next character if it equals `c`.
    pub(crate) fn eat_char(&mut self, c: char) -> bool {
        if self.first() == c {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `predicate` holds.
    pub(crate) fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while predicate(self.first()) && !self.is_eof() {
            self.bump();
        }
    }
}
