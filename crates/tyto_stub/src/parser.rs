//! A single-pass parser for one-line stub declarations of the form
//!
//! ```text
//! def foo(x: int, y: int = ..., *args: int, z: int, **kwargs: str) -> int
//! ```
//!
//! Only the information the binder needs survives parsing: parameter
//! names, binding kinds, whether a default is declared (`= ...` or any
//! literal), and opaque annotation text. A `/` closes a positional-only
//! prefix; `*name` or a bare `*` opens the keyword-only region; `**name`
//! is the keyword-variadic sink.

use tyto_semantic::location::OneIndexed;
use tyto_semantic::name::Name;
use tyto_semantic::signatures::{
    InvalidSignature, Parameter, ParameterKind, Signature, TypeRef,
};

use crate::cursor::{Cursor, EOF_CHAR};

/// A parsed `def` declaration: the function's name and signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    name: Name,
    signature: Signature,
}

impl FunctionDecl {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl std::fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "def {}{}", self.name, self.signature)
    }
}

/// Why a declaration could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected `def` at offset {offset}")]
    ExpectedDef { offset: usize },
    #[error("expected an identifier at offset {offset}")]
    ExpectedIdentifier { offset: usize },
    #[error("expected `{expected}` at offset {offset}")]
    ExpectedToken { expected: char, offset: usize },
    #[error("expected a type at offset {offset}")]
    ExpectedType { offset: usize },
    #[error("expected a default value at offset {offset}")]
    ExpectedDefault { offset: usize },
    #[error("unexpected character `{found}` at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },
    #[error(transparent)]
    InvalidSignature(#[from] InvalidSignature),
    #[error("invalid declaration on line {line}")]
    InvalidLine {
        line: OneIndexed,
        #[source]
        source: Box<ParseError>,
    },
}

/// Parse a single `def` declaration.
pub fn parse_function_def(source: &str) -> Result<FunctionDecl, ParseError> {
    Parser::new(source).parse()
}

/// The declarations of a `.pyi`-style stub text, with their one-indexed
/// source lines. Blank lines and `#` comments are skipped.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StubModule {
    functions: Vec<(OneIndexed, FunctionDecl)>,
}

impl StubModule {
    /// The declaration named `name`, if any. Later declarations shadow
    /// earlier ones, as in a real module namespace.
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions
            .iter()
            .rev()
            .find_map(|(_, decl)| (*decl.name() == name).then_some(decl))
    }

    pub fn iter(&self) -> impl Iterator<Item = (OneIndexed, &FunctionDecl)> {
        self.functions.iter().map(|(line, decl)| (*line, decl))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Parse every declaration of a stub text.
pub fn parse_module(source: &str) -> Result<StubModule, ParseError> {
    let mut functions = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line_number = OneIndexed::from_zero_indexed(index);
        let decl = parse_function_def(trimmed).map_err(|error| ParseError::InvalidLine {
            line: line_number,
            source: Box::new(error),
        })?;
        functions.push((line_number, decl));
    }
    tracing::trace!("parsed stub module with {} declaration(s)", functions.len());
    Ok(StubModule { functions })
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continuation(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Positional,
    KeywordOnly,
}

struct RawParameter<'a> {
    name: &'a str,
    kind: ParameterKind,
    annotation: Option<&'a str>,
    has_default: bool,
}

struct Parser<'a> {
    source: &'a str,
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
        }
    }

    fn skip_whitespace(&mut self) {
        self.cursor.eat_while(|c| c == ' ' || c == '\t');
    }

    fn eat_identifier(&mut self) -> Option<&'a str> {
        if !is_identifier_start(self.cursor.first()) {
            return None;
        }
        let start = self.cursor.offset();
        self.cursor.bump();
        self.cursor.eat_while(is_identifier_continuation);
        Some(&self.source[start..self.cursor.offset()])
    }

    fn expect_identifier(&mut self) -> Result<&'a str, ParseError> {
        let offset = self.cursor.offset();
        self.eat_identifier()
            .ok_or(ParseError::ExpectedIdentifier { offset })
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        if self.cursor.eat_char(expected) {
            Ok(())
        } else {
            Err(ParseError::ExpectedToken {
                expected,
                offset: self.cursor.offset(),
            })
        }
    }

    /// Consume a type expression: everything up to a `,`, `)` or `=` at
    /// bracket depth zero.
    fn eat_type_expression(&mut self) -> Result<&'a str, ParseError> {
        self.skip_whitespace();
        let start = self.cursor.offset();
        let mut depth = 0usize;
        loop {
            match self.cursor.first() {
                EOF_CHAR => break,
                '[' | '(' => {
                    depth += 1;
                    self.cursor.bump();
                }
                ']' | ')' if depth > 0 => {
                    depth -= 1;
                    self.cursor.bump();
                }
                ')' | ',' | '=' if depth == 0 => break,
                _ => {
                    self.cursor.bump();
                }
            }
        }
        let text = self.source[start..self.cursor.offset()].trim();
        if text.is_empty() {
            return Err(ParseError::ExpectedType { offset: start });
        }
        Ok(text)
    }

    /// Consume a default-value token (the value itself is not modeled).
    fn eat_default(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        let start = self.cursor.offset();
        let mut depth = 0usize;
        loop {
            match self.cursor.first() {
                EOF_CHAR => break,
                '[' | '(' => {
                    depth += 1;
                    self.cursor.bump();
                }
                ']' | ')' if depth > 0 => {
                    depth -= 1;
                    self.cursor.bump();
                }
                ')' | ',' if depth == 0 => break,
                _ => {
                    self.cursor.bump();
                }
            }
        }
        if self.source[start..self.cursor.offset()].trim().is_empty() {
            return Err(ParseError::ExpectedDefault { offset: start });
        }
        Ok(())
    }

    fn eat_annotation(&mut self) -> Result<Option<&'a str>, ParseError> {
        self.skip_whitespace();
        if self.cursor.eat_char(':') {
            Ok(Some(self.eat_type_expression()?))
        } else {
            Ok(None)
        }
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut raw: Vec<RawParameter<'a>> = Vec::new();
        let mut section = Section::Positional;
        let mut seen_slash = false;
        let mut positional_only = 0usize;

        loop {
            self.skip_whitespace();
            if self.cursor.eat_char(')') {
                break;
            }
            let offset = self.cursor.offset();
            match self.cursor.first() {
                '/' => {
                    if seen_slash || section == Section::KeywordOnly || raw.is_empty() {
                        return Err(ParseError::UnexpectedCharacter { found: '/', offset });
                    }
                    self.cursor.bump();
                    positional_only = raw.len();
                    seen_slash = true;
                }
                '*' => {
                    self.cursor.bump();
                    if self.cursor.eat_char('*') {
                        let name = self.expect_identifier()?;
                        let annotation = self.eat_annotation()?;
                        raw.push(RawParameter {
                            name,
                            kind: ParameterKind::KeywordVariadic,
                            annotation,
                            has_default: false,
                        });
                        section = Section::KeywordOnly;
                    } else if is_identifier_start(self.cursor.first()) {
                        let name = self.expect_identifier()?;
                        let annotation = self.eat_annotation()?;
                        raw.push(RawParameter {
                            name,
                            kind: ParameterKind::Variadic,
                            annotation,
                            has_default: false,
                        });
                        section = Section::KeywordOnly;
                    } else {
                        // Bare `*` separator.
                        if section == Section::KeywordOnly {
                            return Err(ParseError::UnexpectedCharacter { found: '*', offset });
                        }
                        section = Section::KeywordOnly;
                    }
                }
                _ => {
                    let name = self.expect_identifier()?;
                    let annotation = self.eat_annotation()?;
                    self.skip_whitespace();
                    let has_default = if self.cursor.eat_char('=') {
                        self.eat_default()?;
                        true
                    } else {
                        false
                    };
                    let kind = match section {
                        Section::Positional => ParameterKind::PositionalOrKeyword,
                        Section::KeywordOnly => ParameterKind::KeywordOnly,
                    };
                    raw.push(RawParameter {
                        name,
                        kind,
                        annotation,
                        has_default,
                    });
                }
            }

            self.skip_whitespace();
            if self.cursor.eat_char(',') {
                continue;
            }
            self.expect_char(')')?;
            break;
        }

        let mut parameters = Vec::with_capacity(raw.len());
        for (index, raw) in raw.into_iter().enumerate() {
            let kind = if index < positional_only && raw.kind == ParameterKind::PositionalOrKeyword
            {
                ParameterKind::PositionalOnly
            } else {
                raw.kind
            };
            let mut parameter = match kind {
                ParameterKind::PositionalOnly => Parameter::positional_only(raw.name),
                ParameterKind::PositionalOrKeyword => Parameter::positional_or_keyword(raw.name),
                ParameterKind::Variadic => Parameter::variadic(raw.name),
                ParameterKind::KeywordOnly => Parameter::keyword_only(raw.name),
                ParameterKind::KeywordVariadic => Parameter::keyword_variadic(raw.name),
            };
            if let Some(annotation) = raw.annotation {
                parameter = parameter.with_annotated_type(annotation);
            }
            if raw.has_default {
                parameter = parameter.with_default();
            }
            parameters.push(parameter);
        }
        Ok(parameters)
    }

    fn parse_return_type(&mut self) -> Result<&'a str, ParseError> {
        self.skip_whitespace();
        let start = self.cursor.offset();
        self.cursor.eat_while(|c| c != '#');
        let text = self.source[start..self.cursor.offset()].trim();
        if text.is_empty() {
            return Err(ParseError::ExpectedType { offset: start });
        }
        Ok(text)
    }

    fn parse(mut self) -> Result<FunctionDecl, ParseError> {
        self.skip_whitespace();
        let offset = self.cursor.offset();
        if self.eat_identifier() != Some("def") {
            return Err(ParseError::ExpectedDef { offset });
        }

        self.skip_whitespace();
        let name = self.expect_identifier()?;

        self.skip_whitespace();
        self.expect_char('(')?;
        let parameters = self.parse_parameters()?;

        self.skip_whitespace();
        let return_ty = if self.cursor.eat_char('-') {
            self.expect_char('>')?;
            Some(TypeRef::new(self.parse_return_type()?))
        } else {
            None
        };

        self.skip_whitespace();
        if !self.cursor.is_eof() && self.cursor.first() != '#' {
            return Err(ParseError::UnexpectedCharacter {
                found: self.cursor.first(),
                offset: self.cursor.offset(),
            });
        }

        let signature = Signature::new(parameters, return_ty)?;
        Ok(FunctionDecl {
            name: Name::new(name),
            signature,
        })
    }
}
