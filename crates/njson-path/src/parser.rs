//! Path parser.
//!
//! A single left-to-right scan with one character of lookahead. Segment
//! boundaries (`.`, `[`, `]`) are unambiguous, so nothing is backtracked.

use crate::types::*;
use thiserror::Error;

/// Malformed path text. Positions are byte offsets into the path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("empty path")]
    EmptyPath,
    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("unterminated bracket opened at position {position}")]
    UnterminatedBracket { position: usize },
    #[error("unterminated filter opened at position {position}")]
    UnterminatedFilter { position: usize },
    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },
    #[error("invalid number at position {position}")]
    InvalidNumber { position: usize },
    #[error("index too large at position {position}")]
    IndexOverflow { position: usize },
    #[error("expected a comparison operator at position {position}")]
    InvalidOperator { position: usize },
    #[error("missing literal at position {position}")]
    MissingLiteral { position: usize },
    #[error("invalid regular expression at position {position}: {message}")]
    InvalidRegex { position: usize, message: String },
    #[error("'=~' needs a string pattern at position {position}")]
    RegexNotString { position: usize },
    #[error("empty modifier name at position {position}")]
    EmptyModifierName { position: usize },
    #[error("empty modifier argument at position {position}")]
    EmptyModifierArgument { position: usize },
}

impl SyntaxError {
    /// Byte offset the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            SyntaxError::EmptyPath => None,
            SyntaxError::EmptySegment { position }
            | SyntaxError::UnexpectedChar { position, .. }
            | SyntaxError::UnterminatedBracket { position }
            | SyntaxError::UnterminatedFilter { position }
            | SyntaxError::UnterminatedString { position }
            | SyntaxError::InvalidNumber { position }
            | SyntaxError::IndexOverflow { position }
            | SyntaxError::InvalidOperator { position }
            | SyntaxError::MissingLiteral { position }
            | SyntaxError::InvalidRegex { position, .. }
            | SyntaxError::RegexNotString { position }
            | SyntaxError::EmptyModifierName { position }
            | SyntaxError::EmptyModifierArgument { position } => Some(*position),
        }
    }
}

/// Helper struct returned by `peek_comparison_operator`.
struct ComparisonToken {
    operator: ComparisonOperator,
    len: usize,
}

/// Path parser.
pub struct PathParser<'a> {
    input: &'a str,
    pos: usize,
    segments: Vec<Segment>,
}

impl<'a> PathParser<'a> {
    /// Parse a path expression.
    pub fn parse(input: &'a str) -> Result<Path, SyntaxError> {
        let mut parser = Self {
            input,
            pos: 0,
            segments: Vec::new(),
        };
        parser.parse_path()?;
        tracing::trace!(path = input, segments = parser.segments.len(), "parsed path");
        Ok(Path::new(parser.segments))
    }

    fn parse_path(&mut self) -> Result<(), SyntaxError> {
        if self.input.is_empty() {
            return Err(SyntaxError::EmptyPath);
        }

        if self.peek() == Some('[') {
            self.parse_bracket()?;
        } else {
            self.parse_dotted_segment()?;
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    self.parse_dotted_segment()?;
                }
                '[' => self.parse_bracket()?,
                // `[?(...)]#@name`: modifier straight after a filter.
                '#' if matches!(self.segments.last(), Some(Segment::Filter(_)))
                    && self.peek_str("#@") =>
                {
                    self.advance();
                    self.parse_modifiers()?;
                }
                other => {
                    return Err(SyntaxError::UnexpectedChar {
                        ch: other,
                        position: self.pos,
                    })
                }
            }
        }

        Ok(())
    }

    /// A segment written without brackets: a key, an index or `#`.
    fn parse_dotted_segment(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        match self.peek() {
            None | Some('.') | Some('[') => Err(SyntaxError::EmptySegment { position: start }),
            Some('#') => {
                self.advance();
                // Once the path has fanned out, `#@` applies to the sequence
                // already produced instead of flattening it again.
                let fanned_out = self.segments.iter().any(Segment::is_fan_out);
                if !(fanned_out && self.peek() == Some('@')) {
                    self.segments.push(Segment::Wildcard);
                }
                if self.peek() == Some('@') {
                    self.parse_modifiers()?;
                }
                Ok(())
            }
            Some(c) if is_key_char(c) => {
                let token = self.take_while(is_key_char);
                let segment = if token.bytes().all(|b| b.is_ascii_digit()) {
                    Segment::Index(parse_index(token, start)?)
                } else {
                    Segment::Key(token.to_string())
                };
                self.segments.push(segment);
                Ok(())
            }
            Some(c) => Err(SyntaxError::UnexpectedChar { ch: c, position: start }),
        }
    }

    fn parse_bracket(&mut self) -> Result<(), SyntaxError> {
        let open = self.pos;
        self.expect('[', open)?;

        match self.peek() {
            None => Err(SyntaxError::UnterminatedBracket { position: open }),
            Some('?') => {
                self.advance();
                self.expect('(', open)?;
                let predicate = self.parse_predicate(open)?;
                self.skip_whitespace();
                if self.is_at_end() {
                    return Err(SyntaxError::UnterminatedFilter { position: open });
                }
                self.expect(')', open)?;
                if self.is_at_end() {
                    return Err(SyntaxError::UnterminatedFilter { position: open });
                }
                self.expect(']', open)?;
                // Filters always run over array elements.
                if self.segments.last() != Some(&Segment::Wildcard) {
                    self.segments.push(Segment::Wildcard);
                }
                self.segments.push(Segment::Filter(predicate));
                Ok(())
            }
            Some('#') => {
                self.advance();
                self.expect(']', open)?;
                self.segments.push(Segment::Wildcard);
                Ok(())
            }
            Some('"') | Some('\'') => {
                let key = self.parse_string()?;
                self.expect(']', open)?;
                self.segments.push(Segment::Key(key));
                Ok(())
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                let token = self.take_while(|c| c.is_ascii_digit());
                let index = parse_index(token, start)?;
                self.expect(']', open)?;
                self.segments.push(Segment::Index(index));
                Ok(())
            }
            Some(']') => Err(SyntaxError::EmptySegment { position: self.pos }),
            Some(c) => Err(SyntaxError::UnexpectedChar {
                ch: c,
                position: self.pos,
            }),
        }
    }

    /// `@name[:arg]`, repeated. Called right after a `#`.
    fn parse_modifiers(&mut self) -> Result<(), SyntaxError> {
        while self.peek() == Some('@') {
            self.advance();
            let name_start = self.pos;
            let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
            if name.is_empty() {
                return Err(SyntaxError::EmptyModifierName { position: name_start });
            }
            let name = name.to_string();

            let arg = if self.peek() == Some(':') {
                self.advance();
                let arg_start = self.pos;
                let arg = self.take_while(|c| !matches!(c, '.' | '[' | '@'));
                if arg.is_empty() {
                    return Err(SyntaxError::EmptyModifierArgument { position: arg_start });
                }
                Some(arg.to_string())
            } else {
                None
            };

            self.segments.push(Segment::Modifier { name, arg });
        }
        Ok(())
    }

    /// Everything between `[?(` and `)]`.
    fn parse_predicate(&mut self, open: usize) -> Result<Predicate, SyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            Some('@') => self.advance(),
            None => return Err(SyntaxError::UnterminatedFilter { position: open }),
            Some(c) => {
                return Err(SyntaxError::UnexpectedChar {
                    ch: c,
                    position: self.pos,
                })
            }
        }

        let field = self.parse_field_steps(open)?;

        self.skip_whitespace();
        let op_pos = self.pos;
        let operator = match self.peek_comparison_operator() {
            Some(token) => {
                self.advance_by(token.len);
                token.operator
            }
            None if self.is_at_end() => {
                return Err(SyntaxError::UnterminatedFilter { position: open })
            }
            None => return Err(SyntaxError::InvalidOperator { position: op_pos }),
        };

        self.skip_whitespace();
        let literal_pos = self.pos;
        let literal = self.parse_literal(open)?;

        let literal = if operator == ComparisonOperator::Matches {
            match literal {
                Literal::String(source) => Literal::Pattern(Pattern::new(&source).map_err(|e| {
                    SyntaxError::InvalidRegex {
                        position: literal_pos,
                        message: e.to_string(),
                    }
                })?),
                _ => return Err(SyntaxError::RegexNotString { position: literal_pos }),
            }
        } else {
            literal
        };

        Ok(Predicate::new(field, operator, literal))
    }

    /// `.key`, `.0` and `[0]` steps after the `@`.
    fn parse_field_steps(&mut self, open: usize) -> Result<Vec<FieldStep>, SyntaxError> {
        let mut steps = Vec::new();

        loop {
            match self.peek() {
                Some('.') => {
                    self.advance();
                    let start = self.pos;
                    let token = self.take_while(is_key_char);
                    if token.is_empty() {
                        return match self.peek() {
                            None => Err(SyntaxError::UnterminatedFilter { position: open }),
                            _ => Err(SyntaxError::EmptySegment { position: start }),
                        };
                    }
                    if token.bytes().all(|b| b.is_ascii_digit()) {
                        steps.push(FieldStep::Index(parse_index(token, start)?));
                    } else {
                        steps.push(FieldStep::Key(token.to_string()));
                    }
                }
                Some('[') => {
                    let bracket = self.pos;
                    self.advance();
                    match self.peek() {
                        Some('"') | Some('\'') => {
                            let key = self.parse_string()?;
                            steps.push(FieldStep::Key(key));
                        }
                        Some(c) if c.is_ascii_digit() => {
                            let start = self.pos;
                            let token = self.take_while(|c| c.is_ascii_digit());
                            steps.push(FieldStep::Index(parse_index(token, start)?));
                        }
                        None => return Err(SyntaxError::UnterminatedBracket { position: bracket }),
                        Some(c) => {
                            return Err(SyntaxError::UnexpectedChar {
                                ch: c,
                                position: self.pos,
                            })
                        }
                    }
                    self.expect(']', bracket)?;
                }
                _ => break,
            }
        }

        Ok(steps)
    }

    fn parse_literal(&mut self, open: usize) -> Result<Literal, SyntaxError> {
        match self.peek() {
            None => Err(SyntaxError::UnterminatedFilter { position: open }),
            Some(')') => Err(SyntaxError::MissingLiteral { position: self.pos }),
            Some('"') | Some('\'') => Ok(Literal::String(self.parse_string()?)),
            Some(c) if c.is_ascii_digit() || c == '-' => Ok(Literal::Number(self.parse_float_number()?)),
            Some(c) if is_key_char(c) => {
                // Bare words: keywords, otherwise an unquoted string.
                let word = self.take_while(is_key_char);
                Ok(match word {
                    "true" => Literal::Bool(true),
                    "false" => Literal::Bool(false),
                    "null" => Literal::Null,
                    other => Literal::String(other.to_string()),
                })
            }
            Some(c) => Err(SyntaxError::UnexpectedChar {
                ch: c,
                position: self.pos,
            }),
        }
    }

    /// Quoted text. No escape sequences: everything up to the closing quote
    /// is taken literally.
    fn parse_string(&mut self) -> Result<String, SyntaxError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q) => q,
            None => return Err(SyntaxError::UnterminatedString { position: start }),
        };
        self.advance();

        let body_start = self.pos;
        match self.input[body_start..].find(quote) {
            Some(len) => {
                self.pos = body_start + len + quote.len_utf8();
                Ok(self.input[body_start..body_start + len].to_string())
            }
            None => Err(SyntaxError::UnterminatedString { position: start }),
        }
    }

    fn parse_float_number(&mut self) -> Result<f64, SyntaxError> {
        let start = self.pos;

        // Optional minus
        if self.peek() == Some('-') {
            self.advance();
        }

        // Integer part
        if !matches!(self.peek(), Some('0'..='9')) {
            return Err(SyntaxError::InvalidNumber { position: start });
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }

        // Optional decimal
        if self.peek() == Some('.') {
            self.advance();
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(SyntaxError::InvalidNumber { position: start });
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        // Optional exponent
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(SyntaxError::InvalidNumber { position: start });
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .map_err(|_| SyntaxError::InvalidNumber { position: start })
    }

    /// Peek at the next comparison operator without consuming input.
    fn peek_comparison_operator(&self) -> Option<ComparisonToken> {
        const OPERATORS: [(&str, ComparisonOperator); 7] = [
            ("==", ComparisonOperator::Equal),
            ("!=", ComparisonOperator::NotEqual),
            ("=~", ComparisonOperator::Matches),
            ("<=", ComparisonOperator::LessEqual),
            (">=", ComparisonOperator::GreaterEqual),
            ("<", ComparisonOperator::Less),
            (">", ComparisonOperator::Greater),
        ];
        OPERATORS
            .iter()
            .find(|(text, _)| self.peek_str(text))
            .map(|(text, operator)| ComparisonToken {
                operator: *operator,
                len: text.len(),
            })
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if pred(c) {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume `expected`; running out of input reports the bracket opened at `open`.
    fn expect(&mut self, expected: char, open: usize) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            None => Err(SyntaxError::UnterminatedBracket { position: open }),
            Some(c) => Err(SyntaxError::UnexpectedChar {
                ch: c,
                position: self.pos,
            }),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}

pub(crate) fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn parse_index(digits: &str, position: usize) -> Result<usize, SyntaxError> {
    digits
        .parse::<usize>()
        .map_err(|_| SyntaxError::IndexOverflow { position })
}
