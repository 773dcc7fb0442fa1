use cli_common::{LexError, ParseError};
use token::*;
pub mod token;

/// Produces tokens on demand from a borrowed source string.
///
/// The lexer never fails at end of input: once the source is exhausted every
/// call to [`Lexer::next_token`] returns an `EOF` token positioned at the end
/// of the source.
pub struct Lexer<'a> {
    buf: &'a str,
    chars: Vec<(usize, char)>,
    len: usize,
    pos: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(buf: &'a str) -> Lexer<'a> {
        let chars: Vec<(usize, char)> = buf.char_indices().collect();
        let len = chars.len();
        Lexer {
            buf,
            chars,
            len,
            pos: 0,
            finished: false,
        }
    }

    /// Lex the whole input, including the terminating `EOF` token.
    pub fn lex(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = self.by_ref().collect::<Result<Vec<_>, _>>()?;
        tokens.push(Token::eof(self.buf.len()));

        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            if self.pos >= self.len {
                return Ok(Token::eof(self.buf.len()));
            }

            let (curr_offset, curr_ch) = self.chars[self.pos];

            let token = match curr_ch {
                ' ' | '\n' | '\r' | '\t' => {
                    self.pos += 1;
                    continue;
                }
                c if c.is_ascii_digit() => self.number(curr_offset)?,
                c if is_ident_start(c) => self.identifier(curr_offset),
                '"' => self.string(curr_offset),
                ',' => self.single(TokenKind::Comma, curr_offset),
                '=' => self.single(TokenKind::Equal, curr_offset),
                '*' => self.single(TokenKind::Multiply, curr_offset),
                '(' => self.single(TokenKind::ParenOpen, curr_offset),
                ')' => self.single(TokenKind::ParenClose, curr_offset),
                ';' => self.single(TokenKind::Semicolon, curr_offset),
                '<' if self.peek() == Some('=') => {
                    self.double(TokenKind::LessThanOrEqual, curr_offset)
                }
                '>' if self.peek() == Some('=') => {
                    self.double(TokenKind::GreaterThanOrEqual, curr_offset)
                }
                '!' if self.peek() == Some('=') => self.double(TokenKind::NotEqual, curr_offset),
                '<' => self.single(TokenKind::LessThan, curr_offset),
                '>' => self.single(TokenKind::GreaterThan, curr_offset),
                c => {
                    return Err(LexError::UnexpectedCharacter {
                        character: c,
                        position: curr_offset,
                    }
                    .into())
                }
            };

            log::trace!("{token}");

            return Ok(token);
        }
    }

    fn number(&mut self, start_offset: usize) -> Result<Token, ParseError> {
        let end_pos = self.scan_until(self.pos, |c| !c.is_ascii_digit());

        if end_pos < self.len && is_ident_start(self.chars[end_pos].1) {
            return Err(LexError::LetterInNumber {
                position: self.chars[end_pos].0,
            }
            .into());
        }

        let end_offset = self.offset_at(end_pos);
        self.pos = end_pos;

        Ok(Token::new(
            TokenKind::Number,
            &self.buf[start_offset..end_offset],
            start_offset,
        ))
    }

    fn identifier(&mut self, start_offset: usize) -> Token {
        let end_pos = self.scan_until(self.pos, |c| !is_ident_continue(c));
        let end_offset = self.offset_at(end_pos);
        self.pos = end_pos;

        let slice = &self.buf[start_offset..end_offset];
        let kind = keyword(slice).unwrap_or(TokenKind::Identifier);

        Token::new(kind, slice, start_offset)
    }

    /// Strings run verbatim to the next double quote. An unterminated string
    /// runs to the end of input and is closed as if the quote were present;
    /// its span still stops at the end of input.
    fn string(&mut self, start_offset: usize) -> Token {
        let close_pos = self.scan_to(self.pos + 1, '"');

        if close_pos < self.len {
            let end_offset = self.chars[close_pos].0 + 1;
            self.pos = close_pos + 1;

            Token::new(
                TokenKind::String,
                &self.buf[start_offset..end_offset],
                start_offset,
            )
        } else {
            self.pos = self.len;
            let text = format!("{}\"", &self.buf[start_offset..]);

            let mut token = Token::new(TokenKind::String, text, start_offset);
            token.span.end = self.buf.len();
            token
        }
    }

    fn single(&mut self, kind: TokenKind, start_offset: usize) -> Token {
        self.pos += 1;
        Token::new(kind, &self.buf[start_offset..start_offset + 1], start_offset)
    }

    fn double(&mut self, kind: TokenKind, start_offset: usize) -> Token {
        self.pos += 2;
        Token::new(kind, &self.buf[start_offset..start_offset + 2], start_offset)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).map(|(_, c)| *c)
    }

    fn offset_at(&self, pos: usize) -> usize {
        match pos < self.len {
            true => self.chars[pos].0,
            false => self.buf.len(),
        }
    }

    /// Given a start point and a char to find, scan until the char is found
    /// and return its index. Returns the input length if never found.
    fn scan_to(&self, start: usize, char: char) -> usize {
        self.scan_until(start, |c| c == char)
    }

    /// Given the function end_func, scan the input until the func returns true,
    /// returning the index at that point.
    fn scan_until<F>(&self, start: usize, end_func: F) -> usize
    where
        F: Fn(char) -> bool,
    {
        let mut cursor = start;

        while cursor < self.len && !end_func(self.chars[cursor].1) {
            cursor += 1;
        }

        cursor
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ParseError>;

    /// Yields every token before `EOF`, then stops. Stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_token() {
            Ok(token) if token.is(TokenKind::EOF) => {
                self.finished = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
