use chrono::{DateTime, NaiveDate, Utc};

use crate::parser::ParseError;

/// One lexical token of the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    String(String),
    /// A bare `yyyy-mm-dd` date or a full RFC 3339 instant. Dates read as
    /// midnight UTC.
    Timestamp(DateTime<Utc>),
    Identifier(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Like,
    ILike,
    In,
    Between,
    Is,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    RegexEq,
    RegexNotEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
}

/// A token with the characters it came from. Offsets count characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer { chars: input.chars().collect(), position: 0 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Lexeme>, ParseError> {
        let mut lexemes = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(ch) = self.current() else { break };
            let start = self.position;
            let token = if ch.is_ascii_digit() {
                match self.try_timestamp()? {
                    Some(token) => token,
                    None => self.lex_number(start)?,
                }
            } else if ch == '\'' || ch == '"' {
                self.lex_string(ch, start)?
            } else if ch.is_alphabetic() || ch == '_' {
                self.lex_word()
            } else {
                self.lex_symbol(ch, start)?
            };
            lexemes.push(Lexeme {
                token,
                text: self.text_from(start),
                start,
                end: self.position,
            });
        }
        Ok(lexemes)
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(|ch| ch.is_whitespace()) {
            self.advance();
        }
    }

    fn text_from(&self, start: usize) -> String {
        self.chars[start..self.position].iter().collect()
    }

    fn error(&self, message: &str, start: usize) -> ParseError {
        let end = (self.position + 1).min(self.chars.len());
        let text: String = self.chars[start..end.max(start)].iter().collect();
        ParseError::new(message, &text, start, end)
    }

    fn digits_at(&self, at: usize, count: usize) -> bool {
        (0..count).all(|i| {
            self.chars
                .get(at + i)
                .is_some_and(|ch| ch.is_ascii_digit())
        })
    }

    fn char_at(&self, at: usize) -> Option<char> {
        self.chars.get(at).copied()
    }

    // Date literals win over arithmetic: `2024-01-02` is one token, never
    // `2024 - 01 - 02`.
    fn try_timestamp(&mut self) -> Result<Option<Token>, ParseError> {
        let start = self.position;
        let shape_is_date = self.digits_at(start, 4)
            && self.char_at(start + 4) == Some('-')
            && self.digits_at(start + 5, 2)
            && self.char_at(start + 7) == Some('-')
            && self.digits_at(start + 8, 2);
        if !shape_is_date {
            return Ok(None);
        }
        let date_end = start + 10;

        // a trailing digit means this was never a date: `2024-01-023` is a
        // malformed literal, not a date and a number
        if self.char_at(date_end).is_some_and(|ch| ch.is_ascii_digit()) {
            self.position = date_end;
            return self.error("invalid date literal", start).err();
        }

        let time_follows = matches!(self.char_at(date_end), Some('T') | Some('t'))
            && self.digits_at(date_end + 1, 2);
        if !time_follows {
            self.position = date_end;
            let text = self.text_from(start);
            return match Self::parse_date(&text) {
                Some(t) => Ok(Some(Token::Timestamp(t))),
                None => self.error("invalid date literal", start).err(),
            };
        }

        // hh:mm:ss
        let mut end = date_end + 1;
        let time_ok = self.digits_at(end, 2)
            && self.char_at(end + 2) == Some(':')
            && self.digits_at(end + 3, 2)
            && self.char_at(end + 5) == Some(':')
            && self.digits_at(end + 6, 2);
        if !time_ok {
            self.position = end;
            return self.error("invalid timestamp literal", start).err();
        }
        end += 8;

        // optional fraction
        if self.char_at(end) == Some('.') && self.digits_at(end + 1, 1) {
            end += 1;
            while self.char_at(end).is_some_and(|ch| ch.is_ascii_digit()) {
                end += 1;
            }
        }

        // mandatory offset: Z or +hh:mm / -hh:mm
        match self.char_at(end) {
            Some('Z') | Some('z') => end += 1,
            Some('+') | Some('-')
                if self.digits_at(end + 1, 2)
                    && self.char_at(end + 3) == Some(':')
                    && self.digits_at(end + 4, 2) =>
            {
                end += 6;
            }
            _ => {
                self.position = end;
                return self.error("invalid timestamp literal", start).err();
            }
        }

        self.position = end;
        let text = self.text_from(start);
        match DateTime::parse_from_rfc3339(&text) {
            Ok(t) => Ok(Some(Token::Timestamp(t.with_timezone(&Utc)))),
            Err(_) => self.error("invalid timestamp literal", start).err(),
        }
    }

    fn parse_date(text: &str) -> Option<DateTime<Utc>> {
        let date: NaiveDate = text.parse().ok()?;
        Some(date.and_hms_opt(0, 0, 0)?.and_utc())
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, ParseError> {
        while self.current().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        if self.current() == Some('.') && self.peek(1).is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
            while self.current().is_some_and(|ch| ch.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.current(), Some('e') | Some('E')) {
            let mut offset = 1;
            if matches!(self.peek(1), Some('+') | Some('-')) {
                offset = 2;
            }
            if self.peek(offset).is_some_and(|ch| ch.is_ascii_digit()) {
                self.position += offset;
                while self.current().is_some_and(|ch| ch.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
        let text = self.text_from(start);
        match text.parse::<f64>() {
            Ok(n) => Ok(Token::Number(n)),
            Err(_) => self.error("invalid number literal", start).err(),
        }
    }

    fn lex_string(&mut self, quote: char, start: usize) -> Result<Token, ParseError> {
        self.advance();
        let mut value = String::new();
        while let Some(ch) = self.current() {
            if ch == quote {
                self.advance();
                return Ok(Token::String(value));
            }
            if ch == '\\' {
                self.advance();
                match self.current() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some('"') => value.push('"'),
                    _ => return self.error("invalid escape sequence", start).err(),
                }
                self.advance();
                continue;
            }
            value.push(ch);
            self.advance();
        }
        self.error("unterminated string", start).err()
    }

    fn lex_word(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else if ch == '.'
                && self
                    .peek(1)
                    .is_some_and(|next| next.is_alphabetic() || next == '_')
            {
                // dotted path: `details.age` is one identifier
                self.advance();
            } else {
                break;
            }
        }
        let word = self.text_from(start);
        match word.to_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "like" => Token::Like,
            "ilike" => Token::ILike,
            "in" => Token::In,
            "between" => Token::Between,
            "is" => Token::Is,
            "null" => Token::Null,
            "true" => Token::True,
            "false" => Token::False,
            _ => Token::Identifier(word),
        }
    }

    fn lex_symbol(&mut self, ch: char, start: usize) -> Result<Token, ParseError> {
        self.advance();
        let token = match ch {
            '=' => Token::Eq,
            '!' => match self.current() {
                Some('=') => {
                    self.advance();
                    Token::NotEq
                }
                _ => return self.error("unexpected character", start).err(),
            },
            '<' => match self.current() {
                Some('=') => {
                    self.advance();
                    Token::LtEq
                }
                Some('>') => {
                    self.advance();
                    Token::NotEq
                }
                _ => Token::Lt,
            },
            '>' => match self.current() {
                Some('=') => {
                    self.advance();
                    Token::GtEq
                }
                _ => Token::Gt,
            },
            '~' => match self.current() {
                Some('=') => {
                    self.advance();
                    Token::RegexEq
                }
                Some('!') => {
                    self.advance();
                    Token::RegexNotEq
                }
                _ => return self.error("unexpected character", start).err(),
            },
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            _ => return self.error("unexpected character", start).err(),
        };
        Ok(token)
    }
}
