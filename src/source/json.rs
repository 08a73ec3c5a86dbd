//! JSON Event Source
//!
//! Pull tokenizer that presents JSON through the same event vocabulary as XML:
//! - object members open a node named after their key
//! - array elements open a node named `member`
//! - scalars become a single text event with their literal text
//! - `null` opens and closes its node without text
//!
//! The root value opens no node, so `{"a":{"b":1}}` nests exactly like
//! `<a><b>1</b></a>`.

use super::events::{Event, EventSource, NodeStart};
use crate::config::ARRAY_MEMBER_NAME;
use crate::error::SourceError;
use memchr::memchr2;
use std::collections::VecDeque;
use thiserror::Error;

/// JSON syntax error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct JsonError {
    pub message: &'static str,
    pub position: usize,
}

impl JsonError {
    pub fn new(message: &'static str, position: usize) -> Self {
        JsonError { message, position }
    }
}

/// Byte scanner over the JSON input
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Skip whitespace and return the next significant byte
    #[inline]
    fn next_significant(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.peek()
    }

    fn error(&self, message: &'static str) -> JsonError {
        JsonError::new(message, self.pos)
    }

    fn expect(&mut self, byte: u8, message: &'static str) -> Result<(), JsonError> {
        if self.next_significant() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn consume_literal(&mut self, literal: &'static [u8]) -> Result<&'a str, JsonError> {
        let start = self.pos;
        if self.input[start..].starts_with(literal) {
            self.pos += literal.len();
            Ok(self.str_slice(start, self.pos))
        } else {
            Err(self.error("invalid literal"))
        }
    }

    #[inline]
    fn str_slice(&self, start: usize, end: usize) -> &'a str {
        // Input originates from a &str and slices fall on ASCII boundaries
        std::str::from_utf8(&self.input[start..end]).unwrap_or_default()
    }

    /// Read a quoted string; the scanner must sit on the opening quote
    fn read_string(&mut self) -> Result<String, JsonError> {
        self.pos += 1;
        let mut out = String::new();

        loop {
            let rest = &self.input[self.pos..];
            let Some(offset) = memchr2(b'"', b'\\', rest) else {
                return Err(self.error("unterminated string"));
            };
            let chunk = &rest[..offset];
            if chunk.iter().any(|&b| b < 0x20) {
                return Err(self.error("control character in string"));
            }
            out.push_str(self.str_slice(self.pos, self.pos + offset));
            self.pos += offset;

            if self.input[self.pos] == b'"' {
                self.pos += 1;
                return Ok(out);
            }

            self.pos += 1;
            let escape = self.peek().ok_or_else(|| self.error("unterminated escape"))?;
            self.pos += 1;
            match escape {
                b'"' => out.push('"'),
                b'\\' => out.push('\\'),
                b'/' => out.push('/'),
                b'b' => out.push('\u{0008}'),
                b'f' => out.push('\u{000C}'),
                b'n' => out.push('\n'),
                b'r' => out.push('\r'),
                b't' => out.push('\t'),
                b'u' => out.push(self.read_unicode_escape()?),
                _ => return Err(JsonError::new("invalid escape", self.pos - 1)),
            }
        }
    }

    /// Decode `XXXX` (and a trailing `\uXXXX` low surrogate when needed)
    fn read_unicode_escape(&mut self) -> Result<char, JsonError> {
        let high = self.read_hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"));
        }

        if !self.input[self.pos..].starts_with(b"\\u") {
            return Err(self.error("unpaired surrogate"));
        }
        self.pos += 2;
        let low = self.read_hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.error("unpaired surrogate"));
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn read_hex4(&mut self) -> Result<u32, JsonError> {
        let digits = self
            .input
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let mut value = 0u32;
        for &b in digits {
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| self.error("invalid unicode escape"))?;
            value = value * 16 + digit;
        }
        self.pos += 4;
        Ok(value)
    }

    /// Read a number literal verbatim, validating JSON number grammar
    fn read_number(&mut self) -> Result<&'a str, JsonError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error("invalid number")),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("invalid number"));
            }
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("invalid number"));
            }
            self.skip_digits();
        }

        Ok(self.str_slice(start, self.pos))
    }

    #[inline]
    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }
}

/// Open container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    Array,
}

/// What the tokenizer expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing emitted yet
    Init,
    /// A value (root, member value or array element)
    Value,
    /// First key of an object, or '}'
    FirstKey,
    /// Key after a comma
    Key,
    /// First array element, or ']'
    FirstElement,
    /// ',' or a closing bracket, or end of input at the root
    AfterValue,
    /// End of input reached
    Done,
}

/// JSON pull source over a borrowed document
pub struct JsonEventSource<'a> {
    scanner: Scanner<'a>,
    frames: Vec<Frame>,
    pending: VecDeque<Event>,
    state: State,
}

impl<'a> JsonEventSource<'a> {
    /// Create a source over a string document
    pub fn new(input: &'a str) -> Self {
        JsonEventSource {
            scanner: Scanner::new(input.as_bytes()),
            frames: Vec::new(),
            pending: VecDeque::with_capacity(4),
            state: State::Init,
        }
    }

    /// Byte offset of the tokenizer in the input
    pub fn position(&self) -> usize {
        self.scanner.pos
    }

    fn fill(&mut self) -> Result<(), JsonError> {
        while self.pending.is_empty() {
            self.step()?;
        }
        Ok(())
    }

    /// Advance the state machine by one token
    fn step(&mut self) -> Result<(), JsonError> {
        match self.state {
            State::Init => {
                self.pending.push_back(Event::StartDocument);
                self.state = State::Value;
            }
            State::Value => self.read_value()?,
            State::FirstKey | State::Key => {
                let byte = self.scanner.next_significant();
                if self.state == State::FirstKey && byte == Some(b'}') {
                    self.scanner.pos += 1;
                    self.close_container(Frame::Object)?;
                } else if byte == Some(b'"') {
                    let key = self.scanner.read_string()?;
                    self.scanner.expect(b':', "expected ':' after object key")?;
                    self.pending.push_back(Event::StartNode(NodeStart::new(key)));
                    self.state = State::Value;
                } else {
                    return Err(self.scanner.error("expected object key"));
                }
            }
            State::FirstElement => {
                if self.scanner.next_significant() == Some(b']') {
                    self.scanner.pos += 1;
                    self.close_container(Frame::Array)?;
                } else {
                    self.state = State::Value;
                }
            }
            State::AfterValue => {
                let byte = self.scanner.next_significant();
                match (self.frames.last().copied(), byte) {
                    (None, None) => {
                        self.pending.push_back(Event::EndDocument);
                        self.state = State::Done;
                    }
                    (None, Some(_)) => return Err(self.scanner.error("trailing characters")),
                    (Some(Frame::Object), Some(b',')) => {
                        self.scanner.pos += 1;
                        self.state = State::Key;
                    }
                    (Some(Frame::Array), Some(b',')) => {
                        self.scanner.pos += 1;
                        self.state = State::Value;
                    }
                    (Some(Frame::Object), Some(b'}')) => {
                        self.scanner.pos += 1;
                        self.close_container(Frame::Object)?;
                    }
                    (Some(Frame::Array), Some(b']')) => {
                        self.scanner.pos += 1;
                        self.close_container(Frame::Array)?;
                    }
                    (Some(Frame::Object), _) => {
                        return Err(self.scanner.error("expected ',' or '}'"))
                    }
                    (Some(Frame::Array), _) => {
                        return Err(self.scanner.error("expected ',' or ']'"))
                    }
                }
            }
            State::Done => self.pending.push_back(Event::EndDocument),
        }
        Ok(())
    }

    /// Read one value, opening a `member` node first inside arrays
    fn read_value(&mut self) -> Result<(), JsonError> {
        if self.frames.last() == Some(&Frame::Array) {
            self.pending
                .push_back(Event::StartNode(NodeStart::new(ARRAY_MEMBER_NAME)));
        }

        match self.scanner.next_significant() {
            Some(b'{') => {
                self.scanner.pos += 1;
                self.frames.push(Frame::Object);
                self.state = State::FirstKey;
                return Ok(());
            }
            Some(b'[') => {
                self.scanner.pos += 1;
                self.frames.push(Frame::Array);
                self.state = State::FirstElement;
                return Ok(());
            }
            Some(b'"') => {
                let text = self.scanner.read_string()?;
                self.pending.push_back(Event::Text(text));
            }
            Some(b't') => {
                let text = self.scanner.consume_literal(b"true")?;
                self.pending.push_back(Event::Text(text.to_string()));
            }
            Some(b'f') => {
                let text = self.scanner.consume_literal(b"false")?;
                self.pending.push_back(Event::Text(text.to_string()));
            }
            Some(b'n') => {
                self.scanner.consume_literal(b"null")?;
            }
            Some(b'-' | b'0'..=b'9') => {
                let text = self.scanner.read_number()?;
                self.pending.push_back(Event::Text(text.to_string()));
            }
            Some(_) => return Err(self.scanner.error("unexpected character")),
            None => return Err(self.scanner.error("unexpected end of input")),
        }

        self.close_member();
        Ok(())
    }

    fn close_container(&mut self, frame: Frame) -> Result<(), JsonError> {
        if self.frames.pop() != Some(frame) {
            return Err(self.scanner.error("mismatched bracket"));
        }
        self.close_member();
        Ok(())
    }

    /// A value just completed; close the node that held it unless it was the root
    fn close_member(&mut self) {
        if !self.frames.is_empty() {
            self.pending.push_back(Event::EndNode);
        }
        self.state = State::AfterValue;
    }
}

impl EventSource for JsonEventSource<'_> {
    fn peek(&mut self) -> Result<Option<&Event>, SourceError> {
        self.fill()?;
        Ok(self.pending.front())
    }

    fn next_event(&mut self) -> Result<Event, SourceError> {
        self.fill()?;
        Ok(self.pending.pop_front().unwrap_or(Event::EndDocument))
    }
}
