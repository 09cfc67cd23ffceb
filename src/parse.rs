//! Minimal term parsing: a single-constant parser on [`Heap`] plus
//! the [`LocationTracker`] that follows line/column positions through
//! the input.
//!
//! The parser recognises one constant per call: either an unquoted
//! run ended by whitespace or a reserved character, or a quoted token
//! whose content is stored unescaped and re-canonicalised at
//! interning time.  Malformed or exhausted input never fails the
//! call; it allocates the reserved `$parseError` sentinel constant
//! instead, which [`Heap::is_parse_error`] detects.

use crate::cell::{Cell, HeapRef};
use crate::consts::{is_reserved, MAX_CONST_LENGTH};
use crate::heap::Heap;
use smartstring::alias::String;
use std::iter::Peekable;

/// Name of the sentinel constant allocated on parse failure.
pub const PARSE_ERROR_NAME: &str = "$parseError";

/// Tracks the 0-based line and column of the next input character.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LocationTracker {
    line: usize,
    column: usize,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts one consumed character.
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.new_line();
        } else {
            self.next_column();
        }
    }

    pub fn new_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    pub fn next_column(&mut self) {
        self.column += 1;
    }

    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }
}

fn next_char<I>(chars: &mut Peekable<I>, loc: &mut LocationTracker) -> Option<char>
where
    I: Iterator<Item = char>,
{
    let ch = chars.next()?;
    loc.advance(ch);
    Some(ch)
}

fn skip_white<I>(chars: &mut Peekable<I>, loc: &mut LocationTracker)
where
    I: Iterator<Item = char>,
{
    while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
        next_char(chars, loc);
    }
}

impl Heap {
    /// Parses one constant from the start of `input` and allocates it
    /// on the heap.  On malformed input the `$parseError` sentinel is
    /// allocated instead.
    pub fn parse(&mut self, input: &str) -> HeapRef {
        let mut loc = LocationTracker::new();
        self.parse_at(&mut input.chars().peekable(), &mut loc)
    }

    /// Parses one constant from a character stream, advancing `loc`
    /// over every consumed character.
    pub fn parse_at<I>(&mut self, chars: &mut Peekable<I>, loc: &mut LocationTracker) -> HeapRef
    where
        I: Iterator<Item = char>,
    {
        skip_white(chars, loc);
        self.parse_const(chars, loc)
    }

    fn parse_const<I>(&mut self, chars: &mut Peekable<I>, loc: &mut LocationTracker) -> HeapRef
    where
        I: Iterator<Item = char>,
    {
        let Some(first) = next_char(chars, loc) else {
            return self.parse_error(loc);
        };
        if first == '\'' {
            return self.parse_quoted(chars, loc);
        }
        if is_reserved(first) {
            return self.parse_error(loc);
        }

        let mut name = String::new();
        name.push(first);
        // the terminator stays in the stream for the next token
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() || is_reserved(ch) {
                break;
            }
            if name.len() + ch.len_utf8() >= MAX_CONST_LENGTH {
                return self.parse_error(loc);
            }
            name.push(ch);
            next_char(chars, loc);
        }
        let cref = self.consts.get_const(&name, 0);
        self.new_con(cref)
    }

    fn parse_quoted<I>(&mut self, chars: &mut Peekable<I>, loc: &mut LocationTracker) -> HeapRef
    where
        I: Iterator<Item = char>,
    {
        let mut name = String::new();
        loop {
            let Some(ch) = next_char(chars, loc) else {
                // unterminated quote
                return self.parse_error(loc);
            };
            match ch {
                '\'' => break,
                '\\' => {
                    let Some(escaped) = next_char(chars, loc) else {
                        return self.parse_error(loc);
                    };
                    match escaped {
                        '\\' | '\'' => name.push(escaped),
                        other => {
                            name.push('\\');
                            name.push(other);
                        }
                    }
                }
                other => name.push(other),
            }
            if name.len() >= MAX_CONST_LENGTH - 1 {
                return self.parse_error(loc);
            }
        }
        let cref = self.consts.get_const(&name, 0);
        self.new_con(cref)
    }

    fn parse_error(&mut self, loc: &LocationTracker) -> HeapRef {
        log::trace!(
            "parse error at line {} column {}",
            loc.line(),
            loc.column()
        );
        let cref = self.consts.get_const_no_escape(PARSE_ERROR_NAME, 0);
        self.new_con(cref)
    }

    /// Whether the term at `href` is the parse-failure sentinel.
    pub fn is_parse_error(&self, href: HeapRef) -> bool {
        let sentinel = self.consts.find_const_no_escape(PARSE_ERROR_NAME, 0);
        !sentinel.is_null() && self.deref(self.cell(href)) == Cell::Con(sentinel)
    }
}
