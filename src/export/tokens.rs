//! Line tokenizer for `xmodel_export` text.
//!
//! Tokens are whitespace separated. A double-quoted token may contain spaces
//! and yields its inner text. Unquoted tokens lose trailing commas.

use std::str::FromStr;

use crate::util::{Error, Result, Vec2, Vec3, Vec4};

/// One non-blank line split into tokens.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    /// 1-based line number.
    pub number: usize,
    tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Self {
            number,
            tokens: tokenize(text),
        }
    }

    /// First token of the line.
    pub fn keyword(&self) -> &'a str {
        self.tokens.first().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, index: usize) -> Result<&'a str> {
        self.tokens.get(index).copied().ok_or_else(|| {
            self.error(format!(
                "'{}' needs at least {} values",
                self.keyword(),
                index
            ))
        })
    }

    pub fn parse<T: FromStr>(&self, index: usize) -> Result<T> {
        let token = self.token(index)?;
        token
            .parse()
            .map_err(|_| self.error(format!("invalid number '{}' in '{}'", token, self.keyword())))
    }

    pub fn vec2(&self, start: usize) -> Result<Vec2> {
        Ok(Vec2::new(self.parse(start)?, self.parse(start + 1)?))
    }

    pub fn vec3(&self, start: usize) -> Result<Vec3> {
        Ok(Vec3::new(
            self.parse(start)?,
            self.parse(start + 1)?,
            self.parse(start + 2)?,
        ))
    }

    pub fn vec4(&self, start: usize) -> Result<Vec4> {
        Ok(Vec4::new(
            self.parse(start)?,
            self.parse(start + 1)?,
            self.parse(start + 2)?,
            self.parse(start + 3)?,
        ))
    }

    pub fn error(&self, msg: impl Into<String>) -> Error {
        Error::parse(self.number, msg)
    }
}

/// Iterates the non-blank lines of a document.
pub struct LineReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    pending: Option<Line<'a>>,
    last: usize,
    total: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            pending: None,
            last: 0,
            total: text.lines().count(),
        }
    }

    /// Number of the last line handed out.
    pub fn line_number(&self) -> usize {
        self.last
    }

    /// Lines after the last one handed out, blank ones included.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.last)
    }

    /// Look at the next line without consuming it.
    pub fn peek(&mut self) -> Option<&Line<'a>> {
        if self.pending.is_none() {
            self.pending = self.advance();
        }
        self.pending.as_ref()
    }

    /// Skip lines until one starts with `keyword`.
    pub fn expect(&mut self, keyword: &str) -> Result<Line<'a>> {
        self.expect_any(&[keyword])
    }

    /// Skip lines until one starts with any of `keywords`.
    pub fn expect_any(&mut self, keywords: &[&str]) -> Result<Line<'a>> {
        for line in self.by_ref() {
            if keywords.contains(&line.keyword()) {
                return Ok(line);
            }
        }
        Err(Error::parse(
            self.last,
            format!("unexpected end of file, expected {}", keywords.join(" or ")),
        ))
    }

    fn advance(&mut self) -> Option<Line<'a>> {
        for (i, text) in self.lines.by_ref() {
            let line = Line::new(i + 1, text);
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }
}

impl<'a> Iterator for LineReader<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        let line = self.pending.take().or_else(|| self.advance())?;
        self.last = line.number;
        Some(line)
    }
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            tokens.push(&quoted[..end]);
            rest = quoted.get(end + 1..).unwrap_or_default();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let token = rest[..end].trim_end_matches(',');
            if !token.is_empty() {
                tokens.push(token);
            }
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    tokens
}
