//! Best-effort reading of tool arguments that are still streaming.
//!
//! While the model streams a tool call, its argument JSON is usually cut off
//! mid-value (`{"path": "/src/ma`). [`parse_partial_object`] reads such text
//! as far as it goes, closing open strings and containers, and reports the
//! fields seen so far. Text that is not merely truncated but malformed falls
//! back to scraping `"key": "value` pairs with a regex.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Nesting limit for the tolerant parser, as in serde_json.
const MAX_DEPTH: usize = 128;

/// Matches `"key": "value` where the value may be unterminated.
static STRING_FIELD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([A-Za-z0-9_\-]+)"\s*:\s*"((?:[^"\\]|\\.)*)"#).unwrap()
});

/// Parse a possibly truncated JSON object.
///
/// Returns `None` when the text does not start an object, is malformed
/// before the point of truncation, or nests deeper than 128 levels.
pub fn parse_partial_object(text: &str) -> Option<Map<String, Value>> {
    let mut parser = PartialParser::new(text);
    parser.skip_ws();
    if parser.chars.peek() != Some(&'{') {
        return None;
    }
    match parser.parse_value()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Best-effort string value of the first of `keys` present in `text`.
///
/// Tries the tolerant parser first, then the regex scrape.
pub fn partial_string_field(text: &str, keys: &[&str]) -> Option<String> {
    if let Some(map) = parse_partial_object(text) {
        return keys.iter().find_map(|key| {
            map.get(*key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        });
    }
    scrape_string_field(text, keys)
}

/// Regex scrape of `"key": "value` pairs, used for malformed text.
pub fn scrape_string_field(text: &str, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        STRING_FIELD_REGEX
            .captures_iter(text)
            .find(|caps| caps.get(1).map(|m| m.as_str()) == Some(*key))
            .and_then(|caps| caps.get(2))
            .map(|m| unescape_lossy(m.as_str()))
            .filter(|s| !s.trim().is_empty())
    })
}

/// Decode common JSON escapes, leaving anything unrecognised as-is.
fn unescape_lossy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Recursive-descent parser that treats end of input as "close everything".
struct PartialParser<'a> {
    chars: Peekable<Chars<'a>>,
    /// Set once input ran out; every open value is then returned as-is.
    truncated: bool,
    /// Open containers.
    depth: usize,
}

impl<'a> PartialParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            truncated: false,
            depth: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    /// Next non-whitespace character, marking truncation at end of input.
    fn peek_token(&mut self) -> Option<char> {
        self.skip_ws();
        let next = self.chars.peek().copied();
        if next.is_none() {
            self.truncated = true;
        }
        next
    }

    /// `None` means malformed, too deep, or truncated before any value began.
    fn parse_value(&mut self) -> Option<Value> {
        match self.peek_token()? {
            '{' => self.nested(Self::parse_object).map(Value::Object),
            '[' => self.nested(Self::parse_array).map(Value::Array),
            '"' => self.parse_string().map(Value::String),
            't' => self.parse_literal("true", Value::Bool(true)),
            'f' => self.parse_literal("false", Value::Bool(false)),
            'n' => self.parse_literal("null", Value::Null),
            c if c == '-' || c.is_ascii_digit() => self.parse_number(),
            _ => None,
        }
    }

    /// Run a container parser one level deeper. Exceeding the limit is
    /// treated as malformed, so it is never mistaken for truncation.
    fn nested<T>(&mut self, parse: fn(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            self.truncated = false;
            return None;
        }
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn parse_object(&mut self) -> Option<Map<String, Value>> {
        self.chars.next(); // '{'
        let mut map = Map::new();
        loop {
            match self.peek_token() {
                None => return Some(map),
                Some('}') => {
                    self.chars.next();
                    return Some(map);
                }
                Some('"') => {}
                Some(_) => return None,
            }

            let key = self.parse_string()?;
            if self.truncated {
                return Some(map);
            }

            match self.peek_token() {
                None => return Some(map),
                Some(':') => {
                    self.chars.next();
                }
                Some(_) => return None,
            }

            match self.parse_value() {
                Some(value) => {
                    map.insert(key, value);
                }
                None if self.truncated => return Some(map),
                None => return None,
            }
            if self.truncated {
                return Some(map);
            }

            match self.peek_token() {
                None => return Some(map),
                Some(',') => {
                    self.chars.next();
                }
                Some('}') => {
                    self.chars.next();
                    return Some(map);
                }
                Some(_) => return None,
            }
        }
    }

    fn parse_array(&mut self) -> Option<Vec<Value>> {
        self.chars.next(); // '['
        let mut items = Vec::new();
        loop {
            match self.peek_token() {
                None => return Some(items),
                Some(']') => {
                    self.chars.next();
                    return Some(items);
                }
                Some(_) => {}
            }

            match self.parse_value() {
                Some(value) => items.push(value),
                None if self.truncated => return Some(items),
                None => return None,
            }
            if self.truncated {
                return Some(items);
            }

            match self.peek_token() {
                None => return Some(items),
                Some(',') => {
                    self.chars.next();
                }
                Some(']') => {
                    self.chars.next();
                    return Some(items);
                }
                Some(_) => return None,
            }
        }
    }

    /// Parse a string; an unterminated string yields what was read.
    fn parse_string(&mut self) -> Option<String> {
        self.chars.next(); // opening quote
        let mut out = String::new();
        loop {
            let Some(c) = self.chars.next() else {
                self.truncated = true;
                return Some(out);
            };
            match c {
                '"' => return Some(out),
                '\\' => {
                    let Some(escaped) = self.chars.next() else {
                        self.truncated = true;
                        return Some(out);
                    };
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'u' => {
                            let hex: String = self.chars.by_ref().take(4).collect();
                            if hex.len() < 4 {
                                self.truncated = true;
                                return Some(out);
                            }
                            let code = u32::from_str_radix(&hex, 16).ok()?;
                            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                        }
                        other => out.push(other),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn parse_literal(&mut self, literal: &str, value: Value) -> Option<Value> {
        for expected in literal.chars() {
            match self.chars.next() {
                Some(c) if c == expected => {}
                Some(_) => return None,
                None => {
                    self.truncated = true;
                    return None;
                }
            }
        }
        Some(value)
    }

    fn parse_number(&mut self) -> Option<Value> {
        let mut raw = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                raw.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if self.chars.peek().is_none() {
            self.truncated = true;
        }

        if let Ok(int) = raw.parse::<i64>() {
            return Some(Value::Number(int.into()));
        }
        let float = raw.trim_end_matches(['e', 'E', '+', '-', '.']).parse::<f64>().ok()?;
        Number::from_f64(float).map(Value::Number)
    }
}
