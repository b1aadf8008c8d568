//! Text to events.
//!
//! A line-oriented scanner for the block subset the store reads and
//! writes: nested mappings and sequences, plain and quoted one-line
//! scalars, comments, blank lines. Flow collections, anchors, tags,
//! block scalars, directives and multi-document streams are rejected
//! with the offending line number.

use crate::error::{YamlError, YamlResult};
use crate::event::{Event, ScalarStyle};

#[derive(Debug)]
struct Line {
    no: usize,
    indent: usize,
    content: String,
}

pub fn scan(input: &str) -> YamlResult<Vec<Event>> {
    let lines = logical_lines(input)?;
    let mut scanner = Scanner {
        lines,
        pos: 0,
        events: vec![Event::StreamStart, Event::DocumentStart],
    };
    if scanner.lines.is_empty() {
        scanner.events.push(Event::plain(""));
    } else {
        let indent = scanner.lines[0].indent;
        let no = scanner.lines[0].no;
        let content = scanner.lines[0].content.clone();
        if !scanner.current_is_item(indent) && split_entry(&content, no)?.is_none() {
            // bare scalar document
            scanner.events.push(flow_scalar(&content, no)?);
            scanner.pos = 1;
        } else {
            scanner.parse_block(indent)?;
        }
        if let Some(line) = scanner.lines.get(scanner.pos) {
            return Err(YamlError::scan(line.no, "content outside the root block"));
        }
    }
    scanner.events.push(Event::DocumentEnd);
    scanner.events.push(Event::StreamEnd);
    Ok(scanner.events)
}

struct Scanner {
    lines: Vec<Line>,
    pos: usize,
    events: Vec<Event>,
}

impl Scanner {
    fn parse_block(&mut self, indent: usize) -> YamlResult<()> {
        if self.current_is_item(indent) {
            self.parse_sequence(indent)
        } else {
            self.parse_mapping(indent)
        }
    }

    fn current_is_item(&self, indent: usize) -> bool {
        self.lines.get(self.pos).is_some_and(|line| {
            line.indent == indent && (line.content == "-" || line.content.starts_with("- "))
        })
    }

    fn parse_mapping(&mut self, indent: usize) -> YamlResult<()> {
        self.events.push(Event::MappingStart);
        while let Some(line) = self.lines.get(self.pos) {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(YamlError::scan(line.no, "bad indentation in mapping"));
            }
            if line.content == "-" || line.content.starts_with("- ") {
                break;
            }
            let no = line.no;
            let Some((key, key_style, rest)) = split_entry(&line.content, no)? else {
                return Err(YamlError::scan(no, "expected a `key: value` entry"));
            };
            self.events.push(Event::Scalar {
                text: key,
                style: key_style,
            });
            self.pos += 1;
            if rest.is_empty() {
                self.parse_block_value(indent, no)?;
            } else {
                self.events.push(flow_scalar(&rest, no)?);
            }
        }
        self.events.push(Event::MappingEnd);
        Ok(())
    }

    /// The value of a `key:` line with nothing inline: a deeper block,
    /// a sequence at the same indent, or null.
    fn parse_block_value(&mut self, indent: usize, _key_line: usize) -> YamlResult<()> {
        let next_indent = self.lines.get(self.pos).map(|line| line.indent);
        match next_indent {
            Some(child) if child > indent => self.parse_block(child),
            Some(_) if self.current_is_item(indent) => self.parse_sequence(indent),
            _ => {
                self.events.push(Event::plain(""));
                Ok(())
            }
        }
    }

    fn parse_sequence(&mut self, indent: usize) -> YamlResult<()> {
        self.events.push(Event::SequenceStart);
        while let Some(line) = self.lines.get(self.pos) {
            if line.indent != indent || !(line.content == "-" || line.content.starts_with("- ")) {
                if line.indent > indent {
                    return Err(YamlError::scan(line.no, "bad indentation in sequence"));
                }
                break;
            }
            let no = line.no;
            if line.content == "-" {
                self.pos += 1;
                match self.lines.get(self.pos) {
                    Some(next) if next.indent > indent => {
                        let child = next.indent;
                        self.parse_block(child)?;
                    }
                    _ => self.events.push(Event::plain("")),
                }
                continue;
            }
            let rest = line.content[2..].trim_start().to_owned();
            if split_entry(&rest, no)?.is_some() {
                // inline mapping item; re-slot the remainder as the
                // first line of a mapping two columns deeper
                self.lines[self.pos].indent = indent + 2;
                self.lines[self.pos].content = rest;
                self.parse_mapping(indent + 2)?;
            } else {
                self.events.push(flow_scalar(&rest, no)?);
                self.pos += 1;
            }
        }
        self.events.push(Event::SequenceEnd);
        Ok(())
    }
}

/// Split `key: value` / `key:`, honoring quoted keys. `None` when the
/// line is not a mapping entry (a plain sequence-item scalar).
fn split_entry(content: &str, no: usize) -> YamlResult<Option<(String, ScalarStyle, String)>> {
    if content.starts_with('\'') || content.starts_with('"') {
        let (key, style, consumed) = parse_quoted(content, no)?;
        let after = content[consumed..].trim_start();
        return match after.strip_prefix(':') {
            Some(rest) if rest.is_empty() || rest.starts_with(' ') => {
                Ok(Some((key, style, rest.trim_start().to_owned())))
            }
            _ => Ok(None),
        };
    }
    if let Some(idx) = content.find(": ") {
        let key = content[..idx].trim_end();
        if key.is_empty() {
            return Err(YamlError::scan(no, "empty mapping key"));
        }
        return Ok(Some((
            key.to_owned(),
            ScalarStyle::Plain,
            content[idx + 2..].trim_start().to_owned(),
        )));
    }
    if let Some(key) = content.strip_suffix(':') {
        let key = key.trim_end();
        if key.is_empty() {
            return Err(YamlError::scan(no, "empty mapping key"));
        }
        if key.contains(':') {
            return Err(YamlError::scan(no, "unexpected `:` in mapping key"));
        }
        return Ok(Some((key.to_owned(), ScalarStyle::Plain, String::new())));
    }
    Ok(None)
}

/// A one-line scalar in value position.
fn flow_scalar(text: &str, no: usize) -> YamlResult<Event> {
    if text.starts_with('\'') || text.starts_with('"') {
        let (value, style, consumed) = parse_quoted(text, no)?;
        if !text[consumed..].trim().is_empty() {
            return Err(YamlError::scan(no, "trailing content after quoted scalar"));
        }
        return Ok(Event::Scalar { text: value, style });
    }
    let feature = match text.chars().next() {
        Some('[' | ']' | '{' | '}') => Some("flow collections"),
        Some('&') => Some("anchors"),
        Some('*') => Some("aliases"),
        Some('!') => Some("tags"),
        Some('|' | '>') => Some("block scalars"),
        Some('%') => Some("directives"),
        Some('@' | '`') => Some("reserved indicators"),
        _ => None,
    };
    if let Some(feature) = feature {
        return Err(YamlError::Unsupported { line: no, feature });
    }
    Ok(Event::plain(text))
}

/// A quoted scalar starting at the first byte; returns the unescaped
/// text, its style, and how many bytes the quote spans.
fn parse_quoted(content: &str, no: usize) -> YamlResult<(String, ScalarStyle, usize)> {
    let mut chars = content.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('\'' | '"'))) => q,
        _ => return Err(YamlError::scan(no, "expected a quoted scalar")),
    };
    let mut out = String::new();
    while let Some((idx, c)) = chars.next() {
        if quote == '\'' {
            if c == '\'' {
                // '' is a literal quote inside single quotes
                if let Some((_, '\'')) = chars.clone().next() {
                    chars.next();
                    out.push('\'');
                    continue;
                }
                return Ok((out, ScalarStyle::SingleQuoted, idx + 1));
            }
            out.push(c);
        } else {
            match c {
                '"' => return Ok((out, ScalarStyle::DoubleQuoted, idx + 1)),
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, '0')) => out.push('\0'),
                    Some((_, '"')) => out.push('"'),
                    Some((_, '\\')) => out.push('\\'),
                    other => {
                        let what = other.map(|(_, c)| c).unwrap_or(' ');
                        return Err(YamlError::scan(no, format!("unknown escape \\{what}")));
                    }
                },
                _ => out.push(c),
            }
        }
    }
    Err(YamlError::scan(no, "unterminated quoted scalar"))
}

/// Raw text to non-blank logical lines: indent measured, comments
/// stripped, directives and document markers rejected.
fn logical_lines(input: &str) -> YamlResult<Vec<Line>> {
    let mut lines = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let no = i + 1;
        let trimmed = raw.trim_start_matches(' ');
        let indent = raw.len() - trimmed.len();
        if trimmed.starts_with('\t') {
            return Err(YamlError::scan(no, "tab character in indentation"));
        }
        let content = strip_comment(trimmed).trim_end();
        if content.is_empty() {
            continue;
        }
        if content == "---" || content.starts_with("--- ") {
            return Err(YamlError::Unsupported {
                line: no,
                feature: "document markers",
            });
        }
        if content.starts_with('%') {
            return Err(YamlError::Unsupported {
                line: no,
                feature: "directives",
            });
        }
        lines.push(Line {
            no,
            indent,
            content: content.to_owned(),
        });
    }
    Ok(lines)
}

/// Cut a trailing comment: a `#` outside quotes, at the start or after
/// whitespace.
fn strip_comment(content: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev: Option<char> = None;
    for (idx, c) in content.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => {
                if prev.is_none() || prev.is_some_and(char::is_whitespace) {
                    return &content[..idx];
                }
            }
            _ => {}
        }
        prev = Some(c);
    }
    content
}
