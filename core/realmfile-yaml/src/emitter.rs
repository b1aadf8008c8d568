//! Events to text.
//!
//! Renders an event stream as a block document: two-space indentation,
//! sequences indented under their key, a mapping inside a sequence
//! item started inline after `- `.

use crate::error::{YamlError, YamlResult};
use crate::event::{Event, ScalarStyle};

pub fn emit(events: &[Event]) -> YamlResult<String> {
    let mut emitter = Emitter {
        out: String::new(),
        stack: Vec::new(),
        inline: false,
    };
    for event in events {
        emitter.step(event)?;
    }
    if !emitter.stack.is_empty() {
        return Err(YamlError::UnexpectedEvent {
            event: "stream end",
        });
    }
    Ok(emitter.out)
}

#[derive(Debug, Clone, Copy)]
enum FrameKind {
    Mapping { at_key: bool },
    Sequence,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    indent: usize,
}

struct Emitter {
    out: String,
    stack: Vec<Frame>,
    /// The cursor sits right after `- `; the next token starts there
    /// instead of on a fresh indented line.
    inline: bool,
}

impl Emitter {
    fn step(&mut self, event: &Event) -> YamlResult<()> {
        match event {
            Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => Ok(()),
            Event::MappingStart => self.open(FrameKind::Mapping { at_key: true }),
            Event::SequenceStart => self.open(FrameKind::Sequence),
            Event::MappingEnd | Event::SequenceEnd => {
                self.stack.pop().ok_or(YamlError::UnexpectedEvent {
                    event: event.name(),
                })?;
                Ok(())
            }
            Event::Scalar { text, style } => self.scalar(text, *style),
        }
    }

    fn open(&mut self, kind: FrameKind) -> YamlResult<()> {
        let indent = match self.stack.last_mut() {
            None => 0,
            Some(Frame {
                kind: FrameKind::Mapping { at_key },
                indent,
            }) => {
                if *at_key {
                    return Err(YamlError::Unwritable {
                        kind: "container key",
                    });
                }
                // the nested block is this key's whole value
                *at_key = true;
                let child = *indent + 2;
                self.out.push('\n');
                child
            }
            Some(Frame {
                kind: FrameKind::Sequence,
                indent,
            }) => {
                let item = *indent;
                let line = format!("{}- ", " ".repeat(item));
                if self.inline {
                    self.out.push_str("- ");
                } else {
                    self.out.push_str(&line);
                }
                self.inline = true;
                item + 2
            }
        };
        self.stack.push(Frame { kind, indent });
        Ok(())
    }

    fn scalar(&mut self, text: &str, style: ScalarStyle) -> YamlResult<()> {
        let rendered = render(text, style);
        match self.stack.last().copied() {
            None => {
                self.out.push_str(&rendered);
                self.out.push('\n');
                Ok(())
            }
            Some(Frame {
                kind: FrameKind::Mapping { at_key: true },
                indent,
            }) => {
                if self.inline {
                    self.inline = false;
                } else {
                    self.push_indent(indent);
                }
                self.out.push_str(&rendered);
                self.out.push(':');
                self.set_at_key(false);
                Ok(())
            }
            Some(Frame {
                kind: FrameKind::Mapping { at_key: false },
                ..
            }) => {
                self.out.push(' ');
                self.out.push_str(&rendered);
                self.out.push('\n');
                self.set_at_key(true);
                Ok(())
            }
            Some(Frame {
                kind: FrameKind::Sequence,
                indent,
            }) => {
                if self.inline {
                    self.inline = false;
                } else {
                    self.push_indent(indent);
                }
                self.out.push_str("- ");
                self.out.push_str(&rendered);
                self.out.push('\n');
                Ok(())
            }
        }
    }

    fn set_at_key(&mut self, value: bool) {
        if let Some(Frame {
            kind: FrameKind::Mapping { at_key },
            ..
        }) = self.stack.last_mut()
        {
            *at_key = value;
        }
    }

    fn push_indent(&mut self, indent: usize) {
        for _ in 0..indent {
            self.out.push(' ');
        }
    }
}

fn render(text: &str, style: ScalarStyle) -> String {
    match style {
        ScalarStyle::Plain => text.to_owned(),
        ScalarStyle::SingleQuoted => format!("'{}'", text.replace('\'', "''")),
        ScalarStyle::DoubleQuoted => {
            let mut out = String::with_capacity(text.len() + 2);
            out.push('"');
            for c in text.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    '\0' => out.push_str("\\0"),
                    _ => out.push(c),
                }
            }
            out.push('"');
            out
        }
    }
}
