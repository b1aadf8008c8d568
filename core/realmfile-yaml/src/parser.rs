//! The event dispatcher.
//!
//! Drives a stack of [`YamlContext`]s over the event stream: one frame
//! per open container, the root context at the bottom. Keys must
//! resolve to strings; values parse in the child context the parent
//! picks, falling back to a structural default for the event kind.

use realmfile_model::Value;

use crate::context::{DefaultListContext, DefaultMapContext, YamlContext, SEQUENCE_ITEM_KEY};
use crate::error::{YamlError, YamlResult};
use crate::event::{Event, ScalarStyle};
use crate::resolve::resolve_scalar;

enum FrameKind {
    Mapping { pending_key: Option<String> },
    Sequence,
}

struct Frame {
    ctx: Box<dyn YamlContext>,
    kind: FrameKind,
}

/// Run the events through `root` and return what it parsed to.
pub fn parse_document(events: Vec<Event>, root: Box<dyn YamlContext>) -> YamlResult<Value> {
    let mut parser = Parser {
        stack: Vec::new(),
        root: Some(root),
        result: None,
    };
    for event in events {
        parser.step(event)?;
    }
    parser
        .result
        .ok_or(YamlError::UnexpectedDocument { expected: "value" })
}

struct Parser {
    stack: Vec<Frame>,
    root: Option<Box<dyn YamlContext>>,
    result: Option<Value>,
}

impl Parser {
    fn step(&mut self, event: Event) -> YamlResult<()> {
        match event {
            Event::StreamStart | Event::DocumentStart => Ok(()),
            Event::StreamEnd | Event::DocumentEnd => {
                if !self.stack.is_empty() {
                    return Err(YamlError::UnexpectedEvent {
                        event: event.name(),
                    });
                }
                if self.result.is_none() {
                    if let Some(root) = self.root.take() {
                        self.result = Some(root.into_result());
                    }
                }
                Ok(())
            }
            Event::MappingStart => {
                let ctx = self.open(true)?;
                self.stack.push(Frame {
                    ctx,
                    kind: FrameKind::Mapping { pending_key: None },
                });
                Ok(())
            }
            Event::SequenceStart => {
                let ctx = self.open(false)?;
                self.stack.push(Frame {
                    ctx,
                    kind: FrameKind::Sequence,
                });
                Ok(())
            }
            Event::MappingEnd | Event::SequenceEnd => {
                let frame = self.stack.pop().ok_or(YamlError::UnexpectedEvent {
                    event: event.name(),
                })?;
                match (&frame.kind, &event) {
                    (FrameKind::Mapping { .. }, Event::MappingEnd)
                    | (FrameKind::Sequence, Event::SequenceEnd) => {}
                    _ => {
                        return Err(YamlError::UnexpectedEvent {
                            event: event.name(),
                        })
                    }
                }
                let value = frame.ctx.into_result();
                self.merge(value)
            }
            Event::Scalar { text, style } => self.scalar(text, style),
        }
    }

    /// Pick the context for a container that just opened.
    fn open(&mut self, mapping: bool) -> YamlResult<Box<dyn YamlContext>> {
        let Some(frame) = self.stack.last() else {
            return self.root.take().ok_or(YamlError::UnexpectedEvent {
                event: "second document root",
            });
        };
        let key = match &frame.kind {
            FrameKind::Mapping {
                pending_key: Some(key),
            } => key.as_str(),
            FrameKind::Mapping { pending_key: None } => {
                return Err(YamlError::UnexpectedEvent {
                    event: "container in key position",
                });
            }
            FrameKind::Sequence => SEQUENCE_ITEM_KEY,
        };
        Ok(frame.ctx.child(key).unwrap_or_else(|| {
            if mapping {
                Box::new(DefaultMapContext::default())
            } else {
                Box::new(DefaultListContext::default())
            }
        }))
    }

    fn merge(&mut self, value: Value) -> YamlResult<()> {
        match self.stack.last_mut() {
            Some(Frame {
                ctx,
                kind: FrameKind::Mapping { pending_key },
            }) => {
                let key = pending_key.take().ok_or(YamlError::UnexpectedEvent {
                    event: "value without key",
                })?;
                ctx.add_entry(key, value)
            }
            Some(Frame {
                ctx,
                kind: FrameKind::Sequence,
            }) => ctx.add_value(value),
            None => {
                self.result = Some(value);
                Ok(())
            }
        }
    }

    fn scalar(&mut self, text: String, style: ScalarStyle) -> YamlResult<()> {
        match self.stack.last_mut() {
            Some(Frame {
                kind: FrameKind::Mapping { pending_key },
                ..
            }) if pending_key.is_none() => {
                match resolve_scalar(&text, style) {
                    Value::Str(key) => {
                        *pending_key = Some(key);
                        Ok(())
                    }
                    _ => Err(YamlError::InvalidKey { found: text }),
                }
            }
            Some(_) | None => {
                let value = resolve_scalar(&text, style);
                self.merge_scalar(value)
            }
        }
    }

    fn merge_scalar(&mut self, value: Value) -> YamlResult<()> {
        if self.stack.is_empty() {
            // bare scalar document
            return match self.root.as_mut() {
                Some(root) => root.add_value(value),
                None => Err(YamlError::UnexpectedEvent {
                    event: "second document root",
                }),
            };
        }
        self.merge(value)
    }
}
