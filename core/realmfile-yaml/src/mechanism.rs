use realmfile_model::Value;

use crate::event::{Event, ScalarStyle};
use crate::resolve::plain_stays_string;

/// An append-only event buffer the writing contexts push into.
///
/// The buffer does no balance checking; the contexts are responsible
/// for pairing their start/end events, and the emitter rejects an
/// unbalanced stream.
#[derive(Debug, Default)]
pub struct WriteMechanism {
    events: Vec<Event>,
}

impl WriteMechanism {
    pub fn start_stream(&mut self) {
        self.events.push(Event::StreamStart);
    }

    pub fn end_stream(&mut self) {
        self.events.push(Event::StreamEnd);
    }

    pub fn start_document(&mut self) {
        self.events.push(Event::DocumentStart);
    }

    pub fn end_document(&mut self) {
        self.events.push(Event::DocumentEnd);
    }

    pub fn start_mapping(&mut self) {
        self.events.push(Event::MappingStart);
    }

    pub fn end_mapping(&mut self) {
        self.events.push(Event::MappingEnd);
    }

    pub fn start_sequence(&mut self) {
        self.events.push(Event::SequenceStart);
    }

    pub fn end_sequence(&mut self) {
        self.events.push(Event::SequenceEnd);
    }

    pub fn add_key(&mut self, key: &str) {
        self.events.push(Event::Scalar {
            text: key.to_owned(),
            style: string_style(key),
        });
    }

    /// Append a scalar value. Strings that would re-resolve as some
    /// other type get quoted so `'11'` survives a write-read cycle.
    pub fn add_scalar(&mut self, value: &Value) {
        let event = match value {
            Value::Null => Event::plain("null"),
            Value::Str(text) => Event::Scalar {
                text: text.clone(),
                style: string_style(text),
            },
            other => match other.scalar_text() {
                Some(text) => Event::plain(text),
                None => Event::plain(""),
            },
        };
        self.events.push(event);
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

fn string_style(text: &str) -> ScalarStyle {
    if text.chars().any(|c| c.is_control()) {
        return ScalarStyle::DoubleQuoted;
    }
    if text.is_empty() || !plain_stays_string(text) || needs_syntactic_quoting(text) {
        return ScalarStyle::SingleQuoted;
    }
    ScalarStyle::Plain
}

// Text the scanner would misread if left plain.
fn needs_syntactic_quoting(text: &str) -> bool {
    let first = match text.chars().next() {
        Some(c) => c,
        None => return true,
    };
    if matches!(
        first,
        '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`' | '"' | '\'' | '#'
            | ',' | '?'
    ) {
        return true;
    }
    if first == '-' && (text == "-" || text.starts_with("- ")) {
        return true;
    }
    text.starts_with(' ')
        || text.ends_with(' ')
        || text.ends_with(':')
        || text.contains(": ")
        || text.contains(" #")
}
