/// How a scalar was (or should be) spelled in the document.
///
/// Quoting is semantic: a quoted scalar is always a string, while a
/// plain one goes through implicit type resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

/// One step of a document stream.
///
/// The scanner produces these from text, the writer collects them into
/// a buffer, and the emitter renders them back to text. Both sides
/// share this vocabulary so the parsing contexts never see syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    MappingStart,
    MappingEnd,
    SequenceStart,
    SequenceEnd,
    Scalar { text: String, style: ScalarStyle },
}

impl Event {
    pub fn plain(text: impl Into<String>) -> Self {
        Event::Scalar {
            text: text.into(),
            style: ScalarStyle::Plain,
        }
    }

    /// Event name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Event::StreamStart => "stream start",
            Event::StreamEnd => "stream end",
            Event::DocumentStart => "document start",
            Event::DocumentEnd => "document end",
            Event::MappingStart => "mapping start",
            Event::MappingEnd => "mapping end",
            Event::SequenceStart => "sequence start",
            Event::SequenceEnd => "sequence end",
            Event::Scalar { .. } => "scalar",
        }
    }
}
