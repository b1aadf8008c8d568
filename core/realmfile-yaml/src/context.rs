//! The parsing/writing context protocol.
//!
//! A context is the accumulator for one nesting level of the document.
//! The dispatcher asks the current context for a child when it enters
//! a nested value, feeds scalars and finished children back in, and
//! takes the result when the level closes. Specialized contexts are
//! how one document shape becomes a different in-memory shape: the
//! same protocol drives the inverse transform on the write side.

use indexmap::IndexMap;
use realmfile_model::Value;
use tracing::warn;

use crate::error::{YamlError, YamlResult};
use crate::mechanism::WriteMechanism;

/// The child key the dispatcher uses for sequence items.
pub const SEQUENCE_ITEM_KEY: &str = "[]";

pub trait YamlContext {
    /// The context for a nested value under `key` (or an item, for
    /// [`SEQUENCE_ITEM_KEY`]). `None` lets the dispatcher pick a
    /// structural default from the next event.
    fn child(&self, _key: &str) -> Option<Box<dyn YamlContext>> {
        None
    }

    /// Accept a scalar or a finished sequence item.
    fn add_value(&mut self, value: Value) -> YamlResult<()>;

    /// Accept a finished mapping entry.
    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()>;

    /// Yield what this level parsed to.
    fn into_result(self: Box<Self>) -> Value;

    /// Write `value` the way this context reads it back. Callers skip
    /// undefined values before emitting the surrounding key, so an
    /// implementation may assume `value` is worth writing.
    fn write_value(&self, value: &Value, mech: &mut WriteMechanism) -> YamlResult<()> {
        write_plain_value(value, mech)
    }
}

/// Write a structural value: scalars, sequences, mappings. Undefined
/// mapping entries are skipped entirely, key included.
pub fn write_plain_value(value: &Value, mech: &mut WriteMechanism) -> YamlResult<()> {
    match value {
        scalar if scalar.is_scalar() => {
            mech.add_scalar(scalar);
            Ok(())
        }
        Value::Sequence(items) => {
            mech.start_sequence();
            for item in items {
                write_plain_value(item, mech)?;
            }
            mech.end_sequence();
            Ok(())
        }
        Value::Mapping(entries) => {
            mech.start_mapping();
            for (key, entry) in entries {
                if entry.is_undefined() {
                    continue;
                }
                mech.add_key(key);
                write_plain_value(entry, mech)?;
            }
            mech.end_mapping();
            Ok(())
        }
        other => Err(YamlError::Unwritable { kind: other.kind() }),
    }
}

/// Structural default for sequences: an ordered list of whatever the
/// items parse to.
#[derive(Debug, Default)]
pub struct DefaultListContext {
    items: Vec<Value>,
}

impl YamlContext for DefaultListContext {
    fn add_value(&mut self, value: Value) -> YamlResult<()> {
        self.items.push(value);
        Ok(())
    }

    fn add_entry(&mut self, _key: String, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedEvent {
            event: "mapping entry",
        })
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Sequence(self.items)
    }
}

/// Structural default for mappings: keys upsert, later wins.
#[derive(Debug, Default)]
pub struct DefaultMapContext {
    entries: IndexMap<String, Value>,
}

impl YamlContext for DefaultMapContext {
    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedEvent { event: "scalar" })
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        self.entries.insert(key, value);
        Ok(())
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Mapping(self.entries)
    }
}

/// A mapping whose values follow the attribute convention: every
/// value is a string list, a bare scalar reading as a one-element
/// list. The inverse collapse happens on the write side.
#[derive(Debug, Default)]
pub struct AttributesLikeContext {
    entries: IndexMap<String, Vec<String>>,
}

impl AttributesLikeContext {
    pub fn boxed() -> Box<dyn YamlContext> {
        Box::new(Self::default())
    }
}

impl YamlContext for AttributesLikeContext {
    fn child(&self, _key: &str) -> Option<Box<dyn YamlContext>> {
        Some(Box::new(AttributeValueContext::default()))
    }

    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedEvent { event: "scalar" })
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        let values = value.coerce_string_list()?;
        if self.entries.insert(key.clone(), values).is_some() {
            warn!(attribute = %key, "attribute listed more than once, keeping last value");
        }
        Ok(())
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Mapping(
            self.entries
                .into_iter()
                .map(|(k, v)| {
                    (
                        k,
                        Value::Sequence(v.into_iter().map(Value::Str).collect()),
                    )
                })
                .collect(),
        )
    }
}

/// One attribute's values: items stringified as they arrive, always
/// yielded as a sequence so the single-vs-many spelling downstream
/// code sees is uniform.
#[derive(Debug, Default)]
pub struct AttributeValueContext {
    values: Vec<String>,
}

impl YamlContext for AttributeValueContext {
    fn add_value(&mut self, value: Value) -> YamlResult<()> {
        self.values.push(value.coerce_string()?);
        Ok(())
    }

    fn add_entry(&mut self, _key: String, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedEvent {
            event: "mapping entry",
        })
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Sequence(self.values.into_iter().map(Value::Str).collect())
    }
}
