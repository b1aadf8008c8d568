use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::entity::{
    ClientEntity, ComponentEntity, GroupEntity, ProtocolMapperEntity, RealmEntity,
};
use crate::error::{ModelError, ModelResult};

/// A parsed document value.
///
/// Scalars carry their resolved type (the document syntax decides whether
/// `11` is an integer or the string `'11'`); containers preserve insertion
/// order so a read-modify-write cycle reproduces the original key order.
/// The entity variants let specialized parsing contexts hand fully built
/// records up the stack instead of raw mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
    Components(Vec<ComponentEntity>),
    ProtocolMappers(Vec<ProtocolMapperEntity>),
    Realm(Box<RealmEntity>),
    Client(Box<ClientEntity>),
    Group(Box<GroupEntity>),
}

impl Value {
    /// True when writing this value should produce no output at all:
    /// nulls and empty containers are suppressed, never emitted as
    /// empty keys.
    pub fn is_undefined(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Sequence(items) => items.is_empty(),
            Value::Mapping(entries) => entries.is_empty(),
            Value::Components(components) => components.is_empty(),
            Value::ProtocolMappers(mappers) => mappers.is_empty(),
            _ => false,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Str(_)
                | Value::Uuid(_)
                | Value::Timestamp(_)
        )
    }

    /// Short type label for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Components(_) => "components",
            Value::ProtocolMappers(_) => "protocol mappers",
            Value::Realm(_) => "realm",
            Value::Client(_) => "client",
            Value::Group(_) => "group",
        }
    }

    /// Canonical text for a scalar, `None` for null and containers.
    ///
    /// This is the rendering the document writer uses, chosen so the
    /// text resolves back to the same scalar: floats keep their decimal
    /// point, timestamps are RFC 3339, uuids hyphenated lowercase.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) => Some(format!("{f:?}")),
            Value::Str(s) => Some(s.clone()),
            Value::Uuid(u) => Some(u.to_string()),
            Value::Timestamp(t) => Some(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    // ── coercions used by field setters and attribute contexts ──

    pub fn coerce_string(self) -> ModelResult<String> {
        self.scalar_text()
            .ok_or_else(|| ModelError::coercion("string", self.kind()))
    }

    pub fn coerce_opt_string(self) -> ModelResult<Option<String>> {
        match self {
            Value::Null => Ok(None),
            other => other.coerce_string().map(Some),
        }
    }

    pub fn coerce_bool(self) -> ModelResult<Option<bool>> {
        match self {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b)),
            other => Err(ModelError::coercion("bool", other.kind())),
        }
    }

    pub fn coerce_i64(self) -> ModelResult<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            Value::Int(n) => Ok(Some(n)),
            other => Err(ModelError::coercion("integer", other.kind())),
        }
    }

    /// A sequence of scalars, or a lone scalar promoted to a
    /// one-element list. This is the attribute convention: `a: v` and
    /// `a: [v]` read back identically.
    pub fn coerce_string_list(self) -> ModelResult<Vec<String>> {
        match self {
            Value::Null => Ok(Vec::new()),
            Value::Sequence(items) => items
                .into_iter()
                .map(Value::coerce_string)
                .collect::<ModelResult<Vec<_>>>(),
            scalar if scalar.is_scalar() => Ok(vec![scalar.coerce_string()?]),
            other => Err(ModelError::coercion("string list", other.kind())),
        }
    }

    pub fn coerce_string_list_map(self) -> ModelResult<IndexMap<String, Vec<String>>> {
        match self {
            Value::Null => Ok(IndexMap::new()),
            Value::Mapping(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((k, v.coerce_string_list()?)))
                .collect(),
            other => Err(ModelError::coercion("string list map", other.kind())),
        }
    }

    pub fn coerce_string_map(self) -> ModelResult<IndexMap<String, String>> {
        match self {
            Value::Null => Ok(IndexMap::new()),
            Value::Mapping(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((k, v.coerce_string()?)))
                .collect(),
            other => Err(ModelError::coercion("string map", other.kind())),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::Null, Value::Str)
    }
}

/// A string list as a document value: one element becomes a bare
/// scalar, anything else a sequence.
pub fn string_list_value(items: &[String]) -> Value {
    match items {
        [] => Value::Null,
        [single] => Value::Str(single.clone()),
        many => Value::Sequence(many.iter().map(|s| Value::Str(s.clone())).collect()),
    }
}

/// A string-list map as a nested document value, single-element lists
/// collapsed to bare scalars.
pub fn string_list_map_value(map: &IndexMap<String, Vec<String>>) -> Value {
    let entries: IndexMap<String, Value> = map
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), string_list_value(v)))
        .collect();
    Value::Mapping(entries)
}
