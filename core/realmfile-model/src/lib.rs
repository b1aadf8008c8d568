//! Typed entity model for the realm file store.
//!
//! Defines the records persisted as documents and the machinery that
//! maps them to and from document keys:
//! - [`RealmEntity`], [`ClientEntity`], [`GroupEntity`] — stored
//!   records with an optimistic-concurrency `version` stamp
//! - [`ComponentEntity`], [`ProtocolMapperEntity`] — nested records
//!   that appear in the document as mappings keyed by name
//! - [`Value`] — the tagged union parsed values travel in
//! - [`EntityFieldRegistry`] / [`MappedEntity`] — per-kind field
//!   tables driving generic parse and write
//! - [`shortcut`] — the realm keys that lift well-known attributes and
//!   key-provider components out of the generic blocks
//!
//! The document syntax itself lives in `realmfile-yaml`; persistence
//! and locking in `realmfile-store`.

mod entity;
mod error;
mod fields;
pub mod shortcut;
mod value;

pub use entity::{
    ClientEntity, ComponentEntity, GroupEntity, ProtocolMapperEntity, RealmEntity, SslRequired,
    BROWSER_HEADER_PREFIX, KEY_PROVIDER_TYPE,
};
pub use error::{ModelError, ModelResult};
pub use fields::{EntityField, EntityFieldRegistry, FieldKind, MappedEntity};
pub use value::{string_list_map_value, string_list_value, Value};
