//! Block-style document parser and writer for realm store records.
//!
//! # Architecture
//!
//! Reading and writing share one event vocabulary ([`Event`]):
//! - [`scan`] turns text into events; [`emit`] turns events back into
//!   text
//! - [`parse_document`] dispatches events through a stack of
//!   [`YamlContext`]s, each context the accumulator for one nesting
//!   level
//! - [`WriteMechanism`] is the append-only event buffer the writing
//!   side of each context fills
//!
//! The per-entity context assemblies ([`RealmContext`],
//! [`ClientContext`], [`GroupContext`]) wire the contexts for each
//! record kind behind `parse_*`/`write_*` entry points. Transforms
//! that are lossy in one direction (bare
//! scalar vs one-element list, prefix shortcuts, mapping-keyed entity
//! collections) are inverted by the matching context pair, so
//! `parse(write(e))` reproduces `e`.

mod client;
mod context;
mod emitter;
mod entity_ctx;
mod error;
mod event;
mod group;
mod mechanism;
mod parser;
mod realm;
mod resolve;
mod scanner;

pub use client::{parse_client, write_client, ClientContext, ProtocolMappersContext};
pub use context::{
    write_plain_value, AttributeValueContext, AttributesLikeContext, DefaultListContext,
    DefaultMapContext, YamlContext, SEQUENCE_ITEM_KEY,
};
pub use emitter::emit;
pub use entity_ctx::{write_entity_fields, MapEntityContext};
pub use error::{YamlError, YamlResult};
pub use event::{Event, ScalarStyle};
pub use group::{parse_group, write_group, GroupContext};
pub use mechanism::WriteMechanism;
pub use parser::parse_document;
pub use realm::{parse_realm, write_realm, ComponentsContext, KeysContext, RealmContext};
pub use resolve::{resolve_plain, resolve_scalar};
pub use scanner::scan;
