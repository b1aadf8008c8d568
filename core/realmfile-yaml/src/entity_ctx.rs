//! Registry-driven entity mapping context.

use realmfile_model::{EntityField, FieldKind, MappedEntity, Value};
use tracing::warn;

use crate::context::{write_plain_value, AttributesLikeContext, YamlContext};
use crate::error::YamlResult;
use crate::mechanism::WriteMechanism;

/// Parses a document mapping into an entity through its field
/// registry. Entity kinds with nested collections or shortcuts wrap
/// this and route those keys to their own contexts first.
#[derive(Default)]
pub struct MapEntityContext<E: MappedEntity> {
    pub entity: E,
}

impl<E: MappedEntity> MapEntityContext<E> {
    /// Registry-based child lookup for the plain field kinds.
    pub fn child_for(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        match E::registry().field(key)?.kind {
            FieldKind::StringListMap => Some(AttributesLikeContext::boxed()),
            // lists and scalars parse fine in the structural defaults;
            // entity collections are routed by the wrapping context
            FieldKind::List | FieldKind::Scalar | FieldKind::Entities => None,
        }
    }

    /// Route one finished entry into the entity, dropping unknown keys
    /// with a warning.
    pub fn apply(&mut self, key: String, value: Value) -> YamlResult<()> {
        if !E::registry().apply(&mut self.entity, &key, value)? {
            warn!(kind = E::KIND, key = %key, "ignoring unknown document key");
        }
        Ok(())
    }
}

impl<E: MappedEntity> YamlContext for MapEntityContext<E> {
    fn child(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        self.child_for(key)
    }

    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(crate::error::YamlError::UnexpectedDocument {
            expected: "mapping",
        })
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        self.apply(key, value)
    }

    fn into_result(self: Box<Self>) -> Value {
        self.entity.into_value()
    }
}

/// Write an entity's fields in registry order. `special` sees every
/// field before the generic path and returns `Ok(true)` to claim it;
/// the generic path skips undefined values, key and all.
pub fn write_entity_fields<E: MappedEntity>(
    entity: &E,
    mech: &mut WriteMechanism,
    mut special: impl FnMut(&EntityField<E>, &Value, &mut WriteMechanism) -> YamlResult<bool>,
) -> YamlResult<()> {
    for field in E::registry().fields() {
        let value = (field.get)(entity);
        if special(field, &value, mech)? {
            continue;
        }
        if value.is_undefined() {
            continue;
        }
        mech.add_key(field.name);
        write_plain_value(&value, mech)?;
    }
    Ok(())
}
