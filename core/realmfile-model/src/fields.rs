use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::warn;

use crate::entity::{ClientEntity, GroupEntity, RealmEntity};
use crate::error::{ModelError, ModelResult};
use crate::value::{string_list_value, Value};

/// How a field participates in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single scalar value; a repeated key overwrites with a warning.
    Scalar,
    /// Ordered string list, always written as a sequence.
    List,
    /// String-list map following the attribute convention (single
    /// values collapse to bare scalars on write).
    StringListMap,
    /// Nested entity collection handled by a specialized context.
    Entities,
}

/// One named field of an entity: its document key, shape, and typed
/// accessors.
pub struct EntityField<E> {
    pub name: &'static str,
    pub kind: FieldKind,
    pub get: fn(&E) -> Value,
    pub set: fn(&mut E, Value) -> ModelResult<()>,
}

/// The ordered, immutable field table of one entity kind.
///
/// Order is document order on write; lookup is by document key on
/// read. Built once behind a `LazyLock`, never mutated after.
pub struct EntityFieldRegistry<E: 'static> {
    fields: Vec<EntityField<E>>,
    by_name: HashMap<&'static str, usize>,
}

impl<E> EntityFieldRegistry<E> {
    fn new(fields: Vec<EntityField<E>>) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name, i))
            .collect();
        Self { fields, by_name }
    }

    pub fn field(&self, name: &str) -> Option<&EntityField<E>> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn fields(&self) -> impl Iterator<Item = &EntityField<E>> {
        self.fields.iter()
    }

    /// Route a parsed value into the named field. Returns `Ok(false)`
    /// for unknown names so callers can skip the key and carry on;
    /// repeated scalar keys warn and take the last value.
    pub fn apply(&self, entity: &mut E, name: &str, value: Value) -> ModelResult<bool> {
        let Some(field) = self.field(name) else {
            return Ok(false);
        };
        if field.kind == FieldKind::Scalar && !(field.get)(entity).is_undefined() {
            warn!(field = name, "field set more than once, keeping last value");
        }
        (field.set)(entity, value)?;
        Ok(true)
    }
}

/// An entity kind with a field registry, parseable from and writable
/// to a document mapping.
pub trait MappedEntity: Default + 'static {
    /// Entity kind label used in logs and error messages.
    const KIND: &'static str;

    fn registry() -> &'static EntityFieldRegistry<Self>;

    /// Wrap the finished entity as a document value.
    fn into_value(self) -> Value;
}

fn opt_bool_value(v: Option<bool>) -> Value {
    v.map_or(Value::Null, Value::Bool)
}

fn opt_i64_value(v: Option<i64>) -> Value {
    v.map_or(Value::Null, Value::Int)
}

fn string_seq_value(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::Str(s.clone())).collect())
}

fn string_list_map_raw(map: &indexmap::IndexMap<String, Vec<String>>) -> Value {
    Value::Mapping(
        map.iter()
            .map(|(k, v)| (k.clone(), string_list_value(v)))
            .collect(),
    )
}

static REALM_FIELDS: LazyLock<EntityFieldRegistry<RealmEntity>> = LazyLock::new(|| {
    EntityFieldRegistry::new(vec![
        EntityField {
            name: "id",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.id.clone()),
            set: |e, v| {
                e.id = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "name",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.name.clone()),
            set: |e, v| {
                e.name = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "enabled",
            kind: FieldKind::Scalar,
            get: |e| opt_bool_value(e.enabled),
            set: |e, v| {
                e.enabled = v.coerce_bool()?;
                Ok(())
            },
        },
        EntityField {
            name: "notBefore",
            kind: FieldKind::Scalar,
            get: |e| opt_i64_value(e.not_before),
            set: |e, v| {
                e.not_before = v.coerce_i64()?;
                Ok(())
            },
        },
        EntityField {
            name: "sslRequired",
            kind: FieldKind::Scalar,
            get: |e| match e.ssl_required {
                Some(s) => Value::Str(s.to_string()),
                None => Value::Null,
            },
            set: |e, v| {
                e.ssl_required = v.coerce_opt_string()?.map(|s| s.parse()).transpose()?;
                Ok(())
            },
        },
        EntityField {
            name: "attributes",
            kind: FieldKind::StringListMap,
            get: |e| string_list_map_raw(&e.attributes),
            set: |e, v| {
                e.attributes.extend(v.coerce_string_list_map()?);
                Ok(())
            },
        },
        EntityField {
            name: "components",
            kind: FieldKind::Entities,
            get: |e| Value::Components(e.components.clone()),
            set: |e, v| match v {
                Value::Null => Ok(()),
                Value::Components(components) => {
                    e.components.extend(components);
                    Ok(())
                }
                other => Err(ModelError::coercion("components", other.kind())),
            },
        },
    ])
});

static CLIENT_FIELDS: LazyLock<EntityFieldRegistry<ClientEntity>> = LazyLock::new(|| {
    EntityFieldRegistry::new(vec![
        EntityField {
            name: "id",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.id.clone()),
            set: |e, v| {
                e.id = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "clientId",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.client_id.clone()),
            set: |e, v| {
                e.client_id = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "realmId",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.realm_id.clone()),
            set: |e, v| {
                e.realm_id = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "enabled",
            kind: FieldKind::Scalar,
            get: |e| opt_bool_value(e.enabled),
            set: |e, v| {
                e.enabled = v.coerce_bool()?;
                Ok(())
            },
        },
        EntityField {
            name: "protocol",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.protocol.clone()),
            set: |e, v| {
                e.protocol = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "redirectUris",
            kind: FieldKind::List,
            get: |e| string_seq_value(&e.redirect_uris),
            set: |e, v| {
                e.redirect_uris.extend(v.coerce_string_list()?);
                Ok(())
            },
        },
        EntityField {
            name: "protocolMappers",
            kind: FieldKind::Entities,
            get: |e| Value::ProtocolMappers(e.protocol_mappers.clone()),
            set: |e, v| match v {
                Value::Null => Ok(()),
                Value::ProtocolMappers(mappers) => {
                    e.protocol_mappers.extend(mappers);
                    Ok(())
                }
                other => Err(ModelError::coercion("protocol mappers", other.kind())),
            },
        },
        EntityField {
            name: "attributes",
            kind: FieldKind::StringListMap,
            get: |e| string_list_map_raw(&e.attributes),
            set: |e, v| {
                e.attributes.extend(v.coerce_string_list_map()?);
                Ok(())
            },
        },
    ])
});

static GROUP_FIELDS: LazyLock<EntityFieldRegistry<GroupEntity>> = LazyLock::new(|| {
    EntityFieldRegistry::new(vec![
        EntityField {
            name: "id",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.id.clone()),
            set: |e, v| {
                e.id = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "name",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.name.clone()),
            set: |e, v| {
                e.name = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "realmId",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.realm_id.clone()),
            set: |e, v| {
                e.realm_id = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "parentId",
            kind: FieldKind::Scalar,
            get: |e| Value::from(e.parent_id.clone()),
            set: |e, v| {
                e.parent_id = v.coerce_opt_string()?;
                Ok(())
            },
        },
        EntityField {
            name: "grantedRoles",
            kind: FieldKind::List,
            get: |e| string_seq_value(&e.granted_roles),
            set: |e, v| {
                e.granted_roles.extend(v.coerce_string_list()?);
                Ok(())
            },
        },
        EntityField {
            name: "attributes",
            kind: FieldKind::StringListMap,
            get: |e| string_list_map_raw(&e.attributes),
            set: |e, v| {
                e.attributes.extend(v.coerce_string_list_map()?);
                Ok(())
            },
        },
    ])
});

impl MappedEntity for RealmEntity {
    const KIND: &'static str = "realm";

    fn registry() -> &'static EntityFieldRegistry<Self> {
        &REALM_FIELDS
    }

    fn into_value(self) -> Value {
        Value::Realm(Box::new(self))
    }
}

impl MappedEntity for ClientEntity {
    const KIND: &'static str = "client";

    fn registry() -> &'static EntityFieldRegistry<Self> {
        &CLIENT_FIELDS
    }

    fn into_value(self) -> Value {
        Value::Client(Box::new(self))
    }
}

impl MappedEntity for GroupEntity {
    const KIND: &'static str = "group";

    fn registry() -> &'static EntityFieldRegistry<Self> {
        &GROUP_FIELDS
    }

    fn into_value(self) -> Value {
        Value::Group(Box::new(self))
    }
}
