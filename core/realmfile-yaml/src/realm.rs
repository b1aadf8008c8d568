//! Realm documents.
//!
//! The realm mapping is registry-driven except for three shortcut keys
//! (`browserHeaders`, `displayName`, `keys`) that lift well-known
//! attributes and key-provider components out of the generic blocks,
//! and the `components` block, whose document shape is a mapping keyed
//! by component name rather than a list.

use indexmap::IndexMap;
use realmfile_model::shortcut::{
    realm_shortcut, take_attribute, take_key_components, take_prefixed, ShortcutKind,
};
use realmfile_model::{
    string_list_map_value, string_list_value, ComponentEntity, MappedEntity, ModelError,
    RealmEntity, Value, BROWSER_HEADER_PREFIX, KEY_PROVIDER_TYPE,
};
use tracing::warn;

use crate::context::{
    write_plain_value, AttributeValueContext, AttributesLikeContext, YamlContext,
};
use crate::entity_ctx::{write_entity_fields, MapEntityContext};
use crate::error::{YamlError, YamlResult};
use crate::mechanism::WriteMechanism;
use crate::{emitter, parser, scanner};

/// Parse one realm document.
pub fn parse_realm(input: &str) -> YamlResult<RealmEntity> {
    let events = scanner::scan(input)?;
    match parser::parse_document(events, Box::new(RealmContext::default()))? {
        Value::Realm(realm) => Ok(*realm),
        _ => Err(YamlError::UnexpectedDocument {
            expected: "realm mapping",
        }),
    }
}

/// Write one realm document.
pub fn write_realm(realm: &RealmEntity) -> YamlResult<String> {
    let mut mech = WriteMechanism::default();
    mech.start_stream();
    mech.start_document();
    RealmContext::default().write_value(&Value::Realm(Box::new(realm.clone())), &mut mech)?;
    mech.end_document();
    mech.end_stream();
    emitter::emit(&mech.into_events())
}

#[derive(Default)]
pub struct RealmContext {
    inner: MapEntityContext<RealmEntity>,
}

impl YamlContext for RealmContext {
    fn child(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        match key {
            "attributes" | "browserHeaders" => Some(AttributesLikeContext::boxed()),
            "keys" => Some(Box::new(KeysContext::default())),
            "components" => Some(Box::new(ComponentsContext::default())),
            _ => self.inner.child_for(key),
        }
    }

    fn add_value(&mut self, value: Value) -> YamlResult<()> {
        // an empty document scans as one null scalar
        match value {
            Value::Null => Ok(()),
            _ => Err(YamlError::UnexpectedDocument {
                expected: "realm mapping",
            }),
        }
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        let Some(shortcut) = realm_shortcut(&key) else {
            return self.inner.apply(key, value);
        };
        let realm = &mut self.inner.entity;
        match shortcut.kind {
            ShortcutKind::Singleton { attribute } => {
                let values = value.coerce_string_list()?;
                if !values.is_empty() {
                    realm.attributes.insert(attribute.to_owned(), values);
                }
                Ok(())
            }
            ShortcutKind::Prefixed { prefix } => {
                for (name, values) in value.coerce_string_list_map()? {
                    realm.attributes.insert(format!("{prefix}{name}"), values);
                }
                Ok(())
            }
            ShortcutKind::KeyComponents => match value {
                Value::Null => Ok(()),
                Value::Components(components) => {
                    realm.components.extend(components);
                    Ok(())
                }
                other => Err(ModelError::coercion("key components", other.kind()).into()),
            },
        }
    }

    fn into_result(self: Box<Self>) -> Value {
        self.inner.entity.into_value()
    }

    fn write_value(&self, value: &Value, mech: &mut WriteMechanism) -> YamlResult<()> {
        let Value::Realm(realm) = value else {
            return Err(YamlError::Unwritable { kind: value.kind() });
        };
        // pull the shortcut slices out so the generic blocks see the
        // complement; shortcut keys land just before `attributes`, in
        // key order
        let mut realm = realm.as_ref().clone();
        let headers = take_prefixed(&mut realm.attributes, BROWSER_HEADER_PREFIX);
        let display = take_attribute(&mut realm.attributes, "displayName").unwrap_or_default();
        let keys = take_key_components(&mut realm.components);

        mech.start_mapping();
        write_entity_fields(&realm, mech, |field, value, mech| match field.name {
            "attributes" => {
                if !headers.is_empty() {
                    mech.add_key("browserHeaders");
                    AttributesLikeContext::default()
                        .write_value(&string_list_map_value(&headers), mech)?;
                }
                if !display.is_empty() {
                    mech.add_key("displayName");
                    AttributeValueContext::default()
                        .write_value(&string_list_value(&display), mech)?;
                }
                if !keys.is_empty() {
                    mech.add_key("keys");
                    let flat: Vec<ComponentEntity> =
                        keys.values().flat_map(|group| group.iter().cloned()).collect();
                    KeysContext::default().write_value(&Value::Components(flat), mech)?;
                }
                if !value.is_undefined() {
                    mech.add_key("attributes");
                    AttributesLikeContext::default().write_value(value, mech)?;
                }
                Ok(true)
            }
            "components" => {
                if !value.is_undefined() {
                    mech.add_key("components");
                    ComponentsContext::default().write_value(value, mech)?;
                }
                Ok(true)
            }
            _ => Ok(false),
        })?;
        mech.end_mapping();
        Ok(())
    }
}

/// The `components` block: a document mapping keyed by component name,
/// each entry a flat mapping of the reserved keys plus config values.
#[derive(Debug, Default)]
pub struct ComponentsContext {
    components: Vec<ComponentEntity>,
}

impl YamlContext for ComponentsContext {
    fn child(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        Some(Box::new(ComponentContext::named(key)))
    }

    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedDocument {
            expected: "components mapping",
        })
    }

    fn add_entry(&mut self, _key: String, value: Value) -> YamlResult<()> {
        match value {
            Value::Null => Ok(()),
            Value::Components(components) => {
                self.components.extend(components);
                Ok(())
            }
            other => Err(ModelError::coercion("component", other.kind()).into()),
        }
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Components(self.components)
    }

    fn write_value(&self, value: &Value, mech: &mut WriteMechanism) -> YamlResult<()> {
        let Value::Components(components) = value else {
            return Err(YamlError::Unwritable { kind: value.kind() });
        };
        mech.start_mapping();
        for component in components {
            // an empty key would read back as a phantom `""` record
            let Some(name) = component.name.as_deref().or(component.id.as_deref()) else {
                return Err(ModelError::InvalidField {
                    field: "name".into(),
                    reason: "component has neither name nor id".into(),
                }
                .into());
            };
            mech.add_key(name);
            mech.start_mapping();
            if let Some(provider_id) = &component.provider_id {
                mech.add_key("providerId");
                mech.add_scalar(&Value::Str(provider_id.clone()));
            }
            if let Some(provider_type) = &component.provider_type {
                mech.add_key("providerType");
                mech.add_scalar(&Value::Str(provider_type.clone()));
            }
            for (key, values) in &component.config {
                if values.is_empty() {
                    continue;
                }
                mech.add_key(key);
                write_plain_value(&string_list_value(values), mech)?;
            }
            mech.end_mapping();
        }
        mech.end_mapping();
        Ok(())
    }
}

/// One named component entry. Id and name come from the mapping key;
/// `providerId` and `providerType` are reserved; every other key is a
/// config value.
#[derive(Debug)]
struct ComponentContext {
    component: ComponentEntity,
}

impl ComponentContext {
    fn named(name: &str) -> Self {
        let mut component = ComponentEntity::new(name);
        component.id = Some(name.to_owned());
        Self { component }
    }
}

impl YamlContext for ComponentContext {
    fn child(&self, _key: &str) -> Option<Box<dyn YamlContext>> {
        Some(Box::new(AttributeValueContext::default()))
    }

    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedDocument {
            expected: "component mapping",
        })
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        match key.as_str() {
            "providerId" => {
                self.component.provider_id = value.coerce_opt_string()?;
                Ok(())
            }
            "providerType" => {
                self.component.provider_type = value.coerce_opt_string()?;
                Ok(())
            }
            "id" | "name" => {
                warn!(key = %key, "ignoring reserved component key, the mapping key wins");
                Ok(())
            }
            _ => {
                self.component.config.insert(key, value.coerce_string_list()?);
                Ok(())
            }
        }
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Components(vec![self.component])
    }
}

/// The `keys` shortcut block: key-provider components grouped by
/// provider id, each group a sequence of config mappings.
#[derive(Debug, Default)]
pub struct KeysContext {
    components: Vec<ComponentEntity>,
}

impl YamlContext for KeysContext {
    fn child(&self, _key: &str) -> Option<Box<dyn YamlContext>> {
        Some(Box::new(KeyProviderContext::default()))
    }

    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedDocument {
            expected: "keys mapping",
        })
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        match value {
            Value::Null => Ok(()),
            Value::Components(components) => {
                for mut component in components {
                    component.provider_id = Some(key.clone());
                    component.provider_type = Some(KEY_PROVIDER_TYPE.to_owned());
                    self.components.push(component);
                }
                Ok(())
            }
            other => Err(ModelError::coercion("key components", other.kind()).into()),
        }
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Components(self.components)
    }

    fn write_value(&self, value: &Value, mech: &mut WriteMechanism) -> YamlResult<()> {
        let Value::Components(components) = value else {
            return Err(YamlError::Unwritable { kind: value.kind() });
        };
        // regroup by provider id; callers hand these over pre-sorted
        let mut grouped: IndexMap<&str, Vec<&ComponentEntity>> = IndexMap::new();
        for component in components {
            let Some(provider) = component.provider_id.as_deref() else {
                return Err(ModelError::InvalidField {
                    field: "providerId".into(),
                    reason: "key component has no provider id".into(),
                }
                .into());
            };
            grouped.entry(provider).or_default().push(component);
        }
        mech.start_mapping();
        for (provider, group) in grouped {
            mech.add_key(provider);
            mech.start_sequence();
            for component in group {
                write_plain_value(&string_list_map_value(&component.config), mech)?;
            }
            mech.end_sequence();
        }
        mech.end_mapping();
        Ok(())
    }
}

/// One provider's entries under `keys`: a sequence of config mappings.
/// Ids and names are storage concerns, not document data, so the
/// parsed components carry neither.
#[derive(Debug, Default)]
struct KeyProviderContext {
    components: Vec<ComponentEntity>,
}

impl YamlContext for KeyProviderContext {
    fn child(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        if key == crate::context::SEQUENCE_ITEM_KEY {
            Some(Box::new(KeyComponentContext::default()))
        } else {
            None
        }
    }

    fn add_value(&mut self, value: Value) -> YamlResult<()> {
        match value {
            Value::Null => Ok(()),
            Value::Components(components) => {
                self.components.extend(components);
                Ok(())
            }
            other => Err(ModelError::coercion("key component", other.kind()).into()),
        }
    }

    fn add_entry(&mut self, _key: String, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedDocument {
            expected: "key entry sequence",
        })
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Components(self.components)
    }
}

/// A single key entry: nothing but config values.
#[derive(Debug, Default)]
struct KeyComponentContext {
    config: IndexMap<String, Vec<String>>,
}

impl YamlContext for KeyComponentContext {
    fn child(&self, _key: &str) -> Option<Box<dyn YamlContext>> {
        Some(Box::new(AttributeValueContext::default()))
    }

    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedDocument {
            expected: "key entry mapping",
        })
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        self.config.insert(key, value.coerce_string_list()?);
        Ok(())
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::Components(vec![ComponentEntity {
            config: self.config,
            ..ComponentEntity::default()
        }])
    }
}
