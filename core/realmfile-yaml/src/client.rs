//! Client documents.
//!
//! Registry-driven like realms, with one inverted block: the document
//! lists protocol mappers as a mapping keyed by mapper name, the
//! entity as a list.

use realmfile_model::{ClientEntity, MappedEntity, ModelError, ProtocolMapperEntity, Value};
use tracing::warn;

use crate::context::{AttributesLikeContext, YamlContext};
use crate::entity_ctx::{write_entity_fields, MapEntityContext};
use crate::error::{YamlError, YamlResult};
use crate::mechanism::WriteMechanism;
use crate::{emitter, parser, scanner};

/// Parse one client document.
pub fn parse_client(input: &str) -> YamlResult<ClientEntity> {
    let events = scanner::scan(input)?;
    match parser::parse_document(events, Box::new(ClientContext::default()))? {
        Value::Client(client) => Ok(*client),
        _ => Err(YamlError::UnexpectedDocument {
            expected: "client mapping",
        }),
    }
}

/// Write one client document.
pub fn write_client(client: &ClientEntity) -> YamlResult<String> {
    let mut mech = WriteMechanism::default();
    mech.start_stream();
    mech.start_document();
    ClientContext::default().write_value(&Value::Client(Box::new(client.clone())), &mut mech)?;
    mech.end_document();
    mech.end_stream();
    emitter::emit(&mech.into_events())
}

#[derive(Default)]
pub struct ClientContext {
    inner: MapEntityContext<ClientEntity>,
}

impl YamlContext for ClientContext {
    fn child(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        match key {
            "protocolMappers" => Some(Box::new(ProtocolMappersContext::default())),
            _ => self.inner.child_for(key),
        }
    }

    fn add_value(&mut self, value: Value) -> YamlResult<()> {
        // an empty document scans as one null scalar
        match value {
            Value::Null => Ok(()),
            _ => Err(YamlError::UnexpectedDocument {
                expected: "client mapping",
            }),
        }
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        self.inner.apply(key, value)
    }

    fn into_result(self: Box<Self>) -> Value {
        self.inner.entity.into_value()
    }

    fn write_value(&self, value: &Value, mech: &mut WriteMechanism) -> YamlResult<()> {
        let Value::Client(client) = value else {
            return Err(YamlError::Unwritable { kind: value.kind() });
        };
        mech.start_mapping();
        write_entity_fields(client.as_ref(), mech, |field, value, mech| {
            match field.name {
                "protocolMappers" => {
                    if !value.is_undefined() {
                        mech.add_key("protocolMappers");
                        ProtocolMappersContext::default().write_value(value, mech)?;
                    }
                    Ok(true)
                }
                "attributes" => {
                    if !value.is_undefined() {
                        mech.add_key("attributes");
                        AttributesLikeContext::default().write_value(value, mech)?;
                    }
                    Ok(true)
                }
                _ => Ok(false),
            }
        })?;
        mech.end_mapping();
        Ok(())
    }
}

/// The `protocolMappers` block: a mapping keyed by mapper name, each
/// entry the reserved `protocolMapper` key plus flat config values.
#[derive(Debug, Default)]
pub struct ProtocolMappersContext {
    mappers: Vec<ProtocolMapperEntity>,
}

impl YamlContext for ProtocolMappersContext {
    fn child(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        Some(Box::new(ProtocolMapperContext::named(key)))
    }

    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedDocument {
            expected: "protocol mappers mapping",
        })
    }

    fn add_entry(&mut self, _key: String, value: Value) -> YamlResult<()> {
        match value {
            Value::Null => Ok(()),
            Value::ProtocolMappers(mappers) => {
                self.mappers.extend(mappers);
                Ok(())
            }
            other => Err(ModelError::coercion("protocol mapper", other.kind()).into()),
        }
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::ProtocolMappers(self.mappers)
    }

    fn write_value(&self, value: &Value, mech: &mut WriteMechanism) -> YamlResult<()> {
        let Value::ProtocolMappers(mappers) = value else {
            return Err(YamlError::Unwritable { kind: value.kind() });
        };
        mech.start_mapping();
        for mapper in mappers {
            // an empty key would read back as a phantom `""` record
            let Some(name) = mapper.name.as_deref() else {
                return Err(ModelError::InvalidField {
                    field: "name".into(),
                    reason: "protocol mapper has no name".into(),
                }
                .into());
            };
            mech.add_key(name);
            mech.start_mapping();
            if let Some(protocol_mapper) = &mapper.protocol_mapper {
                mech.add_key("protocolMapper");
                mech.add_scalar(&Value::Str(protocol_mapper.clone()));
            }
            for (key, value) in &mapper.config {
                mech.add_key(key);
                mech.add_scalar(&Value::Str(value.clone()));
            }
            mech.end_mapping();
        }
        mech.end_mapping();
        Ok(())
    }
}

#[derive(Debug)]
struct ProtocolMapperContext {
    mapper: ProtocolMapperEntity,
}

impl ProtocolMapperContext {
    fn named(name: &str) -> Self {
        Self {
            mapper: ProtocolMapperEntity::new(name),
        }
    }
}

impl YamlContext for ProtocolMapperContext {
    fn add_value(&mut self, _value: Value) -> YamlResult<()> {
        Err(YamlError::UnexpectedDocument {
            expected: "protocol mapper mapping",
        })
    }

    fn add_entry(&mut self, key: String, value: Value) -> YamlResult<()> {
        match key.as_str() {
            "protocolMapper" => {
                self.mapper.protocol_mapper = value.coerce_opt_string()?;
                Ok(())
            }
            "name" => {
                warn!("ignoring reserved protocol mapper key, the mapping key wins");
                Ok(())
            }
            _ => {
                self.mapper.config.insert(key, value.coerce_string()?);
                Ok(())
            }
        }
    }

    fn into_result(self: Box<Self>) -> Value {
        Value::ProtocolMappers(vec![self.mapper])
    }
}
