//! Group documents. Fully registry-driven; no shortcuts, no nested
//! entity blocks.

use realmfile_model::{GroupEntity, MappedEntity, Value};

use crate::context::{AttributesLikeContext, YamlContext};
use crate::entity_ctx::{write_entity_fields, MapEntityContext};
use crate::error::{YamlError, YamlResult};
use crate::mechanism::WriteMechanism;
use crate::{emitter, parser, scanner};

/// Parse one group document.
pub fn parse_group(input: &str) -> YamlResult<GroupEntity> {
    let events = scanner::scan(input)?;
    match parser::parse_document(events, Box::new(GroupContext::default()))? {
        Value::Group(group) => Ok(*group),
        _ => Err(YamlError::UnexpectedDocument {
            expected: "group mapping",
        }),
    }
}

/// Write one group document.
pub fn write_group(group: &GroupEntity) -> YamlResult<String> {
    let mut mech = WriteMechanism::default();
    mech.start_stream();
    mech.start_document();
    GroupContext::default().write_value(&Value::Group(Box::new(group.clone())), &mut mech)?;
    mech.end_document();
    mech.end_stream();
    emitter::emit(&mech.into_events())
}

#[derive(Default)]
pub struct GroupContext {
    inner: MapEntityContext<GroupEntity>,
}

impl YamlContext for GroupContext {
    fn child(&self, key: &str) -> Option<Box<dyn YamlContext>> {
        self.inner.child_for(key)
    }

    fn add_value(&mut self, value: Value) -> YamlResult<()> {
        // an empty document scans as one null scalar
        match value {
            Value::Null => Ok(()),
            _ => Err(YamlError::UnexpectedDocument {
                expected: "group mapping",
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
        let Value::Group(group) = value else {
            return Err(YamlError::Unwritable { kind: value.kind() });
        };
        mech.start_mapping();
        write_entity_fields(group.as_ref(), mech, |field, value, mech| {
            if field.name == "attributes" {
                if !value.is_undefined() {
                    mech.add_key("attributes");
                    AttributesLikeContext::default().write_value(value, mech)?;
                }
                return Ok(true);
            }
            Ok(false)
        })?;
        mech.end_mapping();
        Ok(())
    }
}
