//! Document formats gluing the store to the entity parsers, plus the
//! [`StoredRecord`] wiring for the persisted kinds. The file name is
//! the authority on a record's id: a document that carries a
//! different id is stamped over with a warning.

use realmfile_model::{ClientEntity, GroupEntity, RealmEntity};
use realmfile_yaml::{
    parse_client, parse_group, parse_realm, write_client, write_group, write_realm,
};
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::store::{RecordFormat, StoredRecord};

pub const DOCUMENT_EXTENSION: &str = "yaml";

macro_rules! stored_record {
    ($entity:ty) => {
        impl StoredRecord for $entity {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn version(&self) -> i64 {
                self.version
            }

            fn set_version(&mut self, version: i64) {
                self.version = version;
            }
        }
    };
}

stored_record!(RealmEntity);
stored_record!(ClientEntity);
stored_record!(GroupEntity);

fn decode_utf8(bytes: &[u8]) -> StoreResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        StoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

fn stamp_id(slot: &mut Option<String>, id: &str, kind: &'static str) {
    match slot {
        Some(doc_id) if doc_id != id => {
            warn!(kind, doc_id = %doc_id, file_id = id, "document id differs from file name, file name wins");
            *slot = Some(id.to_owned());
        }
        Some(_) => {}
        None => *slot = Some(id.to_owned()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealmYamlFormat;

impl RecordFormat<RealmEntity> for RealmYamlFormat {
    fn extension(&self) -> &'static str {
        DOCUMENT_EXTENSION
    }

    fn serialize(&self, entity: &RealmEntity) -> StoreResult<Vec<u8>> {
        Ok(write_realm(entity)?.into_bytes())
    }

    fn deserialize(&self, id: &str, bytes: &[u8]) -> StoreResult<RealmEntity> {
        let mut entity = parse_realm(decode_utf8(bytes)?)?;
        stamp_id(&mut entity.id, id, "realm");
        Ok(entity)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ClientYamlFormat;

impl RecordFormat<ClientEntity> for ClientYamlFormat {
    fn extension(&self) -> &'static str {
        DOCUMENT_EXTENSION
    }

    fn serialize(&self, entity: &ClientEntity) -> StoreResult<Vec<u8>> {
        Ok(write_client(entity)?.into_bytes())
    }

    fn deserialize(&self, id: &str, bytes: &[u8]) -> StoreResult<ClientEntity> {
        let mut entity = parse_client(decode_utf8(bytes)?)?;
        stamp_id(&mut entity.id, id, "client");
        Ok(entity)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GroupYamlFormat;

impl RecordFormat<GroupEntity> for GroupYamlFormat {
    fn extension(&self) -> &'static str {
        DOCUMENT_EXTENSION
    }

    fn serialize(&self, entity: &GroupEntity) -> StoreResult<Vec<u8>> {
        Ok(write_group(entity)?.into_bytes())
    }

    fn deserialize(&self, id: &str, bytes: &[u8]) -> StoreResult<GroupEntity> {
        let mut entity = parse_group(decode_utf8(bytes)?)?;
        stamp_id(&mut entity.id, id, "group");
        Ok(entity)
    }
}
