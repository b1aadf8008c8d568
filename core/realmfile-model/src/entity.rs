use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Document key prefix that routes realm attributes into the
/// `browserHeaders` block.
pub const BROWSER_HEADER_PREFIX: &str = "browserHeaders.";

/// Provider type of components surfaced through the realm `keys` block.
pub const KEY_PROVIDER_TYPE: &str = "keyProvider";

/// When TLS is demanded for connections to this realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslRequired {
    All,
    External,
    None,
}

impl fmt::Display for SslRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SslRequired::All => "all",
            SslRequired::External => "external",
            SslRequired::None => "none",
        };
        f.write_str(s)
    }
}

impl FromStr for SslRequired {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(SslRequired::All),
            "external" => Ok(SslRequired::External),
            "none" => Ok(SslRequired::None),
            other => Err(ModelError::InvalidField {
                field: "sslRequired".into(),
                reason: format!("unknown value {other:?}"),
            }),
        }
    }
}

/// A realm record.
///
/// `attributes` is the free-form string-list map most realm settings
/// live in; a handful of well-known attributes surface as dedicated
/// document keys instead (see the shortcut table). `version` is the
/// optimistic-concurrency stamp the store maintains, never part of the
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmEntity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub not_before: Option<i64>,
    pub ssl_required: Option<SslRequired>,
    pub attributes: IndexMap<String, Vec<String>>,
    pub components: Vec<ComponentEntity>,
    #[serde(skip)]
    pub version: i64,
}

impl RealmEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.attributes.insert(key.into(), values);
    }

    pub fn attribute(&self, key: &str) -> Option<&[String]> {
        self.attributes.get(key).map(Vec::as_slice)
    }
}

/// A client record belonging to a realm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientEntity {
    pub id: Option<String>,
    pub client_id: Option<String>,
    pub realm_id: Option<String>,
    pub enabled: Option<bool>,
    pub protocol: Option<String>,
    pub redirect_uris: Vec<String>,
    pub protocol_mappers: Vec<ProtocolMapperEntity>,
    pub attributes: IndexMap<String, Vec<String>>,
    #[serde(skip)]
    pub version: i64,
}

impl ClientEntity {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Self::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&[String]> {
        self.attributes.get(key).map(Vec::as_slice)
    }
}

/// A group record belonging to a realm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupEntity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub realm_id: Option<String>,
    pub parent_id: Option<String>,
    pub granted_roles: Vec<String>,
    pub attributes: IndexMap<String, Vec<String>>,
    #[serde(skip)]
    pub version: i64,
}

impl GroupEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&[String]> {
        self.attributes.get(key).map(Vec::as_slice)
    }
}

/// A pluggable provider configuration attached to a realm.
///
/// In the document, components appear as a mapping keyed by component
/// name; id and name are reconstructed from that key on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentEntity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub provider_id: Option<String>,
    pub provider_type: Option<String>,
    pub config: IndexMap<String, Vec<String>>,
}

impl ComponentEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_key_provider(&self) -> bool {
        self.provider_type.as_deref() == Some(KEY_PROVIDER_TYPE)
    }
}

/// A protocol mapper attached to a client, keyed by mapper name in the
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolMapperEntity {
    pub name: Option<String>,
    pub protocol_mapper: Option<String>,
    pub config: IndexMap<String, String>,
}

impl ProtocolMapperEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
