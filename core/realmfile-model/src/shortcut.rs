//! Realm document shortcuts.
//!
//! A few well-known realm attributes and component families surface as
//! dedicated top-level document keys instead of entries in the generic
//! `attributes`/`components` blocks. The write side removes each
//! shortcut's slice from the entity view before the generic blocks are
//! serialized, so a value appears in exactly one place; the read side
//! folds the dedicated keys back into the generic fields.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::entity::{ComponentEntity, BROWSER_HEADER_PREFIX};

/// How one shortcut key maps onto the generic entity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    /// The whole key is one attribute: `displayName: x` is
    /// `attributes["displayName"] = [x]`.
    Singleton { attribute: &'static str },
    /// A nested mapping whose entries are attributes under a fixed
    /// prefix: `browserHeaders: {a: b}` is
    /// `attributes["browserHeaders.a"] = [b]`.
    Prefixed { prefix: &'static str },
    /// Key-provider components, grouped by provider id under `keys`.
    KeyComponents,
}

pub struct Shortcut {
    pub key: &'static str,
    pub kind: ShortcutKind,
}

/// The realm shortcut table, ordered lexicographically by document key
/// so write-side extraction is deterministic.
pub const REALM_SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        key: "browserHeaders",
        kind: ShortcutKind::Prefixed {
            prefix: BROWSER_HEADER_PREFIX,
        },
    },
    Shortcut {
        key: "displayName",
        kind: ShortcutKind::Singleton {
            attribute: "displayName",
        },
    },
    Shortcut {
        key: "keys",
        kind: ShortcutKind::KeyComponents,
    },
];

pub fn realm_shortcut(key: &str) -> Option<&'static Shortcut> {
    REALM_SHORTCUTS.iter().find(|s| s.key == key)
}

/// Remove and return one attribute's values.
pub fn take_attribute(
    attributes: &mut IndexMap<String, Vec<String>>,
    key: &str,
) -> Option<Vec<String>> {
    attributes.shift_remove(key)
}

/// Remove and return every attribute under `prefix`, keyed by the
/// remainder of the name, in the entity's own order.
pub fn take_prefixed(
    attributes: &mut IndexMap<String, Vec<String>>,
    prefix: &str,
) -> IndexMap<String, Vec<String>> {
    let keys: Vec<String> = attributes
        .keys()
        .filter(|k| k.starts_with(prefix))
        .cloned()
        .collect();
    keys.into_iter()
        .filter_map(|k| {
            let values = attributes.shift_remove(&k)?;
            Some((k[prefix.len()..].to_owned(), values))
        })
        .collect()
}

/// Remove every key-provider component and group the survivors of the
/// split by provider id, sorted for stable output.
pub fn take_key_components(
    components: &mut Vec<ComponentEntity>,
) -> BTreeMap<String, Vec<ComponentEntity>> {
    let mut grouped: BTreeMap<String, Vec<ComponentEntity>> = BTreeMap::new();
    let mut rest = Vec::with_capacity(components.len());
    for component in components.drain(..) {
        if component.is_key_provider() {
            let provider = component.provider_id.clone().unwrap_or_default();
            grouped.entry(provider).or_default().push(component);
        } else {
            rest.push(component);
        }
    }
    *components = rest;
    grouped
}
