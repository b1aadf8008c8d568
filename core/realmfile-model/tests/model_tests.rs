use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use realmfile_model::shortcut::{take_attribute, take_key_components, take_prefixed};
use realmfile_model::{
    string_list_value, ClientEntity, ComponentEntity, MappedEntity, RealmEntity, SslRequired,
    Value, KEY_PROVIDER_TYPE,
};

// ── Value ───────────────────────────────────────────────────────────

#[test]
fn undefined_values() {
    assert!(Value::Null.is_undefined());
    assert!(Value::Sequence(vec![]).is_undefined());
    assert!(Value::Mapping(IndexMap::new()).is_undefined());
    assert!(Value::Components(vec![]).is_undefined());
    assert!(!Value::Bool(false).is_undefined());
    assert!(!Value::Str(String::new()).is_undefined());
    assert!(!Value::Sequence(vec![Value::Null]).is_undefined());
}

#[test]
fn scalar_text_round_trips_floats_and_ints() {
    assert_eq!(Value::Int(11).scalar_text().as_deref(), Some("11"));
    // whole floats keep their decimal point so they re-resolve as floats
    assert_eq!(Value::Float(1.0).scalar_text().as_deref(), Some("1.0"));
    assert_eq!(Value::Float(2.5).scalar_text().as_deref(), Some("2.5"));
}

#[test]
fn string_list_coercion_promotes_lone_scalar() {
    let single = Value::Str("a".into());
    assert_eq!(single.coerce_string_list().unwrap(), vec!["a".to_string()]);

    let seq = Value::Sequence(vec![Value::Str("a".into()), Value::Int(7)]);
    assert_eq!(
        seq.coerce_string_list().unwrap(),
        vec!["a".to_string(), "7".to_string()]
    );

    let bad = Value::Mapping(IndexMap::new());
    assert!(bad.coerce_string_list().is_err());
}

#[test]
fn string_list_value_collapses_single_element() {
    assert_eq!(string_list_value(&[]), Value::Null);
    assert_eq!(
        string_list_value(&["only".to_string()]),
        Value::Str("only".into())
    );
    assert_eq!(
        string_list_value(&["a".to_string(), "b".to_string()]),
        Value::Sequence(vec![Value::Str("a".into()), Value::Str("b".into())])
    );
}

// ── Field registry ──────────────────────────────────────────────────

#[test]
fn registry_routes_scalars_and_lists() {
    let registry = RealmEntity::registry();
    let mut realm = RealmEntity::default();

    assert!(registry
        .apply(&mut realm, "name", Value::Str("master".into()))
        .unwrap());
    assert!(registry
        .apply(&mut realm, "enabled", Value::Bool(true))
        .unwrap());
    assert!(registry
        .apply(&mut realm, "notBefore", Value::Int(42))
        .unwrap());
    assert!(registry
        .apply(&mut realm, "sslRequired", Value::Str("external".into()))
        .unwrap());

    assert_eq!(realm.name.as_deref(), Some("master"));
    assert_eq!(realm.enabled, Some(true));
    assert_eq!(realm.not_before, Some(42));
    assert_eq!(realm.ssl_required, Some(SslRequired::External));
}

#[test]
fn registry_skips_unknown_keys() {
    let mut realm = RealmEntity::default();
    let applied = RealmEntity::registry()
        .apply(&mut realm, "noSuchField", Value::Str("x".into()))
        .unwrap();
    assert!(!applied);
    assert_eq!(realm, RealmEntity::default());
}

#[test]
fn repeated_scalar_key_keeps_last_value() {
    let registry = RealmEntity::registry();
    let mut realm = RealmEntity::default();
    registry
        .apply(&mut realm, "name", Value::Str("first".into()))
        .unwrap();
    registry
        .apply(&mut realm, "name", Value::Str("second".into()))
        .unwrap();
    assert_eq!(realm.name.as_deref(), Some("second"));
}

#[test]
fn list_fields_accumulate() {
    let registry = ClientEntity::registry();
    let mut client = ClientEntity::default();
    registry
        .apply(
            &mut client,
            "redirectUris",
            Value::Sequence(vec![Value::Str("https://a".into())]),
        )
        .unwrap();
    registry
        .apply(
            &mut client,
            "redirectUris",
            Value::Sequence(vec![Value::Str("https://b".into())]),
        )
        .unwrap();
    assert_eq!(client.redirect_uris, vec!["https://a", "https://b"]);
}

#[test]
fn attribute_map_entries_upsert() {
    let registry = RealmEntity::registry();
    let mut realm = RealmEntity::default();

    let mut first = IndexMap::new();
    first.insert("a".to_string(), Value::Str("1".into()));
    registry
        .apply(&mut realm, "attributes", Value::Mapping(first))
        .unwrap();

    let mut second = IndexMap::new();
    second.insert(
        "a".to_string(),
        Value::Sequence(vec![Value::Str("2".into()), Value::Str("3".into())]),
    );
    registry
        .apply(&mut realm, "attributes", Value::Mapping(second))
        .unwrap();

    assert_eq!(
        realm.attribute("a"),
        Some(&["2".to_string(), "3".to_string()][..])
    );
}

#[test]
fn coercion_failure_is_fatal() {
    let mut realm = RealmEntity::default();
    let result = RealmEntity::registry().apply(
        &mut realm,
        "enabled",
        Value::Sequence(vec![Value::Bool(true)]),
    );
    assert!(result.is_err());
}

#[test]
fn version_stamp_is_not_serialized() {
    let mut realm = RealmEntity::new("master");
    realm.version = 1_700_000_000_000;
    let json = serde_json::to_value(&realm).unwrap();
    assert!(json.get("version").is_none());
}

// ── Shortcut extraction ─────────────────────────────────────────────

#[test]
fn take_prefixed_strips_prefix_and_leaves_rest() {
    let mut attributes = IndexMap::new();
    attributes.insert("browserHeaders.xFrameOptions".to_string(), vec!["DENY".to_string()]);
    attributes.insert("other".to_string(), vec!["v".to_string()]);
    attributes.insert(
        "browserHeaders.contentSecurityPolicy".to_string(),
        vec!["none".to_string()],
    );

    let taken = take_prefixed(&mut attributes, "browserHeaders.");
    assert_eq!(taken.len(), 2);
    assert_eq!(taken["xFrameOptions"], vec!["DENY".to_string()]);
    assert_eq!(taken["contentSecurityPolicy"], vec!["none".to_string()]);
    assert_eq!(attributes.len(), 1);
    assert!(attributes.contains_key("other"));
}

#[test]
fn take_attribute_removes_entry() {
    let mut attributes = IndexMap::new();
    attributes.insert("displayName".to_string(), vec!["My Realm".to_string()]);
    assert_eq!(
        take_attribute(&mut attributes, "displayName"),
        Some(vec!["My Realm".to_string()])
    );
    assert!(attributes.is_empty());
    assert_eq!(take_attribute(&mut attributes, "displayName"), None);
}

#[test]
fn take_key_components_splits_and_groups() {
    let mut rsa = ComponentEntity::new("rsa-key");
    rsa.provider_id = Some("rsa".to_string());
    rsa.provider_type = Some(KEY_PROVIDER_TYPE.to_string());
    let mut hmac = ComponentEntity::new("hmac-key");
    hmac.provider_id = Some("hmac".to_string());
    hmac.provider_type = Some(KEY_PROVIDER_TYPE.to_string());
    let mut ldap = ComponentEntity::new("ldap");
    ldap.provider_id = Some("ldap".to_string());
    ldap.provider_type = Some("userStorage".to_string());

    let mut components = vec![rsa.clone(), ldap.clone(), hmac.clone()];
    let grouped = take_key_components(&mut components);

    assert_eq!(components, vec![ldap]);
    let providers: Vec<&str> = grouped.keys().map(String::as_str).collect();
    assert_eq!(providers, ["hmac", "rsa"]);
    assert_eq!(grouped["rsa"], vec![rsa]);
    assert_eq!(grouped["hmac"], vec![hmac]);
}
