use pretty_assertions::assert_eq;

use realmfile_model::{
    ClientEntity, ComponentEntity, GroupEntity, ProtocolMapperEntity, RealmEntity, SslRequired,
    KEY_PROVIDER_TYPE,
};
use realmfile_yaml::{
    parse_client, parse_group, parse_realm, write_client, write_group, write_realm, YamlError,
};

fn sample_realm() -> RealmEntity {
    let mut realm = RealmEntity::new("master");
    realm.id = Some("master-id".to_string());
    realm.enabled = Some(true);
    realm.not_before = Some(1200);
    realm.ssl_required = Some(SslRequired::External);
    realm.set_attribute("displayName", vec!["Master".to_string()]);
    realm.set_attribute("browserHeaders.xFrameOptions", vec!["DENY".to_string()]);
    realm.set_attribute("single", vec!["a".to_string()]);
    realm.set_attribute("multi", vec!["a".to_string(), "b".to_string()]);
    realm.set_attribute("numeric", vec!["11".to_string()]);

    let mut rsa = ComponentEntity::default();
    rsa.provider_id = Some("rsa".to_string());
    rsa.provider_type = Some(KEY_PROVIDER_TYPE.to_string());
    rsa.config
        .insert("algorithm".to_string(), vec!["RS256".to_string()]);

    let mut ldap = ComponentEntity::new("ldap-provider");
    ldap.id = Some("ldap-provider".to_string());
    ldap.provider_id = Some("ldap".to_string());
    ldap.provider_type = Some("userStorage".to_string());
    ldap.config
        .insert("baseDn".to_string(), vec!["dc=example".to_string()]);

    realm.components = vec![rsa, ldap];
    realm
}

// ── Document shape ──────────────────────────────────────────────────

#[test]
fn writes_full_realm_document() {
    let expected = "\
id: master-id
name: master
enabled: true
notBefore: 1200
sslRequired: external
browserHeaders:
  xFrameOptions: DENY
displayName: Master
keys:
  rsa:
    - algorithm: RS256
attributes:
  single: a
  multi:
    - a
    - b
  numeric: '11'
components:
  ldap-provider:
    providerId: ldap
    providerType: userStorage
    baseDn: dc=example
";
    assert_eq!(write_realm(&sample_realm()).unwrap(), expected);
}

#[test]
fn empty_fields_produce_no_output() {
    let realm = RealmEntity::new("empty");
    assert_eq!(write_realm(&realm).unwrap(), "name: empty\n");
}

#[test]
fn single_element_attribute_collapses_to_bare_scalar() {
    let mut realm = RealmEntity::default();
    realm.set_attribute("a", vec!["only".to_string()]);
    assert_eq!(write_realm(&realm).unwrap(), "attributes:\n  a: only\n");
}

#[test]
fn ambiguous_strings_are_quoted() {
    let mut realm = RealmEntity::default();
    realm.set_attribute("n", vec!["11".to_string()]);
    realm.set_attribute("b", vec!["true".to_string()]);
    let out = write_realm(&realm).unwrap();
    assert!(out.contains("n: '11'"), "got: {out}");
    assert!(out.contains("b: 'true'"), "got: {out}");
}

#[test]
fn shortcut_values_never_appear_in_generic_blocks() {
    let out = write_realm(&sample_realm()).unwrap();
    assert_eq!(out.matches("displayName").count(), 1);
    assert!(!out.contains("browserHeaders."), "got: {out}");
    // the key provider lives under `keys`, not `components`
    assert!(!out.contains("keyProvider"), "got: {out}");
    assert_eq!(out.matches("algorithm").count(), 1);
}

// ── Round trips ─────────────────────────────────────────────────────

#[test]
fn realm_round_trip() {
    let realm = sample_realm();
    let reparsed = parse_realm(&write_realm(&realm).unwrap()).unwrap();
    assert_eq!(reparsed, realm);
}

#[test]
fn client_round_trip() {
    let mut client = ClientEntity::new("webapp");
    client.id = Some("c1".to_string());
    client.realm_id = Some("master".to_string());
    client.enabled = Some(true);
    client.protocol = Some("openid-connect".to_string());
    client.redirect_uris = vec![
        "https://example.com/a".to_string(),
        "https://example.com/b".to_string(),
    ];
    let mut mapper = ProtocolMapperEntity::new("email");
    mapper.protocol_mapper = Some("oidc-usermodel-property-mapper".to_string());
    mapper
        .config
        .insert("user.attribute".to_string(), "email".to_string());
    mapper
        .config
        .insert("claim.name".to_string(), "email".to_string());
    client.protocol_mappers = vec![mapper];
    client
        .attributes
        .insert("pkce.code.challenge.method".to_string(), vec!["S256".to_string()]);

    let doc = write_client(&client).unwrap();
    assert!(doc.contains("protocolMappers:\n  email:\n    protocolMapper:"), "got: {doc}");
    assert_eq!(parse_client(&doc).unwrap(), client);
}

#[test]
fn group_round_trip() {
    let mut group = GroupEntity::new("admins");
    group.id = Some("g1".to_string());
    group.realm_id = Some("master".to_string());
    group.parent_id = Some("g0".to_string());
    group.granted_roles = vec!["admin".to_string(), "auditor".to_string()];
    group
        .attributes
        .insert("note".to_string(), vec!["x".to_string()]);

    let doc = write_group(&group).unwrap();
    assert_eq!(parse_group(&doc).unwrap(), group);
}

#[test]
fn awkward_attribute_values_round_trip() {
    let mut realm = RealmEntity::default();
    realm.set_attribute(
        "tricky",
        vec![
            "true".to_string(),
            "null".to_string(),
            "a: b".to_string(),
            "# not a comment".to_string(),
            " padded ".to_string(),
            String::new(),
            "line1\nline2".to_string(),
        ],
    );
    let reparsed = parse_realm(&write_realm(&realm).unwrap()).unwrap();
    assert_eq!(reparsed, realm);
}

#[test]
fn single_value_survives_as_one_element_list() {
    let mut realm = RealmEntity::default();
    realm.set_attribute("a", vec!["only".to_string()]);
    let reparsed = parse_realm(&write_realm(&realm).unwrap()).unwrap();
    assert_eq!(reparsed.attribute("a"), Some(&["only".to_string()][..]));
}

#[test]
fn shortcut_only_attributes_leave_no_generic_block() {
    let mut realm = RealmEntity::default();
    realm.set_attribute("displayName", vec!["Only".to_string()]);
    realm.set_attribute("browserHeaders.xFrameOptions", vec!["DENY".to_string()]);
    let out = write_realm(&realm).unwrap();
    assert!(!out.contains("attributes:"), "got: {out}");
    assert_eq!(parse_realm(&out).unwrap(), realm);
}

#[test]
fn multi_valued_display_name_round_trips() {
    let mut realm = RealmEntity::default();
    realm.set_attribute("displayName", vec!["One".to_string(), "Two".to_string()]);
    let out = write_realm(&realm).unwrap();
    assert!(out.contains("displayName:\n  - One\n  - Two\n"), "got: {out}");
    assert_eq!(parse_realm(&out).unwrap(), realm);
}

#[test]
fn empty_realm_document_round_trips() {
    let realm = RealmEntity::default();
    let doc = write_realm(&realm).unwrap();
    assert_eq!(doc, "");
    assert_eq!(parse_realm(&doc).unwrap(), realm);
}

#[test]
fn key_components_group_by_provider_in_sorted_order() {
    let mut realm = RealmEntity::default();
    for provider in ["rsa", "hmac", "aes"] {
        let mut c = ComponentEntity::default();
        c.provider_id = Some(provider.to_string());
        c.provider_type = Some(KEY_PROVIDER_TYPE.to_string());
        c.config
            .insert("priority".to_string(), vec!["100".to_string()]);
        realm.components.push(c);
    }
    let out = write_realm(&realm).unwrap();
    let aes = out.find("aes:").unwrap();
    let hmac = out.find("hmac:").unwrap();
    let rsa = out.find("rsa:").unwrap();
    assert!(aes < hmac && hmac < rsa, "got: {out}");

    let reparsed = parse_realm(&out).unwrap();
    assert_eq!(reparsed.components.len(), 3);
    assert!(reparsed.components.iter().all(|c| c.is_key_provider()));
}

// ── Degenerate records ──────────────────────────────────────────────

#[test]
fn component_without_name_or_id_is_rejected() {
    let mut realm = RealmEntity::default();
    let mut c = ComponentEntity::default();
    c.provider_id = Some("ldap".to_string());
    c.provider_type = Some("userStorage".to_string());
    realm.components.push(c);
    let err = write_realm(&realm).unwrap_err();
    assert!(matches!(err, YamlError::Model(_)), "got: {err:?}");
}

#[test]
fn key_component_without_provider_id_is_rejected() {
    let mut realm = RealmEntity::default();
    let mut c = ComponentEntity::default();
    c.provider_type = Some(KEY_PROVIDER_TYPE.to_string());
    c.config
        .insert("priority".to_string(), vec!["100".to_string()]);
    realm.components.push(c);
    let err = write_realm(&realm).unwrap_err();
    assert!(matches!(err, YamlError::Model(_)), "got: {err:?}");
}

#[test]
fn protocol_mapper_without_name_is_rejected() {
    let mut client = ClientEntity::new("webapp");
    client.protocol_mappers = vec![ProtocolMapperEntity::default()];
    let err = write_client(&client).unwrap_err();
    assert!(matches!(err, YamlError::Model(_)), "got: {err:?}");
}
