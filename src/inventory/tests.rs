//! Unit tests for inventory parsing and lookups.

use super::*;
use crate::test_support::SAMPLE_INVENTORY;
use rstest::{fixture, rstest};

#[fixture]
fn inventory() -> Inventory {
    Inventory::parse(Utf8Path::new("servers.yaml"), SAMPLE_INVENTORY)
        .unwrap_or_else(|err| panic!("sample inventory should parse: {err}"))
}

fn server(alias: &str, ip: &str) -> Server {
    Server {
        alias: alias.to_owned(),
        ip: ip.to_owned(),
        user: String::from("root"),
        key: String::from("/k"),
        payee: false,
        skip_ssh_check: false,
    }
}

fn instance(name: &str, server: &str) -> Instance {
    Instance {
        name: name.to_owned(),
        server: server.to_owned(),
        project: String::from("p"),
        owner: String::from("o"),
        variables: BTreeMap::new(),
    }
}

#[rstest]
fn servers_and_instances_keep_document_order(inventory: Inventory) {
    let aliases: Vec<&str> = inventory
        .servers()
        .iter()
        .map(|srv| srv.alias.as_str())
        .collect();
    let names: Vec<&str> = inventory
        .instances()
        .iter()
        .map(|inst| inst.name.as_str())
        .collect();

    assert_eq!(aliases, ["alpha", "beta", "gamma"]);
    assert_eq!(names, ["aleo-1", "aleo-2", "sui-1", "sui-2"]);
}

#[rstest]
fn server_lookup_uses_alias_index(inventory: Inventory) {
    let beta = inventory.server("beta").expect("beta should resolve");
    assert_eq!(beta.ip, "10.0.0.2");
    assert!(inventory.server("delta").is_none());
}

#[rstest]
fn payee_and_skip_markers_are_detected(inventory: Inventory) {
    let alpha = inventory.server("alpha").expect("alpha");
    let beta = inventory.server("beta").expect("beta");
    let gamma = inventory.server("gamma").expect("gamma");

    assert!(alpha.is_payee());
    assert!(!beta.is_payee());
    assert!(!gamma.is_payee());
    assert!(!alpha.skip_ssh_check);
    assert!(beta.skip_ssh_check);
}

#[rstest]
#[case("server-payee: ~", false)]
#[case("server-payee: someone", true)]
#[case("server-payee: false", true)]
fn payee_marker_requires_non_null_value(#[case] marker: &str, #[case] expected: bool) {
    let doc = format!(
        "servers:\n  - alias: a\n    ip: 10.0.0.1\n    user: u\n    key: /k\n    {marker}\n"
    );
    let parsed = Inventory::parse(Utf8Path::new("servers.yaml"), &doc).expect("parse");
    assert_eq!(parsed.server("a").map(Server::is_payee), Some(expected));
}

#[rstest]
#[case("skip-ssh-check: ~")]
#[case("skip-ssh-check: false")]
#[case("skip-ssh-check: yes please")]
fn skip_marker_only_needs_presence(#[case] marker: &str) {
    let doc = format!(
        "servers:\n  - alias: a\n    ip: 10.0.0.1\n    user: u\n    key: /k\n    {marker}\n"
    );
    let parsed = Inventory::parse(Utf8Path::new("servers.yaml"), &doc).expect("parse");
    assert_eq!(parsed.server("a").map(|srv| srv.skip_ssh_check), Some(true));
}

#[rstest]
fn projects_and_owners_are_sorted_and_distinct(inventory: Inventory) {
    assert_eq!(inventory.projects().into_iter().collect::<Vec<_>>(), ["aleo", "sui"]);
    assert_eq!(inventory.owners().into_iter().collect::<Vec<_>>(), ["alice", "bob"]);
    assert_eq!(
        inventory
            .projects_of_owner("bob")
            .into_iter()
            .collect::<Vec<_>>(),
        ["aleo"]
    );
}

#[rstest]
fn placements_resolve_servers(inventory: Inventory) {
    let pairs: Vec<(&str, &str)> = inventory
        .placements_in_project("sui")
        .map(|(inst, srv)| (inst.name.as_str(), srv.ip.as_str()))
        .collect();
    assert_eq!(pairs, [("sui-1", "10.0.0.3"), ("sui-2", "10.0.0.1")]);
}

#[rstest]
fn variables_parse_as_scalars(inventory: Inventory) {
    let aleo = inventory
        .instances()
        .first()
        .expect("first instance should exist");
    assert_eq!(
        aleo.variables.get("node_port"),
        Some(&VariableValue::Integer(4133))
    );
    assert_eq!(
        aleo.variables.get("label"),
        Some(&VariableValue::String(String::from("main net")))
    );
    assert_eq!(aleo.variables.get("debug"), Some(&VariableValue::Bool(false)));
}

#[rstest]
#[case(VariableValue::String(String::from("plain")), "plain")]
#[case(VariableValue::String(String::from("two words")), "\"two words\"")]
#[case(VariableValue::Integer(-3), "-3")]
#[case(VariableValue::Float(1.0), "1.0")]
#[case(VariableValue::Float(0.25), "0.25")]
#[case(VariableValue::Bool(true), "True")]
#[case(VariableValue::Bool(false), "False")]
#[case(VariableValue::Null, "None")]
#[case(VariableValue::Integer(18_446_744_073_709_551_615), "18446744073709551615")]
#[case(VariableValue::Float(1.0e20), "1e+20")]
#[case(VariableValue::Float(1.5e-5), "1.5e-05")]
#[case(VariableValue::Float(-2.5e120), "-2.5e+120")]
#[case(VariableValue::Float(1.0e15), "1000000000000000.0")]
#[case(VariableValue::Float(f64::INFINITY), "inf")]
#[case(VariableValue::Float(f64::NAN), "nan")]
fn variable_values_render_for_inventory(#[case] value: VariableValue, #[case] expected: &str) {
    assert_eq!(value.to_inventory_value(), expected);
}

#[rstest]
#[case::tilde("~", "None")]
#[case::null("null", "None")]
#[case::u64_max("18446744073709551615", "18446744073709551615")]
#[case::below_i64_min("-9223372036854775809", "-9223372036854775809")]
#[case::exponent("1.0e+20", "1e+20")]
#[case::small("0.00001", "1e-05")]
#[case::quoted_number("'42'", "42")]
fn document_scalars_render_for_inventory(#[case] scalar: &str, #[case] expected: &str) {
    let document = format!(
        "servers:\n  - {{alias: a, ip: 10.0.0.1, user: root, key: /k}}\n\
         instances:\n  - name: i1\n    server: a\n    project: p\n    owner: o\n\
         \x20   variables:\n      v: {scalar}\n"
    );

    let inventory = Inventory::parse(Utf8Path::new("servers.yaml"), &document)
        .unwrap_or_else(|err| panic!("variable {scalar} should parse: {err}"));
    let value = inventory
        .instances()
        .first()
        .and_then(|instance| instance.variables.get("v"))
        .expect("variable v should exist");

    assert_eq!(value.to_inventory_value(), expected);
}

#[rstest]
fn duplicate_aliases_are_rejected() {
    let err = Inventory::from_parts(
        vec![server("a", "10.0.0.1"), server("a", "10.0.0.2")],
        Vec::new(),
    )
    .expect_err("duplicate alias should fail");
    assert_eq!(
        err,
        InventoryError::DuplicateAlias {
            alias: String::from("a")
        }
    );
}

#[rstest]
fn dangling_server_references_are_rejected() {
    let err = Inventory::from_parts(
        vec![server("a", "10.0.0.1")],
        vec![instance("i1", "a"), instance("i2", "missing")],
    )
    .expect_err("unknown server should fail");
    assert_eq!(
        err,
        InventoryError::UnknownServer {
            instance: String::from("i2"),
            alias: String::from("missing"),
        }
    );
}

#[rstest]
#[case("servers: [")]
#[case("servers:\n  - alias: a\n")]
fn malformed_documents_report_source_path(#[case] contents: &str) {
    let Err(err) = Inventory::parse(Utf8Path::new("broken.yaml"), contents) else {
        panic!("parse should fail");
    };
    let InventoryError::Parse { path, .. } = err else {
        panic!("expected parse error, got {err:?}");
    };
    assert_eq!(path, "broken.yaml");
}

#[rstest]
fn missing_document_is_a_read_error() {
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let path = camino::Utf8PathBuf::from_path_buf(tmp.path().join("servers.yaml"))
        .unwrap_or_else(|err| panic!("utf8 path: {}", err.display()));

    let err = Inventory::load(&path).expect_err("missing file should fail");
    assert!(
        matches!(err, InventoryError::Read(_)),
        "unexpected error: {err:?}"
    );
}
