use super::*;

use pretty_assertions::assert_eq;

#[test]
fn assignments_split_on_the_first_equals_sign() {
    assert_eq!(
        parse_assignment("description=a=b"),
        Ok(("description".to_string(), "a=b".to_string()))
    );
    assert_eq!(
        parse_assignment("name="),
        Ok(("name".to_string(), String::new()))
    );
    assert!(parse_assignment("name").is_err());
    assert!(parse_assignment(" =x").is_err());
}

#[test]
fn update_command_collects_field_values() {
    let args = Args::try_parse_from([
        "admin-console",
        "--yes",
        "products",
        "update",
        "12",
        "--set",
        "price=9.99",
        "--set",
        "active=",
    ])
    .expect("valid arguments");

    assert!(args.yes);
    assert!(matches!(args.resource, ResourceKind::Products));
    let Action::Update { id, values } = args.action else {
        panic!("expected the update action");
    };
    assert_eq!(id, "12");
    assert_eq!(
        values,
        vec![
            ("price".to_string(), "9.99".to_string()),
            ("active".to_string(), String::new()),
        ]
    );
}

#[test]
fn unknown_resources_are_rejected() {
    assert!(Args::try_parse_from(["admin-console", "orders", "list"]).is_err());
}

#[test]
fn config_path_defaults_to_the_working_directory_file() {
    let args = Args::try_parse_from(["admin-console", "categories", "list", "--search", "bo"])
        .expect("valid arguments");

    assert_eq!(args.config, PathBuf::from(config::DEFAULT_CONFIG_FILE));
    assert!(matches!(args.action, Action::List { search: Some(ref s) } if s == "bo"));
}

#[test]
fn id_page_uses_the_generic_id_field() {
    assert_eq!(
        Categories::id_lookup().resolve(&id_page("5")),
        Some("5")
    );
}
