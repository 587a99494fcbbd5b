//! Loading route tables from files on disk
//!
//! Every format must produce the same table, in declaration order, and
//! definition errors must surface with the offending route named.

mod common;

use brrtmvc::routes::load_routes;
use brrtmvc::{RouteDefinitionError, RouteError, Router};
use http::Method;
use tempfile::TempDir;

const YAML: &str = r#"
routes:
  - name: users_show
    path: /users/{id}
    methods: GET|HEAD
    _controller: "App\\Users:show"
    requirements: { id: '\d+' }
  - route: files
    path: /files/{*path}
    controller: "App\\Files"
"#;

const JSON: &str = r#"{
  "routes": [
    {
      "name": "users_show",
      "path": "/users/{id}",
      "methods": ["GET", "HEAD"],
      "controller": "App\\Users:show",
      "requirements": { "id": "\\d+" }
    },
    {
      "_route": "files",
      "path": "/files/{*path}",
      "_controller": "App\\Files"
    }
  ]
}"#;

const TOML: &str = r#"
[[routes]]
name = "users_show"
path = "/users/{id}"
methods = ["GET", "HEAD"]
controller = 'App\Users:show'
requirements = { id = '\d+' }

[[routes]]
route = "files"
path = "/files/{*path}"
controller = 'App\Files'
"#;

fn assert_table_behaviour(router: &Router) {
    let names: Vec<_> = router.table().iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, ["users_show", "files"]);

    let params = router.route(Method::HEAD, "/users/3").unwrap();
    assert_eq!(params.controller(), Some("App\\Users:show"));
    assert_eq!(params.get("id"), Some("3"));

    let params = router.route(Method::GET, "/files/a/b/c.txt").unwrap();
    assert_eq!(params.get("path"), Some("a/b/c.txt"));
    assert_eq!(params.route_name(), Some("files"));

    assert_eq!(
        router.route(Method::POST, "/users/3").unwrap_err(),
        RouteError::MethodNotAllowed {
            allowed: vec![Method::GET, Method::HEAD]
        }
    );
}

#[test]
fn test_all_formats_load_the_same_table() {
    let dir = TempDir::new().unwrap();
    for (name, content) in [("routes.yaml", YAML), ("routes.json", JSON), ("routes.toml", TOML)] {
        let path = common::write_file(dir.path(), name, content);
        let table = load_routes(&path).unwrap_or_else(|e| panic!("{name}: {e:#}"));
        assert_table_behaviour(&Router::new(table));
    }
}

#[test]
fn test_yml_extension_and_case() {
    let dir = TempDir::new().unwrap();
    let path = common::write_file(dir.path(), "routes.YML", YAML);
    assert_eq!(load_routes(&path).unwrap().len(), 2);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = common::write_file(dir.path(), "routes.ini", YAML);
    let err = load_routes(&path).unwrap_err();
    assert!(err.to_string().contains("unsupported route file extension"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(load_routes(dir.path().join("absent.yaml")).is_err());
}

#[test]
fn test_json_object_keyed_by_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = common::write_file(
        dir.path(),
        "routes.json",
        r#"{ "a": { "path": "/a" }, "b": { "path": "/b" } }"#,
    );
    let err = load_routes(&path).unwrap_err();
    assert!(format!("{err:#}").contains("declaration order"));
}

#[test]
fn test_definition_errors_are_reported() {
    let dir = TempDir::new().unwrap();
    let cases = [
        ("dup_name.yaml", "- { name: a, path: /a }\n- { name: a, path: /b }\n"),
        ("dup_placeholder.yaml", "a: { path: '/{id}/{id}' }\n"),
        ("brace.yaml", "a: { path: '/users/{id' }\n"),
        ("bad_name.yaml", "a: { path: '/users/{1d}' }\n"),
        ("bad_regex.yaml", "a: { path: '/users/{id}', requirements: { id: '(' } }\n"),
    ];
    for (file, content) in cases {
        let path = common::write_file(dir.path(), file, content);
        let err = load_routes(&path).unwrap_err();
        let definition = err
            .chain()
            .find_map(|e| e.downcast_ref::<RouteDefinitionError>());
        assert!(definition.is_some(), "{file}: {err:#}");
        assert!(format!("{err:#}").contains("route 'a'"), "{file}: {err:#}");
    }
}

#[test]
fn test_unknown_entry_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = common::write_file(dir.path(), "routes.yaml", "a: { path: /a, verbs: [GET] }\n");
    assert!(load_routes(&path).is_err());
}
