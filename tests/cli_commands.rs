//! Integration tests for the CLI command functions.
//!
//! Each test writes a manifest and PHP sources to a temp dir, opens a
//! `Project` the way the binary does, and checks the JSON it would emit.

use std::fs;
use std::path::Path;

use propdoc::cli::{run_get, run_has, run_list, Project};
use propdoc::error::{OutputErrorCode, PropdocError};
use propdoc::manifest::ManifestError;
use propdoc::output::{emit_response, ErrorResponse};
use serde_json::{json, Value};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "classes": [
        { "name": "App\\Concerns\\HasTimestamps", "kind": "trait",
          "file": "src/HasTimestamps.php",
          "doc": "/**\n * @property \\DateTimeImmutable $created_at\n * @property-read int $age\n */" },
        { "name": "App\\Model", "file": "src/Model.php",
          "uses": ["App\\Concerns\\HasTimestamps"],
          "properties": [ { "name": "id", "type": "int" } ] },
        { "name": "App\\Post", "file": "src/Post.php", "extends": "App\\Model",
          "doc": "/**\n * @property-read User $author\n * @property-write string[] $tags\n * @property Missing<int $broken\n */" }
    ]
}"#;

fn write(root: &Path, name: &str, text: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "classes.json", MANIFEST);
    write(
        root,
        "src/HasTimestamps.php",
        "<?php\nnamespace App\\Concerns;\n\n/**\n * @property \\DateTimeImmutable $created_at\n * @property-read int $age\n */\ntrait HasTimestamps {}\n",
    );
    write(
        root,
        "src/Model.php",
        "<?php\nnamespace App;\n\nabstract class Model\n{\n    use Concerns\\HasTimestamps;\n\n    /** @var int */\n    public $id;\n}\n",
    );
    write(
        root,
        "src/Post.php",
        "<?php\nnamespace App;\n\nuse App\\Auth\\User;\n\n/**\n * @property-read User $author\n * @property-write string[] $tags\n * @property Missing<int $broken\n */\nclass Post extends Model {}\n",
    );
    dir
}

fn open(dir: &TempDir) -> Project {
    Project::open(&dir.path().join("classes.json"), None).unwrap()
}

fn to_json<T: serde::Serialize>(response: &T) -> Value {
    let mut out = Vec::new();
    emit_response(response, &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn has_reports_annotation_native_and_missing() {
    let dir = workspace();
    let project = open(&dir);

    assert!(run_has(&project, "App\\Post", "author").unwrap().found);
    assert!(run_has(&project, "App\\Post", "created_at").unwrap().found);
    assert!(run_has(&project, "App\\Post", "id").unwrap().found);
    assert!(!run_has(&project, "App\\Post", "broken").unwrap().found);

    let json = to_json(&run_has(&project, "\\app\\post", "nope").unwrap());
    assert_eq!(
        json,
        json!({
            "status": "ok",
            "schema_version": "1",
            "class": "App\\Post",
            "property": "nope",
            "found": false
        })
    );
}

#[test]
fn get_resolves_type_in_declaring_file() {
    let dir = workspace();
    let project = open(&dir);

    let json = to_json(&run_get(&project, "App\\Post", "author").unwrap());
    assert_eq!(json["status"], "ok");
    assert_eq!(json["property"]["type"], "\\App\\Auth\\User");
    assert_eq!(json["property"]["readable"], true);
    assert_eq!(json["property"]["writable"], false);
    assert_eq!(json["property"]["declaring_class"], "App\\Post");
    assert_eq!(json["property"]["origin"], "annotation");
    assert_eq!(json["property"]["tag"], "@property-read");

    let tags = run_get(&project, "App\\Post", "tags").unwrap();
    assert_eq!(tags.property.type_string, "array<string>");
    assert!(!tags.property.readable);
}

#[test]
fn get_prefers_native_declaration() {
    let dir = workspace();
    let project = open(&dir);

    let id = run_get(&project, "App\\Post", "id").unwrap();
    assert_eq!(id.property.type_string, "int");
    assert_eq!(id.property.declaring_class, "App\\Model");
    assert!(id.property.tag.is_none());
}

#[test]
fn list_is_in_merge_order() {
    let dir = workspace();
    let project = open(&dir);

    let json = to_json(&run_list(&project, "App\\Post").unwrap());
    assert_eq!(json["kind"], "class");
    let names: Vec<&str> = json["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["created_at", "age", "author", "tags"]);
    assert_eq!(json["properties"][0]["type"], "\\DateTimeImmutable");
    assert_eq!(json["properties"][0]["declaring_class"], "App\\Concerns\\HasTimestamps");
}

#[test]
fn missing_property_is_resolution_error() {
    let dir = workspace();
    let project = open(&dir);

    let err = run_get(&project, "App\\Post", "broken").unwrap_err();
    assert_eq!(OutputErrorCode::from(&err).code(), 3);

    let json = to_json(&ErrorResponse::from_error(&err));
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
    assert_eq!(
        json["error"]["message"],
        "property 'broken' not found on class 'App\\Post'"
    );
}

#[test]
fn unknown_class_is_resolution_error() {
    let dir = workspace();
    let project = open(&dir);

    let err = run_has(&project, "App\\Comment", "body").unwrap_err();
    assert!(matches!(err, PropdocError::ClassNotFound { .. }));
    assert_eq!(OutputErrorCode::from(&err).code(), 3);
}

#[test]
fn explicit_root_overrides_manifest_dir() {
    let dir = workspace();
    let elsewhere = TempDir::new().unwrap();
    fs::copy(
        dir.path().join("classes.json"),
        elsewhere.path().join("classes.json"),
    )
    .unwrap();

    // Sources are not next to the manifest: nothing resolves.
    let detached = open(&elsewhere);
    assert!(!run_has(&detached, "App\\Post", "author").unwrap().found);

    let rooted = Project::open(&elsewhere.path().join("classes.json"), Some(dir.path())).unwrap();
    assert!(run_has(&rooted, "App\\Post", "author").unwrap().found);
}

#[test]
fn manifest_errors_map_to_code_4() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.json", "{ \"classes\": [ ");
    write(
        dir.path(),
        "cycle.json",
        r#"{ "classes": [
            { "name": "A", "extends": "B" },
            { "name": "B", "extends": "A" }
        ] }"#,
    );

    for (file, check) in [
        ("bad.json", matches_parse as fn(&ManifestError) -> bool),
        ("cycle.json", matches_cycle),
        ("absent.json", matches_io),
    ] {
        let err = match Project::open(&dir.path().join(file), None) {
            Ok(_) => panic!("{} should fail to open", file),
            Err(err) => err,
        };
        assert_eq!(OutputErrorCode::from(&err).code(), 4, "{}", file);
        match &err {
            PropdocError::Manifest(inner) => assert!(check(inner), "{}: {}", file, inner),
            other => panic!("{}: unexpected error {}", file, other),
        }
    }
}

fn matches_parse(err: &ManifestError) -> bool {
    matches!(err, ManifestError::Parse(_))
}

fn matches_cycle(err: &ManifestError) -> bool {
    matches!(err, ManifestError::InheritanceCycle { .. })
}

fn matches_io(err: &ManifestError) -> bool {
    matches!(err, ManifestError::Io { .. })
}
