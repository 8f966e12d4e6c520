#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Tests for manifest loading and the manifest → router → artifact pipeline
//!
//! # Test Strategy
//!
//! Writes manifests to temp files in both supported formats and drives them
//! through the same code path the CLI uses.

use std::io::Write;
use switchback::artifact::{Artifact, CompiledMatcher};
use switchback::manifest::load_manifest;
use switchback::route::HandlerRef;
use switchback::router::Router;

const YAML_MANIFEST: &str = r#"
base_url: https://api.example.com
routes:
  - path: /pets
    methods: [GET]
    handler: PetController::index
    name: pets.index
  - path: /pets/{id:\d+}
    methods: [GET, DELETE]
    handler: PetController::show
    name: pets.show
    priority: 5
    middleware: [auth, throttle]
  - path: /pets/{slug}
    handler: pets_by_slug
"#;

#[test]
fn yaml_manifest_loads_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.yaml");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(YAML_MANIFEST.as_bytes())
        .unwrap();

    let manifest = load_manifest(&path).unwrap();
    assert_eq!(manifest.base_url.as_deref(), Some("https://api.example.com"));
    assert_eq!(manifest.routes.len(), 3);

    let routes = manifest.build_routes().unwrap();
    assert_eq!(
        routes[1].handler(),
        &HandlerRef::class_method("PetController", "show")
    );
    assert_eq!(routes[1].middleware(), ["auth", "throttle"]);
    // Declarations without methods default to GET.
    assert_eq!(routes[2].methods(), ["GET"]);
    assert_eq!(routes[2].handler(), &HandlerRef::closure("pets_by_slug"));
}

#[test]
fn json_manifest_loads_by_extension() {
    let json = serde_json::json!({
        "routes": [
            { "path": "/a", "handler": "a_handler" },
            { "path": "/a/{x}", "handler": "A::x", "methods": ["post"] }
        ]
    });
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.json");
    std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    let manifest = load_manifest(&path).unwrap();
    let routes = manifest.build_routes().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[1].methods(), ["POST"]);
}

#[test]
fn manifest_to_artifact_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("routes.yaml");
    std::fs::write(&manifest_path, YAML_MANIFEST).unwrap();

    let manifest = load_manifest(&manifest_path).unwrap();
    let router = Router::new(manifest.build_routes().unwrap());

    let artifact_path = dir.path().join("routes.compiled.json");
    Artifact::compile(&router).write(&artifact_path).unwrap();
    let matcher = CompiledMatcher::load(&artifact_path).unwrap();

    for (method, path) in [
        ("GET", "/pets"),
        ("GET", "/pets/9"),
        ("DELETE", "/pets/9"),
        ("GET", "/pets/rex"),
        ("PUT", "/pets/9"),
        ("GET", "/nothing"),
    ] {
        assert_eq!(
            router.match_route(method, path),
            matcher.match_route(method, path),
            "divergence on {method} {path}"
        );
    }
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_manifest(std::path::Path::new("/nonexistent/routes.yaml")).is_err());
}
