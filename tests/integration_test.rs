use openapi_synth::{
    annotations::{parse_fragment, DocCommentCollector},
    backfill::{REQUEST_PLACEHOLDER, RESPONSE_PLACEHOLDER},
    cli::Framework,
    config::SynthConfig,
    detector::FrameworkDetector,
    endpoint::{Endpoint, EndpointProvider},
    extractor::SourceRoutes,
    openapi::Document,
    openapi_builder::Synthesizer,
    parser::AstParser,
    scanner::FileScanner,
    serializer::{serialize_json, serialize_yaml},
};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn config() -> SynthConfig {
    SynthConfig {
        title: "Chat API".to_string(),
        ..SynthConfig::default()
    }
    .with_version("0.7.5")
}

fn fixture_synthesizer(name: &str, annotation_patterns: &[&str]) -> Synthesizer {
    let root = fixture(name);
    let patterns = annotation_patterns.iter().map(|p| p.to_string()).collect();
    Synthesizer::new(config())
        .with_provider(Arc::new(SourceRoutes::new(root.clone())))
        .with_annotations(Arc::new(DocCommentCollector::new(root, patterns)))
}

fn operations(document: &Document, path: &str) -> Vec<String> {
    document.paths[path].operations.keys().cloned().collect()
}

#[test]
fn test_head_is_dropped_from_parameterized_path() {
    let synth = Synthesizer::new(config())
        .with_provider(Arc::new(vec![Endpoint::new("/user/:id", ["GET", "HEAD"])]));

    let document = synth.build_document(None).unwrap();

    assert_eq!(
        document.paths.keys().cloned().collect::<Vec<_>>(),
        vec!["/user/{id}".to_string()]
    );
    assert_eq!(operations(&document, "/user/{id}"), vec!["get".to_string()]);
}

#[test]
fn test_empty_route_table_still_has_catalog_and_security() {
    let document = Synthesizer::new(config()).build_document(None).unwrap();
    let value = serde_json::to_value(&document).unwrap();

    assert_eq!(value["paths"], serde_json::json!({}));
    assert_eq!(document.tags.len(), 25);
    assert_eq!(
        value["components"]["securitySchemes"]["bearerAuth"]["scheme"],
        "bearer"
    );
    assert!(value.get("servers").is_none());
}

#[test]
fn test_annotated_error_response_keeps_generated_ok() {
    let fragment = parse_fragment(
        r#"
/auth/login:
  post:
    responses:
      400:
        description: Missing email or password.
"#,
        Path::new("auth.rs"),
    )
    .unwrap();
    let synth = Synthesizer::new(config())
        .with_provider(Arc::new(vec![Endpoint::new("/auth/login", ["POST"])]))
        .with_annotations(Arc::new(fragment));

    let document = synth.build_document(None).unwrap();
    let operation = &document.paths["/auth/login"].operations["post"];
    let responses = operation.responses.as_ref().unwrap();

    assert_eq!(
        responses.keys().cloned().collect::<Vec<_>>(),
        vec!["200".to_string(), "400".to_string()]
    );
    assert_eq!(responses["200"].description.as_deref(), Some("OK"));
    assert_eq!(
        responses["400"].description.as_deref(),
        Some("Missing email or password.")
    );
    assert_eq!(operation.summary.as_deref(), Some("POST /auth/login"));
}

#[test]
fn test_axum_project_routes_from_source() {
    let endpoints = SourceRoutes::new(fixture("axum_app")).list_endpoints();

    assert_eq!(
        endpoints,
        vec![
            Endpoint::new("/health", ["GET"]),
            Endpoint::new("/api/auth/login", ["POST"]),
            Endpoint::new("/api/auth/logout", ["POST"]),
            Endpoint::new("/api/user", ["GET"]),
            Endpoint::new("/api/user/:id", ["DELETE", "GET"]),
            Endpoint::new("/api/user/terms", ["GET", "POST"]),
        ]
    );
}

#[test]
fn test_axum_project_document() {
    let synth = fixture_synthesizer("axum_app", &["src/**/*.rs", "docs/openapi/*.yaml"]);
    let document = synth.build_document(Some("http://localhost:3080")).unwrap();

    assert_eq!(
        document.paths.keys().cloned().collect::<Vec<_>>(),
        vec![
            "/api/auth/login",
            "/api/auth/logout",
            "/api/user",
            "/api/user/terms",
            "/api/user/{id}",
            "/health",
        ]
    );
    assert_eq!(
        operations(&document, "/api/user/{id}"),
        vec!["delete".to_string(), "get".to_string()]
    );
    assert!(!document.paths.contains_key("/only-in-tests"));

    let login = &document.paths["/api/auth/login"].operations["post"];
    assert_eq!(
        login.summary.as_deref(),
        Some("Login with email and password.")
    );
    assert_eq!(login.tags, Some(vec!["auth".to_string()]));
    assert!(login.security.is_some());

    let body = serde_json::to_value(login.request_body.as_ref().unwrap()).unwrap();
    assert_eq!(body["required"], true);
    assert_eq!(
        body["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/LoginRequest"
    );

    let responses = login.responses.as_ref().unwrap();
    assert_eq!(
        responses["401"].description.as_deref(),
        Some("Invalid credentials.")
    );
    assert!(responses["200"].content.is_some());
    assert!(responses["401"].content.is_some());

    let profile = &document.paths["/api/user/{id}"].operations["get"];
    assert_eq!(profile.summary.as_deref(), Some("Fetch a user profile."));

    assert!(document.components.schemas.contains_key("LoginRequest"));
    assert_eq!(
        document.servers.as_ref().unwrap()[0].url,
        "http://localhost:3080"
    );
}

#[test]
fn test_placeholders_fill_unannotated_operations() {
    let synth = fixture_synthesizer("axum_app", &["docs/openapi/*.yaml"]);
    let document = synth.build_document(None).unwrap();
    let value = serde_json::to_value(&document).unwrap();

    let logout = &value["paths"]["/api/auth/logout"]["post"];
    assert_eq!(logout["summary"], "POST /api/auth/logout");
    assert_eq!(logout["requestBody"]["required"], false);
    assert_eq!(
        logout["requestBody"]["content"]["application/json"]["schema"]["description"],
        REQUEST_PLACEHOLDER
    );
    assert_eq!(
        logout["responses"]["200"]["content"]["application/json"]["schema"]["description"],
        RESPONSE_PLACEHOLDER
    );

    let health = &value["paths"]["/health"]["get"];
    assert!(health.get("requestBody").is_none());
    assert_eq!(health["security"], serde_json::json!([{ "bearerAuth": [] }]));
}

#[test]
fn test_actix_project_document() {
    let files = FileScanner::new(fixture("actix_app")).scan().unwrap().files;
    let parsed = AstParser::parse_files(&files);
    assert_eq!(
        FrameworkDetector::detect(&parsed).frameworks,
        vec![Framework::ActixWeb]
    );

    let synth = fixture_synthesizer("actix_app", &[]);
    let document = synth.build_document(None).unwrap();

    assert_eq!(
        document.paths.keys().cloned().collect::<Vec<_>>(),
        vec!["/api/convos", "/api/user", "/api/user/{id}", "/health"]
    );
    assert_eq!(operations(&document, "/api/user"), vec!["post".to_string()]);
    assert_eq!(
        document.paths["/api/convos"].operations["get"]
            .summary
            .as_deref(),
        Some("List conversations.")
    );
}

#[test]
fn test_forced_framework_overrides_detection() {
    let endpoints = SourceRoutes::new(fixture("actix_app"))
        .with_framework(Some(Framework::Axum))
        .list_endpoints();

    assert!(endpoints.is_empty());
}

#[test]
fn test_json_round_trip() {
    let synth = fixture_synthesizer("axum_app", &["src/**/*.rs", "docs/openapi/*.yaml"]);
    let document = synth.build_document(Some("https://chat.example.com")).unwrap();

    let json = serialize_json(&document).unwrap();
    let parsed: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, document);
}

#[test]
fn test_yaml_output() {
    let synth = fixture_synthesizer("axum_app", &["src/**/*.rs"]);
    let yaml = serialize_yaml(&synth.build_document(None).unwrap()).unwrap();

    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(value["openapi"].as_str(), Some("3.0.3"));
    assert_eq!(value["info"]["title"].as_str(), Some("Chat API"));
    assert!(value["paths"]["/api/user/{id}"]["get"].is_mapping());
}
