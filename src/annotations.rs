//! Collects hand-written `@openapi` documentation blocks from source files.
//!
//! A block is a doc comment whose first line is `@openapi`; the lines after it are a YAML
//! OpenAPI fragment with top-level `paths` and/or `components.schemas`:
//!
//! ```text
//! /**
//!  * @openapi
//!  * /api/auth/login:
//!  *   post:
//!  *     summary: Login with email and password.
//!  *     responses:
//!  *       400:
//!  *         description: Invalid credentials.
//!  */
//! ```
//!
//! `///` and `//!` line runs work the same way. Rust files are parsed and only real `#[doc]`
//! attributes are read, so comment syntax inside string literals is ignored. Matched
//! `.yaml`/`.yml` files are read whole as a single fragment, and any other file is scanned line
//! by line for comment blocks. Collection never fails: unreadable files and malformed blocks are
//! logged and skipped.

use crate::openapi::{Paths, Schema};
use crate::parser::AstParser;
use crate::paths::normalize_path;
use crate::scanner::FileScanner;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use syn::visit::{self, Visit};
use syn::{Attribute, Expr, ExprLit, Field, ImplItem, Item, Lit, Local, Meta, TraitItem, Variant};

/// Marker that opens an annotation block
pub const ANNOTATION_MARKER: &str = "@openapi";

/// Partial OpenAPI document compiled from annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Paths>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<FragmentComponents>,
}

/// The `components` subset annotations may contribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentComponents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
}

impl OpenApiFragment {
    pub fn is_empty(&self) -> bool {
        self.paths.as_ref().map_or(true, |p| p.is_empty()) && self.schemas().is_empty()
    }

    /// Component schemas defined by the fragment
    pub fn schemas(&self) -> BTreeMap<String, Schema> {
        self.components
            .as_ref()
            .and_then(|c| c.schemas.clone())
            .unwrap_or_default()
    }

    /// Folds `other` into this fragment.
    ///
    /// Path items union their operations and component schemas union by name. On a clash the
    /// later fragment wins.
    pub fn absorb(&mut self, other: OpenApiFragment) {
        if let Some(paths) = other.paths {
            let target = self.paths.get_or_insert_with(Paths::new);
            for (path, item) in paths {
                let path = normalize_path(&path);
                match target.get_mut(&path) {
                    Some(existing) => {
                        existing.operations.extend(item.operations);
                        existing.extensions.extend(item.extensions);
                        if item.reference.is_some() {
                            existing.reference = item.reference;
                        }
                        if item.summary.is_some() {
                            existing.summary = item.summary;
                        }
                        if item.description.is_some() {
                            existing.description = item.description;
                        }
                        if item.servers.is_some() {
                            existing.servers = item.servers;
                        }
                        if item.parameters.is_some() {
                            existing.parameters = item.parameters;
                        }
                    }
                    None => {
                        target.insert(path, item);
                    }
                }
            }
        }

        if let Some(schemas) = other.components.and_then(|c| c.schemas) {
            self.components
                .get_or_insert_with(FragmentComponents::default)
                .schemas
                .get_or_insert_with(BTreeMap::new)
                .extend(schemas);
        }
    }
}

/// Source of hand-written documentation fragments.
///
/// Implementations must not fail; a source with nothing to offer returns an empty fragment.
pub trait AnnotationSource: Send + Sync {
    fn collect_annotations(&self) -> OpenApiFragment;
}

impl AnnotationSource for OpenApiFragment {
    fn collect_annotations(&self) -> OpenApiFragment {
        self.clone()
    }
}

/// Scans files selected by glob patterns for `@openapi` comment blocks
#[derive(Debug, Clone)]
pub struct DocCommentCollector {
    root: PathBuf,
    patterns: Vec<String>,
}

impl DocCommentCollector {
    pub fn new(root: PathBuf, patterns: Vec<String>) -> Self {
        Self { root, patterns }
    }

    fn collect_file(&self, path: &Path) -> OpenApiFragment {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping annotations in {}: {}", path.display(), e);
                return OpenApiFragment::default();
            }
        };

        let blocks = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => return parse_fragment(&content, path).unwrap_or_default(),
            Some("rs") => match AstParser::parse_source(path, &content) {
                Ok(parsed) => extract_doc_annotations(&parsed.syntax_tree),
                Err(e) => {
                    warn!("Skipping annotations in {}: {:#}", path.display(), e);
                    return OpenApiFragment::default();
                }
            },
            _ => extract_annotation_blocks(&content),
        };

        let mut fragment = OpenApiFragment::default();
        for block in blocks {
            if let Some(parsed) = parse_fragment(&block, path) {
                fragment.absorb(parsed);
            }
        }
        fragment
    }
}

impl AnnotationSource for DocCommentCollector {
    fn collect_annotations(&self) -> OpenApiFragment {
        let scanner = match FileScanner::new(self.root.clone()).with_patterns(&self.patterns) {
            Ok(scanner) => scanner,
            Err(e) => {
                warn!("Annotation patterns rejected: {:#}", e);
                return OpenApiFragment::default();
            }
        };

        let scan = match scanner.scan() {
            Ok(scan) => scan,
            Err(e) => {
                warn!("Annotation scan failed: {:#}", e);
                return OpenApiFragment::default();
            }
        };

        let mut fragment = OpenApiFragment::default();
        for path in &scan.files {
            fragment.absorb(self.collect_file(path));
        }

        debug!(
            "Collected {} annotated paths and {} schemas from {} files",
            fragment.paths.as_ref().map_or(0, |p| p.len()),
            fragment.schemas().len(),
            scan.files.len()
        );
        fragment
    }
}

/// Parses a YAML fragment body, returning `None` (with a warning) when it is unusable.
///
/// Besides `paths` and `components`, top-level keys starting with `/` are taken as paths.
pub fn parse_fragment(body: &str, origin: &Path) -> Option<OpenApiFragment> {
    let yaml: serde_yaml::Value = match serde_yaml::from_str(body) {
        Ok(yaml) => yaml,
        Err(e) => {
            warn!("Invalid annotation YAML in {}: {}", origin.display(), e);
            return None;
        }
    };

    let serde_json::Value::Object(mut object) = yaml_to_json(yaml) else {
        warn!("Annotation in {} is not a mapping, ignoring", origin.display());
        return None;
    };

    let path_keys: Vec<String> = object
        .keys()
        .filter(|key| key.starts_with('/'))
        .cloned()
        .collect();
    let top_level_paths: serde_json::Map<String, serde_json::Value> = path_keys
        .into_iter()
        .filter_map(|key| object.remove(&key).map(|value| (key, value)))
        .collect();

    let has_known_keys = object.contains_key("paths") || object.contains_key("components");
    if !has_known_keys && top_level_paths.is_empty() {
        warn!(
            "Annotation in {} has neither paths nor components, ignoring",
            origin.display()
        );
        return None;
    }

    let parsed =
        match serde_json::from_value::<OpenApiFragment>(serde_json::Value::Object(object)) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Malformed annotation in {}: {}", origin.display(), e);
                return None;
            }
        };

    // Absorbing normalizes the path keys
    let mut fragment = OpenApiFragment::default();
    fragment.absorb(parsed);

    if !top_level_paths.is_empty() {
        match serde_json::from_value::<Paths>(serde_json::Value::Object(top_level_paths)) {
            Ok(paths) => fragment.absorb(OpenApiFragment {
                paths: Some(paths),
                components: None,
            }),
            Err(e) => {
                warn!("Malformed annotation in {}: {}", origin.display(), e);
                return None;
            }
        }
    }

    Some(fragment)
}

/// Converts YAML into JSON, stringifying non-string mapping keys (`200:` becomes `"200"`)
pub fn yaml_to_json(value: serde_yaml::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(u) = n.as_u64() {
                Json::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Json::Null, Json::Number)
            }
        }
        Yaml::String(s) => Json::String(s),
        Yaml::Sequence(items) => Json::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Json::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Extracts the YAML bodies of every `@openapi` doc comment in a parsed Rust file
pub fn extract_doc_annotations(file: &syn::File) -> Vec<String> {
    let mut visitor = DocAttributeVisitor::default();
    visitor.visit_file(file);
    visitor
        .blocks
        .into_iter()
        .filter_map(|lines| annotation_body(&lines))
        .collect()
}

/// Groups the `#[doc]` attributes of each item into comment blocks.
///
/// Consecutive line docs on one item form a single block; a block doc (`/** */`) is always a
/// block of its own.
#[derive(Default)]
struct DocAttributeVisitor {
    blocks: Vec<Vec<String>>,
}

impl DocAttributeVisitor {
    fn push_attrs(&mut self, attrs: &[Attribute]) {
        let mut run: Vec<String> = Vec::new();
        for attr in attrs {
            match doc_text(attr) {
                Some(text) if text.contains('\n') => {
                    if !run.is_empty() {
                        self.blocks.push(std::mem::take(&mut run));
                    }
                    self.blocks.push(text.lines().map(strip_gutter).collect());
                }
                Some(text) => run.push(text),
                None if !run.is_empty() => self.blocks.push(std::mem::take(&mut run)),
                None => {}
            }
        }
        if !run.is_empty() {
            self.blocks.push(run);
        }
    }
}

impl<'ast> Visit<'ast> for DocAttributeVisitor {
    fn visit_file(&mut self, file: &'ast syn::File) {
        self.push_attrs(&file.attrs);
        visit::visit_file(self, file);
    }

    fn visit_item(&mut self, item: &'ast Item) {
        self.push_attrs(item_attrs(item));
        visit::visit_item(self, item);
    }

    fn visit_impl_item(&mut self, item: &'ast ImplItem) {
        let attrs: &[Attribute] = match item {
            ImplItem::Const(item) => &item.attrs,
            ImplItem::Fn(item) => &item.attrs,
            ImplItem::Type(item) => &item.attrs,
            ImplItem::Macro(item) => &item.attrs,
            _ => &[],
        };
        self.push_attrs(attrs);
        visit::visit_impl_item(self, item);
    }

    fn visit_trait_item(&mut self, item: &'ast TraitItem) {
        let attrs: &[Attribute] = match item {
            TraitItem::Const(item) => &item.attrs,
            TraitItem::Fn(item) => &item.attrs,
            TraitItem::Type(item) => &item.attrs,
            TraitItem::Macro(item) => &item.attrs,
            _ => &[],
        };
        self.push_attrs(attrs);
        visit::visit_trait_item(self, item);
    }

    fn visit_field(&mut self, field: &'ast Field) {
        self.push_attrs(&field.attrs);
        visit::visit_field(self, field);
    }

    fn visit_variant(&mut self, variant: &'ast Variant) {
        self.push_attrs(&variant.attrs);
        visit::visit_variant(self, variant);
    }

    fn visit_local(&mut self, local: &'ast Local) {
        self.push_attrs(&local.attrs);
        visit::visit_local(self, local);
    }
}

fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Const(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        Item::ExternCrate(item) => &item.attrs,
        Item::Fn(item) => &item.attrs,
        Item::ForeignMod(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        Item::Macro(item) => &item.attrs,
        Item::Mod(item) => &item.attrs,
        Item::Static(item) => &item.attrs,
        Item::Struct(item) => &item.attrs,
        Item::Trait(item) => &item.attrs,
        Item::TraitAlias(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Union(item) => &item.attrs,
        Item::Use(item) => &item.attrs,
        _ => &[],
    }
}

/// Text of a `#[doc = "..."]` attribute
fn doc_text(attr: &Attribute) -> Option<String> {
    let Meta::NameValue(meta) = &attr.meta else {
        return None;
    };
    if !meta.path.is_ident("doc") {
        return None;
    }
    match &meta.value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(text),
            ..
        }) => Some(text.value()),
        _ => None,
    }
}

/// Extracts the YAML bodies of every `@openapi` comment block in `source`.
///
/// Works on raw text, for annotated files that are not Rust.
pub fn extract_annotation_blocks(source: &str) -> Vec<String> {
    comment_blocks(source)
        .into_iter()
        .filter_map(|lines| annotation_body(&lines))
        .collect()
}

/// Splits source text into comment blocks, with comment syntax removed from each line
fn comment_blocks(source: &str) -> Vec<Vec<String>> {
    let mut blocks = Vec::new();
    let mut line_run: Vec<String> = Vec::new();
    let mut block: Option<Vec<String>> = None;

    for line in source.lines() {
        if let Some(current) = block.as_mut() {
            match line.find("*/") {
                Some(end) => {
                    current.push(strip_gutter(&line[..end]));
                    blocks.push(block.take().unwrap_or_default());
                }
                None => current.push(strip_gutter(line)),
            }
            continue;
        }

        let trimmed = line.trim_start();
        let doc_line = trimmed
            .strip_prefix("///")
            .or_else(|| trimmed.strip_prefix("//!"));
        if let Some(rest) = doc_line {
            line_run.push(rest.to_string());
            continue;
        }
        if !line_run.is_empty() {
            blocks.push(std::mem::take(&mut line_run));
        }

        let opened = trimmed
            .strip_prefix("/**")
            .or_else(|| trimmed.strip_prefix("/*!"));
        if let Some(rest) = opened {
            match rest.find("*/") {
                Some(end) => blocks.push(vec![rest[..end].to_string()]),
                None => block = Some(vec![rest.to_string()]),
            }
        }
    }

    if !line_run.is_empty() {
        blocks.push(line_run);
    }
    blocks
}

/// Removes the conventional ` * ` gutter of a block comment line
fn strip_gutter(line: &str) -> String {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.to_string(),
        None => line.to_string(),
    }
}

/// Returns the dedented YAML body if the block opens with the annotation marker
fn annotation_body(lines: &[String]) -> Option<String> {
    let start = lines.iter().position(|line| !line.trim().is_empty())?;
    if lines[start].trim() != ANNOTATION_MARKER {
        return None;
    }

    let body = &lines[start + 1..];
    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let text: Vec<&str> = body
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.get(indent..).unwrap_or(line.trim_start()).trim_end()
            }
        })
        .collect();

    Some(text.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const LOGIN_ROUTE: &str = r#"
use axum::{routing::post, Router};

/**
 * @openapi
 * /api/auth/login:
 *   post:
 *     tags: [auth]
 *     summary: Login with email and password.
 *     requestBody:
 *       required: true
 *       content:
 *         application/json:
 *           schema:
 *             $ref: '#/components/schemas/LoginRequest'
 *     responses:
 *       200:
 *         description: Login succeeded.
 *       400:
 *         description: Invalid credentials.
 */
pub fn routes() -> Router {
    Router::new().route("/login", post(login))
}
"#;

    const SCHEMAS: &str = r#"
/// @openapi
/// components:
///   schemas:
///     LoginRequest:
///       type: object
///       required: [email, password]
///       properties:
///         email:
///           type: string
///           format: email
///         password:
///           type: string
///           format: password
pub struct LoginRequest;
"#;

    fn doc_blocks(source: &str) -> Vec<String> {
        extract_doc_annotations(&syn::parse_file(source).unwrap())
    }

    #[test]
    fn test_block_comment_annotation() {
        let blocks = doc_blocks(LOGIN_ROUTE);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].starts_with("/api/auth/login:\n  post:"));

        let fragment = parse_fragment(&blocks[0], Path::new("auth.rs")).unwrap();
        let paths = fragment.paths.unwrap();
        let operation = &paths["/api/auth/login"].operations["post"];

        assert_eq!(
            operation.summary.as_deref(),
            Some("Login with email and password.")
        );
        assert_eq!(operation.tags, Some(vec!["auth".to_string()]));
        let responses = operation.responses.as_ref().unwrap();
        assert_eq!(
            responses["400"].description.as_deref(),
            Some("Invalid credentials.")
        );
        assert_eq!(responses.len(), 2);
    }

    #[test]
    fn test_line_comment_annotation_with_schemas() {
        let blocks = doc_blocks(SCHEMAS);
        assert_eq!(blocks.len(), 1);

        let fragment = parse_fragment(&blocks[0], Path::new("schemas.rs")).unwrap();
        let schemas = fragment.schemas();
        let login = &schemas["LoginRequest"];
        assert_eq!(login.schema_type.as_deref(), Some("object"));
        assert_eq!(
            login.required,
            Some(vec!["email".to_string(), "password".to_string()])
        );
        assert!(fragment.paths.is_none());
    }

    #[test]
    fn test_plain_doc_comments_are_ignored() {
        let source = r#"
/// Builds the router.
///
/// Nothing to see here.
fn app() {}

/** Not an annotation either */
fn other() {}
"#;
        assert!(doc_blocks(source).is_empty());
        assert!(extract_annotation_blocks(source).is_empty());
    }

    #[test]
    fn test_comment_syntax_in_string_literals_is_ignored() {
        let source = r##"
const TEMPLATE: &str = r#"
/**
 * @openapi
 * /api/fake:
 *   get:
 *     summary: Not real
 */
"#;

fn greeting() -> &'static str {
    "/// @openapi\n/// /api/also-fake:\n///   get: {}"
}
"##;
        assert!(doc_blocks(source).is_empty());
    }

    #[test]
    fn test_inner_and_nested_doc_annotations() {
        let source = r#"
//! @openapi
//! /api/health:
//!   get:
//!     summary: Health check

mod admin {
    pub struct Routes;

    impl Routes {
        /**
         * @openapi
         * /api/admin/users:
         *   delete:
         *     summary: Remove a user
         */
        pub fn register(&self) {}
    }
}
"#;
        let blocks = doc_blocks(source);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("/api/health:\n  get:"));
        assert!(blocks[1].starts_with("/api/admin/users:\n  delete:"));
    }

    #[test]
    fn test_path_level_extensions_are_not_operations() {
        let body = "/api/user:\n  x-internal: true\n  x-codegen:\n    group: ops\n  get:\n    summary: Profile\n";
        let fragment = parse_fragment(body, Path::new("user.rs")).unwrap();

        let item = &fragment.paths.unwrap()["/api/user"];
        let methods: Vec<_> = item.operations.keys().cloned().collect();
        assert_eq!(methods, vec!["get"]);
        assert_eq!(item.extensions["x-internal"], serde_json::json!(true));
        assert_eq!(
            item.extensions["x-codegen"],
            serde_json::json!({ "group": "ops" })
        );
    }

    #[test]
    fn test_absorb_keeps_path_extensions() {
        let mut fragment =
            parse_fragment("/api/user:\n  x-owner: accounts\n  get: {}\n", Path::new("a.rs"))
                .unwrap();
        let other =
            parse_fragment("/api/user:\n  x-internal: true\n  delete: {}\n", Path::new("b.rs"))
                .unwrap();
        fragment.absorb(other);

        let item = &fragment.paths.unwrap()["/api/user"];
        assert_eq!(item.operations.len(), 2);
        assert_eq!(item.extensions.len(), 2);
        assert_eq!(item.extensions["x-owner"], serde_json::json!("accounts"));
    }

    #[test]
    fn test_invalid_yaml_is_skipped() {
        let source = "/**\n * @openapi\n * paths: [unclosed\n */\n";
        let blocks = extract_annotation_blocks(source);
        assert_eq!(blocks.len(), 1);
        assert!(parse_fragment(&blocks[0], Path::new("x.rs")).is_none());
    }

    #[test]
    fn test_block_without_known_keys_is_skipped() {
        assert!(parse_fragment("title: Nope", Path::new("x.rs")).is_none());
    }

    #[test]
    fn test_top_level_path_keys_are_paths() {
        let body = "/api/user:\n  get:\n    summary: Profile\n    security:\n      - bearerAuth: []\n";
        let fragment = parse_fragment(body, Path::new("user.rs")).unwrap();

        let paths = fragment.paths.unwrap();
        let operation = &paths["/api/user"].operations["get"];
        assert_eq!(operation.summary.as_deref(), Some("Profile"));
        assert_eq!(operation.security.as_ref().unwrap()[0]["bearerAuth"].len(), 0);
    }

    #[test]
    fn test_numeric_keys_become_strings() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("200: ok\ntrue: yes\n1.5: x").unwrap();
        let json = yaml_to_json(yaml);
        let object = json.as_object().unwrap();
        assert!(object.contains_key("200"));
        assert!(object.contains_key("true"));
        assert!(object.contains_key("1.5"));
    }

    #[test]
    fn test_absorb_unions_methods_and_normalizes_paths() {
        let mut fragment = parse_fragment(
            "paths:\n  /user/:id:\n    get:\n      summary: Get user\n",
            Path::new("a.rs"),
        )
        .unwrap();
        let other = parse_fragment(
            "paths:\n  /user/{id}:\n    delete:\n      summary: Delete user\n",
            Path::new("b.rs"),
        )
        .unwrap();

        let mut combined = OpenApiFragment::default();
        combined.absorb(std::mem::take(&mut fragment));
        combined.absorb(other);

        let paths = combined.paths.unwrap();
        assert_eq!(paths.len(), 1);
        let methods: Vec<_> = paths["/user/{id}"].operations.keys().cloned().collect();
        assert_eq!(methods, vec!["delete", "get"]);
    }

    #[test]
    fn test_collector_scans_files_and_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/routes")).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("src/routes/auth.rs"), LOGIN_ROUTE).unwrap();
        fs::write(root.join("src/schemas.rs"), SCHEMAS).unwrap();
        fs::write(
            root.join("docs/health.yaml"),
            "paths:\n  /health:\n    get:\n      summary: Health check\n      tags: [system]\n",
        )
        .unwrap();

        let collector = DocCommentCollector::new(
            root.to_path_buf(),
            vec!["src/**/*.rs".to_string(), "docs/*.yaml".to_string()],
        );
        let fragment = collector.collect_annotations();

        let paths = fragment.paths.clone().unwrap();
        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/health"));
        assert!(fragment.schemas().contains_key("LoginRequest"));
    }

    #[test]
    fn test_collector_skips_unparseable_rust() {
        let temp_dir = TempDir::new().unwrap();
        let source = format!("{}\nfn broken( {{", LOGIN_ROUTE);
        fs::write(temp_dir.path().join("broken.rs"), source).unwrap();

        let collector =
            DocCommentCollector::new(temp_dir.path().to_path_buf(), vec!["*.rs".to_string()]);
        assert!(collector.collect_annotations().is_empty());
    }

    #[test]
    fn test_collector_missing_root_yields_empty_fragment() {
        let collector = DocCommentCollector::new(
            PathBuf::from("/nonexistent/annotation/root"),
            vec!["**/*.rs".to_string()],
        );
        assert!(collector.collect_annotations().is_empty());
    }

    #[test]
    fn test_collector_bad_pattern_yields_empty_fragment() {
        let temp_dir = TempDir::new().unwrap();
        let collector =
            DocCommentCollector::new(temp_dir.path().to_path_buf(), vec!["[".to_string()]);
        assert_eq!(collector.collect_annotations(), OpenApiFragment::default());
    }
}
