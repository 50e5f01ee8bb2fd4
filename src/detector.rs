use crate::cli::Framework;
use crate::parser::ParsedFile;
use log::debug;
use std::collections::BTreeSet;
use syn::{Item, UseTree};

/// Framework detector for identifying web frameworks used in a Rust project.
///
/// Looks at the crate names imported by `use` statements (at any nesting depth of the
/// file's items). Currently supports detection of:
/// - Axum (via `use axum::...`)
/// - Actix-Web (via `use actix_web::...`)
pub struct FrameworkDetector;

/// Result of framework detection.
pub struct DetectionResult {
    /// Detected frameworks, in a stable order
    pub frameworks: Vec<Framework>,
}

impl FrameworkDetector {
    /// Detects web frameworks used in the provided parsed files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use openapi_synth::detector::FrameworkDetector;
    /// use openapi_synth::parser::AstParser;
    /// use std::path::Path;
    ///
    /// let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
    /// let result = FrameworkDetector::detect(&[parsed]);
    /// println!("Detected {} framework(s)", result.frameworks.len());
    /// ```
    pub fn detect(parsed_files: &[ParsedFile]) -> DetectionResult {
        debug!("Detecting frameworks in {} files", parsed_files.len());

        let mut detected = BTreeSet::new();
        for parsed_file in parsed_files {
            Self::check_items(&parsed_file.syntax_tree.items, &mut detected);
        }

        let frameworks: Vec<Framework> = detected.into_iter().collect();
        debug!("Detected frameworks: {:?}", frameworks);

        DetectionResult { frameworks }
    }

    fn check_items(items: &[Item], detected: &mut BTreeSet<Framework>) {
        for item in items {
            match item {
                Item::Use(use_item) => Self::check_use_tree(&use_item.tree, detected),
                Item::Mod(module) => {
                    if let Some((_, items)) = &module.content {
                        Self::check_items(items, detected);
                    }
                }
                _ => {}
            }
        }
    }

    fn check_ident(ident: &syn::Ident, detected: &mut BTreeSet<Framework>) {
        if ident == "axum" {
            detected.insert(Framework::Axum);
        } else if ident == "actix_web" {
            detected.insert(Framework::ActixWeb);
        }
    }

    /// Recursively check use tree for framework imports
    fn check_use_tree(tree: &UseTree, detected: &mut BTreeSet<Framework>) {
        match tree {
            UseTree::Path(path) => {
                Self::check_ident(&path.ident, detected);
                Self::check_use_tree(&path.tree, detected);
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    Self::check_use_tree(item, detected);
                }
            }
            UseTree::Rename(rename) => Self::check_ident(&rename.ident, detected),
            UseTree::Name(name) => Self::check_ident(&name.ident, detected),
            // Glob imports don't name a crate on their own
            UseTree::Glob(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;
    use std::path::Path;

    fn parse(name: &str, code: &str) -> ParsedFile {
        AstParser::parse_source(Path::new(name), code).unwrap()
    }

    #[test]
    fn test_detect_axum_framework() {
        let parsed = parse(
            "axum.rs",
            r#"
            use axum::{Router, routing::get};

            pub fn app() -> Router {
                Router::new().route("/", get(hello))
            }
        "#,
        );

        let result = FrameworkDetector::detect(&[parsed]);
        assert_eq!(result.frameworks, vec![Framework::Axum]);
    }

    #[test]
    fn test_detect_actix_web_framework() {
        let parsed = parse(
            "actix.rs",
            r#"
            use actix_web::{web, App, HttpResponse, HttpServer};

            #[actix_web::get("/")]
            async fn hello() -> HttpResponse {
                HttpResponse::Ok().body("Hello, World!")
            }
        "#,
        );

        let result = FrameworkDetector::detect(&[parsed]);
        assert_eq!(result.frameworks, vec![Framework::ActixWeb]);
    }

    #[test]
    fn test_detect_mixed_frameworks_once_each() {
        let result = FrameworkDetector::detect(&[
            parse("a.rs", "use axum::Router;"),
            parse("b.rs", "use actix_web::{web, App};"),
            parse("c.rs", "use axum::routing::get;"),
        ]);

        assert_eq!(result.frameworks, vec![Framework::Axum, Framework::ActixWeb]);
    }

    #[test]
    fn test_detect_no_framework() {
        let parsed = parse(
            "plain.rs",
            r#"
            use std::collections::HashMap;
            use serde::{Serialize, Deserialize};

            pub fn process(map: HashMap<String, u32>) -> usize { map.len() }
        "#,
        );

        assert!(FrameworkDetector::detect(&[parsed]).frameworks.is_empty());
        assert!(FrameworkDetector::detect(&[]).frameworks.is_empty());
    }

    #[test]
    fn test_detect_renamed_and_nested_imports() {
        let result = FrameworkDetector::detect(&[parse(
            "renamed.rs",
            r#"
            use actix_web as actix;

            mod routes {
                use axum::{extract::{Path, Query}, routing::*};
            }
        "#,
        )]);

        assert_eq!(result.frameworks, vec![Framework::Axum, Framework::ActixWeb]);
    }
}
