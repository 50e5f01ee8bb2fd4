//! Static route table extraction from web framework source code.
//!
//! Each framework has an extractor that walks parsed Rust files and reports the mounted
//! routes as [`Endpoint`] records, the same shape a running application's route table would
//! give. [`SourceRoutes`] packages scanning, parsing, detection and extraction as an
//! [`EndpointProvider`].
//!
//! # Supported Frameworks
//!
//! - **Axum**: See [`axum::AxumExtractor`]
//! - **Actix-Web**: See [`actix::ActixExtractor`]

pub mod actix;
pub mod axum;

use crate::cli::Framework;
use crate::detector::FrameworkDetector;
use crate::endpoint::{Endpoint, EndpointProvider};
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use syn::{Expr, Lit};

/// Trait for extracting mounted routes from parsed Rust files.
pub trait RouteExtractor {
    /// Extracts every route declared across `parsed_files`.
    ///
    /// Routers are often assembled in one file from functions defined in others, so the
    /// extractor sees the whole project at once.
    fn extract_endpoints(&self, parsed_files: &[ParsedFile]) -> Vec<Endpoint>;
}

/// Returns the extractor for a framework
pub fn extractor_for(framework: Framework) -> Box<dyn RouteExtractor> {
    match framework {
        Framework::Axum => Box::new(axum::AxumExtractor),
        Framework::ActixWeb => Box::new(actix::ActixExtractor),
    }
}

/// Upper-cased HTTP method for a routing function name (`get`, `post_service`, ...)
pub(crate) fn http_method(name: &str) -> Option<&'static str> {
    let name = name.strip_suffix("_service").unwrap_or(name);
    match name.to_lowercase().as_str() {
        "get" => Some("GET"),
        "post" => Some("POST"),
        "put" => Some("PUT"),
        "delete" => Some("DELETE"),
        "patch" => Some("PATCH"),
        "head" => Some("HEAD"),
        "options" => Some("OPTIONS"),
        "trace" => Some("TRACE"),
        "connect" => Some("CONNECT"),
        _ => None,
    }
}

/// Methods a catch-all route (`any(handler)`) answers
pub(crate) const ANY_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Joins a mount prefix and a route path, handling slashes
pub(crate) fn combine_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// The value of a string literal expression
pub(crate) fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        Expr::Paren(paren) => string_literal(&paren.expr),
        Expr::Group(group) => string_literal(&group.expr),
        Expr::Reference(reference) => string_literal(&reference.expr),
        _ => None,
    }
}

/// Last path segment of a call's function (`web::get()` -> `get`)
pub(crate) fn called_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Call(call) => match &*call.func {
            Expr::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Module name a file contributes to item paths (`src/routes/auth.rs` -> `auth`)
pub(crate) fn module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    match stem.as_str() {
        "mod" => path
            .parent()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        "lib" | "main" => "crate".to_string(),
        _ => stem,
    }
}

/// True for `#[cfg(test)]` attributes
pub(crate) fn is_cfg_test(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .map(|ident| ident == "test")
                .unwrap_or(false)
    })
}

/// Route table derived from a project's source code.
///
/// Stands in for runtime introspection, which the supported frameworks do not offer: the
/// project is scanned, parsed, and each detected framework's extractor reports its routes.
/// Any failure is logged and yields no routes.
#[derive(Debug, Clone)]
pub struct SourceRoutes {
    root: PathBuf,
    patterns: Vec<String>,
    framework: Option<Framework>,
}

impl SourceRoutes {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            patterns: Vec::new(),
            framework: None,
        }
    }

    /// Restricts the scanned files to the given glob patterns
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Skips detection and uses the given framework's extractor
    pub fn with_framework(mut self, framework: Option<Framework>) -> Self {
        self.framework = framework;
        self
    }

    fn parsed_files(&self) -> anyhow::Result<Vec<ParsedFile>> {
        let scan = FileScanner::new(self.root.clone())
            .with_patterns(&self.patterns)?
            .scan()?;
        for warning in &scan.warnings {
            warn!("{}", warning);
        }
        Ok(AstParser::parse_files(&scan.files))
    }
}

impl EndpointProvider for SourceRoutes {
    fn list_endpoints(&self) -> Vec<Endpoint> {
        let parsed_files = match self.parsed_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Route extraction skipped: {:#}", e);
                return Vec::new();
            }
        };

        let frameworks = match self.framework {
            Some(framework) => vec![framework],
            None => FrameworkDetector::detect(&parsed_files).frameworks,
        };

        if frameworks.is_empty() {
            info!("No supported web framework detected in {}", self.root.display());
            return Vec::new();
        }

        let mut endpoints = Vec::new();
        for framework in frameworks {
            let extracted = extractor_for(framework).extract_endpoints(&parsed_files);
            debug!("Extracted {} endpoints for {:?}", extracted.len(), framework);
            endpoints.extend(extracted);
        }
        endpoints
    }
}
