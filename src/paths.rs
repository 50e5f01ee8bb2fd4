//! Path normalization and the default operations synthesized for every mounted route.

use crate::endpoint::Endpoint;
use crate::openapi::{Operation, PathItem, Paths, Response, SecurityRequirement};
use log::debug;
use std::collections::BTreeMap;

/// Name of the security scheme every synthesized operation requires
pub const BEARER_AUTH: &str = "bearerAuth";

/// Methods that never get an operation of their own
const SKIPPED_METHODS: [&str; 2] = ["options", "head"];

/// Rewrites every `/:name` segment prefix into the OpenAPI `/{name}` placeholder.
///
/// `name` is the longest run of `[A-Za-z0-9_]` following the colon. Nothing else about
/// the path changes, and an already normalized path comes back untouched.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 2);
    let mut rest = path;

    while let Some(pos) = rest.find("/:") {
        let (head, tail) = rest.split_at(pos);
        normalized.push_str(head);

        // tail starts with "/:"
        let after = &tail[2..];
        let ident_len = after
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(after.len());

        if ident_len == 0 {
            normalized.push_str("/:");
        } else {
            normalized.push_str("/{");
            normalized.push_str(&after[..ident_len]);
            normalized.push('}');
        }
        rest = &after[ident_len..];
    }

    normalized.push_str(rest);
    normalized
}

/// Builds the default operation for one method on one normalized path
fn default_operation(method: &str, path: &str) -> Operation {
    let mut responses = BTreeMap::new();
    responses.insert("200".to_string(), Response::described("OK"));

    let mut requirement = SecurityRequirement::new();
    requirement.insert(BEARER_AUTH.to_string(), Vec::new());

    Operation {
        summary: Some(format!("{} {}", method.to_uppercase(), path)),
        responses: Some(responses),
        security: Some(vec![requirement]),
        ..Operation::default()
    }
}

/// Synthesizes a path table with a minimal operation for every registered method.
///
/// Methods are lower-cased and `options`/`head` are dropped. Endpoints that normalize to the
/// same path share one PathItem; if two of them offer the same method the later one wins.
/// An endpoint with nothing left after filtering contributes no entry.
pub fn build_paths(endpoints: &[Endpoint]) -> Paths {
    debug!("Building base paths from {} endpoints", endpoints.len());
    let mut paths = Paths::new();

    for endpoint in endpoints {
        let path = normalize_path(&endpoint.path);
        let operations: BTreeMap<String, Operation> = endpoint
            .methods
            .iter()
            .map(|method| method.to_lowercase())
            .filter(|method| !SKIPPED_METHODS.contains(&method.as_str()))
            .map(|method| {
                let operation = default_operation(&method, &path);
                (method, operation)
            })
            .collect();

        if operations.is_empty() {
            debug!("Skipping {}: no documentable methods", endpoint.path);
            continue;
        }

        paths
            .entry(path)
            .or_insert_with(PathItem::default)
            .operations
            .extend(operations);
    }

    paths
}
