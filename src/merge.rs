//! Combines synthesized base paths with annotated paths.
//!
//! Annotations win every conflict. Scalar and list fields are replaced wholesale when the
//! annotation sets them. `responses` merge per status code, and `requestBody` and each
//! response merge field by field with their `content` merged per media type, so an
//! annotation that documents only a `400` keeps the generated `200`.

use crate::openapi::{Content, Operation, PathItem, Paths, RequestBody, Response};
use log::debug;

/// Merges annotated paths over base paths.
///
/// A path present on only one side is taken unchanged. For a path on both sides the method
/// sets are unioned and operations present on both are merged with [`merge_operation`].
pub fn merge_paths(base: Paths, annotated: Option<Paths>) -> Paths {
    let Some(annotated) = annotated else {
        return base;
    };

    let mut merged = base;
    for (path, item) in annotated {
        match merged.remove(&path) {
            Some(base_item) => {
                debug!("Merging annotated path {}", path);
                merged.insert(path, merge_path_item(base_item, item));
            }
            None => {
                debug!("Adding annotation-only path {}", path);
                merged.insert(path, item);
            }
        }
    }
    merged
}

fn merge_path_item(base: PathItem, annotated: PathItem) -> PathItem {
    let mut operations = base.operations;
    for (method, operation) in annotated.operations {
        let merged = match operations.remove(&method) {
            Some(base_operation) => merge_operation(base_operation, operation),
            None => operation,
        };
        operations.insert(method, merged);
    }

    let mut extensions = base.extensions;
    extensions.extend(annotated.extensions);

    PathItem {
        reference: annotated.reference.or(base.reference),
        summary: annotated.summary.or(base.summary),
        description: annotated.description.or(base.description),
        servers: annotated.servers.or(base.servers),
        parameters: annotated.parameters.or(base.parameters),
        operations,
        extensions,
    }
}

/// Merges one annotated operation over a base operation
pub fn merge_operation(base: Operation, annotated: Operation) -> Operation {
    let responses = match (base.responses, annotated.responses) {
        (Some(mut base_responses), Some(annotated_responses)) => {
            for (status, response) in annotated_responses {
                let merged = match base_responses.remove(&status) {
                    Some(base_response) => merge_response(base_response, response),
                    None => response,
                };
                base_responses.insert(status, merged);
            }
            Some(base_responses)
        }
        (base_responses, annotated_responses) => annotated_responses.or(base_responses),
    };

    let request_body = match (base.request_body, annotated.request_body) {
        (Some(base_body), Some(annotated_body)) => {
            Some(merge_request_body(base_body, annotated_body))
        }
        (base_body, annotated_body) => annotated_body.or(base_body),
    };

    let mut extensions = base.extensions;
    extensions.extend(annotated.extensions);

    Operation {
        tags: annotated.tags.or(base.tags),
        summary: annotated.summary.or(base.summary),
        description: annotated.description.or(base.description),
        operation_id: annotated.operation_id.or(base.operation_id),
        parameters: annotated.parameters.or(base.parameters),
        request_body,
        responses,
        deprecated: annotated.deprecated.or(base.deprecated),
        security: annotated.security.or(base.security),
        extensions,
    }
}

/// A `$ref` stands for the whole object, so a referencing annotation replaces the base.
fn merge_request_body(base: RequestBody, annotated: RequestBody) -> RequestBody {
    if annotated.reference.is_some() {
        return annotated;
    }

    let mut extensions = base.extensions;
    extensions.extend(annotated.extensions);

    RequestBody {
        reference: base.reference,
        description: annotated.description.or(base.description),
        required: annotated.required.or(base.required),
        content: merge_content(base.content, annotated.content),
        extensions,
    }
}

fn merge_response(base: Response, annotated: Response) -> Response {
    if annotated.reference.is_some() {
        return annotated;
    }

    let mut extensions = base.extensions;
    extensions.extend(annotated.extensions);

    Response {
        reference: base.reference,
        description: annotated.description.or(base.description),
        content: merge_content(base.content, annotated.content),
        extensions,
    }
}

fn merge_content(base: Option<Content>, annotated: Option<Content>) -> Option<Content> {
    match (base, annotated) {
        (Some(mut base), Some(annotated)) => {
            base.extend(annotated);
            Some(base)
        }
        (base, annotated) => annotated.or(base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::{MediaType, Schema};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn operation(summary: &str, statuses: &[(&str, &str)]) -> Operation {
        let responses = statuses
            .iter()
            .map(|(status, description)| (status.to_string(), Response::described(*description)))
            .collect::<BTreeMap<_, _>>();
        Operation {
            summary: Some(summary.to_string()),
            responses: if responses.is_empty() {
                None
            } else {
                Some(responses)
            },
            ..Operation::default()
        }
    }

    fn paths_with(path: &str, method: &str, operation: Operation) -> Paths {
        let mut item = PathItem::default();
        item.operations.insert(method.to_string(), operation);
        let mut paths = Paths::new();
        paths.insert(path.to_string(), item);
        paths
    }

    fn json_content(schema: Schema) -> Content {
        let mut content = Content::new();
        content.insert(
            "application/json".to_string(),
            MediaType {
                schema: Some(schema),
                ..MediaType::default()
            },
        );
        content
    }

    #[test]
    fn test_annotated_summary_overrides_and_base_responses_survive() {
        let base = paths_with("/user", "get", operation("A", &[("200", "OK")]));
        let annotated = paths_with("/user", "get", operation("B", &[]));

        let merged = merge_paths(base, Some(annotated));
        let op = &merged["/user"].operations["get"];

        assert_eq!(op.summary.as_deref(), Some("B"));
        let responses = op.responses.as_ref().unwrap();
        assert_eq!(responses["200"].description.as_deref(), Some("OK"));
    }

    #[test]
    fn test_responses_merge_per_status_code() {
        let base = paths_with(
            "/auth/login",
            "post",
            operation("POST /auth/login", &[("200", "OK")]),
        );
        let annotated = paths_with(
            "/auth/login",
            "post",
            operation("Login", &[("400", "Invalid credentials.")]),
        );

        let merged = merge_paths(base, Some(annotated));
        let responses = merged["/auth/login"].operations["post"]
            .responses
            .clone()
            .unwrap();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses["200"].description.as_deref(), Some("OK"));
        assert_eq!(
            responses["400"].description.as_deref(),
            Some("Invalid credentials.")
        );
    }

    #[test]
    fn test_same_status_annotation_wins_but_keeps_base_content() {
        let mut base_op = operation("A", &[("200", "OK")]);
        base_op.responses.as_mut().unwrap().get_mut("200").unwrap().content =
            Some(json_content(Schema::placeholder_object("base")));
        let annotated_op = operation("A", &[("200", "Login succeeded.")]);

        let merged = merge_operation(base_op, annotated_op);
        let response = &merged.responses.unwrap()["200"];

        assert_eq!(response.description.as_deref(), Some("Login succeeded."));
        assert!(response.content.as_ref().unwrap().contains_key("application/json"));
    }

    #[test]
    fn test_request_body_merges_per_field() {
        let base_op = Operation {
            request_body: Some(RequestBody {
                required: Some(false),
                content: Some(json_content(Schema::placeholder_object("base"))),
                ..RequestBody::default()
            }),
            ..Operation::default()
        };
        let annotated_op = Operation {
            request_body: Some(RequestBody {
                required: Some(true),
                content: Some(json_content(Schema::component_ref("LoginRequest"))),
                ..RequestBody::default()
            }),
            ..Operation::default()
        };

        let body = merge_operation(base_op, annotated_op).request_body.unwrap();
        assert_eq!(body.required, Some(true));
        let schema = body.content.unwrap()["application/json"].schema.clone().unwrap();
        assert_eq!(
            schema.reference.as_deref(),
            Some("#/components/schemas/LoginRequest")
        );
    }

    #[test]
    fn test_referenced_response_replaces_base() {
        let mut base_op = operation("A", &[("200", "OK")]);
        base_op.responses.as_mut().unwrap().get_mut("200").unwrap().content =
            Some(json_content(Schema::placeholder_object("base")));
        let annotated_op = Operation {
            responses: Some(BTreeMap::from([(
                "200".to_string(),
                Response {
                    reference: Some("#/components/responses/Session".to_string()),
                    ..Response::default()
                },
            )])),
            ..Operation::default()
        };

        let merged = merge_operation(base_op, annotated_op);
        let response = &merged.responses.unwrap()["200"];
        assert_eq!(
            response.reference.as_deref(),
            Some("#/components/responses/Session")
        );
        assert!(response.description.is_none());
        assert!(response.content.is_none());
    }

    #[test]
    fn test_path_extensions_are_merged() {
        let mut base = paths_with("/user", "get", operation("A", &[("200", "OK")]));
        base.get_mut("/user")
            .unwrap()
            .extensions
            .insert("x-owner".to_string(), serde_json::json!("accounts"));
        let mut annotated = paths_with("/user", "get", operation("B", &[]));
        annotated
            .get_mut("/user")
            .unwrap()
            .extensions
            .insert("x-internal".to_string(), serde_json::json!(true));

        let merged = merge_paths(base, Some(annotated));
        let item = &merged["/user"];
        assert_eq!(item.extensions.len(), 2);
        assert_eq!(item.extensions["x-internal"], serde_json::json!(true));
        assert_eq!(item.operations.len(), 1);
    }

    #[test]
    fn test_method_sets_are_unioned() {
        let base = paths_with("/user", "get", operation("GET /user", &[("200", "OK")]));
        let annotated = paths_with("/user", "delete", operation("Delete", &[]));

        let merged = merge_paths(base, Some(annotated));
        let methods: Vec<_> = merged["/user"].operations.keys().cloned().collect();
        assert_eq!(methods, vec!["delete", "get"]);
    }

    #[test]
    fn test_one_sided_paths_are_taken_unchanged() {
        let base = paths_with("/a", "get", operation("A", &[("200", "OK")]));
        let annotated = paths_with("/b", "post", operation("B", &[]));

        let merged = merge_paths(base.clone(), Some(annotated.clone()));
        assert_eq!(merged["/a"], base["/a"]);
        assert_eq!(merged["/b"], annotated["/b"]);
    }

    #[test]
    fn test_absent_annotations_return_base() {
        let base = paths_with("/a", "get", operation("A", &[("200", "OK")]));
        assert_eq!(merge_paths(base.clone(), None), base);
    }

    #[test]
    fn test_base_fields_kept_when_annotation_omits_them() {
        let mut base_op = operation("GET /user", &[("200", "OK")]);
        base_op.security = Some(vec![BTreeMap::from([(
            "bearerAuth".to_string(),
            Vec::new(),
        )])]);
        let annotated_op = Operation {
            tags: Some(vec!["user".to_string()]),
            ..Operation::default()
        };

        let merged = merge_operation(base_op, annotated_op);
        assert_eq!(merged.summary.as_deref(), Some("GET /user"));
        assert_eq!(merged.tags, Some(vec!["user".to_string()]));
        assert!(merged.security.is_some());
    }
}
