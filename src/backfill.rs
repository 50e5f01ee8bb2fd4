//! Fills in placeholder JSON bodies wherever an operation documents none.

use crate::openapi::{Content, MediaType, Paths, RequestBody, Response, Schema};
use log::debug;
use std::collections::BTreeMap;

/// Media type used for every placeholder body
pub const JSON_MEDIA_TYPE: &str = "application/json";

pub const REQUEST_PLACEHOLDER: &str = "Inferred request schema placeholder.";
pub const RESPONSE_PLACEHOLDER: &str = "Inferred response schema placeholder.";

/// Methods whose operations are expected to carry a request body
const BODY_METHODS: [&str; 4] = ["post", "put", "patch", "delete"];

fn placeholder_content(description: &str) -> Content {
    let mut content = Content::new();
    content.insert(
        JSON_MEDIA_TYPE.to_string(),
        MediaType {
            schema: Some(Schema::placeholder_object(description)),
            ..MediaType::default()
        },
    );
    content
}

fn is_missing(content: &Option<Content>) -> bool {
    content.as_ref().map_or(true, |content| content.is_empty())
}

/// Attaches placeholder schemas to every request body and response that lacks content.
///
/// Existing request bodies and response content are never replaced, and `$ref` entries are
/// left alone. Running this twice is the same as running it once.
pub fn backfill_schemas(paths: &mut Paths) {
    let mut filled = 0usize;

    for (path, item) in paths.iter_mut() {
        for (method, operation) in item.operations.iter_mut() {
            if BODY_METHODS.contains(&method.as_str()) {
                match operation.request_body.as_mut() {
                    None => {
                        operation.request_body = Some(RequestBody {
                            required: Some(false),
                            content: Some(placeholder_content(REQUEST_PLACEHOLDER)),
                            ..RequestBody::default()
                        });
                        filled += 1;
                    }
                    Some(body) if body.reference.is_none() && is_missing(&body.content) => {
                        body.content = Some(placeholder_content(REQUEST_PLACEHOLDER));
                        filled += 1;
                    }
                    Some(_) => {}
                }
            }

            let responses = operation.responses.get_or_insert_with(BTreeMap::new);
            if responses.is_empty() {
                debug!("{} {} declares no responses, adding 200", method, path);
                responses.insert("200".to_string(), Response::described("OK"));
            }

            for response in responses.values_mut() {
                if response.reference.is_none() && is_missing(&response.content) {
                    response.content = Some(placeholder_content(RESPONSE_PLACEHOLDER));
                    filled += 1;
                }
            }
        }
    }

    debug!("Backfilled {} placeholder bodies", filled);
}
