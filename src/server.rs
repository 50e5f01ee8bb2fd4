//! HTTP surface: the generated document as JSON and a Swagger UI page that loads it.

use crate::config::DocsConfig;
use crate::endpoint::RouteTable;
use crate::error::{Error, Result};
use crate::openapi::Document;
use crate::openapi_builder::Synthesizer;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::Html;
use axum::routing::{any, get};
use axum::{Json, Router};
use log::{debug, info};
use std::net::SocketAddr;
use std::sync::Arc;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

struct DocsState {
    synth: Synthesizer,
    page: String,
}

/// `<scheme>://<host>` of the request, if it names a host.
///
/// The scheme is the first `X-Forwarded-Proto` value, else `http`.
pub fn server_url(headers: &HeaderMap) -> Option<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|host| !host.is_empty())?;

    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|scheme| !scheme.is_empty())
        .unwrap_or("http");

    Some(format!("{}://{}", scheme, host))
}

/// Swagger UI page that fetches its document from `spec_path`
pub fn swagger_ui_html(title: &str, spec_path: &str) -> String {
    let spec_url = serde_json::Value::String(spec_path.to_string());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.10.0/swagger-ui.css">
    <style>
        body {{
            margin: 0;
            padding: 0;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.10.0/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {{
            SwaggerUIBundle({{
                url: {spec_url},
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis]
            }});
        }};
    </script>
</body>
</html>"#,
        title = escape_html(title),
        spec_url = spec_url,
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn validate_route(path: &str) -> Result<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "Route path must start with '/': {}",
            path
        )))
    }
}

/// The same route with its trailing slash toggled; `None` for the root
fn slash_variant(path: &str) -> Option<String> {
    match path.strip_suffix('/') {
        Some("") => None,
        Some(trimmed) => Some(trimmed.to_string()),
        None => Some(format!("{}/", path)),
    }
}

/// Router serving `GET {spec_path}` and the Swagger UI page at `{docs_path}` for any method.
///
/// The page also answers on `{docs_path}` with its trailing slash toggled. Only the two
/// configured routes are recorded in `routes` as `GET`, so a synthesizer reading that table
/// documents them.
pub fn docs_router(synth: Synthesizer, docs: &DocsConfig, routes: &RouteTable) -> Result<Router> {
    validate_route(&docs.spec_path)?;
    validate_route(&docs.docs_path)?;
    if docs.spec_path == docs.docs_path {
        return Err(Error::InvalidArgument(format!(
            "Document and Swagger UI routes must differ: {}",
            docs.spec_path
        )));
    }

    let state = Arc::new(DocsState {
        synth,
        page: swagger_ui_html(&docs.title, &docs.spec_path),
    });

    routes.register(docs.spec_path.as_str(), ["GET"]);
    routes.register(docs.docs_path.as_str(), ["GET"]);
    info!("OpenAPI document endpoint enabled at {}", docs.spec_path);
    info!("Swagger UI enabled at {}", docs.docs_path);

    let mut router = Router::new()
        .route(&docs.spec_path, get(openapi_json))
        .route(&docs.docs_path, any(swagger_ui));
    if let Some(alias) = slash_variant(&docs.docs_path).filter(|alias| *alias != docs.spec_path) {
        debug!("Swagger UI also answers at {}", alias);
        router = router.route(&alias, any(swagger_ui));
    }

    Ok(router.with_state(state))
}

async fn openapi_json(
    State(state): State<Arc<DocsState>>,
    headers: HeaderMap,
) -> Result<Json<Document>> {
    let server_url = server_url(&headers);
    debug!("Building OpenAPI document for {:?}", server_url);

    // Route extraction and annotation scanning touch the filesystem
    let synth = state.synth.clone();
    let document = tokio::task::spawn_blocking(move || synth.build_document(server_url.as_deref()))
        .await
        .map_err(|e| Error::Pipeline(anyhow::anyhow!("Document build task failed: {}", e)))??;

    Ok(Json(document))
}

async fn swagger_ui(State(state): State<Arc<DocsState>>) -> Html<String> {
    Html(state.page.clone())
}

/// Serves `router` on `addr` until Ctrl-C
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;
    Ok(())
}
