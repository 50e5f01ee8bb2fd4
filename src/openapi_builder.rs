use crate::annotations::{AnnotationSource, OpenApiFragment};
use crate::backfill::backfill_schemas;
use crate::config::SynthConfig;
use crate::endpoint::{Endpoint, EndpointProvider};
use crate::merge::merge_paths;
use crate::openapi::{
    Components, Document, Info, Paths, Schema, SecurityScheme, Server, OPENAPI_VERSION,
};
use crate::paths::{build_paths, BEARER_AUTH};
use anyhow::Result;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

/// OpenAPI document assembler.
///
/// Wraps a finished path table with the configured metadata, the tag catalog and the
/// `bearerAuth` security scheme.
pub struct OpenApiBuilder {
    config: SynthConfig,
}

impl OpenApiBuilder {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    /// Build the final OpenAPI document.
    ///
    /// `servers` holds `server_url` as its only entry, and is omitted when the URL is absent
    /// or empty.
    pub fn build(
        &self,
        paths: Paths,
        schemas: BTreeMap<String, Schema>,
        server_url: Option<&str>,
    ) -> Document {
        debug!(
            "Assembling document: {} paths, {} schemas",
            paths.len(),
            schemas.len()
        );

        let servers = server_url.filter(|url| !url.is_empty()).map(|url| {
            vec![Server {
                url: url.to_string(),
                description: None,
            }]
        });

        let mut security_schemes = BTreeMap::new();
        security_schemes.insert(BEARER_AUTH.to_string(), SecurityScheme::bearer_jwt());

        Document {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: self.config.title.clone(),
                version: self.config.version.clone(),
                description: self.config.description.clone(),
            },
            servers,
            tags: self.config.tags.clone(),
            components: Components {
                security_schemes,
                schemas,
                ..Components::default()
            },
            paths,
        }
    }
}

/// Request-scoped document pipeline.
///
/// Every [`build_document`](Synthesizer::build_document) call reads the providers and the
/// annotation source afresh and assembles a new document; nothing is cached between calls.
#[derive(Clone)]
pub struct Synthesizer {
    config: SynthConfig,
    providers: Vec<Arc<dyn EndpointProvider>>,
    annotations: Arc<dyn AnnotationSource>,
}

impl Synthesizer {
    /// A synthesizer with no route providers and no annotations
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            providers: Vec::new(),
            annotations: Arc::new(OpenApiFragment::default()),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn EndpointProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_annotations(mut self, annotations: Arc<dyn AnnotationSource>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Runs route listing, base paths, annotation merge, backfill and assembly
    pub fn build_document(&self, server_url: Option<&str>) -> Result<Document> {
        let endpoints: Vec<Endpoint> = self
            .providers
            .iter()
            .flat_map(|provider| provider.list_endpoints())
            .collect();
        debug!(
            "{} endpoints from {} providers",
            endpoints.len(),
            self.providers.len()
        );

        let base = build_paths(&endpoints);
        let fragment = self.annotations.collect_annotations();
        let schemas = fragment.schemas();

        let mut paths = merge_paths(base, fragment.paths);
        backfill_schemas(&mut paths);

        Ok(OpenApiBuilder::new(self.config.clone()).build(paths, schemas, server_url))
    }
}
