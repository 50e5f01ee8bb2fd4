//! OpenAPI Synthesizer - OpenAPI 3.0 documents from a web application's routes and annotations.
//!
//! The document is rebuilt on every request from two inputs:
//!
//! - **Routes**: `(path, methods)` pairs from any [`endpoint::EndpointProvider`]. Providers
//!   include a live [`endpoint::RouteTable`] that routers register into, and
//!   [`extractor::SourceRoutes`], which reads Axum and Actix-Web router code statically.
//! - **Annotations**: YAML fragments in `@openapi` doc comments, collected by
//!   [`annotations::DocCommentCollector`] from files selected by glob patterns.
//!
//! # Pipeline
//!
//! 1. [`paths`] - One placeholder operation per route and verb, with `{param}` paths
//! 2. [`merge`] - Annotated operations override the placeholders, responses merge per status
//! 3. [`backfill`] - Operations still missing bodies or responses get placeholder schemas
//! 4. [`openapi_builder`] - Metadata, tag catalog and `bearerAuth` wrap the paths
//! 5. [`serializer`] / [`server`] - The document leaves as YAML, JSON or an HTTP response
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_synth::{
//!     annotations::DocCommentCollector,
//!     config::SynthConfig,
//!     extractor::SourceRoutes,
//!     openapi_builder::Synthesizer,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let root = PathBuf::from("./my-project");
//! let config = SynthConfig::default();
//! let synth = Synthesizer::new(config.clone())
//!     .with_provider(Arc::new(SourceRoutes::new(root.clone())))
//!     .with_annotations(Arc::new(DocCommentCollector::new(root, config.annotation_patterns)));
//!
//! let document = synth.build_document(Some("http://localhost:3080")).unwrap();
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! See the [`cli`] module for the `generate` and `serve` commands.

pub mod annotations;
pub mod backfill;
pub mod cli;
pub mod config;
pub mod detector;
pub mod endpoint;
pub mod error;
pub mod extractor;
pub mod merge;
pub mod openapi;
pub mod openapi_builder;
pub mod parser;
pub mod paths;
pub mod scanner;
pub mod serializer;
pub mod server;
