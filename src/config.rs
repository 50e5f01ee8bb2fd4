//! Document metadata and HTTP surface settings.
//!
//! Defaults are usable as-is; a YAML file may override any subset of [`SynthConfig`]:
//!
//! ```yaml
//! title: Chat API
//! version: 2.1.0
//! annotation_patterns:
//!   - "src/routes/**/*.rs"
//!   - "docs/openapi/*.yaml"
//! tags:
//!   - name: auth
//!     description: Authentication and session endpoints.
//! ```

use crate::openapi::Tag;
use crate::scanner::DEFAULT_PATTERN;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_TITLE: &str = "Generated API";

pub const DEFAULT_DESCRIPTION: &str = "This OpenAPI document provides a starting point for API \
documentation. Only a limited set of endpoints are described today; extend it with route-level \
@openapi annotations to document additional paths.";

/// API domain tags advertised in every document, whether or not a path references them
const DEFAULT_TAGS: [(&str, &str); 25] = [
    ("auth", "Authentication and session endpoints."),
    ("actions", "Action execution and tool integrations."),
    ("agents", "Agent configuration and execution endpoints."),
    ("assistants", "Assistant configuration endpoints."),
    ("balance", "Account balance and usage endpoints."),
    ("banner", "Banner configuration endpoints."),
    ("categories", "Prompt category endpoints."),
    ("config", "Server and UI configuration endpoints."),
    ("convos", "Conversation management endpoints."),
    ("endpoints", "Model endpoint configuration endpoints."),
    ("files", "File upload and retrieval endpoints."),
    ("keys", "API key and provider key endpoints."),
    ("mcp", "Model Context Protocol endpoints."),
    ("memories", "Memory management endpoints."),
    ("messages", "Message creation and retrieval endpoints."),
    ("models", "Model discovery endpoints."),
    ("permissions", "Access permission endpoints."),
    ("presets", "Preset management endpoints."),
    ("prompts", "Prompt management endpoints."),
    ("roles", "Role-based access endpoints."),
    ("search", "Search endpoints."),
    ("share", "Shared conversation endpoints."),
    ("tags", "Tag management endpoints."),
    ("user", "User profile endpoints."),
    ("system", "System health and metadata endpoints."),
];

/// The default tag catalog
pub fn default_tag_catalog() -> Vec<Tag> {
    DEFAULT_TAGS
        .iter()
        .map(|(name, description)| Tag::new(*name, *description))
        .collect()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_description() -> Option<String> {
    Some(DEFAULT_DESCRIPTION.to_string())
}

fn default_patterns() -> Vec<String> {
    vec![DEFAULT_PATTERN.to_string()]
}

/// Static document metadata and annotation sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// `info.version`; defaults to this crate's package version
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_description")]
    pub description: Option<String>,
    #[serde(default = "default_tag_catalog")]
    pub tags: Vec<Tag>,
    /// Glob patterns, relative to the project root, selecting annotation sources
    #[serde(default = "default_patterns")]
    pub annotation_patterns: Vec<String>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: default_description(),
            tags: default_tag_catalog(),
            annotation_patterns: default_patterns(),
        }
    }
}

impl SynthConfig {
    /// Loads a configuration file; keys it omits keep their defaults
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse configuration YAML")
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Replaces the annotation patterns unless `patterns` is empty
    pub fn with_annotation_patterns(mut self, patterns: Vec<String>) -> Self {
        if !patterns.is_empty() {
            self.annotation_patterns = patterns;
        }
        self
    }
}

/// Routes and title of the documentation surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsConfig {
    pub spec_path: String,
    pub docs_path: String,
    pub title: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            spec_path: "/openapi.json".to_string(),
            docs_path: "/docs".to_string(),
            title: "API Docs".to_string(),
        }
    }
}
