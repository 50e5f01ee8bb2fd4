use crate::annotations::DocCommentCollector;
use crate::config::{DocsConfig, SynthConfig};
use crate::endpoint::RouteTable;
use crate::extractor::SourceRoutes;
use crate::openapi_builder::Synthesizer;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::server::{docs_router, serve};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// OpenAPI Synthesizer - Build an OpenAPI 3.0 document from a web project's routes and @openapi annotations
#[derive(Parser, Debug)]
#[command(name = "openapi-synth")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print or write the OpenAPI document
    Generate(GenerateArgs),
    /// Serve the OpenAPI document and a Swagger UI page over HTTP
    Serve(ServeArgs),
}

/// Where routes and annotations come from
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Specify the web framework to parse (if not specified, auto-detect)
    #[arg(short = 'w', long = "framework", value_enum)]
    pub framework: Option<Framework>,

    /// Glob pattern selecting annotation sources, relative to the project (repeatable)
    #[arg(long = "annotations", value_name = "GLOB")]
    pub annotations: Vec<String>,

    /// YAML configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// URL listed as the document's only server
    #[arg(long = "server-url", value_name = "URL")]
    pub server_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Address to listen on
    #[arg(long = "bind", value_name = "ADDR", default_value = "127.0.0.1:3080")]
    pub bind: SocketAddr,

    /// Route serving the OpenAPI document
    #[arg(long = "spec-path", default_value = "/openapi.json")]
    pub spec_path: String,

    /// Route serving the Swagger UI page
    #[arg(long = "docs-path", default_value = "/docs")]
    pub docs_path: String,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Supported web frameworks
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Framework {
    /// Axum framework
    Axum,
    /// Actix-Web framework
    #[value(name = "actix-web")]
    ActixWeb,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    let project = match &args.command {
        Command::Generate(generate) => &generate.project,
        Command::Serve(serve) => &serve.project,
    };

    if !project.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            project.project_path.display()
        );
    }

    if !project.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            project.project_path.display()
        );
    }

    info!("Project path: {}", project.project_path.display());
    match project.framework {
        Some(framework) => info!("Framework: {:?}", framework),
        None => info!("Framework: auto-detect"),
    }

    Ok(args)
}

/// Loads the configuration file, if any, and applies command line overrides
pub fn load_config(project: &ProjectArgs) -> Result<SynthConfig> {
    let config = match &project.config {
        Some(path) => SynthConfig::from_yaml_file(path)?,
        None => SynthConfig::default(),
    };
    Ok(config.with_annotation_patterns(project.annotations.clone()))
}

/// Synthesizer reading the project's source routes and annotations
pub fn project_synthesizer(project: &ProjectArgs, config: SynthConfig) -> Synthesizer {
    let routes = SourceRoutes::new(project.project_path.clone())
        .with_framework(project.framework);
    let annotations = DocCommentCollector::new(
        project.project_path.clone(),
        config.annotation_patterns.clone(),
    );

    Synthesizer::new(config)
        .with_provider(Arc::new(routes))
        .with_annotations(Arc::new(annotations))
}

/// Run the selected subcommand
pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Generate(generate) => run_generate(generate),
        Command::Serve(serve) => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(run_serve(serve))
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let config = load_config(&args.project)?;
    let synth = project_synthesizer(&args.project, config);
    let document = synth.build_document(args.server_url.as_deref())?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Paths: {}", document.paths.len());
    info!("  - Schemas: {}", document.components.schemas.len());
    info!("  - Tags: {}", document.tags.len());

    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = load_config(&args.project)?;
    let docs = DocsConfig {
        spec_path: args.spec_path.clone(),
        docs_path: args.docs_path.clone(),
        title: format!("{} Docs", config.title),
    };

    // The docs routes register themselves here, so the document lists them too
    let mounted = RouteTable::new();
    let synth = project_synthesizer(&args.project, config).with_provider(Arc::new(mounted.clone()));
    let router = docs_router(synth, &docs, &mounted)?;

    serve(args.bind, router).await?;
    Ok(())
}
