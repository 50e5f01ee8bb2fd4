//! OpenAPI Synthesizer - Command-line front end.
//!
//! Builds an OpenAPI 3.0 document from a Rust web project's routes and `@openapi`
//! annotations, or serves it live next to a Swagger UI page.
//!
//! # Usage
//!
//! ```bash
//! openapi-synth generate [OPTIONS] <PROJECT_PATH>
//! openapi-synth serve [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Write the document as JSON:
//! ```bash
//! openapi-synth generate ./my-api -f json -o openapi.json --server-url http://localhost:3080
//! ```
//!
//! Serve `/openapi.json` and `/docs`:
//! ```bash
//! openapi-synth serve ./my-api --bind 0.0.0.0:3080
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_synth::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("OpenAPI Synthesizer starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    Ok(())
}
