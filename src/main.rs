// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use openc2_validate::driver::{self, USAGE_EXIT_CODE};
use openc2_validate::validator::{BuiltinSchema, Schema};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Validates OpenC2 JSON messages against a JSON Schema.
///
/// The exit status is the number of files that failed validation.
#[derive(Parser, Debug)]
#[command(name = "openc2-validate", version, about)]
#[command(group(ArgGroup::new("schema_source").args(["command", "response", "schema"])))]
struct Cli {
    /// Use built-in Command schema (default)
    #[arg(short, long)]
    command: bool,

    /// Use built-in Response schema
    #[arg(short, long)]
    response: bool,

    /// Use your own custom JSON-Schema file
    #[arg(short, long, value_name = "FILE", value_parser = existing_file)]
    schema: Option<PathBuf>,

    /// Quiet output; exit status returns number of failures
    #[arg(short, long)]
    quiet: bool,

    /// The list of files to validate
    #[arg(value_name = "FILE", value_parser = existing_file)]
    files: Vec<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
enum SchemaSource {
    Builtin(BuiltinSchema),
    File(PathBuf),
}

impl Cli {
    /// The schema options are mutually exclusive, so at most one is set.
    fn schema_source(&self) -> SchemaSource {
        match (self.command, self.response, &self.schema) {
            (_, _, Some(path)) => SchemaSource::File(path.clone()),
            (false, true, None) => SchemaSource::Builtin(BuiltinSchema::Response),
            _ => SchemaSource::Builtin(BuiltinSchema::Command),
        }
    }
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        Err(format!("File \"{value}\" does not exist."))
    } else if path.is_dir() {
        Err(format!("File \"{value}\" is a directory."))
    } else {
        Ok(path)
    }
}

fn load_schema(source: &SchemaSource) -> Result<Schema> {
    match source {
        SchemaSource::Builtin(builtin) => Schema::builtin(*builtin)
            .with_context(|| format!("Failed to load built-in {} schema", builtin.name())),
        SchemaSource::File(path) => Schema::from_path(path)
            .with_context(|| format!("Failed to load schema {}", path.display())),
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let source = cli.schema_source();
    let schema = load_schema(&source)?;
    debug!(?source, files = cli.files.len(), "validating");

    let summary = driver::run(&schema, &cli.files, cli.quiet, &mut io::stdout().lock())
        .context("Failed to write report")?;
    Ok(summary.exit_code())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(USAGE_EXIT_CODE)
        }
    }
}
