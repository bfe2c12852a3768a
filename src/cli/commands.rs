use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::generator::{generate_project_from_spec, GenerateOptions};
use crate::model::build_model;
use crate::spec::load_spec;

/// Command-line interface for busgen
#[derive(Parser)]
#[command(name = "busgen")]
#[command(about = "Generate NATS message-bus services from AsyncAPI documents", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a complete service project from an AsyncAPI document
    Generate {
        /// Path to the AsyncAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Output directory for the generated project
        #[arg(short, long)]
        output: PathBuf,

        /// Replace the output directory if it already exists
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Parse and model a document without writing anything
    Check {
        /// Path to the AsyncAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,
    },
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Generate {
            spec,
            output,
            force,
        } => {
            let written = generate_project_from_spec(
                spec,
                &GenerateOptions {
                    output_root: output.clone(),
                    force: *force,
                },
            )?;
            println!(
                "generated {} files under {}",
                written.len(),
                output.display()
            );
            Ok(())
        }
        Commands::Check { spec } => {
            let document = load_spec(spec)?;
            let model = build_model(&document)?;
            println!(
                "{}: {} channels, {} types, {} schema files",
                model.title,
                model.channels.len(),
                model.types.len(),
                model.schemas.len()
            );
            Ok(())
        }
    }
}
