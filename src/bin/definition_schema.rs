#![cfg(feature = "json_schema")]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jsonschema::{Draft, JSONSchema};
use reportbuilder::core::models::DynamicReportDefinition;
use schemars::schema_for;
use std::{fs, path::PathBuf};

/// Generate the JSON Schema for report definitions or validate a definition file against it.
#[derive(Parser, Debug)]
#[command(name = "definition-schema", about = "Report definition schema generator and validator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the DynamicReportDefinition JSON schema (or write it to a file)
    Schema {
        /// Optional output path for the schema JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a JSON definition file against the schema
    Validate {
        /// Path to the definition JSON
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Schema { output } => {
            let schema = schema_for!(DynamicReportDefinition);
            let json = serde_json::to_string_pretty(&schema)?;

            if let Some(path) = output {
                fs::write(&path, json)?;
                eprintln!("Wrote schema to {}", path.display());
            } else {
                println!("{json}");
            }
        }
        Command::Validate { file } => {
            let schema = schema_for!(DynamicReportDefinition);
            // jsonschema keeps a reference to the schema; leak a small boxed value to satisfy 'static.
            let schema_json = serde_json::to_value(schema)?;
            let schema_ref: &'static serde_json::Value = Box::leak(Box::new(schema_json));
            let compiled = JSONSchema::options()
                .with_draft(Draft::Draft7)
                .compile(schema_ref)
                .context("failed to compile definition schema")?;

            let text = fs::read_to_string(&file).context("failed to read definition file")?;
            let json_value: serde_json::Value =
                serde_json::from_str(&text).context("definition file is not valid JSON")?;

            if let Err(errors) = compiled.validate(&json_value) {
                eprintln!("Validation errors for {}:", file.display());
                for err in errors {
                    eprintln!("- {} at {}", err, err.instance_path);
                }
                std::process::exit(1);
            }
            // Schema-valid is not enough: the typed parse also checks operator tags and value shapes
            serde_json::from_value::<DynamicReportDefinition>(json_value)
                .context("definition does not deserialize")?;
            println!("{} is a valid report definition", file.display());
        }
    }

    Ok(())
}
