// src/cli.rs
use crate::generation::OutputFormat;
use crate::store::{CompanyContext, ContextStore};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "pitchbuddy")]
#[command(about = "Company contexts and AI-generated outreach from LinkedIn profiles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the contexts directory from config.yaml
    #[arg(long, global = true)]
    pub contexts_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Manage company contexts
    #[command(subcommand)]
    Context(ContextCommand),
    /// List the supported output formats
    Formats,
}

#[derive(Subcommand)]
pub enum ContextCommand {
    /// List all contexts, reporting unreadable records
    List,
    /// Print one context as JSON
    Show { name: String },
    /// Create a new context
    Create {
        name: String,
        #[command(flatten)]
        fields: ContextFields,
    },
    /// Change fields of an existing context; unspecified fields are kept
    Update {
        name: String,
        /// Move the context to a new name
        #[arg(long)]
        rename: Option<String>,
        #[command(flatten)]
        fields: ContextFields,
    },
    /// Delete a context
    Delete { name: String },
    /// Write a context as JSON to a file or stdout
    Export {
        name: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import a context from an exported JSON file
    Import {
        file: PathBuf,
        /// Store under this name instead of the one in the file
        #[arg(long)]
        name: Option<String>,
        /// Replace an existing context with the same name
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(Args, Default)]
pub struct ContextFields {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub technology: Option<String>,
    /// Repeat for each value proposition, in order
    #[arg(long = "value-prop")]
    pub value_props: Vec<String>,
    #[arg(long)]
    pub positioning: Option<String>,
}

impl ContextFields {
    /// Apply the given flags on top of `base`
    pub fn apply(self, mut base: CompanyContext) -> CompanyContext {
        if let Some(description) = self.description {
            base.description = description;
        }
        if let Some(technology) = self.technology {
            base.technology = technology;
        }
        if !self.value_props.is_empty() {
            base.value_propositions = self.value_props;
        }
        if let Some(positioning) = self.positioning {
            base.positioning = positioning;
        }
        base
    }
}

pub fn print_formats() {
    for format in OutputFormat::ALL {
        println!("{:<14} {}", format.slug(), format.label());
    }
}

pub fn handle_context_command(store: &ContextStore, command: ContextCommand) -> Result<()> {
    match command {
        ContextCommand::List => {
            let listing = store.list()?;
            if listing.contexts.is_empty() {
                println!("No company contexts found.");
            } else {
                println!("{:<30} {:<20}", "Name", "Updated");
                println!("{}", "-".repeat(50));
                for context in &listing.contexts {
                    let updated = context
                        .updated_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<30} {:<20}", context.name, updated);
                }
            }
            for issue in &listing.issues {
                eprintln!("⚠️  Skipped {}: {}", issue.path.display(), issue.reason);
            }
        }

        ContextCommand::Show { name } => {
            println!("{}", store.export(&name)?);
        }

        ContextCommand::Create { name, fields } => {
            let context = store.create(fields.apply(CompanyContext::new(name)))?;
            info!("Context created from CLI: {}", context.name);
            println!("✅ Context '{}' created", context.name);
        }

        ContextCommand::Update {
            name,
            rename,
            fields,
        } => {
            let mut context = fields.apply(store.get(&name)?);
            if let Some(new_name) = rename {
                context.name = new_name;
            }
            let context = store.update(&name, context)?;
            println!("✅ Context '{}' updated", context.name);
        }

        ContextCommand::Delete { name } => {
            store.delete(&name)?;
            println!("✅ Context '{}' deleted", name.trim());
        }

        ContextCommand::Export { name, output } => {
            let json = store.export(&name)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("✅ Exported '{}' to {}", name.trim(), path.display());
                }
                None => println!("{}", json),
            }
        }

        ContextCommand::Import {
            file,
            name,
            overwrite,
        } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let context = store.import(&json, name.as_deref(), overwrite)?;
            println!("✅ Context '{}' imported", context.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_with_value_props() {
        let cli = Cli::try_parse_from([
            "pitchbuddy",
            "context",
            "create",
            "Acme Corp",
            "--value-prop",
            "faster deploys",
            "--value-prop",
            "lower cost",
            "--positioning",
            "DevOps for mid-market",
        ])
        .unwrap();

        match cli.command {
            Command::Context(ContextCommand::Create { name, fields }) => {
                assert_eq!(name, "Acme Corp");
                assert_eq!(fields.value_props, vec!["faster deploys", "lower cost"]);
                assert_eq!(fields.positioning.as_deref(), Some("DevOps for mid-market"));
                assert!(fields.description.is_none());
            }
            _ => panic!("expected context create"),
        }
    }

    #[test]
    fn test_update_keeps_unspecified_fields() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::open(StoreConfig::new(dir.path())).unwrap();
        store
            .create(
                CompanyContext::new("Acme")
                    .with_description("Cloud infra")
                    .with_positioning("mid-market"),
            )
            .unwrap();

        handle_context_command(
            &store,
            ContextCommand::Update {
                name: "Acme".to_string(),
                rename: None,
                fields: ContextFields {
                    positioning: Some("enterprise".to_string()),
                    ..ContextFields::default()
                },
            },
        )
        .unwrap();

        let context = store.get("Acme").unwrap();
        assert_eq!(context.positioning, "enterprise");
        assert_eq!(context.description, "Cloud infra");
    }

    #[test]
    fn test_delete_missing_context_fails() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::open(StoreConfig::new(dir.path())).unwrap();

        let result = handle_context_command(
            &store,
            ContextCommand::Delete {
                name: "Nope".to_string(),
            },
        );
        assert!(result.is_err());
    }
}
