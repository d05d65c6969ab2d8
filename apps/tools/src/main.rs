use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::{domain::FormId, protocol::FormDocument};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tools", about = "Maintenance commands for the forms database")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/forms.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a form document read from a JSON file.
    Import { path: PathBuf },
    Export {
        form_id: String,
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    List,
    Delete { form_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open '{}'", cli.database_url))?;

    match cli.command {
        Command::Import { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            let document: FormDocument = serde_json::from_str(&raw)
                .with_context(|| format!("'{}' is not a form document", path.display()))?;
            form_core::from_document(&document)
                .with_context(|| format!("'{}' is not a consistent form", path.display()))?;

            let stored = storage.save_form(&document).await?;
            let form_id = stored.id.map(|id| id.to_string()).unwrap_or_default();
            info!(%form_id, questions = stored.question_fields.len(), "form imported");
            println!("{form_id}");
        }
        Command::Export { form_id, output } => {
            let Some(stored) = storage.get_form(&FormId(form_id.clone())).await? else {
                bail!("form {form_id} not found");
            };
            let json = serde_json::to_string_pretty(&stored.document)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    info!(%form_id, path = %path.display(), "form exported");
                }
                None => println!("{json}"),
            }
        }
        Command::List => {
            for form in storage.list_forms().await? {
                println!("{}\t{}\t{}", form.id, form.updated_at.to_rfc3339(), form.title);
            }
        }
        Command::Delete { form_id } => {
            if !storage.delete_form(&FormId(form_id.clone())).await? {
                bail!("form {form_id} not found");
            }
            println!("deleted {form_id}");
        }
    }

    Ok(())
}
