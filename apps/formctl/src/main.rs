use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{FormEditor, FormRepository, FormsClient, DEFAULT_SERVER_URL, SERVER_URL_ENV};
use form_core::{to_document, Field, FormState, PreviewSession};
use shared::domain::{FieldType, FormId};
use tracing_subscriber::EnvFilter;

mod responses;

#[derive(Parser, Debug)]
#[command(name = "formctl", about = "Edit and preview forms stored on a forms server")]
struct Cli {
    #[arg(long, env = SERVER_URL_ENV, default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored forms, most recently updated first.
    List,
    Show {
        form_id: String,
        /// Print the stored document as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Create a form and print its id.
    New {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    AddField {
        form_id: String,
        /// One of text, number, radio, select.
        #[arg(long = "type", value_parser = parse_field_type, default_value = "text")]
        field_type: FieldType,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        required: bool,
        #[arg(long = "option")]
        options: Vec<String>,
    },
    /// Move the question at position FROM to position TO (0-based).
    MoveField {
        form_id: String,
        from: usize,
        to: usize,
    },
    /// Validate a JSON file of responses against a stored form.
    Validate {
        form_id: String,
        #[arg(value_name = "RESPONSES")]
        responses_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut editor = FormEditor::new(FormsClient::new(&cli.server_url)?);

    let result = run(&mut editor, cli.command).await;
    if let Some(notice) = editor.take_notice() {
        eprintln!("{notice}");
    }
    result
}

async fn run<R: FormRepository + 'static>(editor: &mut FormEditor<R>, command: Command) -> Result<()> {
    match command {
        Command::List => {
            let forms = editor.list().await?;
            if forms.is_empty() {
                println!("no forms yet");
            }
            for form in forms {
                println!("{}\t{}", form.id, form.title);
            }
        }
        Command::Show { form_id, json } => {
            editor.load(&FormId(form_id)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&to_document(editor.state()))?);
            } else {
                print_form(editor.state());
            }
        }
        Command::New { title, description } => {
            editor.new_form();
            if let Some(title) = title {
                editor.state_mut().set_title(title);
            }
            if let Some(description) = description {
                editor.state_mut().set_description(description);
            }
            let form_id = editor.save().await?;
            println!("{form_id}");
        }
        Command::AddField {
            form_id,
            field_type,
            label,
            required,
            options,
        } => {
            editor.load(&FormId(form_id)).await?;
            let state = editor.state_mut();
            let field_id = state.add_field(
                Field::new(field_type)
                    .with_label(label.unwrap_or_default())
                    .with_required(required),
            );
            if field_type.has_options() {
                if options.is_empty() {
                    state.add_numbered_option(&field_id)?;
                }
                for option in options {
                    state.add_option(&field_id, option)?;
                }
            }
            editor.save().await?;
            println!("{field_id}");
        }
        Command::MoveField { form_id, from, to } => {
            editor.load(&FormId(form_id)).await?;
            editor.state_mut().move_field(from, to)?;
            editor.save().await?;
            print_form(editor.state());
        }
        Command::Validate {
            form_id,
            responses_file,
        } => {
            editor.load(&FormId(form_id)).await?;
            let raw = std::fs::read_to_string(&responses_file)
                .with_context(|| format!("failed to read '{}'", responses_file.display()))?;

            let mut session = PreviewSession::new(editor.state());
            responses::fill_from_json(&mut session, &raw)?;
            match session.submit() {
                Ok(submission) => {
                    println!("valid: {} answer(s)", submission.responses.len());
                }
                Err(errors) => {
                    for (field_id, message) in errors.iter() {
                        let label = editor
                            .state()
                            .field(field_id)
                            .map(Field::display_label)
                            .unwrap_or_default();
                        println!("{field_id}\t{label}\t{message}");
                    }
                    anyhow::bail!("{} required field(s) unanswered", errors.len());
                }
            }
        }
    }

    Ok(())
}

fn print_form(state: &FormState) {
    println!("{}", state.display_title());
    if !state.description().is_empty() {
        println!("{}", state.description());
    }
    for (position, field) in state.ordered_fields().enumerate() {
        let marker = if field.required { " *" } else { "" };
        println!(
            "{position}. {}{marker} [{}] ({})",
            field.display_label(),
            field.field_type(),
            field.id
        );
        if let Some(options) = field.options() {
            for (option_id, label) in options {
                println!("     - {label} ({option_id})");
            }
        }
    }
}

fn parse_field_type(raw: &str) -> Result<FieldType, String> {
    FieldType::from_wire_name(raw).ok_or_else(|| {
        let names: Vec<_> = FieldType::ALL.iter().map(|t| t.wire_name()).collect();
        format!("unknown field type '{raw}', expected one of {}", names.join(", "))
    })
}
