use anyhow::{anyhow, bail, Context};
use clap::Subcommand;
use serde_json::{Map, Value};
use std::io::Read;

use crate::cli::client::ApiClient;
use crate::cli::config::Session;
use crate::cli::form::RecordForm;
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;
use crate::entity::{EntityDescriptor, EntityKind};

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List records in a collection")]
    List {
        #[arg(help = "Collection name (builds, signals, privates, privacys, keys)")]
        collection: String,
    },

    #[command(about = "Show a single record")]
    Get {
        #[arg(help = "Collection name")]
        collection: String,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from --set fields or stdin JSON")]
    Create {
        #[arg(help = "Collection name")]
        collection: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Set a field value (repeatable)")]
        set: Vec<String>,
    },

    #[command(about = "Update a record from --set fields or stdin JSON")]
    Update {
        #[arg(help = "Collection name")]
        collection: String,
        #[arg(help = "Record ID")]
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Set a field value (repeatable)")]
        set: Vec<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Collection name")]
        collection: String,
        #[arg(help = "Record ID")]
        id: String,
    },
}

pub async fn handle(
    cmd: DataCommands,
    session: &Session,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = authenticated_client(session)?;

    match cmd {
        DataCommands::List { collection } => {
            let descriptor = resolve_collection(&collection)?;
            let records = client.get(&format!("/api/{}", descriptor.collection)).await?;
            output_value(output_format, &records)
        }

        DataCommands::Get { collection, id } => {
            let descriptor = resolve_collection(&collection)?;
            let record = client.get(&format!("/api/{}/{}", descriptor.collection, id)).await?;
            output_value(output_format, &record)
        }

        DataCommands::Create { collection, set } => {
            let descriptor = resolve_collection(&collection)?;

            let mut form = RecordForm::new(descriptor);
            fill_form(&mut form, descriptor, set)?;

            let path = format!("/api/{}", descriptor.collection);
            let client_ref = &client;
            let path_ref = path.as_str();
            let saved = form
                .submit(move |values| async move {
                    client_ref.post(path_ref, Value::Object(values)).await
                })
                .await;

            match saved {
                Some(record) => output_value(output_format, &record),
                None => Err(anyhow!(form.error().unwrap_or("save failed").to_string())),
            }
        }

        DataCommands::Update { collection, id, set } => {
            let descriptor = resolve_collection(&collection)?;

            // Seed from the current record so unchanged fields survive
            let current = client.get(&format!("/api/{}/{}", descriptor.collection, id)).await?;
            let current = current
                .as_object()
                .ok_or_else(|| anyhow!("unexpected record format"))?;

            let mut form = RecordForm::with_initial(descriptor, current);
            fill_form(&mut form, descriptor, set)?;

            let path = format!("/api/{}/{}", descriptor.collection, id);
            let client_ref = &client;
            let path_ref = path.as_str();
            let saved = form
                .submit(move |values| async move {
                    client_ref.patch(path_ref, Value::Object(values)).await
                })
                .await;

            match saved {
                Some(record) => output_value(output_format, &record),
                None => Err(anyhow!(form.error().unwrap_or("save failed").to_string())),
            }
        }

        DataCommands::Delete { collection, id } => {
            let descriptor = resolve_collection(&collection)?;
            client.delete(&format!("/api/{}/{}", descriptor.collection, id)).await?;
            output_success(output_format, &format!("Deleted {} {}", descriptor.collection, id), None)
        }
    }
}

fn authenticated_client(session: &Session) -> anyhow::Result<ApiClient> {
    if !session.is_logged_in() {
        bail!("not logged in; run `workbench auth login <email>` first");
    }
    Ok(ApiClient::new(&session.server, session.token.clone()))
}

fn resolve_collection(segment: &str) -> anyhow::Result<&'static EntityDescriptor> {
    EntityKind::from_collection(segment)
        .map(EntityKind::descriptor)
        .ok_or_else(|| anyhow!("unknown collection: {}", segment))
}

/// Apply `--set field=value` pairs, or stdin JSON when none are given
fn fill_form(
    form: &mut RecordForm,
    descriptor: &'static EntityDescriptor,
    set: Vec<String>,
) -> anyhow::Result<()> {
    if set.is_empty() {
        for (field, value) in stdin_fields()? {
            if !form.set(&field, value) {
                bail!("unknown field '{}' for {}", field, descriptor.collection);
            }
        }
        return Ok(());
    }

    for pair in set {
        let (field, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{}'", pair))?;
        if !form.set(field, value) {
            bail!("unknown field '{}' for {}", field, descriptor.collection);
        }
    }
    Ok(())
}

fn stdin_fields() -> anyhow::Result<Vec<(String, String)>> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let map: Map<String, Value> = serde_json::from_str(&input).context("stdin must be a JSON object")?;

    map.into_iter()
        .map(|(field, value)| match value {
            Value::String(s) => Ok((field, s)),
            other => Err(anyhow!("field '{}' must be a string, got {}", field, other)),
        })
        .collect()
}
