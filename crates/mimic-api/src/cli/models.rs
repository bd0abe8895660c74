//! `mimic models`: list persisted text models.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use mimic_core::directory::UserDirectory;
use mimic_core::storage::KvStore;
use mimic_core::storage::model_store::decode_state;
use mimic_types::storage::{MODEL_KEY_PREFIX, user_id_from_model_key};
use serde::Serialize;

use crate::state::AppState;

/// Summary of one persisted model.
#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub user_id: String,
    pub name: Option<String>,
    pub contexts: usize,
    pub transitions: u64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// False when the stored value no longer decodes.
    pub readable: bool,
}

/// Collect a summary of every persisted model, ordered by user id.
pub async fn collect_models(state: &AppState) -> Result<Vec<ModelSummary>> {
    let keys = state.kv_store.list_keys(MODEL_KEY_PREFIX).await?;
    let mut summaries = Vec::with_capacity(keys.len());

    for key in &keys {
        let Some(user_id) = user_id_from_model_key(key) else {
            continue;
        };
        let Some(entry) = state.kv_store.get_entry(key).await? else {
            continue;
        };
        let name = match state.directory.find_by_id(user_id).await {
            Ok(user) => user.map(|u| u.name),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to look up model owner");
                None
            }
        };
        let (contexts, transitions, readable) = match decode_state(entry.value) {
            Ok(chain) => (chain.context_count(), chain.transition_count(), true),
            Err(_) => (0, 0, false),
        };
        summaries.push(ModelSummary {
            user_id: user_id.to_string(),
            name,
            contexts,
            transitions,
            updated_at: entry.updated_at,
            readable,
        });
    }

    Ok(summaries)
}

/// Print the model listing as a table or JSON.
pub async fn list_models(state: &AppState, json: bool) -> Result<()> {
    let models = collect_models(state).await?;

    if json {
        let result = serde_json::json!({
            "models": models,
            "count": models.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if models.is_empty() {
        println!();
        println!("  {} No text models yet.", style("i").blue().bold());
        println!("     Train one with: mimic train <user-id> <file>");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("User").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Contexts").fg(Color::White),
        Cell::new("Transitions").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for model in &models {
        let contexts = if model.readable {
            Cell::new(model.contexts)
        } else {
            Cell::new("(unreadable)").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&model.user_id).fg(Color::Cyan),
            Cell::new(model.name.as_deref().unwrap_or("-")),
            contexts,
            Cell::new(model.transitions),
            Cell::new(model.updated_at.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("  Text models ({} total)", models.len());
    println!();
    println!("{table}");
    println!();
    Ok(())
}
