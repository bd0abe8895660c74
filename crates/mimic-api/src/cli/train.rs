//! `mimic train`: bulk-train a user's model from a text file.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use mimic_core::directory::UserDirectory;
use mimic_infra::filesystem::read_samples;
use mimic_types::chat::UserRecord;

use crate::state::AppState;

/// Train `user_id`'s model on every line of `file`.
pub async fn train_from_file(
    state: &AppState,
    user_id: &str,
    file: &Path,
    name: Option<&str>,
    json: bool,
) -> Result<()> {
    let samples = read_samples(file)
        .await
        .with_context(|| format!("Failed to read training file {}", file.display()))?;

    if let Some(name) = name {
        state
            .directory
            .reconcile(&UserRecord::new(user_id, name))
            .await
            .with_context(|| format!("Failed to record user '{user_id}'"))?;
    }

    let mut store = state.model_store();
    let accepted = store
        .train_batch(user_id, &samples)
        .await
        .with_context(|| format!("Failed to train model for '{user_id}'"))?;
    let contexts = store.get_model(user_id).await?.context_count();

    if json {
        let result = serde_json::json!({
            "user_id": user_id,
            "samples": samples.len(),
            "accepted": accepted,
            "contexts": contexts,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Trained '{}' on {} of {} samples ({} contexts)",
        style("ok").green(),
        style(user_id).cyan(),
        style(accepted).bold(),
        samples.len(),
        contexts,
    );
    if accepted < samples.len() {
        println!(
            "     {}",
            style(format!(
                "{} samples were shorter than min_words = {}",
                samples.len() - accepted,
                state.config.min_words
            ))
            .dim()
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::storage::KvStore;

    #[tokio::test]
    async fn test_train_from_file_persists_model_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init_in(dir.path().join("data")).await.unwrap();
        let corpus = dir.path().join("corpus.txt");
        tokio::fs::write(&corpus, "hello there\n\nhow are you\n").await.unwrap();

        train_from_file(&state, "U1", &corpus, Some("alice"), true)
            .await
            .unwrap();

        assert!(state.kv_store.get("model:U1").await.unwrap().is_some());
        let user = state.directory.find_by_id("U1").await.unwrap().unwrap();
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_train_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init_in(dir.path().to_path_buf()).await.unwrap();
        let result = train_from_file(&state, "U1", &dir.path().join("nope.txt"), None, true).await;
        assert!(result.is_err());
    }
}
