//! `mimic generate`: sample text from a user's model.

use anyhow::{Context, Result};
use console::style;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::state::AppState;

/// Generate `count` responses from `user_id`'s model, seeded by `seed`.
pub async fn generate(
    state: &AppState,
    user_id: &str,
    seed: &str,
    count: usize,
    rng_seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut rng = match rng_seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut store = state.model_store();
    let samples = generate_samples(&mut store, user_id, seed, count, &mut rng).await?;

    if json {
        let result = serde_json::json!({
            "user_id": user_id,
            "seed": seed,
            "samples": samples,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    if samples.is_empty() {
        println!(
            "  {} No trained model for '{}'.",
            style("i").blue().bold(),
            style(user_id).cyan(),
        );
        println!("     Train one with: mimic train {user_id} <file>");
    } else {
        for sample in &samples {
            println!("  {} {}", style(">").dim(), sample);
        }
    }
    println!();
    Ok(())
}

/// Up to `count` responses. Empty when the model has never been trained.
pub async fn generate_samples(
    store: &mut crate::state::ConcreteModelStore,
    user_id: &str,
    seed: &str,
    count: usize,
    rng: &mut StdRng,
) -> Result<Vec<String>> {
    if store
        .get_model(user_id)
        .await
        .with_context(|| format!("Failed to load model for '{user_id}'"))?
        .is_empty()
    {
        return Ok(Vec::new());
    }

    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        samples.push(store.respond(user_id, seed, rng).await?);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_samples_from_trained_model() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init_in(dir.path().to_path_buf()).await.unwrap();
        let mut store = state.model_store();
        store.train("U1", "the only sentence").await.unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let samples = generate_samples(&mut state.model_store(), "U1", "", 3, &mut rng)
            .await
            .unwrap();
        assert_eq!(samples, vec!["the only sentence"; 3]);

        let none = generate_samples(&mut store, "U2", "", 3, &mut rng).await.unwrap();
        assert!(none.is_empty());
    }
}
