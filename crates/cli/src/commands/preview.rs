//! `lectern preview`: estimate context size and cost for a selection.

use super::format_usd;
use lectern_config::AppConfig;
use lectern_lessons::{ContextBuilder, LessonStore};
use lectern_telemetry::{ContextEstimate, ModelPricing};
use std::path::Path;

/// Everything `/context/preview` would report, plus the pricing model.
#[derive(Debug)]
struct Preview {
    model: String,
    lesson_count: usize,
    estimate: ContextEstimate,
    lessons: Vec<String>,
}

pub fn run(
    config_path: Option<&Path>,
    ids: &[u32],
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = LessonStore::load(&config.paths.lessons_dir);
    let preview = compute(&config, &store, ids, model.as_deref());

    println!("🔎 Context preview");
    println!();
    println!("  Lessons:         {}", preview.lesson_count);
    for title in &preview.lessons {
        println!("    - {title}");
    }
    println!("  Estimated tokens: {}", preview.estimate.estimated_tokens);
    println!("  Priced with:     {}", preview.model);
    println!(
        "  Input cost:      {}",
        format_usd(preview.estimate.estimated_cost_input)
    );
    println!(
        "  Output cost:     {}",
        format_usd(preview.estimate.estimated_cost_output)
    );
    Ok(())
}

fn compute(config: &AppConfig, store: &LessonStore, ids: &[u32], model: Option<&str>) -> Preview {
    let builder = ContextBuilder::new(store);
    let selection = (!ids.is_empty()).then_some(ids);

    let profile = model
        .and_then(|m| config.known_model(m).cloned())
        .unwrap_or_else(|| config.model(&config.default_model));
    let estimate = ContextEstimate::new(
        builder.estimate_tokens(selection),
        &ModelPricing::of(&profile),
    );

    Preview {
        model: profile.id,
        lesson_count: builder.selection(selection).len(),
        estimate,
        lessons: builder.labels(selection),
    }
}
