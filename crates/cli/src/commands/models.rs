//! `lectern models`: show the model catalog.

use super::format_usd;
use lectern_config::AppConfig;
use std::fmt::Write as _;
use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    println!("🤖 Model catalog");
    println!();
    print!("{}", render(&config));
    Ok(())
}

fn render(config: &AppConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<44} {:>8} {:>12} {:>12}",
        "Model", "Context", "In / 1M", "Out / 1M"
    );
    for model in &config.models {
        let marker = if model.id == config.default_model {
            " (default)"
        } else if model.id == config.fallback_model {
            " (fallback)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:<44} {:>8} {:>12} {:>12}{marker}",
            model.id,
            model.context_display,
            format_usd(model.input_cost_per_1m),
            format_usd(model.output_cost_per_1m),
        );
    }
    if config.known_model(&config.default_model).is_none() {
        let _ = writeln!(
            out,
            "\n  ⚠️  default model {} is not in the catalog; it will be billed at $0",
            config.default_model
        );
    }
    out
}
