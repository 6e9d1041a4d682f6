//! `lectern serve`: start the HTTP API.

use std::path::Path;
use std::sync::Arc;

pub async fn run(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("📚 lectern API");
    println!("   Listening: {}:{}", config.server.host, config.server.port);
    println!("   Default model: {}", config.default_model);
    println!("   Fallback model: {}", config.fallback_model);

    let state = lectern_gateway::bootstrap(config).map_err(|e| format!("Startup failed: {e}"))?;
    println!("   Lessons loaded: {}", state.lessons.total());

    lectern_gateway::start(Arc::new(state)).await
}
