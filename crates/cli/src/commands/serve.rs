//! `reelbot serve`: start the HTTP chat gateway.

use reelbot_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🎬 ReelBot Gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {} via {}", config.default_model, config.default_provider);
    println!("   History:   last {} entries per session", config.gateway.history_limit);

    reelbot_gateway::start(config).await?;

    Ok(())
}
