//! `reelbot config`: print, locate, or validate configuration.

use reelbot_config::AppConfig;

const REDACTED: &str = "[REDACTED]";

pub async fn default() -> Result<(), Box<dyn std::error::Error>> {
    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!("{}", AppConfig::default_toml());
    Ok(())
}

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            if !config.default_provider_ready() {
                warnings.push("No completion API key (set GROQ_API_KEY or REELBOT_API_KEY)");
            }
            if !config.has_catalog_key() {
                warnings.push("No TMDB API key (set TMDB_API_KEY); every lookup will fail");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.default_provider);
            println!("   Model:     {}", config.default_model);
            println!("   Catalog:   {}", config.catalog.base_url);
            println!("   Embeds:    {}", config.embed.base_url);
            println!("   Gateway:   {}:{}", config.gateway.host, config.gateway.port);
            println!("   Max turns: {}", config.agent.max_turns);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&redacted(config))?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

/// Mask every secret so `show` output is safe to paste.
fn redacted(mut config: AppConfig) -> AppConfig {
    let mask = |key: &mut Option<String>| {
        if key.is_some() {
            *key = Some(REDACTED.to_string());
        }
    };
    mask(&mut config.api_key);
    mask(&mut config.catalog.api_key);
    for provider in config.providers.values_mut() {
        mask(&mut provider.api_key);
    }
    config
}
